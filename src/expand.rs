use crate::error::{Error, Result};
use crate::instance::{compact_range, materialize, BaseEvent, Instance};
use crate::window::{clip, Window};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Limits applied to every expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionOptions {
    /// Most instances a single expansion may return.
    pub max_instances: usize,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        ExpansionOptions {
            max_instances: 1000,
        }
    }
}

impl ExpansionOptions {
    pub fn with_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = max_instances;
        self
    }
}

/// Where base events are looked up by id.
pub trait EventSource {
    /// Fails with [`Error::NotFound`] when no event has this id.
    fn get_event(&self, id: &str) -> Result<BaseEvent>;
}

impl<S: BuildHasher> EventSource for HashMap<String, BaseEvent, S> {
    fn get_event(&self, id: &str) -> Result<BaseEvent> {
        self.get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound { id: id.to_owned() })
    }
}

/// Materializes every occurrence of `base` inside `window`.
///
/// An event without a recurrence rule comes back unchanged as its only
/// instance. Either the complete ordered list is returned or an error, never
/// part of the list. Occurrences outside years 0 through 9999, or whose end
/// cannot be represented, are not expanded.
#[tracing::instrument(skip_all, fields(event_id = %base.id, start = %window.start(), end = %window.end()))]
pub fn expand_recurrence(
    base: &BaseEvent,
    window: &Window,
    options: &ExpansionOptions,
) -> Result<Vec<Instance>> {
    if base.end < base.start {
        return Err(Error::TimeRange {
            start: base.start,
            end: base.end,
        });
    }

    let Some(rule) = &base.recurrence else {
        if options.max_instances == 0 {
            return Err(Error::ResourceExceeded { cap: 0 });
        }
        tracing::debug!("event does not recur");
        return Ok(vec![Instance::from(base)]);
    };

    // ids carry a four digit year
    let Some(window) = compact_range().and_then(|range| window.intersect(&range)) else {
        tracing::debug!("window lies outside years 0 through 9999");
        return Ok(Vec::new());
    };

    let occurrences = clip(rule, base.start, &window, options.max_instances)?;
    tracing::debug!(instances = occurrences.len(), rule = %rule, "expanded recurrence");

    let mut instances = Vec::with_capacity(occurrences.len());
    for occurrence in occurrences {
        let Some(instance) = materialize(base, occurrence) else {
            tracing::debug!(%occurrence, "instance ends past the calendar range");
            break;
        };
        instances.push(instance);
    }
    Ok(instances)
}

/// Looks `id` up in `source` and expands it.
pub fn expand_stored(
    source: &impl EventSource,
    id: &str,
    window: &Window,
    options: &ExpansionOptions,
) -> Result<Vec<Instance>> {
    let base = source.get_event(id)?;
    expand_recurrence(&base, window, options)
}

/// Expands many events in parallel; results keep the input order.
#[tracing::instrument(skip_all, fields(events = events.len()))]
pub fn expand_batch(
    events: &[BaseEvent],
    window: &Window,
    options: &ExpansionOptions,
) -> Vec<Result<Vec<Instance>>> {
    events
        .par_iter()
        .map(|event| expand_recurrence(event, window, options))
        .collect()
}
