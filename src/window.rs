use crate::error::{Error, Result};
use crate::rrule::RecurrenceRule;
use chrono::{DateTime, Utc};

/// Inclusive `[start, end]` range of instants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(Error::TimeRange { start, end });
        }
        Ok(Window { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// The instants both windows share, if any.
    pub fn intersect(&self, other: &Window) -> Option<Window> {
        Window::new(self.start.max(other.start), self.end.min(other.end)).ok()
    }
}

/// Occurrences of `rule` anchored at `anchor` that fall inside `window`.
///
/// At most `cap` occurrences are returned; finding one more inside the window
/// is [`Error::ResourceExceeded`] rather than a silently shortened list.
pub fn clip(
    rule: &RecurrenceRule,
    anchor: DateTime<Utc>,
    window: &Window,
    cap: usize,
) -> Result<Vec<DateTime<Utc>>> {
    let mut clipped = Vec::new();

    for occurrence in rule.after(anchor, window.start()).bounded_by(window.end()) {
        if clipped.len() == cap {
            tracing::debug!(cap, "window holds more occurrences than allowed");
            return Err(Error::ResourceExceeded { cap });
        }
        clipped.push(occurrence);
    }

    Ok(clipped)
}
