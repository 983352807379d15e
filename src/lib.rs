//! Expands recurring events into concrete instances.
//!
//! A [`RecurrenceRule`] is parsed from (and written back to) its RFC 5545
//! style text form, turned into a lazy sequence of start instants anchored at
//! the event's start, clipped to a caller window under a hard instance cap,
//! and finally projected into non-recurring [`Instance`]s.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use recurrence::{expand_recurrence, parse, BaseEvent, ExpansionOptions, Window};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
//! let event = BaseEvent {
//!     id: "standup".into(),
//!     calendar_id: "work".into(),
//!     title: "Standup".into(),
//!     description: String::new(),
//!     start,
//!     end: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
//!     recurrence: Some(parse("FREQ=WEEKLY;BYDAY=MO").unwrap()),
//!     timezone: "UTC".into(),
//!     created_at: start,
//!     updated_at: start,
//! };
//! let window = Window::new(start, Utc.with_ymd_and_hms(2024, 1, 22, 23, 59, 59).unwrap()).unwrap();
//!
//! let instances = expand_recurrence(&event, &window, &ExpansionOptions::default()).unwrap();
//! assert_eq!(instances.len(), 4);
//! assert_eq!(instances[3].id, "standup-20240122T100000Z");
//! ```

mod calendar;
mod daily;
mod error;
mod expand;
mod generator;
mod instance;
mod monthly;
mod parser;
mod rrule;
mod weekly;
mod window;
mod yearly;

pub use error::{Error, Result};
pub use expand::{expand_batch, expand_recurrence, expand_stored, EventSource, ExpansionOptions};
pub use generator::Occurrences;
pub use instance::{format_compact_utc, materialize, BaseEvent, Instance};
pub use parser::{parse, serialize};
pub use rrule::{validate_rule, Frequency, NthWeekday, RecurrenceRule, RuleDraft};
pub use window::{clip, Window};
