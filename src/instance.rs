use crate::rrule::RecurrenceRule;
use crate::window::Window;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A stored event, possibly recurring. Read-only to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseEvent {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "dtstart")]
    pub start: DateTime<Utc>,
    #[serde(rename = "dtend")]
    pub end: DateTime<Utc>,
    #[serde(rename = "rrule", default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    /// Time zone label as given by the client; never used for arithmetic.
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BaseEvent {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// One concrete, non-recurring occurrence of a [`BaseEvent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "dtstart")]
    pub start: DateTime<Utc>,
    #[serde(rename = "dtend")]
    pub end: DateTime<Utc>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&BaseEvent> for Instance {
    /// The event as it is, for events that do not recur.
    fn from(event: &BaseEvent) -> Self {
        Instance {
            id: event.id.clone(),
            calendar_id: event.calendar_id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
            timezone: event.timezone.clone(),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// `20240101T100000Z`
///
/// Only years 0 through 9999 come out as eight date digits.
pub fn format_compact_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Years 0 through 9999, the instants with a fixed-width compact form.
pub(crate) fn compact_range() -> Option<Window> {
    let first = NaiveDate::from_ymd_opt(0, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let last = NaiveDate::from_ymd_opt(9999, 12, 31)?.and_hms_nano_opt(23, 59, 59, 999_999_999)?;
    Window::new(first.and_utc(), last.and_utc()).ok()
}

/// Projects `base` onto a single occurrence, keeping its duration.
///
/// `None` when the instance would end past the last representable instant.
pub fn materialize(base: &BaseEvent, occurrence: DateTime<Utc>) -> Option<Instance> {
    Some(Instance {
        id: format!("{}-{}", base.id, format_compact_utc(occurrence)),
        start: occurrence,
        end: occurrence.checked_add_signed(base.duration())?,
        ..Instance::from(base)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::test_helpers::*;

    #[test]
    fn keeps_duration_and_metadata() {
        let base = standup();
        let occurrence = utc(2024, 1, 8, 10, 0, 0);

        let instance = materialize(&base, occurrence).unwrap();

        assert_eq!(instance.id, "evt-1-20240108T100000Z");
        assert_eq!(instance.start, occurrence);
        assert_eq!(instance.end, utc(2024, 1, 8, 11, 0, 0));
        assert_eq!(instance.title, base.title);
        assert_eq!(instance.description, base.description);
        assert_eq!(instance.calendar_id, base.calendar_id);
        assert_eq!(instance.timezone, "Asia/Tokyo");
        assert_eq!(instance.created_at, base.created_at);
        assert_eq!(instance.updated_at, base.updated_at);
    }

    #[test]
    fn multi_day_duration() {
        let base = BaseEvent {
            end: utc(2024, 1, 3, 12, 30, 15),
            ..standup()
        };

        let instance = materialize(&base, utc(2024, 3, 9, 10, 0, 0)).unwrap();

        assert_eq!(instance.end - instance.start, base.duration());
    }

    #[test]
    fn end_past_calendar_limit() {
        let last_day = NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let base = BaseEvent {
            start: last_day - days(3),
            end: last_day - days(1),
            ..standup()
        };

        assert!(materialize(&base, base.start).is_some());
        assert_eq!(materialize(&base, last_day - days(1)), None);
    }

    #[test]
    fn compact_form_has_fixed_width() {
        let range = compact_range().unwrap();

        assert_eq!(format_compact_utc(range.start()), "00000101T000000Z");
        assert_eq!(format_compact_utc(range.end()), "99991231T235959Z");
    }

    #[test]
    fn id_always_in_utc() {
        let occurrence = eastern(2024, 7, 4, 9);

        assert_eq!(format_compact_utc(occurrence), "20240704T130000Z");
    }

    #[test]
    fn wire_shape() {
        let base = BaseEvent {
            recurrence: Some(parse("FREQ=WEEKLY;BYDAY=MO").unwrap()),
            ..standup()
        };

        let json = serde_json::to_value(&base).unwrap();
        assert_eq!(json["rrule"], "FREQ=WEEKLY;INTERVAL=1;BYDAY=MO");
        assert_eq!(json["dtstart"], "2024-01-01T10:00:00Z");
        assert_eq!(serde_json::from_value::<BaseEvent>(json).unwrap(), base);

        let instance = serde_json::to_value(materialize(&base, base.start).unwrap()).unwrap();
        assert!(instance.get("rrule").is_none());
        assert_eq!(instance["id"], "evt-1-20240101T100000Z");
    }

    #[test]
    fn missing_rule_deserializes_as_none() {
        let mut json = serde_json::to_value(standup()).unwrap();
        json.as_object_mut().unwrap().remove("rrule");

        let base: BaseEvent = serde_json::from_value(json).unwrap();
        assert_eq!(base.recurrence, None);
    }
}
