use crate::error::{Error, Result};
use chrono::{DateTime, Datelike as _, Timelike as _, Utc, Weekday};
use std::fmt::Debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// A weekday, optionally narrowed to its n-th appearance inside the period.
///
/// An ordinal of 0 selects every appearance; negative ordinals count back
/// from the end of the period (`-1` is the last one).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NthWeekday {
    pub ordinal: i8,
    pub weekday: Weekday,
}

impl NthWeekday {
    pub const fn every(weekday: Weekday) -> Self {
        NthWeekday {
            ordinal: 0,
            weekday,
        }
    }

    pub const fn nth(ordinal: i8, weekday: Weekday) -> Self {
        NthWeekday { ordinal, weekday }
    }
}

/// Unvalidated, structured recurrence rule input.
///
/// The only ways to obtain a [`RecurrenceRule`] are [`RuleDraft::validate`]
/// and [`crate::parse`], so every rule the engine sees has passed the same
/// range and consistency checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleDraft {
    pub frequency: Frequency,
    pub interval: Option<u32>,
    pub count: Option<u32>,
    pub until: Option<DateTime<Utc>>,
    pub by_weekday: Vec<NthWeekday>,
    pub by_month_day: Vec<i8>,
    pub by_month: Vec<u8>,
    pub by_week_no: Vec<i8>,
    pub week_start: Option<Weekday>,
}

impl RuleDraft {
    pub fn new(frequency: Frequency) -> Self {
        RuleDraft {
            frequency,
            interval: None,
            count: None,
            until: None,
            by_weekday: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            by_week_no: Vec::new(),
            week_start: None,
        }
    }

    pub fn validate(self) -> Result<RecurrenceRule> {
        let interval = self.interval.unwrap_or(1);
        if interval == 0 {
            return Err(Error::validation("INTERVAL must be at least 1"));
        }

        if self.count == Some(0) {
            return Err(Error::validation("COUNT must be at least 1"));
        }

        if self.count.is_some() && self.until.is_some() {
            return Err(Error::validation("COUNT and UNTIL are mutually exclusive"));
        }

        if let Some(until) = self.until {
            if until.nanosecond() != 0 {
                return Err(Error::validation("UNTIL must be a whole second"));
            }
            if !(0..=9999).contains(&until.year()) {
                return Err(Error::validation(format!(
                    "UNTIL year {} is outside 0..=9999",
                    until.year()
                )));
            }
        }

        let ordinal_limit = match self.frequency {
            _ if !self.by_week_no.is_empty() => 0,
            Frequency::Daily | Frequency::Weekly => 0,
            Frequency::Monthly => 5,
            Frequency::Yearly if !self.by_month.is_empty() => 5,
            Frequency::Yearly => 53,
        };
        for day in &self.by_weekday {
            if i16::from(day.ordinal).abs() > ordinal_limit {
                let reason = if ordinal_limit == 0 {
                    format!("BYDAY ordinal {} is not allowed here", day.ordinal)
                } else {
                    format!(
                        "BYDAY ordinal {} is outside -{ordinal_limit}..={ordinal_limit}",
                        day.ordinal
                    )
                };
                return Err(Error::validation(reason));
            }
        }
        ensure_unique("BYDAY", &self.by_weekday)?;

        if !self.by_month_day.is_empty() && self.frequency == Frequency::Weekly {
            return Err(Error::validation("BYMONTHDAY cannot be used with WEEKLY"));
        }
        for &day in &self.by_month_day {
            if day == 0 || !(-31..=31).contains(&day) {
                return Err(Error::validation(format!("BYMONTHDAY {day} is out of range")));
            }
        }
        ensure_unique("BYMONTHDAY", &self.by_month_day)?;

        for &month in &self.by_month {
            if !(1..=12).contains(&month) {
                return Err(Error::validation(format!("BYMONTH {month} is out of range")));
            }
        }
        ensure_unique("BYMONTH", &self.by_month)?;

        if !self.by_week_no.is_empty() {
            if self.frequency != Frequency::Yearly {
                return Err(Error::validation("BYWEEKNO requires FREQ=YEARLY"));
            }
            if !self.by_month.is_empty() {
                return Err(Error::validation("BYWEEKNO cannot be combined with BYMONTH"));
            }
        }
        for &week in &self.by_week_no {
            if week == 0 || !(-53..=53).contains(&week) {
                return Err(Error::validation(format!("BYWEEKNO {week} is out of range")));
            }
        }
        ensure_unique("BYWEEKNO", &self.by_week_no)?;

        Ok(RecurrenceRule {
            frequency: self.frequency,
            interval,
            count: self.count,
            until: self.until,
            by_weekday: self.by_weekday,
            by_month_day: self.by_month_day,
            by_month: self.by_month,
            by_week_no: self.by_week_no,
            week_start: self.week_start,
        })
    }
}

fn ensure_unique<T: PartialEq + Debug>(field: &str, values: &[T]) -> Result<()> {
    for (i, value) in values.iter().enumerate() {
        if values[..i].contains(value) {
            return Err(Error::validation(format!("{field} lists {value:?} twice")));
        }
    }
    Ok(())
}

/// Checks structured rule input, producing the immutable rule on success.
pub fn validate_rule(draft: RuleDraft) -> Result<RecurrenceRule> {
    draft.validate()
}

/// A validated recurrence rule. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
    count: Option<u32>,
    until: Option<DateTime<Utc>>,
    by_weekday: Vec<NthWeekday>,
    by_month_day: Vec<i8>,
    by_month: Vec<u8>,
    by_week_no: Vec<i8>,
    week_start: Option<Weekday>,
}

impl RecurrenceRule {
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    pub fn by_weekday(&self) -> &[NthWeekday] {
        &self.by_weekday
    }

    pub fn by_month_day(&self) -> &[i8] {
        &self.by_month_day
    }

    pub fn by_month(&self) -> &[u8] {
        &self.by_month
    }

    pub fn by_week_no(&self) -> &[i8] {
        &self.by_week_no
    }

    /// First day of the week, Monday unless the rule says otherwise.
    pub fn week_start(&self) -> Weekday {
        self.week_start.unwrap_or(Weekday::Mon)
    }

    /// The week start exactly as written in the rule.
    pub fn declared_week_start(&self) -> Option<Weekday> {
        self.week_start
    }

    /// True when any by-filter narrows the candidates of a period.
    pub fn has_filters(&self) -> bool {
        !(self.by_weekday.is_empty()
            && self.by_month_day.is_empty()
            && self.by_month.is_empty()
            && self.by_week_no.is_empty())
    }

    pub fn into_draft(self) -> RuleDraft {
        RuleDraft {
            frequency: self.frequency,
            interval: Some(self.interval),
            count: self.count,
            until: self.until,
            by_weekday: self.by_weekday,
            by_month_day: self.by_month_day,
            by_month: self.by_month,
            by_week_no: self.by_week_no,
            week_start: self.week_start,
        }
    }

    pub(crate) fn month_selected(&self, month: u32) -> bool {
        self.by_month.is_empty() || self.by_month.iter().any(|&m| u32::from(m) == month)
    }
}
