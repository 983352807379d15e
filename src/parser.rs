//! Canonical text form of a recurrence rule.
//!
//! Both directions are driven by the [`Part`] table below: every key knows how
//! to read its value into a [`RuleDraft`] and how to write it back out of a
//! [`RecurrenceRule`]. Adding a key to one direction without the other is not
//! possible.

use crate::error::{Error, Result};
use crate::rrule::{Frequency, NthWeekday, RecurrenceRule, RuleDraft};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc, Weekday};
use std::fmt;
use std::str::FromStr;

const UNTIL_FORMAT: &str = "%Y%m%dT%H%M%SZ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Part {
    Freq,
    Interval,
    Count,
    Until,
    ByDay,
    ByMonthDay,
    ByMonth,
    ByWeekNo,
    Wkst,
}

impl Part {
    /// Serialization order.
    const CANONICAL: [Part; 9] = [
        Part::Freq,
        Part::Interval,
        Part::Count,
        Part::Until,
        Part::ByDay,
        Part::ByMonthDay,
        Part::ByMonth,
        Part::ByWeekNo,
        Part::Wkst,
    ];

    fn key(self) -> &'static str {
        match self {
            Part::Freq => "FREQ",
            Part::Interval => "INTERVAL",
            Part::Count => "COUNT",
            Part::Until => "UNTIL",
            Part::ByDay => "BYDAY",
            Part::ByMonthDay => "BYMONTHDAY",
            Part::ByMonth => "BYMONTH",
            Part::ByWeekNo => "BYWEEKNO",
            Part::Wkst => "WKST",
        }
    }

    fn from_key(key: &str) -> Option<Part> {
        Part::CANONICAL
            .into_iter()
            .find(|part| part.key().eq_ignore_ascii_case(key))
    }

    fn read(self, raw: &str, draft: &mut RuleDraft) -> Result<()> {
        let invalid = || Error::parse(self.key(), raw);

        match self {
            Part::Freq => draft.frequency = frequency_from_str(raw).ok_or_else(invalid)?,
            Part::Interval => {
                let interval: u32 = raw.parse().map_err(|_| invalid())?;
                if interval == 0 {
                    return Err(invalid());
                }
                draft.interval = Some(interval);
            }
            Part::Count => {
                let count: u32 = raw.parse().map_err(|_| invalid())?;
                if count == 0 {
                    return Err(invalid());
                }
                draft.count = Some(count);
            }
            Part::Until => draft.until = Some(parse_until(raw).ok_or_else(invalid)?),
            Part::ByDay => draft.by_weekday = list(raw, parse_nth_weekday).ok_or_else(invalid)?,
            Part::ByMonthDay => {
                draft.by_month_day = list(raw, |s| {
                    s.parse::<i8>()
                        .ok()
                        .filter(|d| *d != 0 && (-31..=31).contains(d))
                })
                .ok_or_else(invalid)?
            }
            Part::ByMonth => {
                draft.by_month = list(raw, |s| {
                    s.parse::<u8>().ok().filter(|m| (1..=12).contains(m))
                })
                .ok_or_else(invalid)?
            }
            Part::ByWeekNo => {
                draft.by_week_no = list(raw, |s| {
                    s.parse::<i8>()
                        .ok()
                        .filter(|w| *w != 0 && (-53..=53).contains(w))
                })
                .ok_or_else(invalid)?
            }
            Part::Wkst => draft.week_start = Some(weekday_from_code(raw).ok_or_else(invalid)?),
        }

        Ok(())
    }

    fn write(self, rule: &RecurrenceRule) -> Option<String> {
        match self {
            Part::Freq => Some(frequency_str(rule.frequency()).to_owned()),
            Part::Interval => Some(rule.interval().to_string()),
            Part::Count => rule.count().map(|c| c.to_string()),
            Part::Until => rule.until().map(|u| u.format(UNTIL_FORMAT).to_string()),
            Part::ByDay => join(rule.by_weekday(), |d| {
                if d.ordinal == 0 {
                    weekday_code(d.weekday).to_owned()
                } else {
                    format!("{}{}", d.ordinal, weekday_code(d.weekday))
                }
            }),
            Part::ByMonthDay => join(rule.by_month_day(), ToString::to_string),
            Part::ByMonth => join(rule.by_month(), ToString::to_string),
            Part::ByWeekNo => join(rule.by_week_no(), ToString::to_string),
            Part::Wkst => rule.declared_week_start().map(|w| weekday_code(w).to_owned()),
        }
    }
}

fn list<T>(raw: &str, item: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    raw.split(',').map(|s| item(s.trim())).collect()
}

fn join<T>(values: &[T], item: impl Fn(&T) -> String) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(item).collect::<Vec<_>>().join(","))
}

fn frequency_str(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "DAILY",
        Frequency::Weekly => "WEEKLY",
        Frequency::Monthly => "MONTHLY",
        Frequency::Yearly => "YEARLY",
    }
}

fn frequency_from_str(raw: &str) -> Option<Frequency> {
    [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ]
    .into_iter()
    .find(|f| frequency_str(*f).eq_ignore_ascii_case(raw))
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn weekday_from_code(raw: &str) -> Option<Weekday> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .find(|w| weekday_code(*w).eq_ignore_ascii_case(raw))
}

// [+|-]ordinal followed by a two letter day code, e.g. "MO", "2TU", "-1FR"
fn parse_nth_weekday(raw: &str) -> Option<NthWeekday> {
    let split = raw.len().checked_sub(2)?;
    if !raw.is_char_boundary(split) {
        return None;
    }
    let (ordinal, code) = raw.split_at(split);
    let weekday = weekday_from_code(code)?;

    if ordinal.is_empty() {
        return Some(NthWeekday::every(weekday));
    }

    let digits = ordinal.trim_start_matches(['+', '-']);
    if digits.is_empty()
        || ordinal.len() - digits.len() > 1
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let ordinal: i8 = ordinal.strip_prefix('+').unwrap_or(ordinal).parse().ok()?;
    if ordinal == 0 || !(-53..=53).contains(&ordinal) {
        return None;
    }

    Some(NthWeekday::nth(ordinal, weekday))
}

fn parse_until(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(local) = raw.strip_suffix(['Z', 'z']) {
        return NaiveDateTime::parse_from_str(local, "%Y%m%dT%H%M%S")
            .ok()
            .map(|naive| naive.and_utc());
    }

    if raw.len() == 8 {
        return NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc());
    }

    NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parses `FREQ=...;INTERVAL=...` text into a validated rule.
///
/// Keys may appear in any order and in any case, an optional leading `RRULE:`
/// is ignored. Unknown or repeated keys and out-of-range values fail with
/// [`Error::Parse`]; fields that contradict each other fail with
/// [`Error::Validation`].
pub fn parse(text: &str) -> Result<RecurrenceRule> {
    let text = text.trim();
    let body = match text.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &text[6..],
        _ => text,
    };

    let mut frequency = None;
    let mut draft = RuleDraft::new(Frequency::Daily);
    let mut seen = Vec::with_capacity(Part::CANONICAL.len());

    for pair in body.split(';').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::parse(pair, ""))?;
        let part = Part::from_key(key.trim()).ok_or_else(|| Error::parse(key, value))?;
        if seen.contains(&part) {
            return Err(Error::parse(part.key(), value));
        }
        seen.push(part);

        part.read(value.trim(), &mut draft)?;
        if part == Part::Freq {
            frequency = Some(draft.frequency);
        }
    }

    if frequency.is_none() {
        return Err(Error::parse(Part::Freq.key(), ""));
    }

    draft.validate()
}

/// Writes the canonical text form. Never fails and never re-validates.
pub fn serialize(rule: &RecurrenceRule) -> String {
    Part::CANONICAL
        .into_iter()
        .filter_map(|part| part.write(rule).map(|value| format!("{}={value}", part.key())))
        .collect::<Vec<_>>()
        .join(";")
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

impl FromStr for RecurrenceRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl serde::Serialize for RecurrenceRule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&serialize(self))
    }
}

impl<'de> serde::Deserialize<'de> for RecurrenceRule {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}
