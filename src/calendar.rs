//! Plain date arithmetic shared by the frequency modules.
//!
//! Everything works on `NaiveDate`; overflow past chrono's representable range
//! shows up as `None` rather than a panic.

use crate::rrule::NthWeekday;
use chrono::{Datelike as _, NaiveDate, TimeDelta, Weekday};

pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub(crate) fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Days to walk forward from `from` to reach `to`, in `0..7`.
pub(crate) fn days_until(from: Weekday, to: Weekday) -> i64 {
    i64::from((to.num_days_from_monday() + 7 - from.num_days_from_monday()) % 7)
}

/// First day of the week containing `date`.
pub(crate) fn week_start(date: NaiveDate, week_start: Weekday) -> Option<NaiveDate> {
    add_days(date, -days_until(week_start, date.weekday()))
}

/// Months since year 0, so consecutive months differ by one.
pub(crate) fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

pub(crate) fn month_from_index(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// First and last day of a month.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, month, 1)?,
        NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?,
    ))
}

pub(crate) fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// Resolves a signed month day, `-1` being the last day of the month.
pub(crate) fn month_day(year: i32, month: u32, day: i8) -> Option<NaiveDate> {
    let length = i64::from(days_in_month(year, month));
    let day = if day < 0 {
        length + i64::from(day) + 1
    } else {
        i64::from(day)
    };
    if day < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, u32::try_from(day).ok()?)
}

pub(crate) fn month_day_matches(days: &[i8], date: NaiveDate) -> bool {
    days.is_empty()
        || days
            .iter()
            .any(|&day| month_day(date.year(), date.month(), day) == Some(date))
}

/// Every date in `first..=last` falling on `nth.weekday`, narrowed to the
/// requested ordinal.
pub(crate) fn nth_weekdays(first: NaiveDate, last: NaiveDate, nth: NthWeekday) -> Vec<NaiveDate> {
    let mut all = Vec::new();
    let mut cursor = add_days(first, days_until(first.weekday(), nth.weekday));
    while let Some(date) = cursor.filter(|date| *date <= last) {
        all.push(date);
        cursor = add_days(date, 7);
    }

    let index = match nth.ordinal {
        0 => return all,
        n if n > 0 => usize::from(n.unsigned_abs()) - 1,
        n => match all.len().checked_sub(usize::from(n.unsigned_abs())) {
            Some(index) => index,
            None => return Vec::new(),
        },
    };

    all.get(index).copied().into_iter().collect()
}

/// Whether `date` is selected by `nth` when ordinals count within `first..=last`.
pub(crate) fn matches_nth(date: NaiveDate, first: NaiveDate, last: NaiveDate, nth: NthWeekday) -> bool {
    if date.weekday() != nth.weekday || date < first || date > last {
        return false;
    }

    let forward = (date - first).num_days() / 7 + 1;
    let backward = -((last - date).num_days() / 7 + 1);
    let ordinal = i64::from(nth.ordinal);
    ordinal == 0 || ordinal == forward || ordinal == backward
}

/// Start of week 1: the first week beginning on `week_start` that has at
/// least four of its days in `year`. ISO 8601 when the week starts on Monday.
pub(crate) fn first_week(year: i32, week_start: Weekday) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let into_week = days_until(week_start, jan1.weekday());
    if into_week <= 3 {
        add_days(jan1, -into_week)
    } else {
        add_days(jan1, 7 - into_week)
    }
}

pub(crate) fn weeks_in_year(year: i32, week_start: Weekday) -> Option<i64> {
    let this = first_week(year, week_start)?;
    let next = first_week(year.checked_add(1)?, week_start)?;
    Some((next - this).num_days() / 7)
}
