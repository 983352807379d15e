use crate::{calendar, generator::Period, rrule::RecurrenceRule};
use chrono::{Datelike as _, NaiveDate};

const DAYS_IN_WEEK: i64 = 7;

/// The `index`-th selected week, counted from the week holding the anchor.
pub(crate) fn period(rule: &RecurrenceRule, anchor: NaiveDate, index: i64) -> Option<Period> {
    let wkst = rule.week_start();
    let offset = index
        .checked_mul(i64::from(rule.interval()))?
        .checked_mul(DAYS_IN_WEEK)?;
    let first = calendar::add_days(calendar::week_start(anchor, wkst)?, offset)?;

    let days = if rule.by_weekday().is_empty() {
        vec![anchor.weekday()]
    } else {
        rule.by_weekday().iter().map(|d| d.weekday).collect()
    };

    let days = days
        .into_iter()
        .filter_map(|weekday| calendar::add_days(first, calendar::days_until(wkst, weekday)))
        .filter(|date| rule.month_selected(date.month()))
        .collect();

    Some(Period { first, days })
}

pub(crate) fn index_at(rule: &RecurrenceRule, anchor: NaiveDate, date: NaiveDate) -> i64 {
    let wkst = rule.week_start();
    match (
        calendar::week_start(anchor, wkst),
        calendar::week_start(date, wkst),
    ) {
        (Some(from), Some(to)) => ((to - from).num_days() / DAYS_IN_WEEK)
            .div_euclid(i64::from(rule.interval())),
        _ => 0,
    }
}
