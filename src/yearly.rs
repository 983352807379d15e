use crate::{calendar, generator::Period, monthly, rrule::RecurrenceRule};
use chrono::{Datelike as _, NaiveDate};

pub(crate) fn period(rule: &RecurrenceRule, anchor: NaiveDate, index: i64) -> Option<Period> {
    let offset = index.checked_mul(i64::from(rule.interval()))?;
    let year = i32::try_from(i64::from(anchor.year()).checked_add(offset)?).ok()?;
    let (first, last) = calendar::year_bounds(year)?;

    let days = if !rule.by_week_no().is_empty() {
        week_days(rule, year)
    } else if !rule.by_month().is_empty() {
        (1..=12)
            .filter(|month| rule.month_selected(*month))
            .flat_map(|month| monthly::days_in(rule, anchor, year, month))
            .collect()
    } else if !rule.by_month_day().is_empty() {
        let mut days: Vec<_> = (1..=12)
            .flat_map(|month| {
                rule.by_month_day()
                    .iter()
                    .filter_map(move |&day| calendar::month_day(year, month, day))
            })
            .collect();
        if !rule.by_weekday().is_empty() {
            days.retain(|date| {
                rule.by_weekday()
                    .iter()
                    .any(|nth| calendar::matches_nth(*date, first, last, *nth))
            });
        }
        days
    } else if !rule.by_weekday().is_empty() {
        // ordinals count through the whole year, "20MO" is the 20th Monday
        rule.by_weekday()
            .iter()
            .flat_map(|nth| calendar::nth_weekdays(first, last, *nth))
            .collect()
    } else {
        NaiveDate::from_ymd_opt(year, anchor.month(), anchor.day())
            .into_iter()
            .collect()
    };

    Some(Period { first, days })
}

pub(crate) fn index_at(rule: &RecurrenceRule, anchor: NaiveDate, date: NaiveDate) -> i64 {
    (i64::from(date.year()) - i64::from(anchor.year())).div_euclid(i64::from(rule.interval()))
}

/// Days of `year` that fall in one of the rule's numbered weeks.
///
/// Week 1 of the next year and the last week of the previous one can both
/// spill into `year`, so their numbering is consulted as well; days outside
/// `year` belong to a neighbouring period.
fn week_days(rule: &RecurrenceRule, year: i32) -> Vec<NaiveDate> {
    let wkst = rule.week_start();
    let mut days = Vec::new();

    for owner in [year.checked_sub(1), Some(year), year.checked_add(1)]
        .into_iter()
        .flatten()
    {
        let (Some(week_one), Some(weeks)) = (
            calendar::first_week(owner, wkst),
            calendar::weeks_in_year(owner, wkst),
        ) else {
            continue;
        };

        for &number in rule.by_week_no() {
            let number = i64::from(number);
            let week = if number > 0 { number } else { weeks + number + 1 };
            if week < 1 || week > weeks {
                continue;
            }

            let Some(start) = calendar::add_days(week_one, (week - 1) * 7) else {
                continue;
            };
            days.extend(
                (0..7)
                    .filter_map(|offset| calendar::add_days(start, offset))
                    .filter(|date| date.year() == year)
                    .filter(|date| {
                        rule.by_weekday().is_empty()
                            || rule.by_weekday().iter().any(|d| d.weekday == date.weekday())
                    })
                    .filter(|date| calendar::month_day_matches(rule.by_month_day(), *date)),
            );
        }
    }

    days
}
