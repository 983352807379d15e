use crate::{calendar, generator::Period, rrule::RecurrenceRule};
use chrono::{Datelike as _, NaiveDate};

pub(crate) fn period(rule: &RecurrenceRule, anchor: NaiveDate, index: i64) -> Option<Period> {
    let offset = index.checked_mul(i64::from(rule.interval()))?;
    let (year, month) = calendar::month_from_index(calendar::month_index(anchor).checked_add(offset)?)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let days = if rule.month_selected(month) {
        days_in(rule, anchor, year, month)
    } else {
        Vec::new()
    };

    Some(Period { first, days })
}

pub(crate) fn index_at(rule: &RecurrenceRule, anchor: NaiveDate, date: NaiveDate) -> i64 {
    (calendar::month_index(date) - calendar::month_index(anchor))
        .div_euclid(i64::from(rule.interval()))
}

/// Day selection inside one month; also used by yearly rules with `BYMONTH`.
///
/// With both month days and weekdays, a day must match one of each. Without
/// either, the anchor's day of month is used and months too short for it are
/// skipped.
pub(crate) fn days_in(rule: &RecurrenceRule, anchor: NaiveDate, year: i32, month: u32) -> Vec<NaiveDate> {
    let Some((first, last)) = calendar::month_bounds(year, month) else {
        return Vec::new();
    };

    if !rule.by_month_day().is_empty() {
        let mut days: Vec<_> = rule
            .by_month_day()
            .iter()
            .filter_map(|&day| calendar::month_day(year, month, day))
            .collect();

        if !rule.by_weekday().is_empty() {
            days.retain(|date| {
                rule.by_weekday()
                    .iter()
                    .any(|nth| calendar::matches_nth(*date, first, last, *nth))
            });
        }
        return days;
    }

    if !rule.by_weekday().is_empty() {
        return rule
            .by_weekday()
            .iter()
            .flat_map(|nth| calendar::nth_weekdays(first, last, *nth))
            .collect();
    }

    NaiveDate::from_ymd_opt(year, month, anchor.day())
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::rrule::{Frequency, NthWeekday, RuleDraft};
    use crate::test_helpers::*;
    use chrono::Weekday;

    fn monthly(draft: RuleDraft) -> Vec<chrono::DateTime<chrono::Utc>> {
        draft.validate().unwrap().all(utc(2024, 1, 1, 10, 0, 0)).collect()
    }

    #[test]
    fn last_day_tracks_leap_years() {
        let dates: Vec<_> = RuleDraft {
            by_month_day: vec![-1],
            ..RuleDraft::new(Frequency::Monthly)
        }
        .validate()
        .unwrap()
        .all(utc(2023, 1, 1, 0, 0, 0))
        .take(14)
        .collect();

        assert_eq!(dates[1], utc(2023, 2, 28, 0, 0, 0));
        assert_eq!(dates[13], utc(2024, 2, 29, 0, 0, 0));
    }

    #[test]
    fn anchor_day_missing_is_skipped() {
        let dates: Vec<_> = RuleDraft {
            count: Some(4),
            ..RuleDraft::new(Frequency::Monthly)
        }
        .validate()
        .unwrap()
        .all(utc(2024, 1, 31, 8, 0, 0))
        .collect();

        // no overflow into the following month
        assert_eq!(
            dates,
            vec![
                utc(2024, 1, 31, 8, 0, 0),
                utc(2024, 3, 31, 8, 0, 0),
                utc(2024, 5, 31, 8, 0, 0),
                utc(2024, 7, 31, 8, 0, 0),
            ]
        );
    }

    #[test]
    fn negative_month_day_past_start() {
        // -31 only exists in 31 day months
        let dates = monthly(RuleDraft {
            by_month_day: vec![-31],
            count: Some(3),
            ..RuleDraft::new(Frequency::Monthly)
        });

        assert_eq!(
            dates,
            vec![
                utc(2024, 1, 1, 10, 0, 0),
                utc(2024, 3, 1, 10, 0, 0),
                utc(2024, 5, 1, 10, 0, 0),
            ]
        );
    }

    #[test]
    fn second_monday_and_last_friday() {
        let dates = monthly(RuleDraft {
            by_weekday: vec![
                NthWeekday::nth(2, Weekday::Mon),
                NthWeekday::nth(-1, Weekday::Fri),
            ],
            count: Some(4),
            ..RuleDraft::new(Frequency::Monthly)
        });

        assert_eq!(
            dates,
            vec![
                utc(2024, 1, 8, 10, 0, 0),
                utc(2024, 1, 26, 10, 0, 0),
                utc(2024, 2, 12, 10, 0, 0),
                utc(2024, 2, 23, 10, 0, 0),
            ]
        );
    }

    #[test]
    fn fifth_weekday_only_when_present() {
        let dates = monthly(RuleDraft {
            by_weekday: vec![NthWeekday::nth(5, Weekday::Mon)],
            count: Some(3),
            ..RuleDraft::new(Frequency::Monthly)
        });

        assert_eq!(
            dates,
            vec![
                utc(2024, 1, 29, 10, 0, 0),
                utc(2024, 4, 29, 10, 0, 0),
                utc(2024, 7, 29, 10, 0, 0),
            ]
        );
    }

    #[test]
    fn every_weekday_of_month() {
        let dates = monthly(RuleDraft {
            by_weekday: vec![NthWeekday::every(Weekday::Tue)],
            until: Some(utc(2024, 1, 31, 23, 59, 59)),
            ..RuleDraft::new(Frequency::Monthly)
        });

        assert_eq!(dates.len(), 5);
        assert_eq!(dates[0], utc(2024, 1, 2, 10, 0, 0));
    }

    #[test]
    fn friday_the_thirteenth() {
        let dates = monthly(RuleDraft {
            by_weekday: vec![NthWeekday::every(Weekday::Fri)],
            by_month_day: vec![13],
            count: Some(3),
            ..RuleDraft::new(Frequency::Monthly)
        });

        assert_eq!(
            dates,
            vec![
                utc(2024, 9, 13, 10, 0, 0),
                utc(2024, 12, 13, 10, 0, 0),
                utc(2025, 6, 13, 10, 0, 0),
            ]
        );
    }

    #[test]
    fn month_days_sorted_and_deduplicated() {
        // 31 and -1 coincide in January
        let dates = monthly(RuleDraft {
            by_month_day: vec![31, 15, -1],
            count: Some(3),
            ..RuleDraft::new(Frequency::Monthly)
        });

        assert_eq!(
            dates,
            vec![
                utc(2024, 1, 15, 10, 0, 0),
                utc(2024, 1, 31, 10, 0, 0),
                utc(2024, 2, 15, 10, 0, 0),
            ]
        );
    }

    #[test]
    fn by_month_limits_months() {
        let dates = monthly(RuleDraft {
            by_month: vec![6, 12],
            interval: Some(3),
            count: Some(3),
            ..RuleDraft::new(Frequency::Monthly)
        });

        // every third month from January: Jan, Apr, Jul, Oct never hit June or December
        assert!(dates.is_empty());
    }

    #[test]
    fn interval_months() {
        let dates = monthly(RuleDraft {
            interval: Some(5),
            count: Some(3),
            ..RuleDraft::new(Frequency::Monthly)
        });

        assert_eq!(
            dates,
            vec![
                utc(2024, 1, 1, 10, 0, 0),
                utc(2024, 6, 1, 10, 0, 0),
                utc(2024, 11, 1, 10, 0, 0),
            ]
        );
    }
}
