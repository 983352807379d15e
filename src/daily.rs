use crate::{calendar, generator::Period, rrule::RecurrenceRule};
use chrono::{Datelike as _, NaiveDate};

/// The `index`-th day period, `interval` days apart from the anchor.
pub(crate) fn period(rule: &RecurrenceRule, anchor: NaiveDate, index: i64) -> Option<Period> {
    let date = calendar::add_days(anchor, index.checked_mul(i64::from(rule.interval()))?)?;

    let selected = rule.month_selected(date.month())
        && calendar::month_day_matches(rule.by_month_day(), date)
        && (rule.by_weekday().is_empty()
            || rule.by_weekday().iter().any(|d| d.weekday == date.weekday()));

    Some(Period {
        first: date,
        days: if selected { vec![date] } else { Vec::new() },
    })
}

pub(crate) fn index_at(rule: &RecurrenceRule, anchor: NaiveDate, date: NaiveDate) -> i64 {
    (date - anchor)
        .num_days()
        .div_euclid(i64::from(rule.interval()))
}

#[cfg(test)]
mod tests {
    use crate::rrule::{Frequency, NthWeekday, RuleDraft};
    use crate::test_helpers::*;
    use chrono::Weekday;

    #[test]
    fn dtstart() {
        let dtstart = july_first();
        let rule = RuleDraft::new(Frequency::Daily).validate().unwrap();

        let first = rule.all(dtstart).next().unwrap();

        assert_eq!(dtstart, first);
    }

    #[test]
    fn multiple_days() {
        let dtstart = july_first();
        let rule = RuleDraft::new(Frequency::Daily).validate().unwrap();
        let mut dates = rule.all(dtstart).skip(1);

        assert_eq!(dtstart + days(1), dates.next().unwrap());
        assert_eq!(dtstart + days(2), dates.next().unwrap());
    }

    #[test]
    fn count_limit() {
        let rule = RuleDraft {
            count: Some(2),
            ..RuleDraft::new(Frequency::Daily)
        }
        .validate()
        .unwrap();

        assert_eq!(rule.all(july_first()).count(), 2);
    }

    #[test]
    fn until_limit() {
        let dtstart = july_first();
        let rule = RuleDraft {
            until: Some(dtstart + days(4) + hours(1)),
            ..RuleDraft::new(Frequency::Daily)
        }
        .validate()
        .unwrap();

        assert_eq!(rule.all(dtstart).count(), 5);
    }

    #[test]
    fn until_is_inclusive() {
        let dtstart = july_first();
        let rule = RuleDraft {
            until: Some(dtstart + days(4)),
            ..RuleDraft::new(Frequency::Daily)
        }
        .validate()
        .unwrap();

        assert_eq!(rule.all(dtstart).last(), Some(dtstart + days(4)));
    }

    #[test]
    fn interval() {
        let dtstart = july_first();
        let rule = RuleDraft {
            interval: Some(3),
            ..RuleDraft::new(Frequency::Daily)
        }
        .validate()
        .unwrap();

        let three_days_later = rule.all(dtstart).nth(1).unwrap();

        assert_eq!(three_days_later - dtstart, days(3));
    }

    #[test]
    fn dst_changes_do_not_shift_instants() {
        let last_day_of_dst = eastern(2019, 11, 2, 23);
        let rule = RuleDraft::new(Frequency::Daily).validate().unwrap();

        let next = rule.all(last_day_of_dst).nth(1).unwrap();

        // absolute arithmetic: exactly 24 hours even across the fall back
        assert_eq!(next - last_day_of_dst, hours(24));
    }

    #[test]
    fn weekday_limit() {
        // 2024-07-01 is a Monday
        let rule = RuleDraft {
            by_weekday: vec![
                NthWeekday::every(Weekday::Sat),
                NthWeekday::every(Weekday::Sun),
            ],
            ..RuleDraft::new(Frequency::Daily)
        }
        .validate()
        .unwrap();

        let weekend: Vec<_> = rule.all(july_first()).take(3).collect();

        assert_eq!(
            weekend,
            vec![
                utc(2024, 7, 6, 9, 0, 0),
                utc(2024, 7, 7, 9, 0, 0),
                utc(2024, 7, 13, 9, 0, 0),
            ]
        );
    }

    #[test]
    fn month_and_month_day_limit() {
        let rule = RuleDraft {
            by_month: vec![2],
            by_month_day: vec![-1],
            ..RuleDraft::new(Frequency::Daily)
        }
        .validate()
        .unwrap();

        let ends: Vec<_> = rule.all(july_first()).take(2).collect();

        assert_eq!(
            ends,
            vec![utc(2025, 2, 28, 9, 0, 0), utc(2026, 2, 28, 9, 0, 0)]
        );
    }

    #[test]
    fn after_before_dtstart() {
        let dtstart = july_first();
        let rule = RuleDraft::new(Frequency::Daily).validate().unwrap();

        let first = rule.after(dtstart, dtstart - hours(40)).next().unwrap();

        assert_eq!(dtstart, first);
    }

    #[test]
    fn after_right_after_dtstart() {
        let dtstart = july_first();
        let rule = RuleDraft::new(Frequency::Daily).validate().unwrap();

        let first = rule.after(dtstart, dtstart + minutes(1)).next().unwrap();

        assert_eq!(dtstart + days(1), first);
    }

    #[test]
    fn after_days_after_dtstart() {
        let dtstart = july_first();
        let rule = RuleDraft::new(Frequency::Daily).validate().unwrap();

        let first = rule
            .after(dtstart, dtstart + days(5) + minutes(10))
            .next()
            .unwrap();

        assert_eq!(dtstart + days(6), first);
    }

    #[test]
    fn after_with_count() {
        let dtstart = july_first();
        let rule = RuleDraft {
            count: Some(10),
            interval: Some(2),
            ..RuleDraft::new(Frequency::Daily)
        }
        .validate()
        .unwrap();

        // occurrences at days 0, 2, .., 18; days 12 onwards leaves 4
        assert_eq!(rule.after(dtstart, dtstart + days(11)).count(), 4);
    }
}
