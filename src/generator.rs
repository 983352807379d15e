use crate::rrule::{Frequency, RecurrenceRule};
use crate::{daily, monthly, weekly, yearly};
use chrono::{DateTime, Datelike as _, NaiveDate, Utc};

/// One step of a rule: the first day the period covers and its candidate days.
pub(crate) struct Period {
    pub first: NaiveDate,
    pub days: Vec<NaiveDate>,
}

/// Lazy, ascending sequence of occurrence start instants.
///
/// Built by [`RecurrenceRule::all`] or [`RecurrenceRule::after`]; asking the
/// rule again with the same anchor replays the identical sequence. Periods are
/// expanded one at a time, so dropping the iterator stops all work.
#[derive(Clone, Debug)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    anchor: DateTime<Utc>,
    index: i64,
    emitted: u32,
    idle: u32,
    floor: Option<DateTime<Utc>>,
    horizon: Option<DateTime<Utc>>,
    pending: std::vec::IntoIter<DateTime<Utc>>,
    done: bool,
}

impl RecurrenceRule {
    /// Every occurrence, starting at the first candidate not before `anchor`.
    pub fn all(&self, anchor: DateTime<Utc>) -> Occurrences<'_> {
        Occurrences {
            rule: self,
            anchor,
            index: 0,
            emitted: 0,
            idle: 0,
            floor: None,
            horizon: None,
            pending: Vec::new().into_iter(),
            done: false,
        }
    }

    /// Occurrences at or after `min`.
    ///
    /// `COUNT` still counts from the anchor. Whole periods before `min` are
    /// skipped arithmetically whenever that cannot change which occurrences
    /// the count admits.
    pub fn after(&self, anchor: DateTime<Utc>, min: DateTime<Utc>) -> Occurrences<'_> {
        let mut occurrences = self.all(anchor);
        if min <= anchor {
            return occurrences;
        }
        occurrences.floor = Some(min);

        let uniform = occurrences.is_uniform();
        if self.count().is_some() && !uniform {
            return occurrences;
        }

        let skip = index_at(self, anchor.date_naive(), min.date_naive()).max(0);
        occurrences.index = skip;
        if uniform {
            occurrences.emitted = u32::try_from(skip).unwrap_or(u32::MAX);
        }
        tracing::trace!(skip, uniform, "skipped periods before {min}");

        occurrences
    }
}

impl Occurrences<'_> {
    /// Stops expanding once a period begins after `horizon`; occurrences
    /// later than `horizon` are never produced.
    pub fn bounded_by(mut self, horizon: DateTime<Utc>) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Every period yields exactly one occurrence: no by-filters, and the
    /// anchor's day exists in every month (or year) the rule steps through.
    fn is_uniform(&self) -> bool {
        if self.rule.has_filters() {
            return false;
        }

        let date = self.anchor.date_naive();
        match self.rule.frequency() {
            Frequency::Daily | Frequency::Weekly => true,
            Frequency::Monthly => date.day() <= 28,
            Frequency::Yearly => !(date.month() == 2 && date.day() == 29),
        }
    }

    fn period(&self, index: i64) -> Option<Period> {
        let anchor = self.anchor.date_naive();
        match self.rule.frequency() {
            Frequency::Daily => daily::period(self.rule, anchor, index),
            Frequency::Weekly => weekly::period(self.rule, anchor, index),
            Frequency::Monthly => monthly::period(self.rule, anchor, index),
            Frequency::Yearly => yearly::period(self.rule, anchor, index),
        }
    }

    fn past(&self, instant: DateTime<Utc>) -> bool {
        self.horizon.is_some_and(|h| instant > h) || self.rule.until().is_some_and(|u| instant > u)
    }

    /// Loads the next period that has any candidates. False once the
    /// sequence can produce nothing more.
    fn fill(&mut self) -> bool {
        let time = self.anchor.time();

        loop {
            let Some(period) = self.period(self.index) else {
                tracing::debug!(index = self.index, "calendar range exhausted");
                return false;
            };
            self.index += 1;

            let Some(opening) = period.first.and_hms_opt(0, 0, 0) else {
                return false;
            };
            if self.past(opening.and_utc()) {
                return false;
            }

            let mut starts: Vec<_> = period
                .days
                .into_iter()
                .map(|date| date.and_time(time).and_utc())
                .filter(|start| *start >= self.anchor)
                .collect();
            starts.sort_unstable();
            starts.dedup();

            if starts.is_empty() {
                self.idle += 1;
                if self.idle >= idle_limit(self.rule.frequency()) {
                    tracing::warn!(
                        rule = %self.rule,
                        "rule matches no date in a full calendar cycle, ending sequence"
                    );
                    return false;
                }
                continue;
            }

            self.idle = 0;
            self.pending = starts.into_iter();
            return true;
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        loop {
            if self.done || self.rule.count().is_some_and(|count| self.emitted >= count) {
                self.done = true;
                return None;
            }

            let Some(next) = self.pending.next() else {
                if !self.fill() {
                    self.done = true;
                    return None;
                }
                continue;
            };

            if self.past(next) {
                self.done = true;
                return None;
            }

            self.emitted += 1;
            if self.floor.is_some_and(|floor| next < floor) {
                continue;
            }
            return Some(next);
        }
    }
}

impl std::iter::FusedIterator for Occurrences<'_> {}

/// Index of the period holding `date`, negative before the anchor's period.
pub(crate) fn index_at(rule: &RecurrenceRule, anchor: NaiveDate, date: NaiveDate) -> i64 {
    match rule.frequency() {
        Frequency::Daily => daily::index_at(rule, anchor, date),
        Frequency::Weekly => weekly::index_at(rule, anchor, date),
        Frequency::Monthly => monthly::index_at(rule, anchor, date),
        Frequency::Yearly => yearly::index_at(rule, anchor, date),
    }
}

/// Consecutive empty periods after which a rule can never match again: the
/// Gregorian calendar repeats every 400 years, so a full cycle of period
/// positions has been seen by then whatever the interval.
fn idle_limit(frequency: Frequency) -> u32 {
    match frequency {
        Frequency::Daily => 146_097,
        Frequency::Weekly => 20_871,
        Frequency::Monthly => 4_800,
        Frequency::Yearly => 400,
    }
}
