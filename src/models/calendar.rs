//! Exam period, time slot, and time window models.
//!
//! The exam period is a fixed inclusive date range crossed with an
//! ordered list of daily start times. The full slot space is finite and
//! known before scheduling begins: `days × slots_per_day`.
//!
//! # Time Model
//! Dates and times are naive (no time zone). The consumer decides which
//! local calendar the exam period refers to.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// One (day, time-of-day) scheduling unit of the exam period.
///
/// `index` points into the period's ordered daily slot list, so two slots
/// compare equal iff they share the same day and the same daily position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Calendar day.
    pub date: NaiveDate,
    /// Position in the daily slot list (0-based).
    pub index: usize,
}

impl TimeSlot {
    /// Creates a time slot.
    pub fn new(date: NaiveDate, index: usize) -> Self {
        Self { date, index }
    }
}

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: NaiveDateTime,
    /// Interval end (exclusive).
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a window starting at `start` and lasting `minutes`.
    pub fn from_start(start: NaiveDateTime, minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(minutes)),
        }
    }

    /// Duration of this window.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The resolved exam period: every exam day and every daily slot start.
///
/// Built by [`SchedulerConfig::validate`](crate::config::SchedulerConfig::validate),
/// which guarantees at least one day and at least one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamPeriod {
    days: Vec<NaiveDate>,
    slot_starts: Vec<NaiveTime>,
}

impl ExamPeriod {
    /// Creates a period over `start..=end`.
    ///
    /// An `end` before `start` yields a period with no days.
    pub fn new(start: NaiveDate, end: NaiveDate, slot_starts: Vec<NaiveTime>) -> Self {
        let days = start.iter_days().take_while(|d| *d <= end).collect();
        Self { days, slot_starts }
    }

    /// Exam days in chronological order.
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Daily slot start times in configured order.
    pub fn slot_starts(&self) -> &[NaiveTime] {
        &self.slot_starts
    }

    /// Number of slots per day.
    #[inline]
    pub fn slots_per_day(&self) -> usize {
        self.slot_starts.len()
    }

    /// Total number of time slots in the period.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.days.len() * self.slot_starts.len()
    }

    /// Whether `slot` lies inside this period.
    pub fn contains(&self, slot: TimeSlot) -> bool {
        slot.index < self.slot_starts.len() && self.days.binary_search(&slot.date).is_ok()
    }

    /// Start timestamp of a slot, or `None` if the slot index is out of range.
    pub fn start_of(&self, slot: TimeSlot) -> Option<NaiveDateTime> {
        self.slot_starts
            .get(slot.index)
            .map(|time| slot.date.and_time(*time))
    }

    /// All time slots, day-major.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.days.iter().flat_map(move |day| {
            (0..self.slot_starts.len()).map(move |index| TimeSlot::new(*day, index))
        })
    }

    /// Smallest gap between consecutive daily slot starts.
    ///
    /// `None` when there is only one slot per day.
    pub fn min_slot_gap(&self) -> Option<Duration> {
        self.slot_starts
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample_period() -> ExamPeriod {
        ExamPeriod::new(
            date(10),
            date(12),
            vec![time(8, 30), time(11, 0), time(14, 0)],
        )
    }

    #[test]
    fn test_period_days_inclusive() {
        let p = sample_period();
        assert_eq!(p.days(), &[date(10), date(11), date(12)]);
        assert_eq!(p.slots_per_day(), 3);
        assert_eq!(p.slot_count(), 9);
    }

    #[test]
    fn test_period_reversed_range_is_empty() {
        let p = ExamPeriod::new(date(12), date(10), vec![time(8, 30)]);
        assert!(p.days().is_empty());
        assert_eq!(p.slot_count(), 0);
    }

    #[test]
    fn test_slots_day_major() {
        let p = sample_period();
        let slots: Vec<TimeSlot> = p.slots().take(4).collect();
        assert_eq!(slots[0], TimeSlot::new(date(10), 0));
        assert_eq!(slots[2], TimeSlot::new(date(10), 2));
        assert_eq!(slots[3], TimeSlot::new(date(11), 0));
    }

    #[test]
    fn test_start_of() {
        let p = sample_period();
        let start = p.start_of(TimeSlot::new(date(11), 1)).unwrap();
        assert_eq!(start, date(11).and_time(time(11, 0)));
        assert!(p.start_of(TimeSlot::new(date(11), 3)).is_none());
    }

    #[test]
    fn test_contains() {
        let p = sample_period();
        assert!(p.contains(TimeSlot::new(date(12), 2)));
        assert!(!p.contains(TimeSlot::new(date(13), 0)));
        assert!(!p.contains(TimeSlot::new(date(10), 3)));
    }

    #[test]
    fn test_min_slot_gap() {
        let p = sample_period();
        assert_eq!(p.min_slot_gap(), Some(Duration::minutes(150)));

        let single = ExamPeriod::new(date(10), date(10), vec![time(9, 0)]);
        assert_eq!(single.min_slot_gap(), None);
    }

    #[test]
    fn test_window_overlap() {
        let a = TimeWindow::from_start(date(10).and_time(time(8, 30)), 90);
        let b = TimeWindow::from_start(date(10).and_time(time(9, 30)), 90);
        let c = TimeWindow::from_start(date(10).and_time(time(10, 0)), 90);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // [8:30, 10:00) and [10:00, 11:30) touch only
        assert_eq!(a.duration(), Duration::minutes(90));
    }
}
