//! Candidate enumeration.
//!
//! Produces, lazily and in priority order, the (slot, room, proctor)
//! placements worth trying for one module. The enumerator only reads the
//! ledger; committing is the engine's job.
//!
//! # Ordering (outer → inner)
//!
//! 1. Days in chronological order, skipping days where the module's
//!    formation already sits an exam or any enrolled student is busy.
//! 2. Daily slots, rotated by the module's rank so consecutive modules
//!    start from different slots. Full slots are skipped.
//! 3. Rooms by descending capacity, skipping rooms that are too small,
//!    already taken in the slot, or owned by another cohort that day.
//! 4. The least-loaded proctor still under the daily cap.
//!
//! The student gate runs once per day: `student_day_used` depends only on
//! the day, and enrollments run into the thousands.

use std::iter::FusedIterator;

use chrono::NaiveDate;

use super::ledger::{Candidate, ConstraintLedger, ModuleDemand};
use crate::models::{ExamPeriod, Proctor, Room, TimeSlot};

/// Daily slot indices starting at `rank % slots_per_day`, wrapping around.
///
/// # Example
/// ```
/// use u_exam_schedule::scheduler::rotated_slot_order;
///
/// let order: Vec<usize> = rotated_slot_order(4, 3).collect();
/// assert_eq!(order, vec![1, 2, 0]);
/// ```
pub fn rotated_slot_order(rank: usize, slots_per_day: usize) -> impl Iterator<Item = usize> + Clone {
    let offset = if slots_per_day == 0 {
        0
    } else {
        rank % slots_per_day
    };
    (0..slots_per_day).map(move |k| (offset + k) % slots_per_day)
}

/// Rooms sorted by descending capacity; equal capacities keep input order.
pub fn rooms_by_capacity(rooms: &[Room]) -> Vec<&Room> {
    let mut sorted: Vec<&Room> = rooms.iter().collect();
    sorted.sort_by(|a, b| b.capacity.cmp(&a.capacity));
    sorted
}

/// Lazy, finite, non-restartable stream of feasible candidates.
#[derive(Debug)]
pub struct CandidateEnumerator<'l, 'a> {
    ledger: &'l ConstraintLedger<'a>,
    demand: &'l ModuleDemand<'a>,
    period: &'l ExamPeriod,
    rooms: &'l [&'a Room],
    proctors: &'a [Proctor],
    slot_order: Vec<usize>,
    day_pos: usize,
    // Proctor chosen for the current day; `None` until the day is opened
    day_proctor: Option<&'a Proctor>,
    slot_step: usize,
    room_pos: usize,
}

impl<'l, 'a> CandidateEnumerator<'l, 'a> {
    /// Creates an enumerator for one module.
    ///
    /// `rooms` must already be in descending capacity order
    /// (see [`rooms_by_capacity`]). `slot_offset` is the rotation seed,
    /// normally the module's rank in processing order.
    pub fn new(
        ledger: &'l ConstraintLedger<'a>,
        demand: &'l ModuleDemand<'a>,
        period: &'l ExamPeriod,
        rooms: &'l [&'a Room],
        proctors: &'a [Proctor],
        slot_offset: usize,
    ) -> Self {
        Self {
            ledger,
            demand,
            period,
            rooms,
            proctors,
            slot_order: rotated_slot_order(slot_offset, period.slots_per_day()).collect(),
            day_pos: 0,
            day_proctor: None,
            slot_step: 0,
            room_pos: 0,
        }
    }

    /// Applies the day-level gates and picks the day's proctor.
    fn open_day(&self, day: NaiveDate) -> Option<&'a Proctor> {
        if self.ledger.formation_busy(&self.demand.module.formation_id, day) {
            return None;
        }
        if self.ledger.students_busy(self.demand.students, day) {
            return None;
        }
        self.ledger.least_loaded_proctor(self.proctors, day)
    }

    fn next_day(&mut self) {
        self.day_pos += 1;
        self.day_proctor = None;
        self.slot_step = 0;
        self.room_pos = 0;
    }

    fn room_allowed(&self, room: &Room, slot: TimeSlot) -> bool {
        room.fits(self.demand.enrolled)
            && !self.ledger.room_taken(&room.id, slot)
            && self.ledger.room_owner_allows(
                &room.id,
                slot.date,
                self.demand.cohort,
                &self.demand.module.formation_id,
            )
    }
}

impl<'l, 'a> Iterator for CandidateEnumerator<'l, 'a> {
    type Item = Candidate<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&day) = self.period.days().get(self.day_pos) {
            let proctor = match self.day_proctor {
                Some(p) => p,
                None => match self.open_day(day) {
                    Some(p) => {
                        self.day_proctor = Some(p);
                        p
                    }
                    None => {
                        self.next_day();
                        continue;
                    }
                },
            };

            while let Some(&index) = self.slot_order.get(self.slot_step) {
                let slot = TimeSlot::new(day, index);

                if self.room_pos == 0 && self.ledger.slot_full(slot) {
                    self.slot_step += 1;
                    continue;
                }

                while let Some(&room) = self.rooms.get(self.room_pos) {
                    self.room_pos += 1;
                    if self.room_allowed(room, slot) {
                        let start = day.and_time(self.period.slot_starts()[index]);
                        return Some(Candidate {
                            slot,
                            start,
                            room,
                            proctor,
                        });
                    }
                }

                self.room_pos = 0;
                self.slot_step += 1;
            }

            self.next_day();
        }

        None
    }
}

impl FusedIterator for CandidateEnumerator<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalogue, CourseModule};
    use crate::scheduler::ledger::LedgerLimits;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn period(days: u32, slots: usize) -> ExamPeriod {
        let starts = [(8, 30), (11, 0), (14, 0)]
            .iter()
            .take(slots)
            .map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
            .collect();
        ExamPeriod::new(day(10), day(10 + days - 1), starts)
    }

    fn limits() -> LedgerLimits {
        LedgerLimits {
            max_rooms_per_slot: 10,
            enforce_cohort_room_ownership: false,
            proctor_daily_cap: None,
        }
    }

    fn catalogue() -> Catalogue {
        Catalogue::new(
            vec![
                CourseModule::new("M1", "F1"),
                CourseModule::new("M2", "F1"),
                CourseModule::new("M3", "F2"),
            ],
            vec![Room::new("small", 20), Room::new("big", 100), Room::new("mid", 50)],
            vec![Proctor::new("P1"), Proctor::new("P2")],
        )
        .with_enrollment("M1", (0..40).map(|i| format!("s{i}")))
        .with_enrollment("M2", ["x1"])
        .with_enrollment("M3", ["s1"])
    }

    #[test]
    fn test_rotated_slot_order() {
        assert_eq!(rotated_slot_order(0, 3).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(rotated_slot_order(1, 3).collect::<Vec<_>>(), vec![1, 2, 0]);
        assert_eq!(rotated_slot_order(5, 3).collect::<Vec<_>>(), vec![2, 0, 1]);
        assert_eq!(rotated_slot_order(7, 1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(rotated_slot_order(3, 0).count(), 0);
    }

    #[test]
    fn test_rooms_by_capacity_stable() {
        let rooms = vec![Room::new("a", 30), Room::new("b", 80), Room::new("c", 30)];
        let ids: Vec<&str> = rooms_by_capacity(&rooms).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_order_days_slots_rooms() {
        let cat = catalogue();
        let ledger = ConstraintLedger::new(limits());
        let p = period(2, 2);
        let rooms = rooms_by_capacity(&cat.rooms);
        let d = ModuleDemand::new(&cat.modules[0], &cat, 2024); // 40 students

        let got: Vec<(NaiveDate, usize, &str)> =
            CandidateEnumerator::new(&ledger, &d, &p, &rooms, &cat.proctors, 0)
                .map(|c| (c.slot.date, c.slot.index, c.room.id.as_str()))
                .collect();

        // "small" never fits 40 students
        assert_eq!(
            got,
            vec![
                (day(10), 0, "big"),
                (day(10), 0, "mid"),
                (day(10), 1, "big"),
                (day(10), 1, "mid"),
                (day(11), 0, "big"),
                (day(11), 0, "mid"),
                (day(11), 1, "big"),
                (day(11), 1, "mid"),
            ]
        );
    }

    #[test]
    fn test_rotation_changes_first_slot() {
        let cat = catalogue();
        let ledger = ConstraintLedger::new(limits());
        let p = period(1, 3);
        let rooms = rooms_by_capacity(&cat.rooms);
        let d = ModuleDemand::new(&cat.modules[1], &cat, 2024);

        let first = CandidateEnumerator::new(&ledger, &d, &p, &rooms, &cat.proctors, 2)
            .next()
            .unwrap();
        assert_eq!(first.slot.index, 2);
        assert_eq!(
            first.start,
            day(10).and_time(NaiveTime::from_hms_opt(14, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_skips_formation_and_student_days() {
        let cat = catalogue();
        let p = period(3, 1);
        let rooms = rooms_by_capacity(&cat.rooms);
        let mut ledger = ConstraintLedger::new(limits());

        let m1 = ModuleDemand::new(&cat.modules[0], &cat, 2024);
        let first = CandidateEnumerator::new(&ledger, &m1, &p, &rooms, &cat.proctors, 0)
            .next()
            .unwrap();
        ledger.commit(&m1, &first).unwrap();

        // M2 shares formation F1 → day 10 skipped
        let m2 = ModuleDemand::new(&cat.modules[1], &cat, 2024);
        let c2 = CandidateEnumerator::new(&ledger, &m2, &p, &rooms, &cat.proctors, 1)
            .next()
            .unwrap();
        assert_eq!(c2.slot.date, day(11));

        // M3 shares student s1 with M1 → day 10 skipped
        let m3 = ModuleDemand::new(&cat.modules[2], &cat, 2024);
        let c3 = CandidateEnumerator::new(&ledger, &m3, &p, &rooms, &cat.proctors, 2)
            .next()
            .unwrap();
        assert_eq!(c3.slot.date, day(11));
    }

    #[test]
    fn test_skips_full_slot_and_taken_room() {
        let cat = catalogue();
        let p = period(1, 2);
        let rooms = rooms_by_capacity(&cat.rooms);
        let mut ledger = ConstraintLedger::new(LedgerLimits {
            max_rooms_per_slot: 1,
            ..limits()
        });

        let m2 = ModuleDemand::new(&cat.modules[1], &cat, 2024);
        let c = CandidateEnumerator::new(&ledger, &m2, &p, &rooms, &cat.proctors, 0)
            .next()
            .unwrap();
        assert_eq!((c.slot.index, c.room.id.as_str()), (0, "big"));
        ledger.commit(&m2, &c).unwrap();

        // Slot 0 is at cap → M3 lands in slot 1, biggest room first
        let m3 = ModuleDemand::new(&cat.modules[2], &cat, 2024);
        let c3 = CandidateEnumerator::new(&ledger, &m3, &p, &rooms, &cat.proctors, 0)
            .next()
            .unwrap();
        assert_eq!((c3.slot.index, c3.room.id.as_str()), (1, "big"));
    }

    #[test]
    fn test_least_loaded_proctor_proposed() {
        let cat = catalogue();
        let p = period(2, 1);
        let rooms = rooms_by_capacity(&cat.rooms);
        let mut ledger = ConstraintLedger::new(limits());

        let m1 = ModuleDemand::new(&cat.modules[0], &cat, 2024);
        let c1 = CandidateEnumerator::new(&ledger, &m1, &p, &rooms, &cat.proctors, 0)
            .next()
            .unwrap();
        assert_eq!(c1.proctor.id, "P1");
        ledger.commit(&m1, &c1).unwrap();

        let m2 = ModuleDemand::new(&cat.modules[1], &cat, 2024);
        let c2 = CandidateEnumerator::new(&ledger, &m2, &p, &rooms, &cat.proctors, 1)
            .next()
            .unwrap();
        assert_eq!(c2.proctor.id, "P2");
    }

    #[test]
    fn test_proctor_cap_skips_day() {
        let mut cat = catalogue();
        cat.proctors.truncate(1);
        let p = period(2, 2);
        let rooms = rooms_by_capacity(&cat.rooms);
        let mut ledger = ConstraintLedger::new(LedgerLimits {
            proctor_daily_cap: Some(1),
            ..limits()
        });

        let m2 = ModuleDemand::new(&cat.modules[1], &cat, 2024);
        let c2 = CandidateEnumerator::new(&ledger, &m2, &p, &rooms, &cat.proctors, 0)
            .next()
            .unwrap();
        ledger.commit(&m2, &c2).unwrap();

        // P1 is capped on day 10 although slots and rooms remain
        let m3 = ModuleDemand::new(&cat.modules[2], &cat, 2024);
        let c3 = CandidateEnumerator::new(&ledger, &m3, &p, &rooms, &cat.proctors, 0)
            .next()
            .unwrap();
        assert_eq!(c3.slot.date, day(11));
    }

    #[test]
    fn test_exhausted_and_fused() {
        let cat = catalogue();
        let p = period(1, 1);
        let mut small_only = cat.clone();
        small_only.rooms = vec![Room::new("small", 20)];
        let rooms = rooms_by_capacity(&small_only.rooms);
        let ledger = ConstraintLedger::new(limits());
        let d = ModuleDemand::new(&small_only.modules[0], &small_only, 2024);

        let mut it = CandidateEnumerator::new(&ledger, &d, &p, &rooms, &small_only.proctors, 0);
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_no_proctors_yields_nothing() {
        let cat = catalogue();
        let p = period(3, 3);
        let rooms = rooms_by_capacity(&cat.rooms);
        let ledger = ConstraintLedger::new(limits());
        let d = ModuleDemand::new(&cat.modules[1], &cat, 2024);

        assert_eq!(CandidateEnumerator::new(&ledger, &d, &p, &rooms, &[], 0).count(), 0);
    }
}
