//! Constraint ledger.
//!
//! Mutable record of every commitment made during one run. Each lookup
//! structure answers one feasibility question in O(1):
//!
//! | Structure | Enforces |
//! |-----------|----------|
//! | `room_slot_used` | one exam per room per slot |
//! | `formation_day_used` | one exam per formation per day |
//! | `student_day_used` | one exam per student per day |
//! | `room_day_owner` | one (cohort, formation) per room per day (optional) |
//! | `slot_room_count` | bounded rooms in parallel per slot |
//! | `proctor_load` / `proctor_day_load` | least-loaded choice, daily cap (optional) |
//!
//! The ledger is created empty for a run and never rolled back.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};

use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::models::{Catalogue, CourseModule, Proctor, Room, TimeSlot};

/// A module as seen by the scheduler: identity plus derived demand.
#[derive(Debug, Clone)]
pub struct ModuleDemand<'a> {
    /// The module itself.
    pub module: &'a CourseModule,
    /// Distinct enrolled students.
    pub students: &'a [String],
    /// Distinct enrolled-student count.
    pub enrolled: usize,
    /// Resolved cohort (fallback applied).
    pub cohort: i32,
}

impl<'a> ModuleDemand<'a> {
    /// Resolves a module's demand against the catalogue.
    pub fn new(module: &'a CourseModule, catalogue: &'a Catalogue, default_cohort: i32) -> Self {
        Self {
            module,
            students: catalogue.students_of(&module.id),
            enrolled: catalogue.enrolled_count(&module.id),
            cohort: module.cohort_or(default_cohort),
        }
    }
}

/// One (slot, room, proctor) placement proposal for a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Proposed time slot.
    pub slot: TimeSlot,
    /// Start timestamp of `slot`.
    pub start: NaiveDateTime,
    /// Proposed room.
    pub room: &'a Room,
    /// Proposed proctor.
    pub proctor: &'a Proctor,
}

/// Limits applied by the ledger, taken from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerLimits {
    /// Maximum rooms in use per slot.
    pub max_rooms_per_slot: usize,
    /// Whether a room is owned by one (cohort, formation) per day.
    pub enforce_cohort_room_ownership: bool,
    /// Maximum exams per proctor per day.
    pub proctor_daily_cap: Option<u32>,
}

impl From<&SchedulerConfig> for LedgerLimits {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            max_rooms_per_slot: config.max_rooms_per_slot,
            enforce_cohort_room_ownership: config.enforce_cohort_room_ownership,
            proctor_daily_cap: config.proctor_daily_cap,
        }
    }
}

/// Commitments made so far in one scheduling run.
///
/// Keys borrow identities from the catalogue, so a ledger cannot outlive
/// the run's input.
#[derive(Debug, Clone)]
pub struct ConstraintLedger<'a> {
    limits: LedgerLimits,
    room_slot_used: HashSet<(&'a str, TimeSlot)>,
    formation_day_used: HashSet<(&'a str, NaiveDate)>,
    student_day_used: HashSet<(&'a str, NaiveDate)>,
    room_day_owner: HashMap<(&'a str, NaiveDate), (i32, &'a str)>,
    slot_room_count: HashMap<TimeSlot, usize>,
    proctor_load: HashMap<&'a str, u32>,
    proctor_day_load: HashMap<(&'a str, NaiveDate), u32>,
    committed: HashSet<&'a str>,
}

impl<'a> ConstraintLedger<'a> {
    /// Creates an empty ledger.
    pub fn new(limits: LedgerLimits) -> Self {
        Self {
            limits,
            room_slot_used: HashSet::new(),
            formation_day_used: HashSet::new(),
            student_day_used: HashSet::new(),
            room_day_owner: HashMap::new(),
            slot_room_count: HashMap::new(),
            proctor_load: HashMap::new(),
            proctor_day_load: HashMap::new(),
            committed: HashSet::new(),
        }
    }

    /// Limits in force.
    pub fn limits(&self) -> LedgerLimits {
        self.limits
    }

    /// Whether the formation already sits an exam on `day`.
    pub fn formation_busy(&self, formation_id: &str, day: NaiveDate) -> bool {
        self.formation_day_used.contains(&(formation_id, day))
    }

    /// Whether any of `students` already sits an exam on `day`.
    pub fn students_busy(&self, students: &[String], day: NaiveDate) -> bool {
        students
            .iter()
            .any(|s| self.student_day_used.contains(&(s.as_str(), day)))
    }

    /// Rooms already committed in `slot`.
    pub fn rooms_in_use(&self, slot: TimeSlot) -> usize {
        self.slot_room_count.get(&slot).copied().unwrap_or(0)
    }

    /// Whether `slot` has reached the per-slot room cap.
    pub fn slot_full(&self, slot: TimeSlot) -> bool {
        self.rooms_in_use(slot) >= self.limits.max_rooms_per_slot
    }

    /// Whether the room already hosts an exam in `slot`.
    pub fn room_taken(&self, room_id: &str, slot: TimeSlot) -> bool {
        self.room_slot_used.contains(&(room_id, slot))
    }

    /// Whether the room may host `(cohort, formation)` on `day`.
    ///
    /// Always `true` when cohort ownership is disabled.
    pub fn room_owner_allows(
        &self,
        room_id: &str,
        day: NaiveDate,
        cohort: i32,
        formation_id: &str,
    ) -> bool {
        if !self.limits.enforce_cohort_room_ownership {
            return true;
        }
        match self.room_day_owner.get(&(room_id, day)) {
            Some(&(owner_cohort, owner_formation)) => {
                owner_cohort == cohort && owner_formation == formation_id
            }
            None => true,
        }
    }

    /// Total exams committed to a proctor.
    pub fn proctor_load(&self, proctor_id: &str) -> u32 {
        self.proctor_load.get(proctor_id).copied().unwrap_or(0)
    }

    /// Exams committed to a proctor on `day`.
    pub fn proctor_day_load(&self, proctor_id: &str, day: NaiveDate) -> u32 {
        self.proctor_day_load
            .get(&(proctor_id, day))
            .copied()
            .unwrap_or(0)
    }

    /// Whether the proctor is below the daily cap on `day`.
    pub fn proctor_available(&self, proctor_id: &str, day: NaiveDate) -> bool {
        match self.limits.proctor_daily_cap {
            Some(cap) => self.proctor_day_load(proctor_id, day) < cap,
            None => true,
        }
    }

    /// Least-loaded proctor available on `day`.
    ///
    /// Ties go to the proctor listed first.
    pub fn least_loaded_proctor(&self, proctors: &'a [Proctor], day: NaiveDate) -> Option<&'a Proctor> {
        proctors
            .iter()
            .filter(|p| self.proctor_available(&p.id, day))
            .min_by_key(|p| self.proctor_load(&p.id))
    }

    /// Whether the module already has a committed assignment.
    pub fn is_committed(&self, module_id: &str) -> bool {
        self.committed.contains(module_id)
    }

    /// Number of committed modules.
    pub fn committed_count(&self) -> usize {
        self.committed.len()
    }

    /// Checks a candidate against every constraint. Read-only.
    pub fn check_candidate(&self, demand: &ModuleDemand<'_>, candidate: &Candidate<'_>) -> bool {
        let day = candidate.slot.date;
        let module = demand.module;

        !self.is_committed(&module.id)
            && candidate.room.fits(demand.enrolled)
            && !self.room_taken(&candidate.room.id, candidate.slot)
            && !self.slot_full(candidate.slot)
            && !self.formation_busy(&module.formation_id, day)
            && self.room_owner_allows(&candidate.room.id, day, demand.cohort, &module.formation_id)
            && self.proctor_available(&candidate.proctor.id, day)
            && !self.students_busy(demand.students, day)
    }

    /// Records a placement in every structure.
    ///
    /// # Errors
    /// [`ScheduleError::DoubleCommit`] if the module was already committed;
    /// the ledger is left untouched in that case.
    pub fn commit(
        &mut self,
        demand: &ModuleDemand<'a>,
        candidate: &Candidate<'a>,
    ) -> Result<(), ScheduleError> {
        let module = demand.module;
        if !self.committed.insert(module.id.as_str()) {
            return Err(ScheduleError::DoubleCommit {
                module_id: module.id.clone(),
            });
        }

        let day = candidate.slot.date;
        let room_id = candidate.room.id.as_str();
        let proctor_id = candidate.proctor.id.as_str();

        self.room_slot_used.insert((room_id, candidate.slot));
        self.formation_day_used
            .insert((module.formation_id.as_str(), day));
        for student in demand.students {
            self.student_day_used.insert((student.as_str(), day));
        }
        if self.limits.enforce_cohort_room_ownership {
            self.room_day_owner
                .entry((room_id, day))
                .or_insert((demand.cohort, module.formation_id.as_str()));
        }
        *self.slot_room_count.entry(candidate.slot).or_insert(0) += 1;
        *self.proctor_load.entry(proctor_id).or_insert(0) += 1;
        *self.proctor_day_load.entry((proctor_id, day)).or_insert(0) += 1;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn slot(d: u32, index: usize) -> TimeSlot {
        TimeSlot::new(day(d), index)
    }

    fn limits() -> LedgerLimits {
        LedgerLimits {
            max_rooms_per_slot: 2,
            enforce_cohort_room_ownership: false,
            proctor_daily_cap: None,
        }
    }

    fn catalogue() -> Catalogue {
        Catalogue::new(
            vec![
                CourseModule::new("M1", "F1").with_cohort(2023),
                CourseModule::new("M2", "F1").with_cohort(2023),
                CourseModule::new("M3", "F2"),
                CourseModule::new("M4", "F3"),
            ],
            vec![Room::new("R1", 100), Room::new("R2", 30), Room::new("R3", 60)],
            vec![Proctor::new("P1"), Proctor::new("P2")],
        )
        .with_enrollment("M1", ["s1", "s2"])
        .with_enrollment("M2", ["s3"])
        .with_enrollment("M3", ["s2", "s4"])
        .with_enrollment("M4", ["s5"])
    }

    fn candidate<'a>(cat: &'a Catalogue, s: TimeSlot, room: usize, proctor: usize) -> Candidate<'a> {
        Candidate {
            slot: s,
            start: s.date.and_time(NaiveTime::from_hms_opt(8, 30, 0).unwrap()),
            room: &cat.rooms[room],
            proctor: &cat.proctors[proctor],
        }
    }

    fn demand<'a>(cat: &'a Catalogue, idx: usize) -> ModuleDemand<'a> {
        ModuleDemand::new(&cat.modules[idx], cat, 2024)
    }

    #[test]
    fn test_demand_resolution() {
        let cat = catalogue();
        let d = demand(&cat, 0);
        assert_eq!(d.enrolled, 2);
        assert_eq!(d.cohort, 2023);
        assert_eq!(demand(&cat, 2).cohort, 2024);
    }

    #[test]
    fn test_empty_ledger_accepts() {
        let cat = catalogue();
        let ledger = ConstraintLedger::new(limits());
        assert!(ledger.check_candidate(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)));
        assert_eq!(ledger.committed_count(), 0);
    }

    #[test]
    fn test_capacity_rejected() {
        let mut cat = catalogue();
        cat.rooms[1].capacity = 1;
        let ledger = ConstraintLedger::new(limits());
        assert!(!ledger.check_candidate(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 1, 0)));
    }

    #[test]
    fn test_commit_updates_all_structures() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(limits());
        let s = slot(10, 1);
        ledger.commit(&demand(&cat, 0), &candidate(&cat, s, 0, 1)).unwrap();

        assert!(ledger.is_committed("M1"));
        assert!(ledger.room_taken("R1", s));
        assert!(!ledger.room_taken("R1", slot(10, 0)));
        assert!(ledger.formation_busy("F1", day(10)));
        assert!(!ledger.formation_busy("F1", day(11)));
        assert!(ledger.students_busy(&["s2".to_string()], day(10)));
        assert_eq!(ledger.rooms_in_use(s), 1);
        assert_eq!(ledger.proctor_load("P2"), 1);
        assert_eq!(ledger.proctor_day_load("P2", day(10)), 1);
        assert_eq!(ledger.proctor_load("P1"), 0);
    }

    #[test]
    fn test_room_slot_conflict() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(limits());
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();

        // M4 is independent but R1 is taken in that slot
        assert!(!ledger.check_candidate(&demand(&cat, 3), &candidate(&cat, slot(10, 0), 0, 1)));
        assert!(ledger.check_candidate(&demand(&cat, 3), &candidate(&cat, slot(10, 0), 2, 1)));
    }

    #[test]
    fn test_formation_day_conflict() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(limits());
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();

        // M2 shares formation F1: blocked for the whole day
        assert!(!ledger.check_candidate(&demand(&cat, 1), &candidate(&cat, slot(10, 2), 2, 1)));
        assert!(ledger.check_candidate(&demand(&cat, 1), &candidate(&cat, slot(11, 0), 2, 1)));
    }

    #[test]
    fn test_student_day_conflict() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(limits());
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();

        // M3 shares s2 with M1
        assert!(!ledger.check_candidate(&demand(&cat, 2), &candidate(&cat, slot(10, 1), 2, 1)));
        assert!(ledger.check_candidate(&demand(&cat, 2), &candidate(&cat, slot(11, 1), 2, 1)));
    }

    #[test]
    fn test_slot_room_cap() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(LedgerLimits {
            max_rooms_per_slot: 1,
            ..limits()
        });
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();

        assert!(ledger.slot_full(slot(10, 0)));
        assert!(!ledger.check_candidate(&demand(&cat, 3), &candidate(&cat, slot(10, 0), 2, 1)));
        assert!(!ledger.slot_full(slot(10, 1)));
    }

    #[test]
    fn test_cohort_room_ownership() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(LedgerLimits {
            enforce_cohort_room_ownership: true,
            ..limits()
        });
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();

        // R1 now belongs to (2023, F1) for day 10
        assert!(ledger.room_owner_allows("R1", day(10), 2023, "F1"));
        assert!(!ledger.room_owner_allows("R1", day(10), 2024, "F3"));
        assert!(!ledger.check_candidate(&demand(&cat, 3), &candidate(&cat, slot(10, 1), 0, 1)));
        assert!(ledger.check_candidate(&demand(&cat, 3), &candidate(&cat, slot(11, 1), 0, 1)));
    }

    #[test]
    fn test_cohort_ownership_disabled() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(limits());
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();
        assert!(ledger.check_candidate(&demand(&cat, 3), &candidate(&cat, slot(10, 1), 0, 1)));
    }

    #[test]
    fn test_least_loaded_proctor() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(limits());
        // Tie → first listed
        assert_eq!(ledger.least_loaded_proctor(&cat.proctors, day(10)).unwrap().id, "P1");

        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();
        assert_eq!(ledger.least_loaded_proctor(&cat.proctors, day(10)).unwrap().id, "P2");
    }

    #[test]
    fn test_proctor_daily_cap() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(LedgerLimits {
            proctor_daily_cap: Some(1),
            ..limits()
        });
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();
        ledger.commit(&demand(&cat, 3), &candidate(&cat, slot(10, 1), 2, 1)).unwrap();

        assert!(!ledger.proctor_available("P1", day(10)));
        assert!(ledger.proctor_available("P1", day(11)));
        assert!(ledger.least_loaded_proctor(&cat.proctors, day(10)).is_none());
        assert!(!ledger.check_candidate(&demand(&cat, 2), &candidate(&cat, slot(10, 2), 1, 0)));
    }

    #[test]
    fn test_double_commit_is_fatal() {
        let cat = catalogue();
        let mut ledger = ConstraintLedger::new(limits());
        ledger.commit(&demand(&cat, 0), &candidate(&cat, slot(10, 0), 0, 0)).unwrap();

        let err = ledger
            .commit(&demand(&cat, 0), &candidate(&cat, slot(11, 0), 2, 1))
            .unwrap_err();
        assert!(matches!(err, ScheduleError::DoubleCommit { ref module_id } if module_id == "M1"));
        // Second commit left no trace
        assert!(!ledger.room_taken("R3", slot(11, 0)));
        assert_eq!(ledger.proctor_load("P2"), 0);
        assert!(!ledger.check_candidate(&demand(&cat, 0), &candidate(&cat, slot(12, 0), 0, 0)));
    }
}
