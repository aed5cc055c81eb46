//! Greedy first-fit exam scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the configuration and the catalogue.
//! 2. Sort modules by enrolled-student count, descending (stable), so large
//!    classes claim the few large rooms first.
//! 3. For each module, take the first feasible candidate from the
//!    [`CandidateEnumerator`] and commit it to the [`ConstraintLedger`].
//! 4. A module with no feasible candidate is recorded as unplaced; the run
//!    continues. Earlier commitments are never revisited.
//!
//! # Complexity
//! O(M·D·S·R) candidate checks in the worst case, where M = modules,
//! D = days, S = slots per day, R = rooms. Each check is O(1) except the
//! student gate, which runs once per (module, day).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, info_span, warn};

use super::candidates::{rooms_by_capacity, CandidateEnumerator};
use super::ledger::{Candidate, ConstraintLedger, LedgerLimits, ModuleDemand};
use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::models::{
    Approval, Assignment, Catalogue, FailureReason, RunOutcome, Schedule, UnplacedModule,
};
use crate::validation::validate_catalogue;

/// Greedy first-fit exam scheduler.
///
/// Single-threaded and deterministic: identical inputs always produce
/// identical assignments and failures.
///
/// # Example
///
/// ```
/// use u_exam_schedule::config::SchedulerConfig;
/// use u_exam_schedule::models::{Catalogue, CourseModule, Proctor, Room};
/// use u_exam_schedule::scheduler::ExamScheduler;
///
/// let catalogue = Catalogue::new(
///     vec![CourseModule::new("ALGO", "L2-INFO")],
///     vec![Room::new("A1", 50)],
///     vec![Proctor::new("P1")],
/// )
/// .with_enrollment("ALGO", (0..40).map(|i| format!("student-{i}")));
///
/// let schedule = ExamScheduler::new(SchedulerConfig::default())
///     .schedule(&catalogue)
///     .unwrap();
/// assert_eq!(schedule.assignment_count(), 1);
/// assert_eq!(schedule.assignments[0].room_id, "A1");
/// ```
#[derive(Debug, Clone)]
pub struct ExamScheduler {
    config: SchedulerConfig,
    cancel: Option<Arc<AtomicBool>>,
    time_budget: Option<Duration>,
}

impl ExamScheduler {
    /// Creates a scheduler for the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            cancel: None,
            time_budget: None,
        }
    }

    /// Stops the run between modules once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Stops the run between modules once `budget` has elapsed.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Schedules every module of the catalogue.
    ///
    /// Missing rooms or proctors are not errors: every module is then
    /// reported unplaced with [`FailureReason::NoRooms`] or
    /// [`FailureReason::NoProctors`].
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidConfig`] / [`ScheduleError::InvalidCatalogue`]
    ///   before any scheduling work.
    /// - [`ScheduleError::DoubleCommit`] if the ledger detects an internal
    ///   inconsistency; the run stops immediately.
    pub fn schedule(&self, catalogue: &Catalogue) -> Result<Schedule, ScheduleError> {
        let _span = info_span!("exam_schedule").entered();

        let period = self.config.validate()?;
        validate_catalogue(catalogue).map_err(ScheduleError::InvalidCatalogue)?;

        let duration = self.config.exam_duration_minutes;
        if let Some(gap) = period.min_slot_gap() {
            if gap < chrono::Duration::minutes(i64::from(duration)) {
                warn!(
                    gap_minutes = gap.num_minutes(),
                    duration_minutes = duration,
                    "daily slots are closer than the exam duration; consecutive exams will overlap"
                );
            }
        }

        info!(
            modules = catalogue.modules.len(),
            rooms = catalogue.rooms.len(),
            proctors = catalogue.proctors.len(),
            days = period.days().len(),
            slots = period.slot_count(),
            "starting exam scheduling run"
        );

        let default_cohort = self.config.default_cohort;
        let demands: Vec<ModuleDemand<'_>> = catalogue
            .modules
            .iter()
            .map(|m| ModuleDemand::new(m, catalogue, default_cohort))
            .collect();
        let order = order_by_enrollment(&demands);

        let mut schedule = Schedule::new();

        if let Some(reason) = insufficiency(catalogue) {
            warn!(?reason, "catalogue cannot host any exam; every module is unplaced");
            for &idx in &order {
                let d = &demands[idx];
                schedule.add_failure(UnplacedModule::new(&d.module.id, d.enrolled, reason));
            }
            return Ok(schedule);
        }

        let rooms = rooms_by_capacity(&catalogue.rooms);
        let largest_room = rooms.first().map(|r| r.capacity).unwrap_or(0);
        let mut ledger = ConstraintLedger::new(LedgerLimits::from(&self.config));
        let started = Instant::now();

        for (rank, &idx) in order.iter().enumerate() {
            if self.should_stop(started) {
                warn!(
                    visited = rank,
                    remaining = order.len() - rank,
                    "scheduling run cancelled"
                );
                for &rest in &order[rank..] {
                    let d = &demands[rest];
                    schedule.add_failure(UnplacedModule::new(
                        &d.module.id,
                        d.enrolled,
                        FailureReason::Cancelled,
                    ));
                }
                schedule.outcome = RunOutcome::Cancelled;
                break;
            }

            let demand = &demands[idx];
            if demand.enrolled > largest_room as usize {
                warn!(
                    module = %demand.module.id,
                    enrolled = demand.enrolled,
                    largest_room,
                    "no room is large enough"
                );
                schedule.add_failure(UnplacedModule::new(
                    &demand.module.id,
                    demand.enrolled,
                    FailureReason::CapacityExceeded,
                ));
                continue;
            }

            let slot_offset = if self.config.rotate_daily_slots { rank } else { 0 };
            let found = CandidateEnumerator::new(
                &ledger,
                demand,
                &period,
                &rooms,
                &catalogue.proctors,
                slot_offset,
            )
            .next();

            let Some(candidate) = found else {
                warn!(
                    module = %demand.module.id,
                    enrolled = demand.enrolled,
                    "no feasible slot in the exam period"
                );
                schedule.add_failure(UnplacedModule::new(
                    &demand.module.id,
                    demand.enrolled,
                    FailureReason::HorizonExhausted,
                ));
                continue;
            };

            debug_assert!(ledger.check_candidate(demand, &candidate));
            if let Err(e) = ledger.commit(demand, &candidate) {
                error!(module = %demand.module.id, "ledger rejected commit: {e}");
                return Err(e);
            }

            debug!(
                module = %demand.module.id,
                date = %candidate.slot.date,
                slot = candidate.slot.index,
                room = %candidate.room.id,
                proctor = %candidate.proctor.id,
                "exam placed"
            );
            schedule.add_assignment(make_assignment(demand, &candidate, duration));
        }

        info!(
            placed = schedule.assignment_count(),
            unplaced = schedule.failure_count(),
            outcome = ?schedule.outcome,
            "exam scheduling run finished"
        );

        Ok(schedule)
    }

    fn should_stop(&self, started: Instant) -> bool {
        let cancelled = self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        let expired = self
            .time_budget
            .is_some_and(|budget| started.elapsed() >= budget);
        cancelled || expired
    }
}

/// Module indices by descending enrollment; ties keep input order.
fn order_by_enrollment(demands: &[ModuleDemand<'_>]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..demands.len()).collect();
    indices.sort_by(|&a, &b| demands[b].enrolled.cmp(&demands[a].enrolled));
    indices
}

fn insufficiency(catalogue: &Catalogue) -> Option<FailureReason> {
    if catalogue.rooms.is_empty() {
        Some(FailureReason::NoRooms)
    } else if catalogue.proctors.is_empty() {
        Some(FailureReason::NoProctors)
    } else {
        None
    }
}

fn make_assignment(demand: &ModuleDemand<'_>, candidate: &Candidate<'_>, duration: u32) -> Assignment {
    let module = demand.module;
    Assignment {
        module_id: module.id.clone(),
        formation_id: module.formation_id.clone(),
        department_id: module.department_id.clone(),
        proctor_id: candidate.proctor.id.clone(),
        room_id: candidate.room.id.clone(),
        slot: candidate.slot,
        start: candidate.start,
        duration_minutes: duration,
        approval: Approval::default(),
    }
}
