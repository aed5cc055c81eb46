//! Schedule (run output) model.
//!
//! A schedule is the committed set of exam assignments produced by one
//! scheduling run, together with the modules that could not be placed.
//! A module appears either once in `assignments` or once in `failures`,
//! never in both.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{TimeSlot, TimeWindow};

/// Result of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Committed assignments, in commit order.
    pub assignments: Vec<Assignment>,
    /// Modules that received no assignment.
    pub failures: Vec<UnplacedModule>,
    /// How the run ended.
    pub outcome: RunOutcome,
}

/// A committed exam placement: module × proctor × room × time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Scheduled module ID.
    pub module_id: String,
    /// Owning formation (denormalized for query convenience).
    pub formation_id: String,
    /// Owning department (denormalized for query convenience).
    pub department_id: Option<String>,
    /// Assigned proctor ID.
    pub proctor_id: String,
    /// Assigned room ID.
    pub room_id: String,
    /// Assigned time slot.
    pub slot: TimeSlot,
    /// Exam start.
    pub start: NaiveDateTime,
    /// Exam duration in minutes.
    pub duration_minutes: u32,
    /// Sign-off state.
    pub approval: Approval,
}

/// Sign-off flags set after scheduling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// Approved by the head of department.
    pub department_head: bool,
    /// Approved by the dean.
    pub dean: bool,
}

/// Who signs off an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalLevel {
    /// Head of department.
    DepartmentHead,
    /// Dean or vice-dean.
    Dean,
}

/// A module that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedModule {
    /// Module ID.
    pub module_id: String,
    /// Distinct enrolled students.
    pub enrolled: usize,
    /// Why no assignment was committed.
    pub reason: FailureReason,
}

/// Why a module received no assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The catalogue has no rooms.
    NoRooms,
    /// The catalogue has no proctors.
    NoProctors,
    /// No room is large enough for the enrollment.
    CapacityExceeded,
    /// Every candidate in the exam period was infeasible.
    HorizonExhausted,
    /// The run was cancelled before this module was visited.
    Cancelled,
}

/// How a scheduling run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every module was visited.
    #[default]
    Completed,
    /// A cancellation signal stopped the run between modules.
    Cancelled,
}

impl Assignment {
    /// Time interval occupied by this exam.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_start(self.start, self.duration_minutes)
    }

    /// Exam end (exclusive).
    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.window().end
    }

    /// Exam day.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.slot.date
    }

    /// Whether both sign-offs are present.
    #[inline]
    pub fn is_fully_approved(&self) -> bool {
        self.approval.department_head && self.approval.dean
    }
}

impl UnplacedModule {
    /// Creates a failure record.
    pub fn new(module_id: impl Into<String>, enrolled: usize, reason: FailureReason) -> Self {
        Self {
            module_id: module_id.into(),
            enrolled,
            reason,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Records an unplaced module.
    pub fn add_failure(&mut self, failure: UnplacedModule) {
        self.failures.push(failure);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Number of unplaced modules.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Whether every visited module was placed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.outcome == RunOutcome::Completed
    }

    /// IDs of unplaced modules, in failure order.
    pub fn failed_module_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.module_id.as_str()).collect()
    }

    /// Finds the assignment for a module.
    pub fn assignment_for_module(&self, module_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.module_id == module_id)
    }

    /// Assignments of one formation.
    pub fn assignments_for_formation(&self, formation_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.formation_id == formation_id)
            .collect()
    }

    /// Assignments of one department.
    pub fn assignments_for_department(&self, department_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.department_id.as_deref() == Some(department_id))
            .collect()
    }

    /// Assignments supervised by one proctor.
    pub fn assignments_for_proctor(&self, proctor_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.proctor_id == proctor_id)
            .collect()
    }

    /// Assignments held in one room.
    pub fn assignments_for_room(&self, room_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.room_id == room_id)
            .collect()
    }

    /// Assignments held on one day.
    pub fn assignments_on(&self, date: NaiveDate) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.date() == date)
            .collect()
    }

    /// Assignments ordered by start time, then room.
    pub fn chronological(&self) -> Vec<&Assignment> {
        let mut sorted: Vec<&Assignment> = self.assignments.iter().collect();
        sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.room_id.cmp(&b.room_id)));
        sorted
    }

    /// Exam count per proctor (proctors without exams are absent).
    pub fn proctor_loads(&self) -> BTreeMap<&str, usize> {
        let mut loads = BTreeMap::new();
        for a in &self.assignments {
            *loads.entry(a.proctor_id.as_str()).or_insert(0) += 1;
        }
        loads
    }

    /// Records a sign-off on a module's assignment.
    ///
    /// Returns `false` if the module has no assignment.
    pub fn approve(&mut self, module_id: &str, level: ApprovalLevel) -> bool {
        match self.assignments.iter_mut().find(|a| a.module_id == module_id) {
            Some(a) => {
                match level {
                    ApprovalLevel::DepartmentHead => a.approval.department_head = true,
                    ApprovalLevel::Dean => a.approval.dean = true,
                }
                true
            }
            None => false,
        }
    }

    /// Assignments carrying both sign-offs.
    pub fn fully_approved(&self) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.is_fully_approved())
            .collect()
    }
}
