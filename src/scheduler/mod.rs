//! Greedy exam scheduler and KPI evaluation.
//!
//! # Algorithm
//!
//! `ExamScheduler` places modules largest-first, taking the first feasible
//! (day, slot, room, proctor) candidate for each one. It never backtracks:
//! a module that finds no candidate is reported unplaced and earlier
//! placements stay as they are. Fast and deterministic, not optimal.
//!
//! # Components
//!
//! - [`ConstraintLedger`]: commitments made so far and O(1) feasibility checks.
//! - [`CandidateEnumerator`]: lazy, prioritized candidate stream per module.
//! - [`ExamScheduler`]: the main loop.
//! - [`ScheduleKpi`]: placement, occupancy, and proctor-load metrics.
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination Timetabling: Algorithmic
//!   Strategies and Applications"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

mod candidates;
mod engine;
mod kpi;
mod ledger;

pub use candidates::{rooms_by_capacity, rotated_slot_order, CandidateEnumerator};
pub use engine::ExamScheduler;
pub use kpi::{ProctorLoad, RoomOccupancy, ScheduleKpi};
pub use ledger::{Candidate, ConstraintLedger, LedgerLimits, ModuleDemand};
