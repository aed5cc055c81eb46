//! Exam timetabling domain models.
//!
//! Provides the input catalogue (modules, rooms, proctors, enrollments),
//! the exam period grid, and the schedule produced by a run.
//!
//! # Domain Mappings
//!
//! | u-exam-schedule | Generic scheduling |
//! |-----------------|--------------------|
//! | CourseModule | Task |
//! | Room | Primary resource (capacity-bound) |
//! | Proctor | Human resource |
//! | TimeSlot | Discrete time bucket |
//! | Assignment | Task × resources × time |

mod calendar;
mod catalogue;
mod module;
mod resource;
mod schedule;

pub use calendar::{ExamPeriod, TimeSlot, TimeWindow};
pub use catalogue::Catalogue;
pub use module::CourseModule;
pub use resource::{Proctor, Room};
pub use schedule::{
    Approval, ApprovalLevel, Assignment, FailureReason, RunOutcome, Schedule, UnplacedModule,
};
