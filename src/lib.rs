//! Greedy exam timetabling for university exam sessions.
//!
//! Places every course module's exam into a (day, slot, room, proctor)
//! combination over a configured exam period, honoring room capacity,
//! one exam per formation per day, one exam per student per day, a cap on
//! rooms in use per slot, and optionally cohort room ownership and a
//! proctor daily cap. Modules that cannot be placed are reported with a
//! reason instead of failing the run.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `CourseModule`, `Room`, `Proctor`, `Catalogue`,
//!   `ExamPeriod`, `TimeSlot`, `Schedule`, `Assignment`
//! - **`config`**: `SchedulerConfig` with defaults and TOML loading
//! - **`validation`**: Catalogue integrity checks (duplicate IDs, dangling enrollments)
//! - **`scheduler`**: Constraint ledger, candidate enumeration, `ExamScheduler`, KPIs
//! - **`audit`**: Post-hoc overlap audit and rule re-check
//! - **`error`**: `ConfigError` and `ScheduleError`
//!
//! # Example
//!
//! ```
//! use u_exam_schedule::config::SchedulerConfig;
//! use u_exam_schedule::models::{Catalogue, CourseModule, Proctor, Room};
//! use u_exam_schedule::scheduler::ExamScheduler;
//!
//! let catalogue = Catalogue::new(
//!     vec![CourseModule::new("ALG", "CS-L1"), CourseModule::new("DB", "CS-L2")],
//!     vec![Room::new("A1", 40)],
//!     vec![Proctor::new("P1")],
//! )
//! .with_enrollment("ALG", ["s1", "s2"])
//! .with_enrollment("DB", ["s3"]);
//!
//! let schedule = ExamScheduler::new(SchedulerConfig::default())
//!     .schedule(&catalogue)
//!     .unwrap();
//! assert_eq!(schedule.assignment_count(), 2);
//! assert!(schedule.is_complete());
//! ```
//!
//! # References
//!
//! - Carter, Laporte & Lee (1996), "Examination Timetabling: Algorithmic
//!   Strategies and Applications"
//! - Qu et al. (2009), "A survey of search methodologies and automated system
//!   development for examination timetabling"

pub mod audit;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;
