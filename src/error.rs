//! Error types.
//!
//! Only run-level problems are errors. Missing rooms, proctors, or modules
//! and per-module unplaceability are regular outcomes recorded in the
//! [`Schedule`](crate::models::Schedule).

use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::ValidationError;

/// Configuration rejected before any scheduling work.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The end date precedes the start date.
    #[error("exam period is empty: end date {end} is before start date {start}")]
    EmptyDateRange { start: NaiveDate, end: NaiveDate },
    /// No daily slots configured.
    #[error("no daily slots configured")]
    NoDailySlots,
    /// A slot label is not a time of day.
    #[error("invalid slot label '{0}': expected HH:MM")]
    InvalidSlotLabel(String),
    /// Daily slots are not strictly increasing.
    #[error("daily slots must be strictly increasing: '{previous}' then '{next}'")]
    UnorderedSlots { previous: String, next: String },
    /// Exam duration is zero.
    #[error("exam duration must be positive")]
    ZeroDuration,
    /// Per-slot room cap is zero.
    #[error("max_rooms_per_slot must be positive")]
    ZeroRoomCap,
    /// Proctor daily cap is set to zero.
    #[error("proctor_daily_cap must be positive when set")]
    ZeroProctorCap,
    /// TOML source could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fatal outcome of a scheduling run.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// Catalogue failed structural validation.
    #[error("invalid catalogue: {}", summarize(.0))]
    InvalidCatalogue(Vec<ValidationError>),
    /// The ledger saw a second commit for the same module.
    #[error("internal consistency fault: module '{module_id}' committed twice")]
    DoubleCommit { module_id: String },
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors.first() {
        Some(first) => format!("{} issue(s), first: {}", errors.len(), first.message),
        None => "no issues reported".to_string(),
    }
}
