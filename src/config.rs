//! Scheduling configuration.
//!
//! Defaults reproduce the production exam session: 16 days from
//! 2026-01-10, three daily slots, 90-minute exams, at most 35 rooms in
//! parallel per slot.
//!
//! # Example
//!
//! ```
//! use u_exam_schedule::config::SchedulerConfig;
//!
//! let config = SchedulerConfig::from_toml_str(r#"
//!     start_date = "2026-06-01"
//!     end_date = "2026-06-05"
//!     daily_slots = ["09:00", "13:30"]
//!     max_rooms_per_slot = 10
//!     proctor_daily_cap = 2
//! "#).unwrap();
//!
//! let period = config.validate().unwrap();
//! assert_eq!(period.slot_count(), 10);
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::ExamPeriod;

/// Configuration of one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// First exam day (inclusive).
    pub start_date: NaiveDate,
    /// Last exam day (inclusive).
    pub end_date: NaiveDate,
    /// Ordered daily slot start times, `HH:MM`.
    pub daily_slots: Vec<String>,
    /// Fixed exam duration.
    pub exam_duration_minutes: u32,
    /// Maximum number of rooms in use during one slot.
    pub max_rooms_per_slot: usize,
    /// Restrict each room to one (cohort, formation) per day.
    pub enforce_cohort_room_ownership: bool,
    /// Maximum exams per proctor per day. `None` = unlimited.
    pub proctor_daily_cap: Option<u32>,
    /// Cohort assumed for modules without one.
    pub default_cohort: i32,
    /// Rotate the daily slot order per module to spread load.
    pub rotate_daily_slots: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 25).unwrap_or_default(),
            daily_slots: vec!["08:30".into(), "11:00".into(), "14:00".into()],
            exam_duration_minutes: 90,
            max_rooms_per_slot: 35,
            enforce_cohort_room_ownership: false,
            proctor_daily_cap: None,
            default_cohort: 2024,
            rotate_daily_slots: true,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TOML document. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Sets the inclusive date range.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Sets the daily slot labels.
    pub fn with_daily_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.daily_slots = slots.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the exam duration.
    pub fn with_exam_duration(mut self, minutes: u32) -> Self {
        self.exam_duration_minutes = minutes;
        self
    }

    /// Sets the per-slot room cap.
    pub fn with_max_rooms_per_slot(mut self, cap: usize) -> Self {
        self.max_rooms_per_slot = cap;
        self
    }

    /// Enables or disables room/day cohort ownership.
    pub fn with_cohort_room_ownership(mut self, enabled: bool) -> Self {
        self.enforce_cohort_room_ownership = enabled;
        self
    }

    /// Sets the per-proctor daily cap.
    pub fn with_proctor_daily_cap(mut self, cap: u32) -> Self {
        self.proctor_daily_cap = Some(cap);
        self
    }

    /// Sets the fallback cohort.
    pub fn with_default_cohort(mut self, cohort: i32) -> Self {
        self.default_cohort = cohort;
        self
    }

    /// Enables or disables per-module slot rotation.
    pub fn with_slot_rotation(mut self, enabled: bool) -> Self {
        self.rotate_daily_slots = enabled;
        self
    }

    /// Inclusive (start, end) date range.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.start_date, self.end_date)
    }

    /// Checks the configuration and resolves the exam period.
    ///
    /// # Errors
    /// Returns the first problem found: empty date range, no slots,
    /// unparsable or non-increasing slot labels, or a zero duration or cap.
    pub fn validate(&self) -> Result<ExamPeriod, ConfigError> {
        if self.end_date < self.start_date {
            return Err(ConfigError::EmptyDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.daily_slots.is_empty() {
            return Err(ConfigError::NoDailySlots);
        }
        if self.exam_duration_minutes == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.max_rooms_per_slot == 0 {
            return Err(ConfigError::ZeroRoomCap);
        }
        if self.proctor_daily_cap == Some(0) {
            return Err(ConfigError::ZeroProctorCap);
        }

        let mut starts: Vec<NaiveTime> = Vec::with_capacity(self.daily_slots.len());
        for label in &self.daily_slots {
            let time = parse_slot_label(label)?;
            if let Some(previous) = starts.last() {
                if time <= *previous {
                    return Err(ConfigError::UnorderedSlots {
                        previous: previous.format("%H:%M").to_string(),
                        next: label.clone(),
                    });
                }
            }
            starts.push(time);
        }

        Ok(ExamPeriod::new(self.start_date, self.end_date, starts))
    }
}

fn parse_slot_label(label: &str) -> Result<NaiveTime, ConfigError> {
    let trimmed = label.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ConfigError::InvalidSlotLabel(label.to_string()))
}
