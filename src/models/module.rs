//! Course module model.
//!
//! A course module is a teaching unit that needs exactly one exam. It
//! belongs to a formation (academic program) and optionally to a
//! department and an intake cohort ("promo").

use serde::{Deserialize, Serialize};

/// A course module requiring one exam.
///
/// The enrolled-student count is not stored here: it is derived from the
/// enrollment lists held by the [`Catalogue`](super::Catalogue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseModule {
    /// Unique module identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Owning formation (academic program).
    pub formation_id: String,
    /// Owning department, if known.
    pub department_id: Option<String>,
    /// Intake cohort year. `None` = use the configured fallback.
    pub cohort: Option<i32>,
}

impl CourseModule {
    /// Creates a module owned by `formation_id`.
    pub fn new(id: impl Into<String>, formation_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            formation_id: formation_id.into(),
            department_id: None,
            cohort: None,
        }
    }

    /// Sets the module name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the owning department.
    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    /// Sets the intake cohort.
    pub fn with_cohort(mut self, cohort: i32) -> Self {
        self.cohort = Some(cohort);
        self
    }

    /// Cohort, falling back to `default_cohort` when absent.
    #[inline]
    pub fn cohort_or(&self, default_cohort: i32) -> i32 {
        self.cohort.unwrap_or(default_cohort)
    }
}
