//! Input validation for exam scheduling catalogues.
//!
//! Checks structural integrity of modules, rooms, proctors, and
//! enrollments before scheduling. Detects:
//! - Empty identifiers
//! - Duplicate IDs
//! - Enrollment lists attached to unknown modules
//! - Duplicate students inside one enrollment list
//!
//! An empty catalogue section (no rooms, no proctors, no modules) is not a
//! validation error: the scheduler reports it as unplaced modules.

use crate::models::Catalogue;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// An entity has an empty ID.
    EmptyId,
    /// An enrollment list references a module that doesn't exist.
    UnknownModuleReference,
    /// A student appears twice in one module's enrollment list.
    DuplicateEnrollment,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a scheduling catalogue.
///
/// Checks:
/// 1. No empty module, room, proctor, or formation IDs
/// 2. No duplicate module, room, or proctor IDs
/// 3. Every enrollment list belongs to a known module
/// 4. No student is listed twice for the same module
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalogue(catalogue: &Catalogue) -> ValidationResult {
    let mut errors = Vec::new();

    let mut module_ids = HashSet::new();
    for m in &catalogue.modules {
        if m.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Module with empty ID",
            ));
        } else if !module_ids.insert(m.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate module ID: {}", m.id),
            ));
        }
        if m.formation_id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("Module '{}' has an empty formation ID", m.id),
            ));
        }
    }

    let mut room_ids = HashSet::new();
    for r in &catalogue.rooms {
        if r.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Room with empty ID",
            ));
        } else if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }

    let mut proctor_ids = HashSet::new();
    for p in &catalogue.proctors {
        if p.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Proctor with empty ID",
            ));
        } else if !proctor_ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate proctor ID: {}", p.id),
            ));
        }
    }

    // Sorted for a deterministic error order
    let mut enrolled_modules: Vec<&String> = catalogue.enrollments.keys().collect();
    enrolled_modules.sort();

    for module_id in enrolled_modules {
        if !module_ids.contains(module_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownModuleReference,
                format!("Enrollments reference unknown module '{module_id}'"),
            ));
        }

        let mut seen = HashSet::new();
        for student in catalogue.students_of(module_id) {
            if !seen.insert(student.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateEnrollment,
                    format!("Student '{student}' enrolled twice in module '{module_id}'"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
