//! Room and proctor models.
//!
//! Rooms and proctors are the two resources every exam consumes. Both are
//! immutable inputs to a scheduling run.

use serde::{Deserialize, Serialize};

/// An exam room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Seating capacity.
    pub capacity: u32,
}

/// An exam proctor (invigilator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proctor {
    /// Unique proctor identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning department, if known.
    pub department_id: Option<String>,
}

impl Room {
    /// Creates a room with the given capacity.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether `enrolled` students fit in this room.
    #[inline]
    pub fn fits(&self, enrolled: usize) -> bool {
        enrolled <= self.capacity as usize
    }
}

impl Proctor {
    /// Creates a proctor with no department.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department_id: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the owning department.
    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }
}
