//! Scheduling input catalogue.
//!
//! Bundles every immutable input of a run: modules, rooms, proctors, and
//! the module → enrolled-students mapping. Students are never materialized
//! as records; they exist only as identities inside enrollment lists.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{CourseModule, Proctor, Room};

/// Input catalogue for one scheduling run.
///
/// Collections keep their input order, which is the stable tie-break used
/// throughout scheduling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogue {
    /// Modules to schedule.
    pub modules: Vec<CourseModule>,
    /// Available rooms.
    pub rooms: Vec<Room>,
    /// Available proctors.
    pub proctors: Vec<Proctor>,
    /// Enrolled student identities per module ID.
    pub enrollments: HashMap<String, Vec<String>>,
}

impl Catalogue {
    /// Creates a catalogue without enrollments.
    pub fn new(modules: Vec<CourseModule>, rooms: Vec<Room>, proctors: Vec<Proctor>) -> Self {
        Self {
            modules,
            rooms,
            proctors,
            enrollments: HashMap::new(),
        }
    }

    /// Sets the enrollment list of a module.
    ///
    /// Duplicate student IDs are dropped, keeping first occurrences.
    pub fn with_enrollment<I, S>(mut self, module_id: impl Into<String>, students: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let list: Vec<String> = students
            .into_iter()
            .map(Into::into)
            .filter(|s| seen.insert(s.clone()))
            .collect();
        self.enrollments.insert(module_id.into(), list);
        self
    }

    /// Enrolls one student in a module. Returns `false` if already enrolled.
    pub fn enroll(&mut self, module_id: &str, student_id: impl Into<String>) -> bool {
        let student_id = student_id.into();
        let list = self.enrollments.entry(module_id.to_string()).or_default();
        if list.contains(&student_id) {
            return false;
        }
        list.push(student_id);
        true
    }

    /// Enrolled students of a module (empty if none).
    pub fn students_of(&self, module_id: &str) -> &[String] {
        self.enrollments
            .get(module_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct students enrolled in a module.
    pub fn enrolled_count(&self, module_id: &str) -> usize {
        let students = self.students_of(module_id);
        let distinct: HashSet<&str> = students.iter().map(String::as_str).collect();
        distinct.len()
    }

    /// Finds a module by ID.
    pub fn module(&self, module_id: &str) -> Option<&CourseModule> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    /// Finds a room by ID.
    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    /// Finds a proctor by ID.
    pub fn proctor(&self, proctor_id: &str) -> Option<&Proctor> {
        self.proctors.iter().find(|p| p.id == proctor_id)
    }

    /// Whether two modules share at least one enrolled student.
    pub fn share_students(&self, a: &str, b: &str) -> bool {
        let left: HashSet<&str> = self.students_of(a).iter().map(String::as_str).collect();
        self.students_of(b)
            .iter()
            .any(|s| left.contains(s.as_str()))
    }

    /// Whether the catalogue lacks modules, rooms, or proctors.
    pub fn is_insufficient(&self) -> bool {
        self.modules.is_empty() || self.rooms.is_empty() || self.proctors.is_empty()
    }
}
