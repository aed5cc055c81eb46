//! Post-hoc schedule verification.
//!
//! Two independent passes over a committed schedule, run after (never
//! during) scheduling:
//!
//! - [`audit`]: interval-overlap conflicts. Two assignments conflict when
//!   they share a room (or a proctor) and their `[start, start + duration)`
//!   windows overlap. This catches problems the ledger's exact slot
//!   equality cannot see, such as slots defined closer together than the
//!   exam duration.
//! - [`check_invariants`]: re-derives every scheduling rule (capacity, one
//!   exam per room/slot, formation/day, student/day, room cap per slot,
//!   cohort ownership, proctor daily cap) from the schedule and catalogue.
//!
//! Both are pure: calling them twice on the same input yields the same list.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::SchedulerConfig;
use crate::models::{Assignment, Catalogue, CourseModule, Schedule, TimeSlot};

/// An overlap between two assignments sharing a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Which resource is double-booked.
    pub kind: ConflictKind,
    /// Room or proctor ID.
    pub resource_id: String,
    /// Module of the earlier-listed assignment.
    pub first_module: String,
    /// Module of the later-listed assignment.
    pub second_module: String,
    /// Start of the earlier-listed assignment.
    pub first_start: NaiveDateTime,
    /// Start of the later-listed assignment.
    pub second_start: NaiveDateTime,
}

/// Conflict classes reported by [`audit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConflictKind {
    /// Same room, overlapping time.
    Room,
    /// Same proctor, overlapping time.
    Proctor,
}

/// Finds room and proctor overlaps.
///
/// Room conflicts come first, then proctor conflicts. Within a class,
/// conflicts are grouped by resource ID and pairs keep schedule order.
pub fn audit(assignments: &[Assignment]) -> Vec<Conflict> {
    let mut conflicts = overlaps(assignments, ConflictKind::Room, room_of);
    conflicts.extend(overlaps(assignments, ConflictKind::Proctor, proctor_of));
    conflicts
}

/// Number of conflicts of one class.
pub fn count_conflicts(conflicts: &[Conflict], kind: ConflictKind) -> usize {
    conflicts.iter().filter(|c| c.kind == kind).count()
}

fn room_of(a: &Assignment) -> &str {
    &a.room_id
}

fn proctor_of(a: &Assignment) -> &str {
    &a.proctor_id
}

fn overlaps(
    assignments: &[Assignment],
    kind: ConflictKind,
    resource: fn(&Assignment) -> &str,
) -> Vec<Conflict> {
    let mut groups: BTreeMap<&str, Vec<&Assignment>> = BTreeMap::new();
    for a in assignments {
        groups.entry(resource(a)).or_default().push(a);
    }

    let mut conflicts = Vec::new();
    for (resource_id, group) in groups {
        for (i, first) in group.iter().enumerate() {
            for second in &group[i + 1..] {
                if first.window().overlaps(&second.window()) {
                    conflicts.push(Conflict {
                        kind,
                        resource_id: resource_id.to_string(),
                        first_module: first.module_id.clone(),
                        second_module: second.module_id.clone(),
                        first_start: first.start,
                        second_start: second.start,
                    });
                }
            }
        }
    }
    conflicts
}

/// A broken scheduling rule found by [`check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity ID (module, room, slot, or proctor).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A module has more than one assignment.
    DuplicateAssignment,
    /// An assignment references a module missing from the catalogue.
    UnknownModule,
    /// An assignment references a room missing from the catalogue.
    UnknownRoom,
    /// Room capacity is below the module's enrollment.
    CapacityExceeded,
    /// Two exams share a room in the same slot.
    RoomDoubleBooked,
    /// Two exams of one formation on the same day.
    FormationSameDay,
    /// A student sits two exams on the same day.
    StudentSameDay,
    /// More rooms in use during a slot than allowed.
    SlotRoomCapExceeded,
    /// A room hosts two (cohort, formation) pairs on one day.
    CohortRoomMix,
    /// A proctor supervises more exams in a day than allowed.
    ProctorDailyCapExceeded,
}

impl Violation {
    fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Checks a schedule against every scheduling rule.
///
/// Returns an empty list for any schedule produced by
/// [`ExamScheduler`](crate::scheduler::ExamScheduler) with the same
/// catalogue and configuration.
pub fn check_invariants(
    schedule: &Schedule,
    catalogue: &Catalogue,
    config: &SchedulerConfig,
) -> Vec<Violation> {
    let modules: HashMap<&str, &CourseModule> = catalogue
        .modules
        .iter()
        .map(|m| (m.id.as_str(), m))
        .collect();

    let mut violations = Vec::new();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut room_slot: HashMap<(&str, TimeSlot), &str> = HashMap::new();
    let mut formation_day: HashMap<(&str, NaiveDate), &str> = HashMap::new();
    let mut student_day: HashMap<(&str, NaiveDate), &str> = HashMap::new();
    let mut room_owner: HashMap<(&str, NaiveDate), (i32, &str)> = HashMap::new();
    let mut slot_rooms: BTreeMap<TimeSlot, HashSet<&str>> = BTreeMap::new();
    let mut proctor_day: BTreeMap<(&str, NaiveDate), u32> = BTreeMap::new();

    for a in &schedule.assignments {
        let module_id = a.module_id.as_str();
        let day = a.date();

        if !placed.insert(module_id) {
            violations.push(Violation::new(
                ViolationType::DuplicateAssignment,
                module_id,
                format!("Module '{module_id}' is assigned more than once"),
                100,
            ));
        }

        let Some(module) = modules.get(module_id) else {
            violations.push(Violation::new(
                ViolationType::UnknownModule,
                module_id,
                format!("Module '{module_id}' is not in the catalogue"),
                90,
            ));
            continue;
        };

        let enrolled = catalogue.enrolled_count(module_id);
        match catalogue.room(&a.room_id) {
            Some(room) if !room.fits(enrolled) => violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                &a.room_id,
                format!(
                    "Room '{}' seats {} but module '{module_id}' has {enrolled} students",
                    room.id, room.capacity
                ),
                90,
            )),
            Some(_) => {}
            None => violations.push(Violation::new(
                ViolationType::UnknownRoom,
                &a.room_id,
                format!("Room '{}' is not in the catalogue", a.room_id),
                90,
            )),
        }

        if let Some(other) = room_slot.insert((a.room_id.as_str(), a.slot), module_id) {
            violations.push(Violation::new(
                ViolationType::RoomDoubleBooked,
                &a.room_id,
                format!(
                    "Room '{}' hosts '{other}' and '{module_id}' in the same slot",
                    a.room_id
                ),
                95,
            ));
        }

        if let Some(other) = formation_day.insert((module.formation_id.as_str(), day), module_id) {
            violations.push(Violation::new(
                ViolationType::FormationSameDay,
                &module.formation_id,
                format!(
                    "Formation '{}' sits '{other}' and '{module_id}' on {day}",
                    module.formation_id
                ),
                80,
            ));
        }

        let mut clashes: BTreeSet<&str> = BTreeSet::new();
        for student in catalogue.students_of(module_id) {
            if let Some(other) = student_day.insert((student.as_str(), day), module_id) {
                if other != module_id {
                    clashes.insert(other);
                }
            }
        }
        for other in clashes {
            violations.push(Violation::new(
                ViolationType::StudentSameDay,
                module_id,
                format!("Modules '{other}' and '{module_id}' share students on {day}"),
                85,
            ));
        }

        if config.enforce_cohort_room_ownership {
            let owner = (
                module.cohort_or(config.default_cohort),
                module.formation_id.as_str(),
            );
            let existing = *room_owner.entry((a.room_id.as_str(), day)).or_insert(owner);
            if existing != owner {
                violations.push(Violation::new(
                    ViolationType::CohortRoomMix,
                    &a.room_id,
                    format!(
                        "Room '{}' on {day} is owned by ({}, {}) but hosts ({}, {})",
                        a.room_id, existing.0, existing.1, owner.0, owner.1
                    ),
                    60,
                ));
            }
        }

        slot_rooms.entry(a.slot).or_default().insert(a.room_id.as_str());
        *proctor_day.entry((a.proctor_id.as_str(), day)).or_insert(0) += 1;
    }

    for (slot, rooms) in &slot_rooms {
        if rooms.len() > config.max_rooms_per_slot {
            violations.push(Violation::new(
                ViolationType::SlotRoomCapExceeded,
                format!("{}#{}", slot.date, slot.index),
                format!(
                    "{} rooms in use on {} slot {}, cap is {}",
                    rooms.len(),
                    slot.date,
                    slot.index,
                    config.max_rooms_per_slot
                ),
                70,
            ));
        }
    }

    if let Some(cap) = config.proctor_daily_cap {
        for ((proctor_id, day), count) in &proctor_day {
            if *count > cap {
                violations.push(Violation::new(
                    ViolationType::ProctorDailyCapExceeded,
                    *proctor_id,
                    format!("Proctor '{proctor_id}' supervises {count} exams on {day}, cap is {cap}"),
                    50,
                ));
            }
        }
    }

    violations
}
