//! Schedule quality metrics (KPIs).
//!
//! Computes the dashboard figures of an exam session from a schedule and
//! the catalogue it was built from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement Rate | placed / (placed + unplaced) |
//! | Room / Proctor Conflicts | Overlapping windows found by the auditor |
//! | Room Occupancy | Exams per room, mean enrolled/capacity in percent |
//! | Proctor Load | Exams and supervised hours per proctor |
//! | Load Spread | Max minus min proctor exam count |
//! | Busiest Slot | Most rooms in use during any single slot |
//! | Exam Days | Distinct dates carrying at least one exam |

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::audit::{audit, count_conflicts, ConflictKind};
use crate::models::{Catalogue, Schedule, TimeSlot};

/// Usage of one room across the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOccupancy {
    pub room_id: String,
    /// Exams hosted.
    pub exams: usize,
    /// Mean of enrolled/capacity over hosted exams, in percent (0 when idle).
    pub avg_fill_rate: f64,
}

/// Supervision load of one proctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProctorLoad {
    pub proctor_id: String,
    /// Exams supervised.
    pub exams: usize,
    /// Supervised time in hours.
    pub hours: f64,
}

/// Exam session performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Modules with an assignment.
    pub placed: usize,
    /// Modules reported unplaced.
    pub unplaced: usize,
    /// Fraction of modules placed (0.0..1.0); 1.0 when there was nothing to place.
    pub placement_rate: f64,
    /// Overlapping room bookings.
    pub room_conflicts: usize,
    /// Overlapping proctor duties.
    pub proctor_conflicts: usize,
    /// One entry per catalogue room, in catalogue order.
    pub rooms: Vec<RoomOccupancy>,
    /// One entry per catalogue proctor, in catalogue order.
    pub proctors: Vec<ProctorLoad>,
    /// Max minus min proctor exam count (0 without proctors).
    pub load_spread: usize,
    /// Exams per department; modules without a department are not counted.
    pub exams_by_department: BTreeMap<String, usize>,
    /// Most rooms in use during one slot.
    pub busiest_slot_rooms: usize,
    /// Distinct dates with at least one exam.
    pub exam_days: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its catalogue.
    ///
    /// # Arguments
    /// * `schedule` - The committed schedule.
    /// * `catalogue` - The catalogue it was built from (capacities, enrollments, staff).
    pub fn calculate(schedule: &Schedule, catalogue: &Catalogue) -> Self {
        let placed = schedule.assignment_count();
        let unplaced = schedule.failure_count();
        let placement_rate = if placed + unplaced == 0 {
            1.0
        } else {
            placed as f64 / (placed + unplaced) as f64
        };

        let conflicts = audit(&schedule.assignments);

        // room -> (exams, sum of fill percentages)
        let mut room_usage: HashMap<&str, (usize, f64)> = HashMap::new();
        let mut proctor_usage: HashMap<&str, (usize, u32)> = HashMap::new();
        let mut exams_by_department: BTreeMap<String, usize> = BTreeMap::new();
        let mut slot_rooms: HashMap<TimeSlot, HashSet<&str>> = HashMap::new();
        let mut days = BTreeSet::new();

        for a in &schedule.assignments {
            let fill = match catalogue.room(&a.room_id) {
                Some(room) if room.capacity > 0 => {
                    100.0 * catalogue.enrolled_count(&a.module_id) as f64 / room.capacity as f64
                }
                _ => 0.0,
            };
            let usage = room_usage.entry(a.room_id.as_str()).or_insert((0, 0.0));
            usage.0 += 1;
            usage.1 += fill;

            let duty = proctor_usage.entry(a.proctor_id.as_str()).or_insert((0, 0));
            duty.0 += 1;
            duty.1 += a.duration_minutes;

            if let Some(dept) = &a.department_id {
                *exams_by_department.entry(dept.clone()).or_insert(0) += 1;
            }
            slot_rooms.entry(a.slot).or_default().insert(a.room_id.as_str());
            days.insert(a.date());
        }

        let rooms: Vec<RoomOccupancy> = catalogue
            .rooms
            .iter()
            .map(|room| {
                let (exams, fill_sum) = room_usage.get(room.id.as_str()).copied().unwrap_or((0, 0.0));
                RoomOccupancy {
                    room_id: room.id.clone(),
                    exams,
                    avg_fill_rate: if exams == 0 { 0.0 } else { fill_sum / exams as f64 },
                }
            })
            .collect();

        let proctors: Vec<ProctorLoad> = catalogue
            .proctors
            .iter()
            .map(|p| {
                let (exams, minutes) = proctor_usage.get(p.id.as_str()).copied().unwrap_or((0, 0));
                ProctorLoad {
                    proctor_id: p.id.clone(),
                    exams,
                    hours: f64::from(minutes) / 60.0,
                }
            })
            .collect();

        let max_load = proctors.iter().map(|p| p.exams).max().unwrap_or(0);
        let min_load = proctors.iter().map(|p| p.exams).min().unwrap_or(0);

        Self {
            placed,
            unplaced,
            placement_rate,
            room_conflicts: count_conflicts(&conflicts, ConflictKind::Room),
            proctor_conflicts: count_conflicts(&conflicts, ConflictKind::Proctor),
            rooms,
            proctors,
            load_spread: max_load - min_load,
            exams_by_department,
            busiest_slot_rooms: slot_rooms.values().map(HashSet::len).max().unwrap_or(0),
            exam_days: days.len(),
        }
    }

    /// Mean fill rate over rooms that hosted at least one exam, in percent.
    pub fn avg_fill_rate(&self) -> f64 {
        let used: Vec<f64> = self
            .rooms
            .iter()
            .filter(|r| r.exams > 0)
            .map(|r| r.avg_fill_rate)
            .collect();
        if used.is_empty() {
            0.0
        } else {
            used.iter().sum::<f64>() / used.len() as f64
        }
    }

    /// Total conflicts of both classes.
    pub fn total_conflicts(&self) -> usize {
        self.room_conflicts + self.proctor_conflicts
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_placement_rate: f64, max_load_spread: usize) -> bool {
        self.total_conflicts() == 0
            && self.placement_rate >= min_placement_rate
            && self.load_spread <= max_load_spread
    }
}
