//! Local repair after a teacher becomes unavailable at one (day, slot).
//!
//! The teacher's bookings at that cell are dropped. Each section left with an
//! empty cell tries to pull a lecture forward from later the same day; if
//! nothing can move, the cell gets a workshop placeholder instead.

use crate::data::{BookingRow, Configuration, LUNCH_BREAK};
use crate::error::TimetableError;
use crate::grid::{Grid, Occupancy};
use crate::ledger::ResourceLedger;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepairOutcome {
    Moved { from: String },
    Placeholder,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReplanResult {
    pub timetable: Vec<BookingRow>,
    pub repairs: BTreeMap<String, RepairOutcome>,
}

/// Later slots of the day worth pulling a lecture from, best first: the last
/// slot before lunch, the last slot of the day, then the rest right to left.
pub fn candidate_slots(slots: &[String], freed: usize) -> Vec<usize> {
    if slots.is_empty() {
        return Vec::new();
    }
    let last = slots.len() - 1;
    let (before_lunch, end_of_day) = match slots.iter().position(|s| s == LUNCH_BREAK) {
        Some(lunch) => (lunch.checked_sub(1), (last > lunch).then_some(last)),
        None => (Some(last.saturating_sub(1)), Some(last)),
    };

    let mut ordered: Vec<usize> = [before_lunch, end_of_day]
        .into_iter()
        .flatten()
        .filter(|&i| i > freed)
        .collect();
    for i in (freed + 1..slots.len()).rev() {
        if slots[i] != LUNCH_BREAK && !ordered.contains(&i) {
            ordered.push(i);
        }
    }
    ordered.dedup();
    ordered
}

struct Replanner<'a> {
    config: &'a Configuration,
    grid: &'a mut Grid,
    ledger: ResourceLedger,
    /// The invalidated teacher; never moved back into the freed slot.
    teacher: &'a str,
    day: usize,
    slot: usize,
}

impl Replanner<'_> {
    fn repair(&mut self, section: usize, candidates: &[usize]) -> Result<RepairOutcome, String> {
        let (day, slot) = (self.day, self.slot);
        let (day_name, slot_name) = (&self.config.days[day], &self.config.slots[slot]);
        for &from in candidates {
            let [Occupancy::Theory(booking)] = self.grid.cell(section, day, from).as_slice() else {
                continue;
            };
            let teacher = booking.teacher.as_deref();
            if teacher == Some(self.teacher)
                || self.config.teacher_unavailable(teacher, day_name, slot_name)
                || !self.ledger.is_free(booking.room.as_deref(), teacher, day, slot)
            {
                continue;
            }

            let entries = std::mem::replace(self.grid.cell_mut(section, day, from), vec![Occupancy::Free]);
            let Some(Occupancy::Theory(booking)) = entries.into_iter().next() else {
                return Err(format!("slot {} changed during repair", self.config.slots[from]));
            };
            self.ledger
                .release(booking.room.as_deref(), booking.teacher.as_deref(), day, from);
            self.ledger
                .reserve(booking.room.as_deref(), booking.teacher.as_deref(), day, slot);
            debug!(
                "Moved {} for {} from {} to {}",
                booking.subject,
                self.grid.sections()[section],
                self.config.slots[from],
                self.config.slots[slot]
            );
            *self.grid.cell_mut(section, day, slot) = vec![Occupancy::Theory(booking)];
            return Ok(RepairOutcome::Moved {
                from: self.config.slots[from].clone(),
            });
        }

        *self.grid.cell_mut(section, day, slot) = vec![Occupancy::Workshop];
        Ok(RepairOutcome::Placeholder)
    }
}

/// Removes `teacher`'s bookings at (`day`, `slot`) and repairs every section
/// that was left with an empty cell.
pub fn invalidate_teacher(
    config: &Configuration,
    grid: &mut Grid,
    teacher: &str,
    day: &str,
    slot: &str,
) -> Result<ReplanResult, TimetableError> {
    let d = grid
        .day_index(day)
        .ok_or_else(|| TimetableError::UnknownDay(day.to_string()))?;
    let s = grid
        .slot_index(slot)
        .ok_or_else(|| TimetableError::UnknownSlot(slot.to_string()))?;

    let mut freed = Vec::new();
    for section in 0..grid.sections().len() {
        let cell = grid.cell_mut(section, d, s);
        let before = cell.len();
        cell.retain(|e| e.booking().and_then(|b| b.teacher.as_deref()) != Some(teacher));
        if cell.len() != before && cell.is_empty() {
            cell.push(Occupancy::Free);
            freed.push(section);
        }
    }
    info!(
        "Invalidated {} at {} {}: {} section(s) freed",
        teacher,
        day,
        slot,
        freed.len()
    );

    let candidates = candidate_slots(grid.slots(), s);
    let mut replanner = Replanner {
        config,
        ledger: ResourceLedger::from_grid(grid),
        grid: &mut *grid,
        teacher,
        day: d,
        slot: s,
    };

    let mut repairs = BTreeMap::new();
    let mut moved: HashMap<usize, String> = HashMap::new();
    for section in freed {
        let outcome = match replanner.repair(section, &candidates) {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!("Repair failed for {}: {}", replanner.grid.sections()[section], reason);
                *replanner.grid.cell_mut(section, d, s) = vec![Occupancy::Workshop];
                RepairOutcome::Failed { reason }
            }
        };
        if let RepairOutcome::Moved { from } = &outcome {
            moved.insert(section, from.clone());
        }
        repairs.insert(replanner.grid.sections()[section].clone(), outcome);
    }

    let mut timetable = grid.to_rows();
    for row in &mut timetable {
        if row.day != day || row.slot != slot {
            continue;
        }
        let from = grid.section_index(&row.section).and_then(|i| moved.get(&i));
        if let Some(from) = from {
            row.moved_from = Some(from.clone());
            row.moved = Some(true);
        }
    }
    Ok(ReplanResult { timetable, repairs })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_candidates_with_lunch() {
        let s = slots(&["P1", "P2", "P3", LUNCH_BREAK, "P4", "P5"]);
        assert_eq!(candidate_slots(&s, 0), vec![2, 5, 4, 1]);
        assert_eq!(candidate_slots(&s, 4), vec![5]);
        assert!(candidate_slots(&s, 5).is_empty());
    }

    #[test]
    fn test_candidates_without_lunch() {
        let s = slots(&["P1", "P2", "P3", "P4"]);
        assert_eq!(candidate_slots(&s, 0), vec![2, 3, 1]);
        assert_eq!(candidate_slots(&s, 2), vec![3]);
    }
}
