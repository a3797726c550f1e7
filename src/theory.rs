//! Single-period theory lectures.
//!
//! Subjects are placed section by section, busiest subject first, always on
//! the least loaded day that still has room under the per-day caps. When a
//! subject gets stuck, a [`SwapRescue`] may shuffle an existing lecture to
//! open space.

use crate::data::{Configuration, Constraints, Unfulfilled};
use crate::fixed::FixedAssignments;
use crate::grid::{Booking, Grid, Occupancy, is_vacant};
use crate::ledger::ResourceLedger;
use itertools::Itertools;
use log::{debug, info, trace};
use std::collections::HashMap;

/// Mutable view of one theory pass.
pub struct TheoryState<'a> {
    config: &'a Configuration,
    grid: &'a mut Grid,
    ledger: ResourceLedger,
    constraints: Constraints,
    teaching: Vec<usize>,
    // [section][day]
    per_subject: Vec<Vec<HashMap<String, u32>>>,
    per_day: Vec<Vec<u32>>,
}

impl<'a> TheoryState<'a> {
    fn new(config: &'a Configuration, grid: &'a mut Grid, constraints: Constraints) -> Self {
        let ledger = ResourceLedger::from_grid(grid);
        let teaching = grid.teaching_slots();
        let days = config.days.len();
        let sections = config.sections.len();
        Self {
            config,
            grid,
            ledger,
            constraints,
            teaching,
            per_subject: vec![vec![HashMap::new(); days]; sections],
            per_day: vec![vec![0; days]; sections],
        }
    }

    fn subject_count(&self, section: usize, day: usize, subject: &str) -> u32 {
        self.per_subject[section][day].get(subject).copied().unwrap_or(0)
    }

    fn day_has_capacity(&self, section: usize, day: usize, subject: &str) -> bool {
        self.subject_count(section, day, subject) < self.constraints.max_lectures_per_subject_per_day
            && self.per_day[section][day] < self.constraints.max_lectures_per_day_section
    }

    /// Whether a teaching slot next to `pos` (other than `ignore`) already
    /// holds `subject`.
    fn next_to_same(
        &self,
        section: usize,
        day: usize,
        pos: usize,
        subject: &str,
        ignore: Option<usize>,
    ) -> bool {
        let neighbours = [pos.checked_sub(1), Some(pos + 1)];
        neighbours
            .into_iter()
            .flatten()
            .filter_map(|p| self.teaching.get(p).copied())
            .filter(|&slot| Some(slot) != ignore)
            .any(|slot| {
                self.grid
                    .cell(section, day, slot)
                    .iter()
                    .any(|e| e.theory_subject() == Some(subject))
            })
    }

    /// Every check a lecture must pass to occupy the slot at `pos`.
    fn slot_accepts(
        &self,
        section: usize,
        day: usize,
        pos: usize,
        booking: &Booking,
        ignore: Option<usize>,
    ) -> bool {
        let slot = self.teaching[pos];
        is_vacant(self.grid.cell(section, day, slot))
            && !self.config.teacher_unavailable(
                booking.teacher.as_deref(),
                &self.config.days[day],
                &self.config.slots[slot],
            )
            && !self.next_to_same(section, day, pos, &booking.subject, ignore)
            && self
                .ledger
                .is_free(booking.room.as_deref(), booking.teacher.as_deref(), day, slot)
    }

    fn book(&mut self, section: usize, day: usize, slot: usize, booking: Booking) {
        self.ledger
            .reserve(booking.room.as_deref(), booking.teacher.as_deref(), day, slot);
        *self.per_subject[section][day]
            .entry(booking.subject.clone())
            .or_insert(0) += 1;
        self.per_day[section][day] += 1;
        let cell = self.grid.cell_mut(section, day, slot);
        cell.retain(|e| *e != Occupancy::Free);
        cell.push(Occupancy::Theory(booking));
    }

    fn unbook(&mut self, section: usize, day: usize, slot: usize) -> Option<Booking> {
        let cell = self.grid.cell_mut(section, day, slot);
        let pos = cell.iter().position(|e| e.theory_subject().is_some())?;
        let Occupancy::Theory(booking) = cell.remove(pos) else {
            return None;
        };
        self.ledger
            .release(booking.room.as_deref(), booking.teacher.as_deref(), day, slot);
        if let Some(n) = self.per_subject[section][day].get_mut(&booking.subject) {
            *n = n.saturating_sub(1);
        }
        self.per_day[section][day] = self.per_day[section][day].saturating_sub(1);
        Some(booking)
    }

    /// Places one lecture on the least loaded eligible day.
    fn place(&mut self, section: usize, booking: &Booking) -> bool {
        let days: Vec<usize> = (0..self.config.days.len())
            .sorted_by_key(|&d| self.per_day[section][d])
            .collect();
        for day in days {
            if !self.day_has_capacity(section, day, &booking.subject) {
                continue;
            }
            let found = (0..self.teaching.len())
                .find(|&pos| self.slot_accepts(section, day, pos, booking, None));
            if let Some(pos) = found {
                let slot = self.teaching[pos];
                trace!(
                    "{} -> {} {} {}",
                    booking.subject,
                    self.config.sections[section].name,
                    self.config.days[day],
                    self.config.slots[slot]
                );
                self.book(section, day, slot, booking.clone());
                return true;
            }
        }
        false
    }

    fn week_count(&self, section: usize, subject: &str) -> usize {
        (0..self.config.days.len())
            .flat_map(|day| self.teaching.iter().map(move |&slot| (day, slot)))
            .filter(|&(day, slot)| {
                self.grid
                    .cell(section, day, slot)
                    .iter()
                    .any(|e| e.theory_subject() == Some(subject))
            })
            .count()
    }
}

/// Last-resort repair when a subject cannot be placed directly.
///
/// A `true` result is counted as one delivered lecture for `subject` without
/// re-checking; implementations only promise that they changed the grid.
pub trait SwapRescue {
    fn rescue(&self, state: &mut TheoryState<'_>, section: usize, subject: &str) -> bool;
}

/// Moves one lecture of a subject that appears more than once this week into
/// another vacant cell of the same section.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelocateRepeated;

impl SwapRescue for RelocateRepeated {
    fn rescue(&self, state: &mut TheoryState<'_>, section: usize, subject: &str) -> bool {
        let days = state.config.days.len();
        let cells: Vec<(usize, usize)> = (0..days)
            .flat_map(|day| (0..state.teaching.len()).map(move |pos| (day, pos)))
            .collect();

        for &(day, pos) in &cells {
            let slot = state.teaching[pos];
            let cell = state.grid.cell(section, day, slot);
            let [Occupancy::Theory(booking)] = cell.as_slice() else {
                continue;
            };
            if booking.subject == subject || state.week_count(section, &booking.subject) <= 1 {
                continue;
            }
            let booking = booking.clone();

            for &(to_day, to_pos) in &cells {
                if (to_day, to_pos) == (day, pos) {
                    continue;
                }
                if to_day != day && !state.day_has_capacity(section, to_day, &booking.subject) {
                    continue;
                }
                let ignore = (to_day == day).then_some(slot);
                if !state.slot_accepts(section, to_day, to_pos, &booking, ignore) {
                    continue;
                }
                let to_slot = state.teaching[to_pos];
                if let Some(moved) = state.unbook(section, day, slot) {
                    debug!(
                        "Relocated {} for {} from {} {} to {} {} to make room for {}",
                        moved.subject,
                        state.config.sections[section].name,
                        state.config.days[day],
                        state.config.slots[slot],
                        state.config.days[to_day],
                        state.config.slots[to_slot],
                        subject
                    );
                    state.book(section, to_day, to_slot, moved);
                    return true;
                }
            }
        }
        false
    }
}

/// One theory pass over a grid that already holds its lab entries.
///
/// Vacant teaching cells are marked `Free` afterwards. Returns the remaining
/// shortfall per section and subject.
pub fn schedule_theory(
    config: &Configuration,
    fixed: &FixedAssignments,
    grid: &mut Grid,
    constraints: &Constraints,
    rescue: &dyn SwapRescue,
) -> Unfulfilled {
    info!(
        "Scheduling theory for {} sections (max {}/subject/day, {}/day)",
        config.sections.len(),
        constraints.max_lectures_per_subject_per_day,
        constraints.max_lectures_per_day_section
    );
    let mut state = TheoryState::new(config, grid, constraints.clone());
    let max_attempts = config.days.len() * state.teaching.len() * 3;
    let mut unfulfilled = Unfulfilled::new();

    for (section, sec) in config.sections.iter().enumerate() {
        let subjects: Vec<(&String, u32)> = sec
            .subjects
            .iter()
            .unique()
            .map(|s| (s, config.lecture_requirement(s)))
            .sorted_by_key(|&(_, req)| std::cmp::Reverse(req))
            .collect();

        for (subject, mut remaining) in subjects {
            let booking = Booking::new(
                subject,
                fixed.room(section).map(str::to_string),
                fixed.teacher(&sec.name, subject).map(str::to_string),
            );
            let mut attempts = 0;
            while remaining > 0 && attempts < max_attempts {
                attempts += 1;
                if state.place(section, &booking) || rescue.rescue(&mut state, section, subject) {
                    remaining -= 1;
                } else {
                    break;
                }
            }
            if remaining > 0 {
                debug!("{}: {} lecture(s) of {} left unplaced", sec.name, remaining, subject);
                unfulfilled
                    .entry(sec.name.clone())
                    .or_default()
                    .insert(subject.clone(), remaining);
            }
        }
    }

    state.grid.fill_free();
    unfulfilled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DaySlot, LUNCH_BREAK, Resources, Section, TeacherList};

    fn config(subjects: &[&str], days: &[&str], slots: &[&str]) -> Configuration {
        Configuration {
            sections: vec![Section {
                name: "S1".into(),
                student_count: 30,
                subjects: subjects.iter().map(|s| s.to_string()).collect(),
                lab_subjects: vec![],
            }],
            rooms: vec![],
            days: days.iter().map(|s| s.to_string()).collect(),
            slots: slots.iter().map(|s| s.to_string()).collect(),
            resources: Resources::default(),
        }
    }

    fn run(config: &Configuration) -> (Grid, Unfulfilled) {
        let fixed = FixedAssignments::derive(config);
        let mut grid = Grid::new(config);
        let unfulfilled = schedule_theory(
            config,
            &fixed,
            &mut grid,
            &config.resources.constraints,
            &RelocateRepeated,
        );
        (grid, unfulfilled)
    }

    fn subject_at(grid: &Grid, day: usize, slot: usize) -> &str {
        grid.cell(0, day, slot)[0].subject()
    }

    #[test]
    fn test_spreads_lectures_across_days() {
        let cfg = config(
            &["Maths"],
            &["Mon", "Tue", "Wed", "Thu", "Fri"],
            &["P1", "P2", LUNCH_BREAK, "P3", "P4"],
        );
        let (grid, unfulfilled) = run(&cfg);
        assert!(unfulfilled.is_empty());
        for day in 0..3 {
            assert_eq!(subject_at(&grid, day, 0), "Maths");
        }
        let free = grid
            .entries()
            .filter(|(_, _, _, e)| **e == Occupancy::Free)
            .count();
        assert_eq!(free, 17);
    }

    #[test]
    fn test_no_back_to_back_repeats() {
        let mut cfg = config(&["Maths"], &["Mon"], &["P1", "P2", "P3"]);
        cfg.resources.lecture_requirements.insert("Maths".into(), 2);
        let (grid, unfulfilled) = run(&cfg);
        assert!(unfulfilled.is_empty());
        assert_eq!(subject_at(&grid, 0, 0), "Maths");
        assert_eq!(grid.cell(0, 0, 1), &vec![Occupancy::Free]);
        assert_eq!(subject_at(&grid, 0, 2), "Maths");
    }

    #[test]
    fn test_daily_cap_limits_placement() {
        let mut cfg = config(&["Maths"], &["Mon", "Tue"], &["P1", "P2", "P3"]);
        cfg.resources.constraints.max_lectures_per_day_section = 1;
        let (_, unfulfilled) = run(&cfg);
        assert_eq!(unfulfilled["S1"]["Maths"], 1);
    }

    #[test]
    fn test_labs_block_theory_cells() {
        let cfg = config(&["Maths"], &["Mon"], &["P1", "P2"]);
        let fixed = FixedAssignments::derive(&cfg);
        let mut grid = Grid::new(&cfg);
        grid.cell_mut(0, 0, 0).push(Occupancy::Lab {
            booking: Booking::new("Chem", None, None),
            group: "A1".into(),
        });
        let unfulfilled = schedule_theory(&cfg, &fixed, &mut grid, &cfg.resources.constraints, &RelocateRepeated);
        assert_eq!(unfulfilled["S1"]["Maths"], 2);
        assert_eq!(subject_at(&grid, 0, 1), "Maths");
        assert_eq!(grid.cell(0, 0, 0).len(), 1);
    }

    #[test]
    fn test_room_shared_across_sections() {
        let mut cfg = config(&["Maths"], &["Mon"], &["P1", "P2"]);
        let mut second = cfg.sections[0].clone();
        second.name = "S2".into();
        cfg.sections.push(second);
        cfg.rooms = vec!["R1".into()];
        cfg.resources.lecture_requirements.insert("Maths".into(), 1);
        let (grid, unfulfilled) = run(&cfg);
        assert!(unfulfilled.is_empty());
        assert_eq!(grid.cell(0, 0, 0)[0].subject(), "Maths");
        assert_eq!(grid.cell(1, 0, 0), &vec![Occupancy::Free]);
        assert_eq!(grid.cell(1, 0, 1)[0].subject(), "Maths");
    }

    #[test]
    fn test_rescue_relocates_repeated_subject() {
        let mut cfg = config(&["Algebra", "Biology"], &["Mon"], &["P1", "P2", "P3", "P4"]);
        cfg.resources.lecture_requirements.insert("Algebra".into(), 2);
        cfg.resources.lecture_requirements.insert("Biology".into(), 1);
        cfg.resources
            .teachers
            .insert("Biology".into(), TeacherList::One("TB".into()));
        cfg.resources.teacher_unavailability.insert(
            "TB".into(),
            vec![
                DaySlot { day: "Mon".into(), slot: "P2".into() },
                DaySlot { day: "Mon".into(), slot: "P4".into() },
            ],
        );
        let (grid, unfulfilled) = run(&cfg);
        // Algebra took P1 and P3; the rescue moved P3 to P4 and credited Biology
        assert!(unfulfilled.is_empty());
        assert_eq!(subject_at(&grid, 0, 0), "Algebra");
        assert_eq!(grid.cell(0, 0, 2), &vec![Occupancy::Free]);
        assert_eq!(subject_at(&grid, 0, 3), "Algebra");
    }
}
