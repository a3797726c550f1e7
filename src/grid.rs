//! The weekly grid: section -> day -> slot -> occupancy entries.
//!
//! Cells are addressed by indices into the configuration's section, day and
//! slot lists. A cell is *vacant* while it holds nothing but `Free` markers.

use crate::data::{BookingRow, Configuration, LUNCH_BREAK};
use crate::error::TimetableError;

pub const FREE: &str = "FREE";
pub const LUNCH: &str = "LUNCH";
pub const WORKSHOP: &str = "Workshop";
pub const UNSCHEDULED_SUFFIX: &str = "-UNSCHED";

/// Subject plus the resources it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub subject: String,
    pub room: Option<String>,
    pub teacher: Option<String>,
}

impl Booking {
    pub fn new(subject: impl Into<String>, room: Option<String>, teacher: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            room,
            teacher,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Lunch,
    Workshop,
    Theory(Booking),
    Lab { booking: Booking, group: String },
    /// A lab session that could not be placed anywhere.
    Unscheduled { lab: String, group: String },
}

impl Occupancy {
    pub fn subject(&self) -> &str {
        match self {
            Occupancy::Free => FREE,
            Occupancy::Lunch => LUNCH,
            Occupancy::Workshop => WORKSHOP,
            Occupancy::Theory(b) | Occupancy::Lab { booking: b, .. } => &b.subject,
            Occupancy::Unscheduled { lab, .. } => lab,
        }
    }

    /// The subject as it appears in output rows; unplaced labs carry the
    /// unscheduled suffix.
    pub fn label(&self) -> String {
        match self {
            Occupancy::Unscheduled { lab, .. } => format!("{lab}{UNSCHEDULED_SUFFIX}"),
            other => other.subject().to_string(),
        }
    }

    pub fn booking(&self) -> Option<&Booking> {
        match self {
            Occupancy::Theory(b) | Occupancy::Lab { booking: b, .. } => Some(b),
            _ => None,
        }
    }

    /// Lab entries, placed or not; these are kept across theory passes.
    pub fn is_lab_like(&self) -> bool {
        matches!(self, Occupancy::Lab { .. } | Occupancy::Unscheduled { .. })
    }

    pub fn theory_subject(&self) -> Option<&str> {
        match self {
            Occupancy::Theory(b) => Some(&b.subject),
            _ => None,
        }
    }

    fn to_row(&self, section: &str, day: &str, slot: &str) -> Option<BookingRow> {
        let (subject, room, teacher, group) = match self {
            Occupancy::Free | Occupancy::Lunch => return None,
            Occupancy::Workshop => (WORKSHOP.to_string(), None, None, None),
            Occupancy::Theory(b) => (b.subject.clone(), b.room.clone(), b.teacher.clone(), None),
            Occupancy::Lab { booking, group } => (
                booking.subject.clone(),
                booking.room.clone(),
                booking.teacher.clone(),
                Some(group.clone()),
            ),
            Occupancy::Unscheduled { group, .. } => (self.label(), None, None, Some(group.clone())),
        };
        Some(BookingRow {
            section: section.to_string(),
            day: day.to_string(),
            slot: slot.to_string(),
            subject,
            room,
            teacher,
            group,
            moved_from: None,
            moved: None,
        })
    }

    /// Inverse of the row conversion, used when a caller hands a grid back.
    pub fn from_row(row: &BookingRow) -> Self {
        match &row.group {
            Some(group) => match row.subject.strip_suffix(UNSCHEDULED_SUFFIX) {
                Some(lab) => Occupancy::Unscheduled {
                    lab: lab.to_string(),
                    group: group.clone(),
                },
                None => Occupancy::Lab {
                    booking: Booking::new(&row.subject, row.room.clone(), row.teacher.clone()),
                    group: group.clone(),
                },
            },
            None if row.subject == WORKSHOP => Occupancy::Workshop,
            None => Occupancy::Theory(Booking::new(
                &row.subject,
                row.room.clone(),
                row.teacher.clone(),
            )),
        }
    }
}

pub type Cell = Vec<Occupancy>;

pub fn is_vacant(cell: &[Occupancy]) -> bool {
    cell.iter().all(|e| *e == Occupancy::Free)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    sections: Vec<String>,
    days: Vec<String>,
    slots: Vec<String>,
    cells: Vec<Vec<Vec<Cell>>>,
}

impl Grid {
    /// Empty grid with the lunch marker in every lunch cell.
    pub fn new(config: &Configuration) -> Self {
        let day_row: Vec<Cell> = config
            .slots
            .iter()
            .map(|slot| {
                if slot == LUNCH_BREAK {
                    vec![Occupancy::Lunch]
                } else {
                    Vec::new()
                }
            })
            .collect();
        let section_week = vec![day_row; config.days.len()];
        Self {
            sections: config.sections.iter().map(|s| s.name.clone()).collect(),
            days: config.days.clone(),
            slots: config.slots.clone(),
            cells: vec![section_week; config.sections.len()],
        }
    }

    /// Rebuilds a grid from booking rows previously produced for `config`.
    pub fn from_rows(config: &Configuration, rows: &[BookingRow]) -> Result<Self, TimetableError> {
        let mut grid = Self::new(config);
        for row in rows {
            let sec = grid
                .section_index(&row.section)
                .ok_or_else(|| TimetableError::UnknownSection(row.section.clone()))?;
            let day = grid
                .day_index(&row.day)
                .ok_or_else(|| TimetableError::UnknownDay(row.day.clone()))?;
            let slot = grid
                .slot_index(&row.slot)
                .ok_or_else(|| TimetableError::UnknownSlot(row.slot.clone()))?;
            if grid.is_lunch(slot) {
                continue;
            }
            grid.cell_mut(sec, day, slot).push(Occupancy::from_row(row));
        }
        grid.fill_free();
        Ok(grid)
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s == name)
    }

    pub fn day_index(&self, name: &str) -> Option<usize> {
        self.days.iter().position(|d| d == name)
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| s == name)
    }

    pub fn is_lunch(&self, slot: usize) -> bool {
        self.slots[slot] == LUNCH_BREAK
    }

    /// Indices of all non-lunch slots, in order.
    pub fn teaching_slots(&self) -> Vec<usize> {
        (0..self.slots.len()).filter(|&s| !self.is_lunch(s)).collect()
    }

    pub fn cell(&self, section: usize, day: usize, slot: usize) -> &Cell {
        &self.cells[section][day][slot]
    }

    pub fn cell_mut(&mut self, section: usize, day: usize, slot: usize) -> &mut Cell {
        &mut self.cells[section][day][slot]
    }

    /// Every (section, day, slot, entry) in row order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, usize, &Occupancy)> + '_ {
        self.cells.iter().enumerate().flat_map(|(sec, week)| {
            week.iter().enumerate().flat_map(move |(day, slots)| {
                slots
                    .iter()
                    .enumerate()
                    .flat_map(move |(slot, cell)| cell.iter().map(move |e| (sec, day, slot, e)))
            })
        })
    }

    /// Drops everything but lab entries from the teaching cells.
    pub fn strip_theory(&mut self) {
        let teaching = self.teaching_slots();
        for week in &mut self.cells {
            for day in week.iter_mut() {
                for &slot in &teaching {
                    day[slot].retain(Occupancy::is_lab_like);
                }
            }
        }
    }

    /// Marks every vacant teaching cell explicitly `Free`.
    pub fn fill_free(&mut self) {
        let teaching = self.teaching_slots();
        for week in &mut self.cells {
            for day in week.iter_mut() {
                for &slot in &teaching {
                    if is_vacant(&day[slot]) {
                        day[slot] = vec![Occupancy::Free];
                    }
                }
            }
        }
    }

    pub fn to_rows(&self) -> Vec<BookingRow> {
        self.entries()
            .filter_map(|(sec, day, slot, entry)| {
                entry.to_row(&self.sections[sec], &self.days[day], &self.slots[slot])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Resources, Section};

    fn config() -> Configuration {
        Configuration {
            sections: vec![Section {
                name: "S1".into(),
                student_count: 30,
                subjects: vec![],
                lab_subjects: vec![],
            }],
            rooms: vec![],
            days: vec!["Mon".into(), "Tue".into()],
            slots: vec!["P1".into(), LUNCH_BREAK.into(), "P2".into()],
            resources: Resources::default(),
        }
    }

    #[test]
    fn test_new_grid_has_lunch_cells() {
        let grid = Grid::new(&config());
        assert_eq!(grid.cell(0, 1, 1), &vec![Occupancy::Lunch]);
        assert!(grid.cell(0, 0, 0).is_empty());
        assert_eq!(grid.teaching_slots(), vec![0, 2]);
    }

    #[test]
    fn test_row_parsing_variants() {
        let rows = vec![
            BookingRow {
                section: "S1".into(),
                day: "Mon".into(),
                slot: "P1".into(),
                subject: "Chem Lab-UNSCHED".into(),
                room: None,
                teacher: None,
                group: Some("A1".into()),
                moved_from: None,
                moved: None,
            },
            BookingRow {
                section: "S1".into(),
                day: "Tue".into(),
                slot: "P2".into(),
                subject: WORKSHOP.into(),
                room: None,
                teacher: None,
                group: None,
                moved_from: None,
                moved: None,
            },
        ];
        let grid = Grid::from_rows(&config(), &rows).unwrap();
        assert_eq!(
            grid.cell(0, 0, 0),
            &vec![Occupancy::Unscheduled { lab: "Chem Lab".into(), group: "A1".into() }]
        );
        assert_eq!(grid.cell(0, 1, 2), &vec![Occupancy::Workshop]);
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let row = BookingRow {
            section: "Nope".into(),
            day: "Mon".into(),
            slot: "P1".into(),
            subject: "Maths".into(),
            room: None,
            teacher: None,
            group: None,
            moved_from: None,
            moved: None,
        };
        let err = Grid::from_rows(&config(), &[row]).unwrap_err();
        assert!(matches!(err, TimetableError::UnknownSection(s) if s == "Nope"));
    }

    #[test]
    fn test_strip_theory_keeps_labs() {
        let mut grid = Grid::new(&config());
        grid.cell_mut(0, 0, 0)
            .push(Occupancy::Theory(Booking::new("Maths", None, None)));
        grid.cell_mut(0, 0, 2).push(Occupancy::Lab {
            booking: Booking::new("Chem Lab", Some("L1".into()), None),
            group: "A1".into(),
        });
        grid.strip_theory();
        grid.fill_free();
        assert_eq!(grid.cell(0, 0, 0), &vec![Occupancy::Free]);
        assert!(grid.cell(0, 0, 2)[0].is_lab_like());
        assert_eq!(grid.cell(0, 0, 1), &vec![Occupancy::Lunch]);
    }
}
