//! Human-readable explanations for lecture demand that could not be placed.

use crate::data::{Configuration, Suggestions, Unfulfilled};
use crate::grid::{Grid, is_vacant};
use crate::ledger::ResourceLedger;
use std::collections::BTreeMap;

/// Why a shortfall happened, in the order the checks are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortfall {
    NoTeachers,
    TeacherCapacity {
        teachers: usize,
        available: usize,
        missing: usize,
    },
    DailyCaps { free_cells: usize },
    NoCapacity { free_cells: usize },
}

/// Classifies one section/subject shortfall against the finished grid.
pub fn classify(
    config: &Configuration,
    ledger: &ResourceLedger,
    free_cells: usize,
    subject: &str,
    shortfall: u32,
) -> Shortfall {
    let resources = &config.resources;
    let mut candidates = resources
        .teachers
        .get(subject)
        .map(|l| l.names())
        .unwrap_or_default();
    if candidates.is_empty() {
        candidates = resources
            .lab_teachers
            .get(subject)
            .map(|l| l.names())
            .unwrap_or_default();
    }
    if candidates.is_empty() {
        return Shortfall::NoTeachers;
    }

    let available: usize = candidates
        .iter()
        .map(|teacher| teacher_free_slots(config, ledger, teacher))
        .sum();
    let shortfall = shortfall as usize;
    if available < shortfall {
        Shortfall::TeacherCapacity {
            teachers: candidates.len(),
            available,
            missing: shortfall - available,
        }
    } else if free_cells >= shortfall {
        Shortfall::DailyCaps { free_cells }
    } else {
        Shortfall::NoCapacity { free_cells }
    }
}

/// Teaching cells in the week where `teacher` is neither booked nor
/// declared unavailable.
fn teacher_free_slots(config: &Configuration, ledger: &ResourceLedger, teacher: &str) -> usize {
    let teaching = config.teaching_slots();
    let mut free = 0;
    for (d, day) in config.days.iter().enumerate() {
        for (s, slot) in config.slots.iter().enumerate() {
            if !teaching.contains(&slot.as_str()) {
                continue;
            }
            if ledger.teacher_free(Some(teacher), d, s)
                && !config.teacher_unavailable(Some(teacher), day, slot)
            {
                free += 1;
            }
        }
    }
    free
}

fn free_cells(grid: &Grid, section: usize) -> usize {
    let teaching = grid.teaching_slots();
    (0..grid.days().len())
        .flat_map(|day| teaching.iter().map(move |&slot| (day, slot)))
        .filter(|&(day, slot)| is_vacant(grid.cell(section, day, slot)))
        .count()
}

fn describe(kind: Shortfall, section: &str, subject: &str, shortfall: u32) -> String {
    match kind {
        Shortfall::NoTeachers => format!(
            "- No teacher is configured for {subject}. Assign or hire at least {shortfall} qualified teacher(s), or allow cross-teaching."
        ),
        Shortfall::TeacherCapacity {
            teachers,
            available,
            missing,
        } => format!(
            "- {subject} has {teachers} teacher(s) with about {available} free slot(s) between them. Assign or hire at least {missing} more teacher(s), or reassign existing staff."
        ),
        Shortfall::DailyCaps { free_cells } => format!(
            "- {section} still has {free_cells} free slot(s), so the per-day limits are the likely cause. Consider raising max_lectures_per_subject_per_day or max_lectures_per_day_section."
        ),
        Shortfall::NoCapacity { free_cells } => format!(
            "- {section} has only {free_cells} free teaching slot(s) for {shortfall} missing lecture(s). Add teaching slots or days, spread labs more thinly, or add parallel rooms."
        ),
    }
}

/// Suggestions for every positive shortfall in `unfulfilled`.
pub fn suggest(config: &Configuration, grid: &Grid, unfulfilled: &Unfulfilled) -> Suggestions {
    let ledger = ResourceLedger::from_grid(grid);
    let mut suggestions = Suggestions::new();

    for (section, subjects) in unfulfilled {
        let Some(sec) = grid.section_index(section) else {
            continue;
        };
        let free = free_cells(grid, sec);
        let mut per_subject = BTreeMap::new();

        for (subject, &shortfall) in subjects {
            if shortfall == 0 {
                continue;
            }
            let kind = classify(config, &ledger, free, subject, shortfall);

            let mut msgs = vec![
                format!("Unfulfilled: need {shortfall} lecture(s) of {subject} for {section}."),
                describe(kind, section, subject, shortfall),
            ];
            if config.resources.lab_rooms.contains_key(&format!("{subject} LAB")) {
                msgs.push(
                    "- Lab rooms for this subject are limited. Consider another lab room or freeing some lab time.".to_string(),
                );
            }
            msgs.push(
                "- Other options: reduce group sizes, run some lectures as self-study, or defer less critical lectures to another week.".to_string(),
            );
            per_subject.insert(subject.clone(), msgs);
        }

        if !per_subject.is_empty() {
            suggestions.insert(section.clone(), per_subject);
        }
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DaySlot, Resources, Section, TeacherList};
    use crate::grid::{Booking, Occupancy};

    fn config() -> Configuration {
        Configuration {
            sections: vec![Section {
                name: "S1".into(),
                student_count: 30,
                subjects: vec!["Maths".into()],
                lab_subjects: vec![],
            }],
            rooms: vec![],
            days: vec!["Mon".into()],
            slots: vec!["P1".into(), "P2".into()],
            resources: Resources::default(),
        }
    }

    fn shortfall(n: u32) -> Unfulfilled {
        let mut u = Unfulfilled::new();
        u.entry("S1".into()).or_default().insert("Maths".into(), n);
        u
    }

    #[test]
    fn test_no_teachers() {
        let cfg = config();
        let grid = Grid::new(&cfg);
        assert_eq!(classify(&cfg, &ResourceLedger::new(), 2, "Maths", 1), Shortfall::NoTeachers);
        let s = suggest(&cfg, &grid, &shortfall(1));
        let msgs = &s["S1"]["Maths"];
        assert!(msgs[0].starts_with("Unfulfilled: need 1"));
        assert!(msgs[1].contains("No teacher is configured"));
        assert!(msgs.last().unwrap().contains("Other options"));
    }

    #[test]
    fn test_teacher_capacity() {
        let mut cfg = config();
        cfg.resources.teachers.insert("Maths".into(), TeacherList::One("T1".into()));
        cfg.resources.teacher_unavailability.insert(
            "T1".into(),
            vec![DaySlot { day: "Mon".into(), slot: "P2".into() }],
        );
        let mut grid = Grid::new(&cfg);
        grid.cell_mut(0, 0, 0)
            .push(Occupancy::Theory(Booking::new("Maths", None, Some("T1".into()))));
        let ledger = ResourceLedger::from_grid(&grid);
        assert_eq!(
            classify(&cfg, &ledger, 1, "Maths", 1),
            Shortfall::TeacherCapacity {
                teachers: 1,
                available: 0,
                missing: 1
            }
        );
    }

    #[test]
    fn test_teacher_capacity_counts_lab_teachers() {
        let mut cfg = config();
        cfg.resources
            .lab_teachers
            .insert("Maths".into(), TeacherList::Many(vec!["L1".into(), "L2".into()]));
        for teacher in ["L1", "L2"] {
            cfg.resources.teacher_unavailability.insert(
                teacher.into(),
                vec![
                    DaySlot { day: "Mon".into(), slot: "P1".into() },
                    DaySlot { day: "Mon".into(), slot: "P2".into() },
                ],
            );
        }
        let s = suggest(&cfg, &Grid::new(&cfg), &shortfall(1));
        let msgs = &s["S1"]["Maths"];
        assert!(msgs[1].contains("Maths has 2 teacher(s)"), "{msgs:?}");
        assert!(msgs[1].contains("at least 1 more teacher(s)"));
    }

    #[test]
    fn test_caps_versus_capacity() {
        let mut cfg = config();
        cfg.resources.teachers.insert("Maths".into(), TeacherList::One("T1".into()));
        let ledger = ResourceLedger::new();
        assert_eq!(classify(&cfg, &ledger, 2, "Maths", 2), Shortfall::DailyCaps { free_cells: 2 });
        assert_eq!(classify(&cfg, &ledger, 1, "Maths", 2), Shortfall::NoCapacity { free_cells: 1 });
    }

    #[test]
    fn test_lab_room_hint() {
        let mut cfg = config();
        cfg.resources.lab_rooms.insert("Maths LAB".into(), vec!["L1".into()]);
        let s = suggest(&cfg, &Grid::new(&cfg), &shortfall(2));
        assert!(s["S1"]["Maths"].iter().any(|m| m.contains("Lab rooms for this subject")));
    }
}
