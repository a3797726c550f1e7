use crate::data::Statistics;
use crate::grid::{Grid, Occupancy};

/// Usage figures for a finished grid. `total_classes` comes from the request
/// since the grid only knows flattened sections.
pub fn calculate(grid: &Grid, total_classes: usize) -> Statistics {
    let mut stats = Statistics {
        total_sections: grid.sections().len(),
        total_classes,
        total_slots_available: grid.sections().len() * grid.days().len() * grid.teaching_slots().len(),
        ..Default::default()
    };

    for (_, _, slot, entry) in grid.entries() {
        if grid.is_lunch(slot) || matches!(entry, Occupancy::Free | Occupancy::Lunch) {
            continue;
        }
        stats.total_slots_used += 1;
        *stats.subject_distribution.entry(entry.label()).or_insert(0) += 1;
        if let Some(booking) = entry.booking() {
            if let Some(teacher) = &booking.teacher {
                *stats.teacher_utilization.entry(teacher.clone()).or_insert(0) += 1;
            }
            if let Some(room) = &booking.room {
                *stats.room_utilization.entry(room.clone()).or_insert(0) += 1;
            }
        }
    }

    if stats.total_slots_available > 0 {
        stats.utilization_percentage =
            stats.total_slots_used as f64 / stats.total_slots_available as f64 * 100.0;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Configuration, LUNCH_BREAK, Resources, Section};
    use crate::grid::Booking;

    #[test]
    fn test_counts_bookings() {
        let config = Configuration {
            sections: vec![Section {
                name: "S1".into(),
                student_count: 10,
                subjects: vec![],
                lab_subjects: vec![],
            }],
            rooms: vec![],
            days: vec!["Mon".into()],
            slots: vec!["P1".into(), LUNCH_BREAK.into(), "P2".into(), "P3".into()],
            resources: Resources::default(),
        };
        let mut grid = Grid::new(&config);
        grid.cell_mut(0, 0, 0)
            .push(Occupancy::Theory(Booking::new("Maths", Some("R1".into()), Some("T1".into()))));
        grid.cell_mut(0, 0, 2).push(Occupancy::Workshop);
        grid.fill_free();

        let stats = calculate(&grid, 1);
        assert_eq!(stats.total_slots_available, 3);
        assert_eq!(stats.total_slots_used, 2);
        assert!((stats.utilization_percentage - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.teacher_utilization["T1"], 1);
        assert_eq!(stats.room_utilization["R1"], 1);
        assert_eq!(stats.subject_distribution["Workshop"], 1);
    }

    #[test]
    fn test_unscheduled_labs_are_not_counted_as_placed() {
        let config = Configuration {
            sections: vec![Section {
                name: "S1".into(),
                student_count: 90,
                subjects: vec![],
                lab_subjects: vec!["Chem".into()],
            }],
            rooms: vec![],
            days: vec!["Mon".into()],
            slots: vec!["P1".into(), "P2".into(), "P3".into()],
            resources: Resources::default(),
        };
        let mut grid = Grid::new(&config);
        for slot in [0, 1] {
            grid.cell_mut(0, 0, slot).push(Occupancy::Lab {
                booking: Booking::new("Chem", Some("L1".into()), None),
                group: "A1".into(),
            });
        }
        for group in ["A2", "A3"] {
            grid.cell_mut(0, 0, 2).push(Occupancy::Unscheduled {
                lab: "Chem".into(),
                group: group.into(),
            });
        }

        let stats = calculate(&grid, 1);
        assert_eq!(stats.subject_distribution["Chem"], 2);
        assert_eq!(stats.subject_distribution["Chem-UNSCHED"], 2);
        assert_eq!(stats.room_utilization["L1"], 2);
    }
}
