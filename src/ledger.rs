use crate::grid::Grid;
use std::collections::HashSet;

/// Cross-section record of which rooms and teachers are booked at each
/// (day, slot). `None` resources are never tracked and are always free.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    rooms: HashSet<(String, usize, usize)>,
    teachers: HashSet<(String, usize, usize)>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger of every room and teacher referenced by a booking in `grid`.
    pub fn from_grid(grid: &Grid) -> Self {
        let mut ledger = Self::new();
        for (_, day, slot, entry) in grid.entries() {
            if let Some(b) = entry.booking() {
                ledger.reserve(b.room.as_deref(), b.teacher.as_deref(), day, slot);
            }
        }
        ledger
    }

    pub fn room_free(&self, room: Option<&str>, day: usize, slot: usize) -> bool {
        room.is_none_or(|r| !self.rooms.contains(&(r.to_string(), day, slot)))
    }

    pub fn teacher_free(&self, teacher: Option<&str>, day: usize, slot: usize) -> bool {
        teacher.is_none_or(|t| !self.teachers.contains(&(t.to_string(), day, slot)))
    }

    pub fn is_free(&self, room: Option<&str>, teacher: Option<&str>, day: usize, slot: usize) -> bool {
        self.room_free(room, day, slot) && self.teacher_free(teacher, day, slot)
    }

    pub fn reserve(&mut self, room: Option<&str>, teacher: Option<&str>, day: usize, slot: usize) {
        if let Some(r) = room {
            self.rooms.insert((r.to_string(), day, slot));
        }
        if let Some(t) = teacher {
            self.teachers.insert((t.to_string(), day, slot));
        }
    }

    pub fn release(&mut self, room: Option<&str>, teacher: Option<&str>, day: usize, slot: usize) {
        if let Some(r) = room {
            self.rooms.remove(&(r.to_string(), day, slot));
        }
        if let Some(t) = teacher {
            self.teachers.remove(&(t.to_string(), day, slot));
        }
    }
}
