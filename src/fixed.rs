//! Deterministic room and teacher mapping.
//!
//! Re-planning recomputes this mapping from the same configuration on a later
//! request, so it must depend on nothing but its inputs.

use crate::data::Configuration;
use std::collections::HashMap;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over `section`, a zero byte, then `subject`.
pub fn stable_hash(section: &str, subject: &str) -> u64 {
    section
        .bytes()
        .chain(std::iter::once(0u8))
        .chain(subject.bytes())
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixedAssignments {
    /// Indexed like `Configuration::sections`.
    rooms: Vec<Option<String>>,
    teachers: HashMap<(String, String), Option<String>>,
}

impl FixedAssignments {
    pub fn derive(config: &Configuration) -> Self {
        let rooms = (0..config.sections.len())
            .map(|i| {
                if config.rooms.is_empty() {
                    None
                } else {
                    Some(config.rooms[i % config.rooms.len()].clone())
                }
            })
            .collect();

        let mut teachers = HashMap::new();
        for section in &config.sections {
            for subject in section.subjects.iter().chain(&section.lab_subjects) {
                let candidates = teacher_candidates(config, subject);
                let teacher = if candidates.is_empty() {
                    None
                } else {
                    let idx = stable_hash(&section.name, subject) % candidates.len() as u64;
                    Some(candidates[idx as usize].clone())
                };
                teachers.insert((section.name.clone(), subject.clone()), teacher);
            }
        }

        Self { rooms, teachers }
    }

    pub fn room(&self, section: usize) -> Option<&str> {
        self.rooms.get(section).and_then(|r| r.as_deref())
    }

    pub fn teacher(&self, section: &str, subject: &str) -> Option<&str> {
        self.teachers
            .get(&(section.to_string(), subject.to_string()))
            .and_then(|t| t.as_deref())
    }
}

/// Lab teacher list for subjects that have one, theory list otherwise.
fn teacher_candidates(config: &Configuration, subject: &str) -> Vec<String> {
    let resources = &config.resources;
    let list = if config.is_lab_subject(subject) {
        resources.lab_teachers.get(subject)
    } else {
        resources.teachers.get(subject)
    };
    list.map(|l| l.names()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Resources, Section, TeacherList};

    fn config() -> Configuration {
        let mut resources = Resources::default();
        resources.teachers.insert(
            "Maths".into(),
            TeacherList::Many(vec!["Ada".into(), "".into(), "Bob".into(), "Cy".into()]),
        );
        resources
            .teachers
            .insert("Physics".into(), TeacherList::One("Dee".into()));
        resources
            .lab_teachers
            .insert("Physics".into(), TeacherList::Many(vec!["Eve".into()]));
        let section = |name: &str| Section {
            name: name.into(),
            student_count: 40,
            subjects: vec!["Maths".into(), "Art".into()],
            lab_subjects: vec!["Physics".into()],
        };
        Configuration {
            sections: vec![section("S1"), section("S2"), section("S3")],
            rooms: vec!["R1".into(), "R2".into()],
            days: vec!["Mon".into()],
            slots: vec!["P1".into()],
            resources,
        }
    }

    #[test]
    fn test_stable_hash_is_pinned() {
        assert_eq!(stable_hash("", ""), 0xaf63_bd4c_8601_b7df);
        assert_eq!(stable_hash("S1", "Maths"), stable_hash("S1", "Maths"));
        assert_ne!(stable_hash("S1", "Maths"), stable_hash("S1M", "aths"));
    }

    #[test]
    fn test_rooms_round_robin() {
        let fixed = FixedAssignments::derive(&config());
        assert_eq!(fixed.room(0), Some("R1"));
        assert_eq!(fixed.room(1), Some("R2"));
        assert_eq!(fixed.room(2), Some("R1"));

        let mut no_rooms = config();
        no_rooms.rooms.clear();
        assert_eq!(FixedAssignments::derive(&no_rooms).room(0), None);
    }

    #[test]
    fn test_teacher_selection() {
        let config = config();
        let fixed = FixedAssignments::derive(&config);
        for section in ["S1", "S2", "S3"] {
            let t = fixed.teacher(section, "Maths").unwrap();
            assert!(["Ada", "Bob", "Cy"].contains(&t));
            // lab list wins when the subject has one
            assert_eq!(fixed.teacher(section, "Physics"), Some("Eve"));
            assert_eq!(fixed.teacher(section, "Art"), None);
        }
        let expected = ["Ada", "Bob", "Cy"][(stable_hash("S2", "Maths") % 3) as usize];
        assert_eq!(fixed.teacher("S2", "Maths"), Some(expected));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let config = config();
        assert_eq!(FixedAssignments::derive(&config), FixedAssignments::derive(&config));
    }
}
