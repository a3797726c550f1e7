//! Structural checks on a class-based timetable request.
//!
//! Errors stop a request before any scheduling happens; warnings are passed
//! back alongside the generated timetable.

use crate::data::{LUNCH_BREAK, TimetableRequest};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn finish(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Name a class section receives once flattened.
pub fn full_section_name(class_name: &str, section_name: &str) -> String {
    if section_name.is_empty() {
        class_name.to_string()
    } else {
        format!("{class_name} - {section_name}")
    }
}

pub fn validate_request(request: &TimetableRequest) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(classes) = &request.classes else {
        errors.push("Missing required field: classes".to_string());
        return ValidationReport::finish(errors, warnings);
    };
    if classes.is_empty() {
        errors.push("At least one class is required".to_string());
        return ValidationReport::finish(errors, warnings);
    }

    let mut seen_sections = HashSet::new();
    for (i, class) in classes.iter().enumerate() {
        let n = i + 1;
        if class.name.is_empty() {
            errors.push(format!("Class {n} must have a name"));
        }
        if class.sections.is_empty() {
            errors.push(format!("Class {n} must have at least one section"));
        }
        for (j, section) in class.sections.iter().enumerate() {
            let m = j + 1;
            if section.name.is_empty() {
                warnings.push(format!("Class {n}, Section {m} should have a name"));
            }
            if section.student_count == 0 {
                warnings.push(format!("Class {n}, Section {m} should have student count"));
            }
            let full = full_section_name(&class.name, &section.name);
            if !seen_sections.insert(full.clone()) {
                errors.push(format!("Duplicate section name: {full}"));
            }
        }
        if class.subjects.is_empty() && class.lab_subjects.is_empty() {
            warnings.push(format!("Class {n} ({}) has no subjects defined", class.name));
        }
    }

    if request.rooms.is_none() {
        errors.push("Missing required field: rooms".to_string());
    }
    match &request.days {
        None => errors.push("Missing required field: days".to_string()),
        Some(days) if days.is_empty() => {
            errors.push("At least one day must be defined".to_string())
        }
        Some(_) => {}
    }
    match &request.slots {
        None => errors.push("Missing required field: slots".to_string()),
        Some(slots) if slots.iter().all(|s| s == LUNCH_BREAK) => {
            errors.push("At least one time slot must be defined".to_string())
        }
        Some(_) => {}
    }

    let resources = &request.resources;
    let all_subjects: BTreeSet<&String> = classes
        .iter()
        .flat_map(|c| c.subjects.iter().chain(c.lab_subjects.iter()))
        .collect();
    for subject in all_subjects {
        let theory = resources.teachers.get(subject);
        let lab = resources.lab_teachers.get(subject);
        if theory.is_none() && lab.is_none() {
            warnings.push(format!("No teacher assigned to subject: {subject}"));
            continue;
        }
        let assigned = theory
            .into_iter()
            .chain(lab)
            .flat_map(|list| list.names())
            .count();
        if assigned == 0 {
            warnings.push(format!("Subject \"{subject}\" has no valid teachers assigned"));
        }
    }

    for class in classes {
        for lab_subject in &class.lab_subjects {
            let has_rooms = resources
                .lab_rooms
                .get(lab_subject)
                .is_some_and(|rooms| !rooms.is_empty());
            if !has_rooms {
                warnings.push(format!("No lab rooms assigned to lab subject: {lab_subject}"));
            }
        }
    }

    ValidationReport::finish(errors, warnings)
}
