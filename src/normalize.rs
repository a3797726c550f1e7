use crate::data::{Configuration, Section, TimetableRequest};
use crate::error::TimetableError;
use crate::validation::{ValidationReport, full_section_name, validate_request};
use log::debug;

/// Validates a class-based request and flattens it into a [`Configuration`].
///
/// Returns the configuration together with the validation report so callers
/// can surface its warnings.
pub fn normalize(
    request: &TimetableRequest,
) -> Result<(Configuration, ValidationReport), TimetableError> {
    let report = validate_request(request);
    if !report.valid {
        return Err(TimetableError::InvalidInput(report));
    }

    let classes = request.classes.as_deref().unwrap_or_default();
    let sections: Vec<Section> = classes
        .iter()
        .flat_map(|class| {
            class.sections.iter().map(move |section| Section {
                name: full_section_name(&class.name, &section.name),
                student_count: section.student_count,
                subjects: class.subjects.clone(),
                lab_subjects: class.lab_subjects.clone(),
            })
        })
        .collect();
    debug!(
        "Normalized {} classes into {} sections",
        classes.len(),
        sections.len()
    );

    let config = Configuration {
        sections,
        rooms: request.rooms.clone().unwrap_or_default(),
        days: request.days.clone().unwrap_or_default(),
        slots: request.slots.clone().unwrap_or_default(),
        resources: request.resources.clone(),
    };
    Ok((config, report))
}
