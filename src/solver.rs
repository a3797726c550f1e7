use crate::data::{
    Configuration, Constraints, GenerateOutput, ResetTeacherRequest, Suggestions, TimetableRequest,
    Unfulfilled,
};
use crate::diagnostics;
use crate::error::TimetableError;
use crate::fixed::FixedAssignments;
use crate::grid::Grid;
use crate::labs::{LabReport, schedule_labs};
use crate::ledger::ResourceLedger;
use crate::normalize::normalize;
use crate::replan::{ReplanResult, invalidate_teacher};
use crate::stats;
use crate::theory::{RelocateRepeated, schedule_theory};
use log::info;
use std::time::Instant;

/// A finished grid and what could not be fitted into it.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub grid: Grid,
    pub labs: LabReport,
    pub unfulfilled: Unfulfilled,
    pub suggestions: Suggestions,
    pub relaxed: bool,
}

/// Runs the whole engine on a normalized configuration: labs, theory, an
/// optional relaxed theory pass, then diagnostics.
pub fn schedule(config: &Configuration) -> Schedule {
    let start_time = Instant::now();
    info!(
        "Building timetable for {} sections, {} days, {} slots",
        config.sections.len(),
        config.days.len(),
        config.slots.len()
    );

    let fixed = FixedAssignments::derive(config);
    let mut grid = Grid::new(config);
    let mut ledger = ResourceLedger::new();
    let labs = schedule_labs(config, &fixed, &mut grid, &mut ledger);

    let constraints = &config.resources.constraints;
    let mut unfulfilled = schedule_theory(config, &fixed, &mut grid, constraints, &RelocateRepeated);

    let relaxed = !unfulfilled.is_empty();
    if relaxed {
        let loosened = Constraints {
            max_lectures_per_subject_per_day: constraints.max_lectures_per_subject_per_day + 1,
            ..constraints.clone()
        };
        info!(
            "{} section(s) short after first pass; retrying with {} lectures/subject/day",
            unfulfilled.len(),
            loosened.max_lectures_per_subject_per_day
        );
        grid.strip_theory();
        unfulfilled = schedule_theory(config, &fixed, &mut grid, &loosened, &RelocateRepeated);
    }

    let suggestions = diagnostics::suggest(config, &grid, &unfulfilled);
    info!("Timetable built in {:.2?}", start_time.elapsed());
    Schedule {
        grid,
        labs,
        unfulfilled,
        suggestions,
        relaxed,
    }
}

/// Validates, normalizes and schedules a class-based request.
pub fn generate(request: &TimetableRequest) -> Result<GenerateOutput, TimetableError> {
    let (config, report) = normalize(request)?;
    let total_classes = request.classes.as_ref().map_or(0, Vec::len);
    info!(
        "Processing {} sections from {} classes",
        config.sections.len(),
        total_classes
    );

    let schedule = schedule(&config);
    Ok(GenerateOutput {
        success: true,
        timetable: schedule.grid.to_rows(),
        statistics: stats::calculate(&schedule.grid, total_classes),
        unfulfilled: schedule.unfulfilled,
        suggestions: schedule.suggestions,
        validation_warnings: report.warnings,
    })
}

/// Rebuilds the caller's grid and applies a teacher invalidation to it.
///
/// Without a complete (teacher, day, slot) target the grid is returned as
/// given.
pub fn reset_teacher(request: &ResetTeacherRequest) -> Result<ReplanResult, TimetableError> {
    let input = request
        .input_data
        .as_ref()
        .ok_or(TimetableError::MissingInputData)?;
    let (config, _) = normalize(input)?;
    let mut grid = Grid::from_rows(&config, &request.timetable)?;

    match (
        non_empty(&request.teacher),
        non_empty(&request.day),
        non_empty(&request.slot),
    ) {
        (Some(teacher), Some(day), Some(slot)) => {
            invalidate_teacher(&config, &mut grid, teacher, day, slot)
        }
        _ => Ok(ReplanResult {
            timetable: grid.to_rows(),
            repairs: Default::default(),
        }),
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}
