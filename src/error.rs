use crate::validation::ValidationReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("Invalid input data: {}", .0.errors.join("; "))]
    InvalidInput(ValidationReport),
    #[error("Unknown section: {0}")]
    UnknownSection(String),
    #[error("Unknown day: {0}")]
    UnknownDay(String),
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),
    #[error("inputData missing")]
    MissingInputData,
}
