//! Weekly academic timetable generation.
//!
//! Labs are packed into double-period blocks first, theory lectures fill the
//! rest, and whatever demand is left over comes back with suggestions. A
//! separate entry point repairs an existing timetable when a teacher drops
//! out of one slot.

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod fixed;
pub mod grid;
pub mod labs;
pub mod ledger;
pub mod normalize;
pub mod replan;
pub mod server;
pub mod solver;
pub mod stats;
pub mod theory;
pub mod topology;
pub mod validation;

pub use data::{BookingRow, Configuration, GenerateOutput, ResetTeacherRequest, TimetableRequest};
pub use error::TimetableError;
pub use solver::{Schedule, generate, reset_teacher, schedule};
