//! Scheduling workflows built on the store contract: trial assignment,
//! the optional-medication applicator, and scoped mass-edit operations.

pub mod assign;
pub mod error;
pub mod massedit;
pub mod optional;

pub use assign::{
    AssignmentOutcome, AssignmentRequest, AssignmentWarning, ScheduleKind, assign_trial,
};
pub use error::{AssignmentError, MassEditError, OptionalMedicationError, WorkflowStep};
pub use massedit::{
    DeleteConfirmation, delete_appointments, delete_medications, update_appointments,
    update_medications,
};
pub use optional::{OptionalMedicationOutcome, apply_optional_medication};
