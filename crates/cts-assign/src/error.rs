use std::fmt;

use cts_store::StoreError;
use thiserror::Error;

/// Backend step within an assignment or optional-medication workflow.
///
/// Failures name the step so callers can report partial completion ("trial
/// assigned but appointments could not be created") instead of a blanket
/// failure. Writes from already-completed steps are not rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    ActiveAssignmentLookup,
    FetchTrial,
    FetchTemplates,
    CreateAssignment,
    CreateAppointments,
    CreateMedications,
    UpdateProfile,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::ActiveAssignmentLookup => "active assignment lookup",
            WorkflowStep::FetchTrial => "trial fetch",
            WorkflowStep::FetchTemplates => "template fetch",
            WorkflowStep::CreateAssignment => "assignment creation",
            WorkflowStep::CreateAppointments => "appointment creation",
            WorkflowStep::CreateMedications => "medication creation",
            WorkflowStep::UpdateProfile => "profile update",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from the trial-assignment workflow.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// Caller input violates a precondition; raised before any backend
    /// write.
    #[error("validation: {0}")]
    Validation(String),
    /// The patient already has an active enrollment for this trial.
    /// Distinct from a write failure so the caller can say "already
    /// assigned" instead of "try again".
    #[error("patient {patient_id} already has an active assignment for trial {trial_id}")]
    DuplicateAssignment {
        patient_id: String,
        trial_id: String,
    },
    #[error("{step} failed: {source}")]
    Backend {
        step: WorkflowStep,
        #[source]
        source: StoreError,
    },
}

/// Errors from the optional-medication applicator.
#[derive(Debug, Error)]
pub enum OptionalMedicationError {
    /// No template was selected; raised before any backend call.
    #[error("no optional medication selected")]
    NoSelection,
    /// The selected template is a mandatory medication, which is applied at
    /// assignment time, not post-hoc.
    #[error("'{0}' is not an optional medication template")]
    NotOptional(String),
    /// The patient has no active trial enrollment to attach the medication
    /// to.
    #[error("patient {0} has no active trial assignment")]
    NoActiveTrial(String),
    #[error("trial {0} not found")]
    TrialNotFound(String),
    #[error("{step} failed: {source}")]
    Backend {
        step: WorkflowStep,
        #[source]
        source: StoreError,
    },
}

/// Errors from mass-update/mass-delete operations.
#[derive(Debug, Error)]
pub enum MassEditError {
    /// Field is outside the entity's allow-list; rejected before any
    /// backend call.
    #[error("{0}")]
    FieldNotAllowed(String),
    #[error("identity value must not be empty")]
    EmptyIdentity,
    #[error(transparent)]
    Store(#[from] StoreError),
}
