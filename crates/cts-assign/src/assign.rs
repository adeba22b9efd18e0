//! Trial assignment workflow.
//!
//! One assignment runs as a sequence of discrete backend steps:
//!
//! 1. Validate the request (before any backend call)
//! 2. Duplicate-assignment check
//! 3. Insert the PatientTrial row
//! 4. Expand and bulk-insert appointments
//! 5. Expand and bulk-insert mandatory medication instances
//! 6. Update the patient profile's denormalized trial fields
//!
//! There is no transaction across the steps. A failure in steps 3-5 aborts
//! the remaining steps and names the failed step; earlier writes stay in
//! place and the patient may be left partially scheduled. Step 6 and empty
//! expansions are warning-grade: the assignment still succeeds and the
//! warnings ride along on the outcome.

use chrono::NaiveDate;
use tracing::{info, info_span, warn};

use cts_core::{expand_assessments, expand_medications};
use cts_model::{MedicationTemplate, NewPatientTrial, PatientTrial, ProfilePatch, Trial};
use cts_store::TrialStore;

use crate::error::{AssignmentError, WorkflowStep};

/// Request to enroll one patient in one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRequest {
    pub patient_id: String,
    pub trial_id: String,
    pub assigned_by: String,
    /// Defaults to the current date when absent.
    pub start_date: Option<NaiveDate>,
}

/// Non-fatal conditions observed during a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentWarning {
    /// Expansion legitimately produced zero rows (no templates, or the
    /// trial has no usable cycle structure). The clinician can add rows
    /// manually, so the assignment continues.
    NoRowsToInsert { kind: ScheduleKind },
    /// The denormalized profile update failed after the critical steps
    /// succeeded. Not rolled back; surfaced so the caller can qualify the
    /// success message.
    ProfileUpdateFailed { message: String },
}

/// Which derived-row table a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Appointments,
    Medications,
}

impl ScheduleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleKind::Appointments => "appointments",
            ScheduleKind::Medications => "medications",
        }
    }
}

/// Result of a completed (possibly warning-qualified) assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub patient_trial: PatientTrial,
    pub appointments_created: usize,
    pub medications_created: usize,
    pub warnings: Vec<AssignmentWarning>,
}

fn backend(step: WorkflowStep) -> impl FnOnce(cts_store::StoreError) -> AssignmentError {
    move |source| AssignmentError::Backend { step, source }
}

/// Enroll a patient and materialize the trial's schedule.
///
/// The duplicate-assignment check happens before any write; a duplicate
/// short-circuits with [`AssignmentError::DuplicateAssignment`] and zero
/// rows touched. The check-then-insert is racy under concurrent assignment
/// of the same patient; the backend offers no conditional insert, so this
/// stays a documented limitation.
pub fn assign_trial<S: TrialStore>(
    store: &mut S,
    request: &AssignmentRequest,
) -> Result<AssignmentOutcome, AssignmentError> {
    let span = info_span!(
        "assign_trial",
        trial_id = %request.trial_id,
    );
    let _guard = span.enter();

    validate(request)?;

    let already_assigned = store
        .has_active_assignment(&request.patient_id, &request.trial_id)
        .map_err(backend(WorkflowStep::ActiveAssignmentLookup))?;
    if already_assigned {
        return Err(AssignmentError::DuplicateAssignment {
            patient_id: request.patient_id.clone(),
            trial_id: request.trial_id.clone(),
        });
    }

    let trial = store
        .trial(&request.trial_id)
        .map_err(backend(WorkflowStep::FetchTrial))?
        .ok_or_else(|| {
            AssignmentError::Validation(format!("trial {} not found", request.trial_id))
        })?;

    let assessment_templates = store
        .assessment_templates(&trial.id)
        .map_err(backend(WorkflowStep::FetchTemplates))?;
    let medication_templates = store
        .medication_templates(&trial.id)
        .map_err(backend(WorkflowStep::FetchTemplates))?;

    let patient_trial = store
        .insert_patient_trial(NewPatientTrial {
            patient_id: request.patient_id.clone(),
            trial_id: request.trial_id.clone(),
            assigned_by: request.assigned_by.clone(),
            start_date: request.start_date,
        })
        .map_err(backend(WorkflowStep::CreateAssignment))?;

    let mut warnings = Vec::new();

    let appointments = expand_assessments(
        &assessment_templates,
        &trial,
        patient_trial.start_date,
        &request.patient_id,
        &patient_trial.id,
    );
    let appointments_created = if appointments.is_empty() {
        warn!(trial_id = %trial.id, "no appointment rows to insert");
        warnings.push(AssignmentWarning::NoRowsToInsert {
            kind: ScheduleKind::Appointments,
        });
        0
    } else {
        store
            .insert_appointments(appointments)
            .map_err(backend(WorkflowStep::CreateAppointments))?
    };

    // Optional medications are applied post-hoc, never at assignment time.
    let mandatory: Vec<MedicationTemplate> = medication_templates
        .into_iter()
        .filter(|template| !template.is_optional())
        .collect();
    let medications = expand_medications(
        &mandatory,
        &trial,
        patient_trial.start_date,
        &request.patient_id,
        &patient_trial.id,
    );
    let medications_created = if medications.is_empty() {
        warn!(trial_id = %trial.id, "no medication rows to insert");
        warnings.push(AssignmentWarning::NoRowsToInsert {
            kind: ScheduleKind::Medications,
        });
        0
    } else {
        store
            .insert_medications(medications)
            .map_err(backend(WorkflowStep::CreateMedications))?
    };

    // Denormalized profile fields are a convenience for the patient's home
    // screen; failure here must not undo the completed assignment.
    if let Err(error) = store.update_profile(&request.patient_id, &profile_patch(&trial)) {
        warn!(trial_id = %trial.id, %error, "profile update failed after assignment");
        warnings.push(AssignmentWarning::ProfileUpdateFailed {
            message: error.to_string(),
        });
    }

    info!(
        patient_trial_id = %patient_trial.id,
        appointments_created,
        medications_created,
        warnings = warnings.len(),
        "trial assigned"
    );

    Ok(AssignmentOutcome {
        patient_trial,
        appointments_created,
        medications_created,
        warnings,
    })
}

fn validate(request: &AssignmentRequest) -> Result<(), AssignmentError> {
    if request.patient_id.trim().is_empty() {
        return Err(AssignmentError::Validation(
            "patient id must not be empty".to_string(),
        ));
    }
    if request.trial_id.trim().is_empty() {
        return Err(AssignmentError::Validation(
            "trial id must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn profile_patch(trial: &Trial) -> ProfilePatch {
    ProfilePatch {
        trial_name: Some(trial.name.clone()),
        trial_phase: trial.trial_phase.clone(),
        optional_medication_category: None,
    }
}
