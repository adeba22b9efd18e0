//! Optional-medication applicator.
//!
//! Applies exactly one optional-medication template to a patient who is
//! already enrolled in a trial. The expansion math is the medication path of
//! the template expander, scoped to the single selected template and
//! anchored on the existing enrollment's start date.
//!
//! Re-applying the same template is not deduplicated: a second application
//! inserts a second set of rows. Callers wanting idempotence must check
//! before applying; see the duplicate-application test.

use tracing::{info, info_span, warn};

use cts_core::expand_single_medication;
use cts_model::{MedicationTemplate, ProfilePatch};
use cts_store::TrialStore;

use crate::assign::{AssignmentWarning, ScheduleKind};
use crate::error::{OptionalMedicationError, WorkflowStep};

/// Result of applying one optional medication.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionalMedicationOutcome {
    pub patient_trial_id: String,
    pub medications_created: usize,
    pub warnings: Vec<AssignmentWarning>,
}

fn backend(
    step: WorkflowStep,
) -> impl FnOnce(cts_store::StoreError) -> OptionalMedicationError {
    move |source| OptionalMedicationError::Backend { step, source }
}

/// Apply one selected optional-medication template to an enrolled patient.
///
/// `selection` is `None` when the caller's picker had nothing chosen; that
/// fails with [`OptionalMedicationError::NoSelection`] before any backend
/// call. Rows are additive: previously inserted instances, mandatory or
/// optional, are never altered or removed.
pub fn apply_optional_medication<S: TrialStore>(
    store: &mut S,
    patient_id: &str,
    selection: Option<&MedicationTemplate>,
) -> Result<OptionalMedicationOutcome, OptionalMedicationError> {
    let template = selection.ok_or(OptionalMedicationError::NoSelection)?;
    let eligibility_category = template
        .eligibility_category()
        .ok_or_else(|| OptionalMedicationError::NotOptional(template.drug_name().to_string()))?
        .to_string();

    let span = info_span!(
        "apply_optional_medication",
        drug = %template.drug_name(),
    );
    let _guard = span.enter();

    let patient_trial = store
        .active_patient_trial(patient_id)
        .map_err(backend(WorkflowStep::ActiveAssignmentLookup))?
        .ok_or_else(|| OptionalMedicationError::NoActiveTrial(patient_id.to_string()))?;

    let trial = store
        .trial(&patient_trial.trial_id)
        .map_err(backend(WorkflowStep::FetchTrial))?
        .ok_or_else(|| OptionalMedicationError::TrialNotFound(patient_trial.trial_id.clone()))?;

    let rows = expand_single_medication(
        template.schedule(),
        &trial,
        patient_trial.start_date,
        patient_id,
        &patient_trial.id,
    );

    let mut warnings = Vec::new();
    let medications_created = if rows.is_empty() {
        warn!(trial_id = %trial.id, "optional medication expanded to zero rows");
        warnings.push(AssignmentWarning::NoRowsToInsert {
            kind: ScheduleKind::Medications,
        });
        0
    } else {
        store
            .insert_medications(rows)
            .map_err(backend(WorkflowStep::CreateMedications))?
    };

    let patch = ProfilePatch {
        trial_name: None,
        trial_phase: None,
        optional_medication_category: Some(eligibility_category),
    };
    if let Err(error) = store.update_profile(patient_id, &patch) {
        warn!(%error, "profile update failed after optional medication");
        warnings.push(AssignmentWarning::ProfileUpdateFailed {
            message: error.to_string(),
        });
    }

    info!(
        patient_trial_id = %patient_trial.id,
        medications_created,
        "optional medication applied"
    );

    Ok(OptionalMedicationOutcome {
        patient_trial_id: patient_trial.id,
        medications_created,
        warnings,
    })
}
