//! Command implementations.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::info;

use cts_assign::{
    AssignmentOutcome, AssignmentRequest, OptionalMedicationOutcome, apply_optional_medication,
    assign_trial,
};
use cts_core::{expand_assessments, expand_medications};
use cts_model::{
    AssessmentTemplate, MedicationTemplate, ScheduledAppointment, ScheduledMedicationInstance,
};
use cts_store::{MemoryStore, TrialStore};

use crate::cli::{ApplyOptionalArgs, AssignArgs, ExpandArgs};
use cts_cli::logging::redact_value;

/// On-disk shape of a trial definition for `expand`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialDefinition {
    pub trial: cts_model::Trial,
    #[serde(default)]
    pub assessments: Vec<AssessmentTemplate>,
    #[serde(default)]
    pub medications: Vec<MedicationTemplate>,
}

/// Rows produced by a dry-run expansion.
#[derive(Debug, Serialize)]
pub struct ExpandResult {
    pub trial_name: String,
    pub appointments: Vec<ScheduledAppointment>,
    pub medications: Vec<ScheduledMedicationInstance>,
}

pub fn run_expand(args: &ExpandArgs) -> Result<ExpandResult> {
    let contents = std::fs::read_to_string(&args.trial_file)
        .with_context(|| format!("read trial definition {}", args.trial_file.display()))?;
    let definition: TrialDefinition =
        serde_json::from_str(&contents).context("parse trial definition")?;

    // Preview only: no enrollment exists, so stamp a placeholder id.
    let appointments = expand_assessments(
        &definition.assessments,
        &definition.trial,
        args.start_date,
        &args.patient_id,
        "preview",
    );
    let mandatory: Vec<MedicationTemplate> = definition
        .medications
        .iter()
        .filter(|template| !template.is_optional())
        .cloned()
        .collect();
    let medications = expand_medications(
        &mandatory,
        &definition.trial,
        args.start_date,
        &args.patient_id,
        "preview",
    );

    info!(
        trial_id = %definition.trial.id,
        appointments = appointments.len(),
        medications = medications.len(),
        "expanded trial definition"
    );

    Ok(ExpandResult {
        trial_name: definition.trial.name,
        appointments,
        medications,
    })
}

pub fn run_assign(args: &AssignArgs) -> Result<AssignmentOutcome> {
    let mut store = MemoryStore::load(&args.store_file)
        .with_context(|| format!("load store {}", args.store_file.display()))?;

    let request = AssignmentRequest {
        patient_id: args.patient_id.clone(),
        trial_id: args.trial_id.clone(),
        assigned_by: args.assigned_by.clone(),
        start_date: args.start_date,
    };
    info!(
        patient = redact_value(&args.patient_id),
        trial_id = %args.trial_id,
        "assigning trial"
    );
    let outcome = assign_trial(&mut store, &request)?;

    store
        .save(&args.store_file)
        .with_context(|| format!("save store {}", args.store_file.display()))?;
    Ok(outcome)
}

pub fn run_apply_optional(args: &ApplyOptionalArgs) -> Result<OptionalMedicationOutcome> {
    let mut store = MemoryStore::load(&args.store_file)
        .with_context(|| format!("load store {}", args.store_file.display()))?;

    let Some(enrollment) = store.active_patient_trial(&args.patient_id)? else {
        bail!("patient has no active trial assignment");
    };
    let templates = store.medication_templates(&enrollment.trial_id)?;
    let selection = templates.iter().find(|template| {
        template.is_optional() && template.drug_name().eq_ignore_ascii_case(&args.drug_name)
    });
    if selection.is_none() {
        bail!(
            "trial {} has no optional medication named '{}'",
            enrollment.trial_id,
            args.drug_name
        );
    }

    info!(
        patient = redact_value(&args.patient_id),
        drug = %args.drug_name,
        "applying optional medication"
    );
    let outcome = apply_optional_medication(&mut store, &args.patient_id, selection)?;

    store
        .save(&args.store_file)
        .with_context(|| format!("save store {}", args.store_file.display()))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_definition_parses_with_defaults() {
        let json = r#"{
            "trial": {
                "id": "trial-1",
                "name": "Phase II",
                "number_of_cycles": 2,
                "cycle_duration_days": 21
            }
        }"#;
        let definition: TrialDefinition = serde_json::from_str(json).expect("parse");
        assert!(definition.assessments.is_empty());
        assert!(definition.medications.is_empty());
        assert_eq!(definition.trial.number_of_cycles, 2);
    }

    #[test]
    fn trial_definition_accepts_tagged_medications() {
        let json = r#"{
            "trial": {
                "id": "trial-1",
                "name": "Phase II",
                "number_of_cycles": 2,
                "cycle_duration_days": 21
            },
            "medications": [
                {
                    "kind": "optional",
                    "trial_id": "trial-1",
                    "drug_name": "Ondansetron",
                    "frequency": "once daily",
                    "scheduled_days": [1],
                    "eligibility_category": "antiemetic"
                }
            ]
        }"#;
        let definition: TrialDefinition = serde_json::from_str(json).expect("parse");
        assert_eq!(definition.medications.len(), 1);
        assert!(definition.medications[0].is_optional());
    }
}
