use serde::{Deserialize, Serialize};

use cts_model::{ScheduledAppointment, ScheduledMedicationInstance};

/// Row filter for batch update/delete operations.
///
/// A scope is always required: the identity value (shared title or drug
/// name) alone must never select rows across unrelated trials or patients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassEditScope {
    /// All derived rows belonging to one patient.
    Patient { patient_id: String },
    /// All derived rows under the listed enrollments, e.g. every patient
    /// assigned to one trial.
    PatientTrials { ids: Vec<String> },
}

impl MassEditScope {
    pub fn patient(patient_id: impl Into<String>) -> Self {
        MassEditScope::Patient {
            patient_id: patient_id.into(),
        }
    }

    pub fn patient_trials(ids: Vec<String>) -> Self {
        MassEditScope::PatientTrials { ids }
    }

    pub fn matches_appointment(&self, row: &ScheduledAppointment) -> bool {
        match self {
            MassEditScope::Patient { patient_id } => row.user_id == *patient_id,
            MassEditScope::PatientTrials { ids } => ids.contains(&row.patient_trial_id),
        }
    }

    pub fn matches_medication(&self, row: &ScheduledMedicationInstance) -> bool {
        match self {
            MassEditScope::Patient { patient_id } => row.user_id == *patient_id,
            MassEditScope::PatientTrials { ids } => ids.contains(&row.patient_trial_id),
        }
    }
}
