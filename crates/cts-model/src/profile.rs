use serde::{Deserialize, Serialize};

/// Per-patient profile row carrying denormalized trial fields.
///
/// The surrounding application shows these on the patient's home screen;
/// they are refreshed after a successful assignment and when an optional
/// medication is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub user_id: String,
    #[serde(default)]
    pub trial_name: Option<String>,
    #[serde(default)]
    pub trial_phase: Option<String>,
    #[serde(default)]
    pub optional_medication_category: Option<String>,
}

/// Partial update for a patient profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub trial_name: Option<String>,
    #[serde(default)]
    pub trial_phase: Option<String>,
    #[serde(default)]
    pub optional_medication_category: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.trial_name.is_none()
            && self.trial_phase.is_none()
            && self.optional_medication_category.is_none()
    }
}
