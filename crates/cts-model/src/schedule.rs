use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A concrete dated appointment materialized from an assessment template.
///
/// One row per (template x applicable cycle x scheduled day) combination.
/// After expansion the row is logically detached from its template: edits to
/// one instance never propagate back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAppointment {
    /// Server-assigned; `None` until the row is inserted.
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<String>,
    /// Equal to the originating template's name; mass-edit groups rows by it.
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// List-shaped even though the template stores one free-text string:
    /// expansion wraps it into a single-element list without splitting.
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub fasting_required: bool,
    pub patient_trial_id: String,
}

/// A concrete dated medication instance materialized from a medication
/// template. Grouped by `name` for mass-edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMedicationInstance {
    /// Server-assigned; `None` until the row is inserted.
    #[serde(default)]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub frequency: String,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    pub patient_trial_id: String,
}

/// Field values to apply to every appointment sharing a title within a
/// scope. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
}

/// Field values to apply to every medication instance sharing a name within
/// a scope. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicationPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
