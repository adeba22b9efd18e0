use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A clinical protocol template: cycle structure plus associated
/// assessment/medication schedules authored by an admin.
///
/// A trial with `number_of_cycles == 0` or `cycle_duration_days == 0` is a
/// data-quality situation, not an invalid record: it expands to an empty
/// schedule and the caller surfaces a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub trial_phase: Option<String>,
    pub number_of_cycles: u32,
    pub cycle_duration_days: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Trial {
    /// True when the cycle structure can place at least one calendar slot.
    pub fn has_cycle_structure(&self) -> bool {
        self.number_of_cycles >= 1 && self.cycle_duration_days >= 1
    }
}

/// Admin-authored definition of a recurring assessment within a trial.
///
/// `scheduled_days` and `applicable_cycles` are 1-based. An empty
/// `applicable_cycles` means "every cycle of the trial".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentTemplate {
    pub trial_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub scheduled_days: Vec<u32>,
    #[serde(default)]
    pub applicable_cycles: Vec<u32>,
    /// Free-text requirements; carried onto expanded appointments as a
    /// single-element list, never split.
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub fasting_required: bool,
}

/// The schedule shared by both medication template flavors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationSchedule {
    pub trial_id: String,
    pub drug_name: String,
    pub frequency: String,
    #[serde(default)]
    pub scheduled_days: Vec<u32>,
    #[serde(default)]
    pub applicable_cycles: Vec<u32>,
    #[serde(default)]
    pub special_conditions: Option<String>,
}

/// Admin-authored definition of a recurring medication within a trial.
///
/// Mandatory medications are applied automatically when a patient is
/// assigned to the trial. Optional medications are offered post-hoc to
/// patients matching the eligibility category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MedicationTemplate {
    Mandatory {
        #[serde(flatten)]
        schedule: MedicationSchedule,
    },
    Optional {
        #[serde(flatten)]
        schedule: MedicationSchedule,
        /// Patient eligibility label shown when offering the medication.
        eligibility_category: String,
    },
}

impl MedicationTemplate {
    pub fn schedule(&self) -> &MedicationSchedule {
        match self {
            MedicationTemplate::Mandatory { schedule }
            | MedicationTemplate::Optional { schedule, .. } => schedule,
        }
    }

    pub fn drug_name(&self) -> &str {
        &self.schedule().drug_name
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, MedicationTemplate::Optional { .. })
    }

    pub fn eligibility_category(&self) -> Option<&str> {
        match self {
            MedicationTemplate::Mandatory { .. } => None,
            MedicationTemplate::Optional {
                eligibility_category,
                ..
            } => Some(eligibility_category),
        }
    }
}

/// Status of a patient's enrollment in a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Completed,
    Withdrawn,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Active => "active",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(AssignmentStatus::Active),
            "completed" => Ok(AssignmentStatus::Completed),
            "withdrawn" => Ok(AssignmentStatus::Withdrawn),
            _ => Err(format!("Unknown assignment status: {}", s)),
        }
    }
}

/// The join record representing one patient's enrollment in one trial,
/// anchored by a start date.
///
/// At most one Active row may exist per (patient, trial) pair. The check is
/// check-then-insert against the external store, which is racy under
/// concurrent assignment attempts; accepted as a known limitation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientTrial {
    pub id: String,
    pub patient_id: String,
    pub trial_id: String,
    pub assigned_by: String,
    pub status: AssignmentStatus,
    pub start_date: NaiveDate,
}

/// Insert payload for a new enrollment. The store assigns the id, and the
/// start date defaults to the current date when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatientTrial {
    pub patient_id: String,
    pub trial_id: String,
    pub assigned_by: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}
