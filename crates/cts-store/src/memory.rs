//! In-memory reference implementation of [`TrialStore`].
//!
//! Backs the CLI demo (loaded from / saved to a JSON snapshot file) and the
//! workflow tests. Ids are fabricated locally with a serialized counter so
//! a reloaded snapshot keeps allocating fresh ids.

use std::path::Path;

use chrono::Local;
use tracing::debug;

use cts_model::{
    AppointmentPatch, AssessmentTemplate, AssignmentStatus, MedicationPatch, MedicationTemplate,
    NewPatientTrial, PatientProfile, PatientTrial, ProfilePatch, ScheduledAppointment,
    ScheduledMedicationInstance, Trial,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scope::MassEditScope;
use crate::TrialStore;

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub trials: Vec<Trial>,
    #[serde(default)]
    pub assessment_templates: Vec<AssessmentTemplate>,
    #[serde(default)]
    pub medication_templates: Vec<MedicationTemplate>,
    #[serde(default)]
    pub patient_trials: Vec<PatientTrial>,
    #[serde(default)]
    pub appointments: Vec<ScheduledAppointment>,
    #[serde(default)]
    pub medications: Vec<ScheduledMedicationInstance>,
    #[serde(default)]
    pub profiles: Vec<PatientProfile>,
    #[serde(default)]
    pub next_id: u64,
}

/// Flat-table store over vectors, mimicking the hosted backend's row
/// semantics (atomic single-row insert/update, no cross-table transaction).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: StoreSnapshot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        MemoryStore { snapshot }
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    /// Direct access for seeding fixtures; production writes go through the
    /// [`TrialStore`] methods.
    pub fn snapshot_mut(&mut self) -> &mut StoreSnapshot {
        &mut self.snapshot
    }

    pub fn into_snapshot(self) -> StoreSnapshot {
        self.snapshot
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot: StoreSnapshot = serde_json::from_str(&contents)?;
        Ok(MemoryStore::from_snapshot(snapshot))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.snapshot)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.snapshot.next_id += 1;
        format!("{}-{}", prefix, self.snapshot.next_id)
    }
}

impl TrialStore for MemoryStore {
    fn trial(&self, trial_id: &str) -> Result<Option<Trial>> {
        Ok(self
            .snapshot
            .trials
            .iter()
            .find(|trial| trial.id == trial_id)
            .cloned())
    }

    fn assessment_templates(&self, trial_id: &str) -> Result<Vec<AssessmentTemplate>> {
        Ok(self
            .snapshot
            .assessment_templates
            .iter()
            .filter(|template| template.trial_id == trial_id)
            .cloned()
            .collect())
    }

    fn medication_templates(&self, trial_id: &str) -> Result<Vec<MedicationTemplate>> {
        Ok(self
            .snapshot
            .medication_templates
            .iter()
            .filter(|template| template.schedule().trial_id == trial_id)
            .cloned()
            .collect())
    }

    fn active_patient_trial(&self, patient_id: &str) -> Result<Option<PatientTrial>> {
        Ok(self
            .snapshot
            .patient_trials
            .iter()
            .find(|row| row.patient_id == patient_id && row.status == AssignmentStatus::Active)
            .cloned())
    }

    fn has_active_assignment(&self, patient_id: &str, trial_id: &str) -> Result<bool> {
        Ok(self.snapshot.patient_trials.iter().any(|row| {
            row.patient_id == patient_id
                && row.trial_id == trial_id
                && row.status == AssignmentStatus::Active
        }))
    }

    fn insert_patient_trial(&mut self, new: NewPatientTrial) -> Result<PatientTrial> {
        let id = self.next_id("pt");
        let row = PatientTrial {
            id,
            patient_id: new.patient_id,
            trial_id: new.trial_id,
            assigned_by: new.assigned_by,
            status: AssignmentStatus::Active,
            start_date: new
                .start_date
                .unwrap_or_else(|| Local::now().date_naive()),
        };
        self.snapshot.patient_trials.push(row.clone());
        debug!(patient_trial_id = %row.id, "inserted patient trial");
        Ok(row)
    }

    fn insert_appointments(&mut self, rows: Vec<ScheduledAppointment>) -> Result<usize> {
        let count = rows.len();
        for mut row in rows {
            row.id = Some(self.next_id("appt"));
            self.snapshot.appointments.push(row);
        }
        Ok(count)
    }

    fn insert_medications(&mut self, rows: Vec<ScheduledMedicationInstance>) -> Result<usize> {
        let count = rows.len();
        for mut row in rows {
            row.id = Some(self.next_id("med"));
            self.snapshot.medications.push(row);
        }
        Ok(count)
    }

    fn update_profile(&mut self, user_id: &str, patch: &ProfilePatch) -> Result<()> {
        let index = match self
            .snapshot
            .profiles
            .iter()
            .position(|profile| profile.user_id == user_id)
        {
            Some(index) => index,
            None => {
                self.snapshot.profiles.push(PatientProfile {
                    user_id: user_id.to_string(),
                    trial_name: None,
                    trial_phase: None,
                    optional_medication_category: None,
                });
                self.snapshot.profiles.len() - 1
            }
        };
        let profile = &mut self.snapshot.profiles[index];
        if let Some(name) = &patch.trial_name {
            profile.trial_name = Some(name.clone());
        }
        if let Some(phase) = &patch.trial_phase {
            profile.trial_phase = Some(phase.clone());
        }
        if let Some(category) = &patch.optional_medication_category {
            profile.optional_medication_category = Some(category.clone());
        }
        Ok(())
    }

    fn update_appointments_by_title(
        &mut self,
        scope: &MassEditScope,
        title: &str,
        patch: &AppointmentPatch,
    ) -> Result<usize> {
        let mut touched = 0;
        for row in self
            .snapshot
            .appointments
            .iter_mut()
            .filter(|row| scope.matches_appointment(row) && row.title == title)
        {
            if let Some(new_title) = &patch.title {
                row.title = new_title.clone();
            }
            if let Some(category) = &patch.category {
                row.category = Some(category.clone());
            }
            if let Some(location) = &patch.location {
                row.location = Some(location.clone());
            }
            if let Some(requirements) = &patch.requirements {
                row.requirements = Some(requirements.clone());
            }
            touched += 1;
        }
        Ok(touched)
    }

    fn update_medications_by_name(
        &mut self,
        scope: &MassEditScope,
        name: &str,
        patch: &MedicationPatch,
    ) -> Result<usize> {
        let mut touched = 0;
        for row in self
            .snapshot
            .medications
            .iter_mut()
            .filter(|row| scope.matches_medication(row) && row.name == name)
        {
            if let Some(new_name) = &patch.name {
                row.name = new_name.clone();
            }
            if let Some(frequency) = &patch.frequency {
                row.frequency = frequency.clone();
            }
            if let Some(notes) = &patch.notes {
                row.notes = Some(notes.clone());
            }
            touched += 1;
        }
        Ok(touched)
    }

    fn delete_appointments_by_title(
        &mut self,
        scope: &MassEditScope,
        title: &str,
    ) -> Result<usize> {
        let before = self.snapshot.appointments.len();
        self.snapshot
            .appointments
            .retain(|row| !(scope.matches_appointment(row) && row.title == title));
        Ok(before - self.snapshot.appointments.len())
    }

    fn delete_medications_by_name(&mut self, scope: &MassEditScope, name: &str) -> Result<usize> {
        let before = self.snapshot.medications.len();
        self.snapshot
            .medications
            .retain(|row| !(scope.matches_medication(row) && row.name == name));
        Ok(before - self.snapshot.medications.len())
    }
}
