//! Contract with the external relational store.
//!
//! The surrounding application delegates persistence to a hosted backend;
//! this crate captures the minimal operation set the scheduling workflows
//! require as the [`TrialStore`] trait. Each method is one discrete backend
//! step that may fail independently; callers treat failures per step rather
//! than wrapping multiple steps in a transaction (the backend offers none
//! across tables).
//!
//! [`MemoryStore`] is the reference implementation used by tests and the
//! CLI demo.

pub mod error;
pub mod memory;
pub mod scope;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreSnapshot};
pub use scope::MassEditScope;

use cts_model::{
    AppointmentPatch, AssessmentTemplate, MedicationPatch, MedicationTemplate, NewPatientTrial,
    PatientTrial, ProfilePatch, ScheduledAppointment, ScheduledMedicationInstance, Trial,
};

/// Table-level CRUD the scheduling workflows need from the backend.
///
/// Batch update/delete operations are scoped queries, never full-table
/// scans: implementations must apply the [`MassEditScope`] filter in
/// addition to the identity value, so a shared title can never select rows
/// across unrelated patients or trials.
pub trait TrialStore {
    fn trial(&self, trial_id: &str) -> Result<Option<Trial>>;

    fn assessment_templates(&self, trial_id: &str) -> Result<Vec<AssessmentTemplate>>;

    fn medication_templates(&self, trial_id: &str) -> Result<Vec<MedicationTemplate>>;

    /// The patient's Active enrollment, if any. At most one is expected.
    fn active_patient_trial(&self, patient_id: &str) -> Result<Option<PatientTrial>>;

    /// Whether an Active enrollment already exists for (patient, trial).
    fn has_active_assignment(&self, patient_id: &str, trial_id: &str) -> Result<bool>;

    /// Insert an enrollment; the store assigns the id and defaults the
    /// start date to the current date when absent.
    fn insert_patient_trial(&mut self, new: NewPatientTrial) -> Result<PatientTrial>;

    /// Bulk-insert appointment rows; returns the number inserted.
    fn insert_appointments(&mut self, rows: Vec<ScheduledAppointment>) -> Result<usize>;

    /// Bulk-insert medication instance rows; returns the number inserted.
    fn insert_medications(&mut self, rows: Vec<ScheduledMedicationInstance>) -> Result<usize>;

    /// Upsert the denormalized trial fields on a patient's profile.
    fn update_profile(&mut self, user_id: &str, patch: &ProfilePatch) -> Result<()>;

    /// Update every appointment with the given title inside the scope;
    /// returns the number of rows touched.
    fn update_appointments_by_title(
        &mut self,
        scope: &MassEditScope,
        title: &str,
        patch: &AppointmentPatch,
    ) -> Result<usize>;

    /// Update every medication instance with the given name inside the
    /// scope; returns the number of rows touched.
    fn update_medications_by_name(
        &mut self,
        scope: &MassEditScope,
        name: &str,
        patch: &MedicationPatch,
    ) -> Result<usize>;

    /// Permanently delete every appointment with the given title inside the
    /// scope; returns the number of rows removed.
    fn delete_appointments_by_title(&mut self, scope: &MassEditScope, title: &str)
    -> Result<usize>;

    /// Permanently delete every medication instance with the given name
    /// inside the scope; returns the number of rows removed.
    fn delete_medications_by_name(&mut self, scope: &MassEditScope, name: &str) -> Result<usize>;
}
