//! Integration tests for the assignment, optional-medication, and mass-edit
//! workflows against the in-memory store.

use chrono::NaiveDate;

use cts_assign::{
    AssignmentError, AssignmentRequest, AssignmentWarning, DeleteConfirmation, MassEditError,
    OptionalMedicationError, ScheduleKind, WorkflowStep, apply_optional_medication, assign_trial,
    delete_appointments, update_appointments, update_medications,
};
use cts_model::{
    AppointmentPatch, AssessmentTemplate, AssignmentStatus, MedicationPatch, MedicationSchedule,
    MedicationTemplate, NewPatientTrial, PatientTrial, ProfilePatch, ScheduledAppointment,
    ScheduledMedicationInstance, Trial,
};
use cts_store::{MassEditScope, MemoryStore, StoreError, TrialStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_trial(store: &mut MemoryStore, cycles: u32, duration: u32) {
    store.snapshot_mut().trials.push(Trial {
        id: "trial-1".to_string(),
        name: "Phase II combination".to_string(),
        protocol_version: Some("2.0".to_string()),
        trial_phase: Some("Phase II".to_string()),
        number_of_cycles: cycles,
        cycle_duration_days: duration,
        notes: None,
    });
}

fn seed_templates(store: &mut MemoryStore) {
    store
        .snapshot_mut()
        .assessment_templates
        .push(AssessmentTemplate {
            trial_id: "trial-1".to_string(),
            name: "Blood draw".to_string(),
            category: Some("Labs".to_string()),
            scheduled_days: vec![1, 8],
            applicable_cycles: vec![],
            requirements: Some("fast 8h".to_string()),
            fasting_required: true,
        });
    store
        .snapshot_mut()
        .medication_templates
        .push(MedicationTemplate::Mandatory {
            schedule: MedicationSchedule {
                trial_id: "trial-1".to_string(),
                drug_name: "Cisplatin".to_string(),
                frequency: "day 1 of cycle".to_string(),
                scheduled_days: vec![1],
                applicable_cycles: vec![],
                special_conditions: None,
            },
        });
    store
        .snapshot_mut()
        .medication_templates
        .push(optional_template());
}

fn optional_template() -> MedicationTemplate {
    MedicationTemplate::Optional {
        schedule: MedicationSchedule {
            trial_id: "trial-1".to_string(),
            drug_name: "Ondansetron".to_string(),
            frequency: "once daily".to_string(),
            scheduled_days: vec![1, 2],
            applicable_cycles: vec![1],
            special_conditions: None,
        },
        eligibility_category: "antiemetic".to_string(),
    }
}

fn request() -> AssignmentRequest {
    AssignmentRequest {
        patient_id: "patient-1".to_string(),
        trial_id: "trial-1".to_string(),
        assigned_by: "clinician-1".to_string(),
        start_date: Some(date(2025, 1, 1)),
    }
}

#[test]
fn assignment_happy_path() {
    let mut store = MemoryStore::new();
    seed_trial(&mut store, 2, 21);
    seed_templates(&mut store);

    let outcome = assign_trial(&mut store, &request()).expect("assignment succeeds");

    // 1 assessment x 2 cycles x 2 days.
    assert_eq!(outcome.appointments_created, 4);
    // Mandatory medication only: 2 cycles x 1 day. Optional is excluded.
    assert_eq!(outcome.medications_created, 2);
    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.patient_trial.status, AssignmentStatus::Active);
    assert_eq!(outcome.patient_trial.start_date, date(2025, 1, 1));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.appointments.len(), 4);
    assert_eq!(snapshot.medications.len(), 2);
    assert!(
        snapshot
            .medications
            .iter()
            .all(|row| row.name == "Cisplatin")
    );
    // Requirements arrive list-shaped on every expanded appointment.
    assert!(
        snapshot
            .appointments
            .iter()
            .all(|row| row.requirements == Some(vec!["fast 8h".to_string()]))
    );
    // Denormalized profile fields were refreshed.
    let profile = &snapshot.profiles[0];
    assert_eq!(profile.trial_name.as_deref(), Some("Phase II combination"));
    assert_eq!(profile.trial_phase.as_deref(), Some("Phase II"));
}

#[test]
fn duplicate_assignment_short_circuits_with_zero_writes() {
    let mut store = MemoryStore::new();
    seed_trial(&mut store, 2, 21);
    seed_templates(&mut store);
    store.snapshot_mut().patient_trials.push(PatientTrial {
        id: "pt-existing".to_string(),
        patient_id: "patient-1".to_string(),
        trial_id: "trial-1".to_string(),
        assigned_by: "clinician-2".to_string(),
        status: AssignmentStatus::Active,
        start_date: date(2024, 11, 1),
    });

    let error = assign_trial(&mut store, &request()).expect_err("duplicate must be rejected");

    assert!(matches!(
        error,
        AssignmentError::DuplicateAssignment { .. }
    ));
    let snapshot = store.snapshot();
    assert_eq!(snapshot.patient_trials.len(), 1);
    assert!(snapshot.appointments.is_empty());
    assert!(snapshot.medications.is_empty());
    assert!(snapshot.profiles.is_empty());
}

#[test]
fn completed_enrollment_does_not_block_reassignment() {
    let mut store = MemoryStore::new();
    seed_trial(&mut store, 1, 7);
    store.snapshot_mut().patient_trials.push(PatientTrial {
        id: "pt-old".to_string(),
        patient_id: "patient-1".to_string(),
        trial_id: "trial-1".to_string(),
        assigned_by: "clinician-2".to_string(),
        status: AssignmentStatus::Completed,
        start_date: date(2024, 1, 1),
    });

    assert!(assign_trial(&mut store, &request()).is_ok());
}

#[test]
fn zero_cycle_trial_still_assigns_with_warnings() {
    let mut store = MemoryStore::new();
    seed_trial(&mut store, 0, 21);
    seed_templates(&mut store);

    let outcome = assign_trial(&mut store, &request()).expect("assignment still completes");

    assert_eq!(outcome.appointments_created, 0);
    assert_eq!(outcome.medications_created, 0);
    assert!(outcome.warnings.contains(&AssignmentWarning::NoRowsToInsert {
        kind: ScheduleKind::Appointments
    }));
    assert!(outcome.warnings.contains(&AssignmentWarning::NoRowsToInsert {
        kind: ScheduleKind::Medications
    }));
    // The enrollment itself was performed and kept.
    assert_eq!(store.snapshot().patient_trials.len(), 1);
}

#[test]
fn validation_rejects_blank_ids_before_any_write() {
    let mut store = MemoryStore::new();
    seed_trial(&mut store, 2, 21);

    let mut blank_patient = request();
    blank_patient.patient_id = "  ".to_string();
    let error = assign_trial(&mut store, &blank_patient).expect_err("must fail validation");

    assert!(matches!(error, AssignmentError::Validation(_)));
    assert!(store.snapshot().patient_trials.is_empty());
}

#[test]
fn unknown_trial_is_a_validation_error() {
    let mut store = MemoryStore::new();

    let error = assign_trial(&mut store, &request()).expect_err("unknown trial");

    assert!(matches!(error, AssignmentError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Partial failure
// ---------------------------------------------------------------------------

/// Store wrapper that fails one named operation, for exercising the
/// no-rollback partial-completion semantics.
struct FailingStore {
    inner: MemoryStore,
    fail_on: &'static str,
}

impl FailingStore {
    fn failure(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.fail_on == operation {
            Err(StoreError::backend(operation, "injected failure"))
        } else {
            Ok(())
        }
    }
}

impl TrialStore for FailingStore {
    fn trial(&self, trial_id: &str) -> Result<Option<Trial>, StoreError> {
        self.failure("trial")?;
        self.inner.trial(trial_id)
    }

    fn assessment_templates(
        &self,
        trial_id: &str,
    ) -> Result<Vec<AssessmentTemplate>, StoreError> {
        self.failure("assessment_templates")?;
        self.inner.assessment_templates(trial_id)
    }

    fn medication_templates(
        &self,
        trial_id: &str,
    ) -> Result<Vec<MedicationTemplate>, StoreError> {
        self.failure("medication_templates")?;
        self.inner.medication_templates(trial_id)
    }

    fn active_patient_trial(&self, patient_id: &str) -> Result<Option<PatientTrial>, StoreError> {
        self.failure("active_patient_trial")?;
        self.inner.active_patient_trial(patient_id)
    }

    fn has_active_assignment(
        &self,
        patient_id: &str,
        trial_id: &str,
    ) -> Result<bool, StoreError> {
        self.failure("has_active_assignment")?;
        self.inner.has_active_assignment(patient_id, trial_id)
    }

    fn insert_patient_trial(&mut self, new: NewPatientTrial) -> Result<PatientTrial, StoreError> {
        self.failure("insert_patient_trial")?;
        self.inner.insert_patient_trial(new)
    }

    fn insert_appointments(
        &mut self,
        rows: Vec<ScheduledAppointment>,
    ) -> Result<usize, StoreError> {
        self.failure("insert_appointments")?;
        self.inner.insert_appointments(rows)
    }

    fn insert_medications(
        &mut self,
        rows: Vec<ScheduledMedicationInstance>,
    ) -> Result<usize, StoreError> {
        self.failure("insert_medications")?;
        self.inner.insert_medications(rows)
    }

    fn update_profile(&mut self, user_id: &str, patch: &ProfilePatch) -> Result<(), StoreError> {
        self.failure("update_profile")?;
        self.inner.update_profile(user_id, patch)
    }

    fn update_appointments_by_title(
        &mut self,
        scope: &MassEditScope,
        title: &str,
        patch: &AppointmentPatch,
    ) -> Result<usize, StoreError> {
        self.failure("update_appointments_by_title")?;
        self.inner.update_appointments_by_title(scope, title, patch)
    }

    fn update_medications_by_name(
        &mut self,
        scope: &MassEditScope,
        name: &str,
        patch: &MedicationPatch,
    ) -> Result<usize, StoreError> {
        self.failure("update_medications_by_name")?;
        self.inner.update_medications_by_name(scope, name, patch)
    }

    fn delete_appointments_by_title(
        &mut self,
        scope: &MassEditScope,
        title: &str,
    ) -> Result<usize, StoreError> {
        self.failure("delete_appointments_by_title")?;
        self.inner.delete_appointments_by_title(scope, title)
    }

    fn delete_medications_by_name(
        &mut self,
        scope: &MassEditScope,
        name: &str,
    ) -> Result<usize, StoreError> {
        self.failure("delete_medications_by_name")?;
        self.inner.delete_medications_by_name(scope, name)
    }
}

#[test]
fn medication_insert_failure_names_the_step_and_keeps_earlier_writes() {
    let mut inner = MemoryStore::new();
    seed_trial(&mut inner, 2, 21);
    seed_templates(&mut inner);
    let mut store = FailingStore {
        inner,
        fail_on: "insert_medications",
    };

    let error = assign_trial(&mut store, &request()).expect_err("medication insert fails");

    match error {
        AssignmentError::Backend { step, .. } => {
            assert_eq!(step, WorkflowStep::CreateMedications);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Enrollment and appointments landed before the failure and stay put:
    // partial completion is explicit behavior, not rolled back.
    let snapshot = store.inner.snapshot();
    assert_eq!(snapshot.patient_trials.len(), 1);
    assert_eq!(snapshot.appointments.len(), 4);
    assert!(snapshot.medications.is_empty());
}

#[test]
fn profile_failure_is_a_warning_not_an_error() {
    let mut inner = MemoryStore::new();
    seed_trial(&mut inner, 2, 21);
    seed_templates(&mut inner);
    let mut store = FailingStore {
        inner,
        fail_on: "update_profile",
    };

    let outcome = assign_trial(&mut store, &request()).expect("assignment still succeeds");

    assert!(matches!(
        outcome.warnings.as_slice(),
        [AssignmentWarning::ProfileUpdateFailed { .. }]
    ));
    assert_eq!(outcome.appointments_created, 4);
}

// ---------------------------------------------------------------------------
// Optional-medication applicator
// ---------------------------------------------------------------------------

fn enrolled_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    seed_trial(&mut store, 2, 21);
    seed_templates(&mut store);
    assign_trial(&mut store, &request()).expect("seed assignment");
    store
}

#[test]
fn no_selection_fails_before_backend_calls() {
    let mut store = MemoryStore::new();

    let error = apply_optional_medication(&mut store, "patient-1", None)
        .expect_err("nothing selected");

    assert!(matches!(error, OptionalMedicationError::NoSelection));
}

#[test]
fn no_active_trial_is_rejected() {
    let mut store = MemoryStore::new();
    seed_trial(&mut store, 2, 21);
    let template = optional_template();

    let error = apply_optional_medication(&mut store, "patient-1", Some(&template))
        .expect_err("patient not enrolled");

    assert!(matches!(
        error,
        OptionalMedicationError::NoActiveTrial(_)
    ));
}

#[test]
fn mandatory_template_cannot_be_applied_post_hoc() {
    let mut store = enrolled_store();
    let template = MedicationTemplate::Mandatory {
        schedule: MedicationSchedule {
            trial_id: "trial-1".to_string(),
            drug_name: "Cisplatin".to_string(),
            frequency: "day 1 of cycle".to_string(),
            scheduled_days: vec![1],
            applicable_cycles: vec![],
            special_conditions: None,
        },
    };

    let error = apply_optional_medication(&mut store, "patient-1", Some(&template))
        .expect_err("mandatory rejected");

    assert!(matches!(error, OptionalMedicationError::NotOptional(_)));
}

#[test]
fn optional_medication_is_additive() {
    let mut store = enrolled_store();
    let before = store.snapshot().medications.len();
    let template = optional_template();

    let outcome = apply_optional_medication(&mut store, "patient-1", Some(&template))
        .expect("application succeeds");

    // Cycle 1 only, days {1, 2}.
    assert_eq!(outcome.medications_created, 2);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.medications.len(), before + 2);
    // Previously inserted mandatory instances are untouched.
    assert_eq!(
        snapshot
            .medications
            .iter()
            .filter(|row| row.name == "Cisplatin")
            .count(),
        before
    );
    // Eligibility category recorded on the profile.
    assert_eq!(
        snapshot.profiles[0].optional_medication_category.as_deref(),
        Some("antiemetic")
    );
    // Rows anchor on the enrollment's start date.
    assert!(
        snapshot
            .medications
            .iter()
            .filter(|row| row.name == "Ondansetron")
            .all(|row| row.scheduled_date >= date(2025, 1, 1)
                && row.scheduled_date <= date(2025, 1, 2))
    );
}

#[test]
fn reapplying_the_same_optional_medication_duplicates_rows() {
    // Idempotence is deliberately not enforced; pinned here so a change to
    // it is a conscious decision.
    let mut store = enrolled_store();
    let template = optional_template();

    apply_optional_medication(&mut store, "patient-1", Some(&template)).expect("first");
    apply_optional_medication(&mut store, "patient-1", Some(&template)).expect("second");

    let ondansetron = store
        .snapshot()
        .medications
        .iter()
        .filter(|row| row.name == "Ondansetron")
        .count();
    assert_eq!(ondansetron, 4);
}

// ---------------------------------------------------------------------------
// Mass-edit
// ---------------------------------------------------------------------------

#[test]
fn mass_update_parses_requirements_into_list_shape() {
    let mut store = enrolled_store();
    let scope = MassEditScope::patient("patient-1");

    let touched = update_appointments(
        &mut store,
        &scope,
        "Blood draw",
        "requirements",
        "item a, item b ,  item c",
    )
    .expect("update succeeds");

    assert_eq!(touched, 4);
    assert!(store.snapshot().appointments.iter().all(|row| {
        row.requirements
            == Some(vec![
                "item a".to_string(),
                "item b".to_string(),
                "item c".to_string(),
            ])
    }));
}

#[test]
fn mass_update_rejects_fields_outside_the_allow_list() {
    let mut store = enrolled_store();
    let scope = MassEditScope::patient("patient-1");

    let error = update_appointments(&mut store, &scope, "Blood draw", "user_id", "someone")
        .expect_err("field not allowed");
    assert!(matches!(error, MassEditError::FieldNotAllowed(_)));

    let error = update_medications(&mut store, &scope, "Cisplatin", "scheduled_date", "2025-01-01")
        .expect_err("field not allowed");
    assert!(matches!(error, MassEditError::FieldNotAllowed(_)));
}

#[test]
fn mass_update_requires_an_identity_value() {
    let mut store = enrolled_store();
    let scope = MassEditScope::patient("patient-1");

    let error = update_appointments(&mut store, &scope, "  ", "title", "Renamed")
        .expect_err("empty identity");
    assert!(matches!(error, MassEditError::EmptyIdentity));
}

#[test]
fn mass_update_medications_within_trial_scope() {
    let mut store = enrolled_store();
    let pt_id = store.snapshot().patient_trials[0].id.clone();
    let scope = MassEditScope::patient_trials(vec![pt_id]);

    let touched =
        update_medications(&mut store, &scope, "Cisplatin", "notes", "infuse over 2h")
            .expect("update succeeds");

    assert_eq!(touched, 2);
    assert!(store.snapshot().medications.iter().all(|row| {
        row.name != "Cisplatin" || row.notes.as_deref() == Some("infuse over 2h")
    }));
}

#[test]
fn mass_delete_is_scoped_and_explicitly_confirmed() {
    let mut store = enrolled_store();
    // A second patient with an identically titled appointment, outside the
    // edit scope.
    store
        .snapshot_mut()
        .appointments
        .push(ScheduledAppointment {
            id: Some("appt-other".to_string()),
            user_id: "patient-2".to_string(),
            date: date(2025, 1, 1),
            time: None,
            title: "Blood draw".to_string(),
            category: None,
            location: None,
            requirements: None,
            fasting_required: false,
            patient_trial_id: "pt-other".to_string(),
        });

    let removed = delete_appointments(
        &mut store,
        &MassEditScope::patient("patient-1"),
        "Blood draw",
        DeleteConfirmation::Confirmed,
    )
    .expect("delete succeeds");

    assert_eq!(removed, 4);
    // The other patient's identically titled row survives.
    let remaining = store.snapshot().appointments.clone();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, "patient-2");
}
