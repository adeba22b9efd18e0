pub mod profile;
pub mod schedule;
pub mod trial;

pub use profile::{PatientProfile, ProfilePatch};
pub use schedule::{
    AppointmentPatch, MedicationPatch, ScheduledAppointment, ScheduledMedicationInstance,
};
pub use trial::{
    AssessmentTemplate, AssignmentStatus, MedicationSchedule, MedicationTemplate, NewPatientTrial,
    PatientTrial, Trial,
};
