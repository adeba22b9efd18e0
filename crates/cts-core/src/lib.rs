//! Pure scheduling core: offset arithmetic, template expansion, mass-edit
//! field parsing, and the template-authoring draft reducer.
//!
//! Nothing in this crate performs I/O; the store contract and the workflows
//! that persist expanded rows live in `cts-store` and `cts-assign`.

pub mod draft;
pub mod expand;
pub mod massedit;
pub mod offset;

pub use draft::{DraftAction, TemplateDraft};
pub use expand::{expand_assessments, expand_medications, expand_single_medication};
pub use massedit::{
    AppointmentField, MedicationField, appointment_patch, medication_patch, parse_requirements,
};
pub use offset::{parse_day_token, resolve_date};
