//! Scoped mass-update and mass-delete over derived rows.
//!
//! Rows expanded from the same template share a title (appointments) or
//! name (medications); these operations edit or delete every instance of
//! that logical item inside a scope in one call. Field names are checked
//! against the entity's allow-list before any backend call, and deletes
//! require an explicit confirmation value so no silent default path exists.

use tracing::info;

use cts_core::massedit::{
    AppointmentField, MedicationField, appointment_patch, medication_patch,
};
use cts_store::{MassEditScope, TrialStore};

use crate::error::MassEditError;

/// Explicit acknowledgement that a mass-delete is permanent.
///
/// Deliberately has no `Default` impl: the caller's confirmation step must
/// construct it on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteConfirmation {
    Confirmed,
}

/// Set one allow-listed field on every appointment sharing `title` within
/// the scope. Returns the number of rows touched.
///
/// The requirements field takes a comma-separated string and stores it
/// split, trimmed, with empty segments dropped.
pub fn update_appointments<S: TrialStore>(
    store: &mut S,
    scope: &MassEditScope,
    title: &str,
    field: &str,
    value: &str,
) -> Result<usize, MassEditError> {
    if title.trim().is_empty() {
        return Err(MassEditError::EmptyIdentity);
    }
    let field: AppointmentField = field.parse().map_err(MassEditError::FieldNotAllowed)?;
    let patch = appointment_patch(field, value);
    let touched = store.update_appointments_by_title(scope, title, &patch)?;
    info!(%field, touched, "mass-updated appointments");
    Ok(touched)
}

/// Set one allow-listed field on every medication instance sharing `name`
/// within the scope. Returns the number of rows touched.
pub fn update_medications<S: TrialStore>(
    store: &mut S,
    scope: &MassEditScope,
    name: &str,
    field: &str,
    value: &str,
) -> Result<usize, MassEditError> {
    if name.trim().is_empty() {
        return Err(MassEditError::EmptyIdentity);
    }
    let field: MedicationField = field.parse().map_err(MassEditError::FieldNotAllowed)?;
    let patch = medication_patch(field, value);
    let touched = store.update_medications_by_name(scope, name, &patch)?;
    info!(%field, touched, "mass-updated medications");
    Ok(touched)
}

/// Permanently delete every appointment sharing `title` within the scope.
pub fn delete_appointments<S: TrialStore>(
    store: &mut S,
    scope: &MassEditScope,
    title: &str,
    _confirmation: DeleteConfirmation,
) -> Result<usize, MassEditError> {
    if title.trim().is_empty() {
        return Err(MassEditError::EmptyIdentity);
    }
    let removed = store.delete_appointments_by_title(scope, title)?;
    info!(removed, "mass-deleted appointments");
    Ok(removed)
}

/// Permanently delete every medication instance sharing `name` within the
/// scope.
pub fn delete_medications<S: TrialStore>(
    store: &mut S,
    scope: &MassEditScope,
    name: &str,
    _confirmation: DeleteConfirmation,
) -> Result<usize, MassEditError> {
    if name.trim().is_empty() {
        return Err(MassEditError::EmptyIdentity);
    }
    let removed = store.delete_medications_by_name(scope, name)?;
    info!(removed, "mass-deleted medications");
    Ok(removed)
}
