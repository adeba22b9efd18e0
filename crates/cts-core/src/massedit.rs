//! Field allow-lists and value parsing for mass-edit operations.
//!
//! Mass-edit applies one field change to every derived row sharing a title
//! (appointments) or name (medications) within a scope. Only allow-listed
//! fields may be edited; arbitrary field names are rejected before any
//! backend call.

use std::fmt;
use std::str::FromStr;

use cts_model::{AppointmentPatch, MedicationPatch};

/// Appointment fields eligible for mass-edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentField {
    Title,
    Category,
    Location,
    Requirements,
}

impl AppointmentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentField::Title => "title",
            AppointmentField::Category => "category",
            AppointmentField::Location => "location",
            AppointmentField::Requirements => "requirements",
        }
    }
}

impl fmt::Display for AppointmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AppointmentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(AppointmentField::Title),
            "category" => Ok(AppointmentField::Category),
            "location" => Ok(AppointmentField::Location),
            "requirements" => Ok(AppointmentField::Requirements),
            _ => Err(format!("Appointment field cannot be mass-edited: {}", s)),
        }
    }
}

/// Medication fields eligible for mass-edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MedicationField {
    Name,
    Frequency,
    Notes,
}

impl MedicationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationField::Name => "name",
            MedicationField::Frequency => "frequency",
            MedicationField::Notes => "notes",
        }
    }
}

impl fmt::Display for MedicationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MedicationField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(MedicationField::Name),
            "frequency" => Ok(MedicationField::Frequency),
            "notes" => Ok(MedicationField::Notes),
            _ => Err(format!("Medication field cannot be mass-edited: {}", s)),
        }
    }
}

/// Split a comma-separated requirements string into the stored list shape:
/// split on commas, trim each segment, drop empty segments.
///
/// This matches the `requirements: Vec<String>` shape on appointment rows.
/// It is applied only when mass-editing the requirements field; initial
/// expansion wraps the template string whole, without splitting.
pub fn parse_requirements(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Build the patch for one allow-listed appointment field.
pub fn appointment_patch(field: AppointmentField, value: &str) -> AppointmentPatch {
    let mut patch = AppointmentPatch::default();
    match field {
        AppointmentField::Title => patch.title = Some(value.to_string()),
        AppointmentField::Category => patch.category = Some(value.to_string()),
        AppointmentField::Location => patch.location = Some(value.to_string()),
        AppointmentField::Requirements => patch.requirements = Some(parse_requirements(value)),
    }
    patch
}

/// Build the patch for one allow-listed medication field.
pub fn medication_patch(field: MedicationField, value: &str) -> MedicationPatch {
    let mut patch = MedicationPatch::default();
    match field {
        MedicationField::Name => patch.name = Some(value.to_string()),
        MedicationField::Frequency => patch.frequency = Some(value.to_string()),
        MedicationField::Notes => patch.notes = Some(value.to_string()),
    }
    patch
}
