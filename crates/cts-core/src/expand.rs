//! Template expansion: materialize concrete dated rows from a trial's
//! assessment and medication templates.
//!
//! Each template expands over the cross product of its applicable cycles and
//! scheduled days, with dates resolved through [`crate::offset::resolve_date`].
//! Iteration is cycles ascending, then days ascending, so repeated runs over
//! identical inputs produce identical row sequences.
//!
//! The medication path collapses duplicate cycle/day entries with set
//! semantics before taking the cross product; the assessment path keeps
//! duplicates. Downstream consumers depend on duplicate assessment rows, so
//! the asymmetry is deliberate and pinned by tests in both directions.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use cts_model::{
    AssessmentTemplate, MedicationSchedule, MedicationTemplate, ScheduledAppointment,
    ScheduledMedicationInstance, Trial,
};

use crate::offset::resolve_date;

/// Cycles a template applies to, ascending. An empty list means every cycle
/// of the trial. Duplicate entries are kept (assessment semantics).
fn assessment_cycles(applicable: &[u32], trial: &Trial) -> Vec<u32> {
    if applicable.is_empty() {
        (1..=trial.number_of_cycles).collect()
    } else {
        let mut cycles = applicable.to_vec();
        cycles.sort_unstable();
        cycles
    }
}

/// Cycles a medication schedule applies to, deduplicated and ascending.
fn medication_cycles(applicable: &[u32], trial: &Trial) -> BTreeSet<u32> {
    if applicable.is_empty() {
        (1..=trial.number_of_cycles).collect()
    } else {
        applicable.iter().copied().collect()
    }
}

/// Expand assessment templates into concrete appointment rows.
///
/// Emits one row per (cycle, day) pair of each template's cross product.
/// Duplicate cycle or day entries are kept: a template listing day 1 twice
/// yields two rows per cycle. The template's free-text requirements string
/// is wrapped into a single-element list, not comma-split.
///
/// A trial without a usable cycle structure expands to an empty vector; the
/// caller surfaces that as a warning, not a failure.
pub fn expand_assessments(
    templates: &[AssessmentTemplate],
    trial: &Trial,
    start_date: NaiveDate,
    patient_id: &str,
    patient_trial_id: &str,
) -> Vec<ScheduledAppointment> {
    if !trial.has_cycle_structure() {
        debug!(trial_id = %trial.id, "trial has no usable cycle structure; skipping expansion");
        return Vec::new();
    }
    let mut rows = Vec::new();
    for template in templates {
        let cycles = assessment_cycles(&template.applicable_cycles, trial);
        let mut days = template.scheduled_days.clone();
        days.sort_unstable();
        for &cycle in &cycles {
            for &day in &days {
                let Some(date) = resolve_date(start_date, cycle, day, trial.cycle_duration_days)
                else {
                    continue;
                };
                rows.push(ScheduledAppointment {
                    id: None,
                    user_id: patient_id.to_string(),
                    date,
                    time: None,
                    title: template.name.clone(),
                    category: template.category.clone(),
                    location: None,
                    requirements: template
                        .requirements
                        .as_ref()
                        .map(|text| vec![text.clone()]),
                    fasting_required: template.fasting_required,
                    patient_trial_id: patient_trial_id.to_string(),
                });
            }
        }
    }
    debug!(
        trial_id = %trial.id,
        templates = templates.len(),
        rows = rows.len(),
        "expanded assessment templates"
    );
    rows
}

/// Expand one medication schedule into concrete medication instance rows.
///
/// Cycle and day lists are collapsed with set semantics before the cross
/// product, unlike the assessment path. The schedule's special conditions
/// become the instance notes.
pub fn expand_single_medication(
    schedule: &MedicationSchedule,
    trial: &Trial,
    start_date: NaiveDate,
    patient_id: &str,
    patient_trial_id: &str,
) -> Vec<ScheduledMedicationInstance> {
    if !trial.has_cycle_structure() {
        debug!(trial_id = %trial.id, "trial has no usable cycle structure; skipping expansion");
        return Vec::new();
    }
    let cycles = medication_cycles(&schedule.applicable_cycles, trial);
    let days: BTreeSet<u32> = schedule.scheduled_days.iter().copied().collect();
    let mut rows = Vec::new();
    for &cycle in &cycles {
        for &day in &days {
            let Some(date) = resolve_date(start_date, cycle, day, trial.cycle_duration_days)
            else {
                continue;
            };
            rows.push(ScheduledMedicationInstance {
                id: None,
                user_id: patient_id.to_string(),
                name: schedule.drug_name.clone(),
                frequency: schedule.frequency.clone(),
                scheduled_date: date,
                notes: schedule.special_conditions.clone(),
                patient_trial_id: patient_trial_id.to_string(),
            });
        }
    }
    rows
}

/// Expand medication templates into concrete medication instance rows.
///
/// Expands every template it is given; the assignment workflow filters out
/// optional templates before calling this, since those are applied post-hoc.
pub fn expand_medications(
    templates: &[MedicationTemplate],
    trial: &Trial,
    start_date: NaiveDate,
    patient_id: &str,
    patient_trial_id: &str,
) -> Vec<ScheduledMedicationInstance> {
    let rows: Vec<ScheduledMedicationInstance> = templates
        .iter()
        .flat_map(|template| {
            expand_single_medication(
                template.schedule(),
                trial,
                start_date,
                patient_id,
                patient_trial_id,
            )
        })
        .collect();
    debug!(
        trial_id = %trial.id,
        templates = templates.len(),
        rows = rows.len(),
        "expanded medication templates"
    );
    rows
}
