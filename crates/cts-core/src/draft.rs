//! Draft value-object for authoring assessment and medication templates.
//!
//! Template authoring touches a dozen interdependent fields. Instead of many
//! independent mutable cells, the draft is a single value with named
//! transitions applied through [`TemplateDraft::apply`], and finalizers that
//! normalize day tokens and cycle sets into a persistable template.

use std::collections::BTreeSet;

use cts_model::{AssessmentTemplate, MedicationSchedule, MedicationTemplate};

use crate::offset::parse_day_token;

/// In-progress template edits. Cycle and day selections are sets: toggling
/// an already-selected value deselects it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDraft {
    pub name: String,
    pub category: Option<String>,
    pub frequency: Option<String>,
    pub requirements: Option<String>,
    pub special_conditions: Option<String>,
    pub fasting_required: bool,
    pub cycles: BTreeSet<u32>,
    /// Raw day tokens as entered ("3", "d3", "day 3"); parsed and
    /// non-numeric tokens dropped at finalization.
    pub day_tokens: Vec<String>,
}

/// Named transitions on a [`TemplateDraft`].
#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    SetName(String),
    SetCategory(Option<String>),
    SetFrequency(Option<String>),
    SetRequirements(Option<String>),
    SetSpecialConditions(Option<String>),
    SetFasting(bool),
    ToggleCycle(u32),
    AddDayToken(String),
    RemoveDayToken(String),
    Reset,
}

impl TemplateDraft {
    pub fn apply(&mut self, action: DraftAction) {
        match action {
            DraftAction::SetName(name) => self.name = name,
            DraftAction::SetCategory(category) => self.category = category,
            DraftAction::SetFrequency(frequency) => self.frequency = frequency,
            DraftAction::SetRequirements(requirements) => self.requirements = requirements,
            DraftAction::SetSpecialConditions(conditions) => self.special_conditions = conditions,
            DraftAction::SetFasting(fasting) => self.fasting_required = fasting,
            DraftAction::ToggleCycle(cycle) => {
                if !self.cycles.remove(&cycle) {
                    self.cycles.insert(cycle);
                }
            }
            DraftAction::AddDayToken(token) => {
                if !self.day_tokens.contains(&token) {
                    self.day_tokens.push(token);
                }
            }
            DraftAction::RemoveDayToken(token) => {
                self.day_tokens.retain(|existing| existing != &token);
            }
            DraftAction::Reset => *self = TemplateDraft::default(),
        }
    }

    /// Day tokens parsed to 1-based day numbers, sorted, non-numeric tokens
    /// dropped.
    pub fn scheduled_days(&self) -> Vec<u32> {
        let days: BTreeSet<u32> = self
            .day_tokens
            .iter()
            .filter_map(|token| parse_day_token(token))
            .collect();
        days.into_iter().collect()
    }

    /// Finalize the draft as an assessment template for a trial.
    pub fn into_assessment(self, trial_id: &str) -> AssessmentTemplate {
        let scheduled_days = self.scheduled_days();
        AssessmentTemplate {
            trial_id: trial_id.to_string(),
            name: self.name,
            category: self.category,
            scheduled_days,
            applicable_cycles: self.cycles.into_iter().collect(),
            requirements: self.requirements,
            fasting_required: self.fasting_required,
        }
    }

    /// Finalize the draft as a medication template for a trial. The draft
    /// name is the drug name; supplying an eligibility category produces the
    /// optional flavor.
    pub fn into_medication(
        self,
        trial_id: &str,
        eligibility_category: Option<String>,
    ) -> MedicationTemplate {
        let scheduled_days = self.scheduled_days();
        let schedule = MedicationSchedule {
            trial_id: trial_id.to_string(),
            drug_name: self.name,
            frequency: self.frequency.unwrap_or_default(),
            scheduled_days,
            applicable_cycles: self.cycles.into_iter().collect(),
            special_conditions: self.special_conditions,
        };
        match eligibility_category {
            Some(eligibility_category) => MedicationTemplate::Optional {
                schedule,
                eligibility_category,
            },
            None => MedicationTemplate::Mandatory { schedule },
        }
    }
}
