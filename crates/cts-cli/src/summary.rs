use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use cts_assign::{AssignmentOutcome, AssignmentWarning, OptionalMedicationOutcome};

use crate::commands::ExpandResult;

/// A schedule row flattened for display, appointments and medications
/// interleaved by date.
struct ScheduleLine {
    date: chrono::NaiveDate,
    kind: &'static str,
    title: String,
    detail: String,
}

pub fn print_expand(result: &ExpandResult) {
    println!("Trial: {}", result.trial_name);
    println!(
        "Rows: {} appointments, {} medication instances",
        result.appointments.len(),
        result.medications.len()
    );

    let mut lines: Vec<ScheduleLine> = Vec::new();
    for row in &result.appointments {
        let mut detail = row.category.clone().unwrap_or_default();
        if row.fasting_required {
            if !detail.is_empty() {
                detail.push_str(", ");
            }
            detail.push_str("fasting");
        }
        lines.push(ScheduleLine {
            date: row.date,
            kind: "assessment",
            title: row.title.clone(),
            detail,
        });
    }
    for row in &result.medications {
        lines.push(ScheduleLine {
            date: row.scheduled_date,
            kind: "medication",
            title: row.name.clone(),
            detail: row.frequency.clone(),
        });
    }
    lines.sort_by(|a, b| (a.date, a.kind, &a.title).cmp(&(b.date, b.kind, &b.title)));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Date"),
        header_cell("Kind"),
        header_cell("Title"),
        header_cell("Detail"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for line in lines {
        table.add_row(vec![
            line.date.to_string(),
            line.kind.to_string(),
            line.title,
            line.detail,
        ]);
    }
    println!("{table}");
}

pub fn print_assignment(outcome: &AssignmentOutcome) {
    println!("Assigned: patient trial {}", outcome.patient_trial.id);
    println!("Start date: {}", outcome.patient_trial.start_date);
    println!(
        "Created: {} appointments, {} medication instances",
        outcome.appointments_created, outcome.medications_created
    );
    print_warnings(&outcome.warnings);
}

pub fn print_optional(outcome: &OptionalMedicationOutcome) {
    println!(
        "Applied: {} medication instances under patient trial {}",
        outcome.medications_created, outcome.patient_trial_id
    );
    print_warnings(&outcome.warnings);
}

fn print_warnings(warnings: &[AssignmentWarning]) {
    for warning in warnings {
        match warning {
            AssignmentWarning::NoRowsToInsert { kind } => {
                println!("warning: no {} rows to insert", kind.as_str());
            }
            AssignmentWarning::ProfileUpdateFailed { message } => {
                println!("warning: profile update failed: {message}");
            }
        }
    }
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}
