//! CLI argument definitions for the scheduling toolkit.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ctsched",
    version,
    about = "Clinical-trial schedule expansion toolkit",
    long_about = "Expand trial templates into concrete patient schedules.\n\n\
                  Previews a trial definition's full schedule, runs trial\n\
                  assignments against a JSON-backed store, and applies\n\
                  optional medications to enrolled patients."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient identifiers in log output.
    ///
    /// Off by default: patient ids are PHI and appear as [REDACTED] unless
    /// this flag is set.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Preview the full schedule a trial definition expands to.
    Expand(ExpandArgs),

    /// Assign a patient to a trial and materialize the schedule.
    Assign(AssignArgs),

    /// Apply one optional medication to an enrolled patient.
    ApplyOptional(ApplyOptionalArgs),
}

#[derive(Parser)]
pub struct ExpandArgs {
    /// Trial definition file (trial, assessments, medications) as JSON.
    #[arg(value_name = "TRIAL_JSON")]
    pub trial_file: PathBuf,

    /// Start date anchoring the schedule.
    #[arg(long = "start-date", value_name = "YYYY-MM-DD")]
    pub start_date: NaiveDate,

    /// Patient id to stamp onto the previewed rows.
    #[arg(long = "patient", value_name = "ID", default_value = "preview")]
    pub patient_id: String,

    /// Emit the expanded rows as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct AssignArgs {
    /// Store snapshot file (read and rewritten in place).
    #[arg(value_name = "STORE_JSON")]
    pub store_file: PathBuf,

    /// Patient to enroll.
    #[arg(long = "patient", value_name = "ID")]
    pub patient_id: String,

    /// Trial to enroll into.
    #[arg(long = "trial", value_name = "ID")]
    pub trial_id: String,

    /// Clinician performing the assignment.
    #[arg(long = "assigned-by", value_name = "ID", default_value = "cli")]
    pub assigned_by: String,

    /// Enrollment start date (defaults to today).
    #[arg(long = "start-date", value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Parser)]
pub struct ApplyOptionalArgs {
    /// Store snapshot file (read and rewritten in place).
    #[arg(value_name = "STORE_JSON")]
    pub store_file: PathBuf,

    /// Enrolled patient to apply the medication to.
    #[arg(long = "patient", value_name = "ID")]
    pub patient_id: String,

    /// Drug name of the optional-medication template to apply.
    #[arg(long = "drug", value_name = "NAME")]
    pub drug_name: String,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
