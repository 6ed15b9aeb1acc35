use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    group::SelectionPolicy,
    view::{PageSize, ViewerRole},
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Merge dated status and tracker exports into a site roster",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile a primary export with auxiliary exports and write the merged table
    Reconcile(ReconcileArgs),
    /// Filter, search and page through the reconciled table
    View(ViewArgs),
    /// Show how each header of an export is classified
    Inspect(InspectArgs),
}

/// An auxiliary export given on the command line as `policy=path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub policy: SelectionPolicy,
    pub path: PathBuf,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Primary export (CSV or TSV) holding one row per site
    #[arg(short = 'p', long = "primary")]
    pub primary: PathBuf,
    /// Auxiliary export as `status=FILE` or `tracker=FILE` (repeatable)
    #[arg(short = 's', long = "source", value_parser = parse_source_spec, action = clap::ArgAction::Append)]
    pub sources: Vec<SourceSpec>,
    /// YAML run configuration listing sources and view defaults
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character for all inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Write per-source merge reports as JSON to this file
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
    /// Delimiter to use for output (defaults to comma)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Keep rows whose circle equals this value
    #[arg(long)]
    pub circle: Option<String>,
    /// Keep rows whose division equals this value
    #[arg(long)]
    pub division: Option<String>,
    /// Keep rows whose sub-division equals this value
    #[arg(long = "sub-division")]
    pub sub_division: Option<String>,
    /// Keep rows whose device status equals this value
    #[arg(long = "device-status")]
    pub device_status: Option<String>,
    /// Keep rows offline for at least this many days
    #[arg(long = "min-days-offline")]
    pub min_days_offline: Option<f64>,
    /// Case-insensitive text to look for in any visible column
    #[arg(long)]
    pub search: Option<String>,
    /// Rows per page (25, 50, 75 or 100)
    #[arg(long = "page-size", value_parser = parse_page_size)]
    pub page_size: Option<PageSize>,
    /// Page to display, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Viewer role deciding which columns are visible (operator, admin)
    #[arg(long, value_parser = parse_viewer, default_value = "operator")]
    pub viewer: ViewerRole,
    /// Field holding the insertion-ordered id used for newest-first ordering
    #[arg(long = "order-field")]
    pub order_field: Option<String>,
    /// Export every filtered row to this CSV file instead of printing a page
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Print the distinct values available for each filter
    #[arg(long = "list-filters")]
    pub list_filters: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Export to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Also show the column group this policy would select (status, tracker)
    #[arg(long, value_parser = parse_policy)]
    pub policy: Option<SelectionPolicy>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_source_spec(value: &str) -> Result<SourceSpec, String> {
    let (policy, path) = value
        .split_once('=')
        .ok_or_else(|| format!("Expected POLICY=PATH, got '{value}'"))?;
    let path = path.trim();
    if path.is_empty() {
        return Err("Source path cannot be empty".to_string());
    }
    Ok(SourceSpec {
        policy: parse_policy(policy)?,
        path: PathBuf::from(path),
    })
}

pub fn parse_policy(value: &str) -> Result<SelectionPolicy, String> {
    value.parse()
}

pub fn parse_page_size(value: &str) -> Result<PageSize, String> {
    value.parse()
}

pub fn parse_viewer(value: &str) -> Result<ViewerRole, String> {
    value.parse()
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() || !first.is_ascii() {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
            Ok(first as u8)
        }
    }
}
