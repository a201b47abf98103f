
use anyhow::bail;
use clap::{Args, ValueEnum};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::breakpoint_matcher::DEFAULT_WINDOW_SIZE;
use crate::cli::core::{check_optional_filename, check_required_filename, unescape_delimiter, AFTER_HELP, FULL_VERSION};

/// The kinds of tables that can be compared
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, ValueEnum)]
pub enum CompareKind {
    /// Point mutations, exact (chromosome, position, ref, alt) matching
    #[default]
    Snv,
    /// Structural variants, windowed breakpoint matching
    Sv,
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct CompareSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    varsieve_version: String,

    /// First variant table (A), e.g. the reference call set
    #[clap(required = true)]
    #[clap(short = 'a')]
    #[clap(long = "table-a")]
    #[clap(value_name = "TABLE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub table_a: PathBuf,

    /// Second variant table (B), e.g. the call set under test
    #[clap(required = true)]
    #[clap(short = 'b')]
    #[clap(long = "table-b")]
    #[clap(value_name = "TABLE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub table_b: PathBuf,

    /// Optional JSON column mapping; MAF-style defaults otherwise
    #[clap(long = "column-config")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub column_config: Option<PathBuf>,

    /// Output file for the summary line [default: stdout]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: Option<PathBuf>,

    /// Optional per-row match listing (tsv/csv)
    #[clap(long = "output-partitions")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub partitions_filename: Option<PathBuf>,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// The type of variant in both tables
    #[clap(short = 'k')]
    #[clap(long = "kind")]
    #[clap(value_enum)]
    #[clap(default_value = "snv")]
    #[clap(help_heading = Some("Compare parameters"))]
    pub kind: CompareKind,

    /// Maximum distance (bp) between corresponding SV breakends
    #[clap(long = "window")]
    #[clap(value_name = "BP")]
    #[clap(default_value_t = DEFAULT_WINDOW_SIZE)]
    #[clap(help_heading = Some("Compare parameters"))]
    pub window_size: u64,

    /// Sample name prepended to the summary line
    #[clap(long = "name")]
    #[clap(value_name = "NAME")]
    #[clap(help_heading = Some("Summary format"))]
    pub name: Option<String>,

    /// Disables the header line of the summary
    #[clap(long = "no-header")]
    #[clap(help_heading = Some("Summary format"))]
    pub no_header: bool,

    /// Field delimiter of the summary; "\t", "tab", and "space" are accepted
    #[clap(long = "delimiter")]
    #[clap(value_name = "DELIM")]
    #[clap(default_value = "\\t")]
    #[clap(help_heading = Some("Summary format"))]
    pub delimiter: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_compare_settings(mut settings: CompareSettings) -> anyhow::Result<CompareSettings> {
    // hard code the version in
    settings.varsieve_version = FULL_VERSION.clone();
    info!("varsieve version: {:?}", &settings.varsieve_version);
    info!("Sub-command: compare");
    info!("Inputs:");

    // check for all the required input files
    check_required_filename(&settings.table_a, "Table A")?;
    check_required_filename(&settings.table_b, "Table B")?;
    check_optional_filename(settings.column_config.as_deref(), "Column config")?;

    // dump stuff to the logger
    info!("\tTable A: {:?}", &settings.table_a);
    info!("\tTable B: {:?}", &settings.table_b);
    if let Some(filename) = settings.column_config.as_deref() {
        info!("\tColumn config: {filename:?}");
    } else {
        info!("\tColumn config: default");
    }

    // outputs
    info!("Outputs:");
    if let Some(filename) = settings.output_filename.as_deref() {
        info!("\tSummary: {filename:?}");
    } else {
        info!("\tSummary: stdout");
    }
    if let Some(filename) = settings.partitions_filename.as_deref() {
        info!("\tPartitions: {filename:?}");
    }
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    info!("Compare parameters:");
    info!("\tKind: {:?}", settings.kind);
    if settings.kind == CompareKind::Sv {
        info!("\tWindow size: {}", settings.window_size);
    }

    settings.delimiter = unescape_delimiter(&settings.delimiter);
    if settings.delimiter.is_empty() {
        bail!("--delimiter must not be empty");
    }
    if let Some(name) = settings.name.as_deref() {
        if name.contains(settings.delimiter.as_str()) {
            bail!("--name {name:?} contains the summary delimiter {:?}", settings.delimiter);
        }
        info!("\tName: {name:?}");
    }
    info!("\tHeader: {}", if settings.no_header { "DISABLED" } else { "ENABLED" });

    Ok(settings)
}
