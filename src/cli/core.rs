
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use log::info;
use std::path::Path;

use crate::cli::compare::CompareSettings;
use crate::cli::spectrum::SpectrumSettings;
use crate::parsing::table_loader::ColumnConfig;
use crate::util::json_io::load_json;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.2.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.2.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2019-{}     varsieve developers
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// varsieve, a tool for reconciling somatic variant call sets and profiling their mutation spectra.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Compares two variant tables and reports the set overlap
    Compare(Box<CompareSettings>),
    /// Counts the mutation spectrum of a variant table
    Spectrum(Box<SpectrumSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) -> anyhow::Result<()> {
    if let Some(filename) = opt_filename {
        if !filename.exists() {
            bail!("{} does not exist: \"{}\"", label, filename.display());
        }
    }

    // file either was not specified OR it exists
    Ok(())
}

/// Loads the user column mapping, or the MAF-style defaults if none was provided
/// # Arguments
/// * `opt_filename` - optional JSON column mapping
pub fn load_column_config(opt_filename: Option<&Path>) -> anyhow::Result<ColumnConfig> {
    match opt_filename {
        Some(filename) => {
            info!("Loading column mapping from {filename:?}...");
            load_json(filename)
                .with_context(|| format!("Error while loading column mapping from {filename:?}:"))
        },
        None => Ok(ColumnConfig::default())
    }
}

/// Translates the common escaped forms of a delimiter into the character
pub fn unescape_delimiter(delimiter: &str) -> String {
    match delimiter {
        "\\t" | "tab" => "\t".to_string(),
        "space" => " ".to_string(),
        other => other.to_string()
    }
}
