
use anyhow::bail;
use clap::{Args, ValueEnum};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_optional_filename, check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::indel_classifier::DEFAULT_PROJECT;
use crate::sequence_provider::GenomeAssembly;

/// The spectra that can be counted
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, ValueEnum)]
pub enum SpectrumKind {
    /// 96 trinucleotide substitution contexts; requires a reference
    #[default]
    Snv,
    /// Structural variant type and length bins
    Sv,
    /// ID83 indel features from the external matrix generator
    Indel,
}

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct SpectrumSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    varsieve_version: String,

    /// Variant table to count
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TABLE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Reference FASTA, or a folder holding <assembly>.fa; required for SNV spectra
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "FASTA")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference: Option<PathBuf>,

    /// Optional JSON column mapping; MAF-style defaults otherwise
    #[clap(long = "column-config")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub column_config: Option<PathBuf>,

    /// Output spectrum table (tsv/csv)
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_filename: PathBuf,

    /// Optional output spectrum as JSON
    #[clap(long = "output-json")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_json: Option<PathBuf>,

    /// Optional listing of records left out of the spectrum (tsv/csv)
    #[clap(long = "output-skipped")]
    #[clap(value_name = "FILE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub skipped_filename: Option<PathBuf>,

    /// Optional output debug folder
    #[clap(long = "output-debug")]
    #[clap(value_name = "DIR")]
    #[clap(help_heading = Some("Input/Output"))]
    pub debug_folder: Option<PathBuf>,

    /// The spectrum to count
    #[clap(short = 'k')]
    #[clap(long = "kind")]
    #[clap(value_enum)]
    #[clap(default_value = "snv")]
    #[clap(help_heading = Some("Spectrum parameters"))]
    pub kind: SpectrumKind,

    /// Genome assembly of the input (GRCh37 or GRCh38)
    #[clap(long = "genome-assembly")]
    #[clap(value_name = "ASSEMBLY")]
    #[clap(default_value = "GRCh37")]
    #[clap(help_heading = Some("Spectrum parameters"))]
    pub genome_assembly: GenomeAssembly,

    /// Executable used for indel classification [default: python3 with SigProfilerMatrixGenerator]
    #[clap(long = "matrix-generator")]
    #[clap(value_name = "EXE")]
    #[clap(help_heading = Some("Indel parameters"))]
    pub matrix_generator: Option<PathBuf>,

    /// Project label handed to the indel classifier
    #[clap(long = "project")]
    #[clap(value_name = "LABEL")]
    #[clap(default_value = DEFAULT_PROJECT)]
    #[clap(help_heading = Some("Indel parameters"))]
    pub project: String,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_spectrum_settings(mut settings: SpectrumSettings) -> anyhow::Result<SpectrumSettings> {
    // hard code the version in
    settings.varsieve_version = FULL_VERSION.clone();
    info!("varsieve version: {:?}", &settings.varsieve_version);
    info!("Sub-command: spectrum");
    info!("Inputs:");

    check_required_filename(&settings.input_filename, "Input table")?;
    check_optional_filename(settings.column_config.as_deref(), "Column config")?;
    check_optional_filename(settings.reference.as_deref(), "Reference")?;

    info!("\tInput table: {:?}", &settings.input_filename);
    if let Some(filename) = settings.column_config.as_deref() {
        info!("\tColumn config: {filename:?}");
    } else {
        info!("\tColumn config: default");
    }
    match settings.reference.as_deref() {
        Some(reference) => info!("\tReference: {reference:?}"),
        None => {
            if settings.kind == SpectrumKind::Snv {
                bail!("--reference is required for SNV spectra");
            }
            info!("\tReference: None");
        }
    }

    info!("Outputs:");
    info!("\tSpectrum: {:?}", &settings.output_filename);
    if let Some(filename) = settings.output_json.as_deref() {
        info!("\tSpectrum JSON: {filename:?}");
    }
    if let Some(filename) = settings.skipped_filename.as_deref() {
        info!("\tSkipped records: {filename:?}");
    }
    if let Some(debug_folder) = settings.debug_folder.as_ref() {
        info!("\tDebug folder: {debug_folder:?}");
    }

    info!("Spectrum parameters:");
    info!("\tKind: {:?}", settings.kind);
    info!("\tGenome assembly: {}", settings.genome_assembly);
    if settings.kind == SpectrumKind::Indel {
        if let Some(program) = settings.matrix_generator.as_deref() {
            info!("\tMatrix generator: {program:?}");
        } else {
            info!("\tMatrix generator: default");
        }
        if settings.project.is_empty() {
            bail!("--project must not be empty");
        }
        info!("\tProject: {:?}", settings.project);
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings(kind: SpectrumKind) -> SpectrumSettings {
        SpectrumSettings {
            input_filename: PathBuf::from("test_data/tables/svs.csv"),
            output_filename: PathBuf::from("spectrum.tsv"),
            project: DEFAULT_PROJECT.to_string(),
            kind,
            ..Default::default()
        }
    }

    #[test]
    fn test_sv_without_reference() {
        let settings = check_spectrum_settings(base_settings(SpectrumKind::Sv)).unwrap();
        assert_eq!(settings.genome_assembly, GenomeAssembly::GRCh37);
    }

    #[test]
    fn test_snv_requires_reference() {
        assert!(check_spectrum_settings(base_settings(SpectrumKind::Snv)).is_err());
    }

    #[test]
    fn test_indel_requires_project() {
        let mut settings = base_settings(SpectrumKind::Indel);
        settings.project = String::new();
        assert!(check_spectrum_settings(settings).is_err());
    }
}
