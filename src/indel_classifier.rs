/*!
# Indel classifier
Contract with the external indel classification tool.
Indels are written to a VCF in a uniquely named scratch folder, the tool is run synchronously, and its ID83 matrix is read back.
The scratch folder is removed on every exit path, including tool failures.
*/
use derive_builder::Builder;
use log::{debug, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::data_types::spectrum::{Spectrum, SpectrumError};
use crate::data_types::variant_table::VariantTable;
use crate::data_types::variants::IndelVariant;
use crate::sequence_provider::GenomeAssembly;

/// Name of the VCF handed to the tool
pub const INPUT_VCF_NAME: &str = "indels.vcf";
/// Default project label; the tool uses it to name its output matrices
pub const DEFAULT_PROJECT: &str = "indels";

/// Invokes SigProfilerMatrixGenerator; trailing arguments are project, assembly, and input folder
const MATRIX_GENERATOR_SCRIPT: &str = "import sys
from SigProfilerMatrixGenerator.scripts import SigProfilerMatrixGeneratorFunc as matGen
matGen.SigProfilerMatrixGeneratorFunc(sys.argv[1], sys.argv[2], sys.argv[3])";

#[derive(thiserror::Error, Debug)]
pub enum ExternalToolFailure {
    #[error("I/O error while preparing indel classification: {0}")]
    Io(#[from] std::io::Error),
    #[error("error while writing or reading indel tables: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to launch {program:?}: {source}")]
    Spawn { program: PathBuf, source: std::io::Error },
    #[error("external indel classifier exited with {status}")]
    ExitStatus { status: String },
    #[error("external indel classifier produced no matrix at {path:?}")]
    MissingOutput { path: PathBuf },
    #[error("malformed indel matrix row {row}: {detail}")]
    MalformedOutput { row: usize, detail: String },
    #[error("external indel classifier reported an unexpected feature: {0}")]
    UnknownCategory(#[from] SpectrumError),
}

/// Anything that can turn a table of indels into ID83 counts
pub trait IndelClassifier {
    /// Classifies every indel and returns counts over the full indel vocabulary.
    /// # Errors
    /// * whenever the backend cannot produce a complete, well-formed result
    fn classify(&self, indels: &VariantTable<IndelVariant>, assembly: GenomeAssembly) -> Result<Spectrum, ExternalToolFailure>;
}

/// Runs the matrix generator as a subprocess
#[derive(Builder, Clone, Debug)]
#[builder(default)]
pub struct MatrixGeneratorCommand {
    /// The executable to run
    #[builder(setter(into))]
    program: PathBuf,
    /// Arguments placed before the project, assembly, and folder arguments
    args: Vec<String>,
    /// Project label passed to the tool
    #[builder(setter(into))]
    project: String,
}

impl Default for MatrixGeneratorCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("python3"),
            args: vec!["-c".to_string(), MATRIX_GENERATOR_SCRIPT.to_string()],
            project: DEFAULT_PROJECT.to_string()
        }
    }
}

impl MatrixGeneratorCommand {
    /// Where the tool places its ID83 matrix for a given input folder
    fn matrix_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join("output").join("ID").join(format!("{}.ID83.all", self.project))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl IndelClassifier for MatrixGeneratorCommand {
    fn classify(&self, indels: &VariantTable<IndelVariant>, assembly: GenomeAssembly) -> Result<Spectrum, ExternalToolFailure> {
        // unique per call so that concurrent runs never share a folder; removed when dropped
        let work_dir = tempfile::Builder::new()
            .prefix("varsieve_indels_")
            .tempdir()?;
        let vcf_fn = work_dir.path().join(INPUT_VCF_NAME);
        write_indel_vcf(indels, &vcf_fn)?;

        debug!("Running {:?} on {} indels in {:?}...", self.program, indels.len(), work_dir.path());
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.project)
            .arg(assembly.to_string())
            .arg(work_dir.path())
            .output()
            .map_err(|source| ExternalToolFailure::Spawn { program: self.program.clone(), source })?;

        if !output.status.success() {
            debug!("Indel classifier stderr: {}", String::from_utf8_lossy(&output.stderr));
            return Err(ExternalToolFailure::ExitStatus { status: output.status.to_string() });
        }

        let spectrum = read_indel_matrix(&self.matrix_path(work_dir.path()))?;

        let work_path = work_dir.path().to_path_buf();
        if let Err(e) = work_dir.close() {
            warn!("Failed to remove scratch folder {work_path:?}: {e}");
        }
        Ok(spectrum)
    }
}

/// Writes the minimal VCF the tool expects: a single header line and CHROM, POS, ID, REF, ALT
pub fn write_indel_vcf(indels: &VariantTable<IndelVariant>, vcf_fn: &Path) -> Result<(), ExternalToolFailure> {
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(vcf_fn)?;
    csv_writer.write_record(["#CHROM", "POS", "ID", "REF", "ALT"])?;
    for (_row_id, indel) in indels.iter() {
        let position = indel.position().to_string();
        csv_writer.write_record([indel.chrom(), position.as_str(), ".", indel.ref_allele(), indel.alt_allele()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Parses an ID83 matrix (feature code, count) into a full indel spectrum.
/// # Errors
/// * if the file is absent, a row is malformed, or a feature code is outside the vocabulary
pub fn read_indel_matrix(matrix_fn: &Path) -> Result<Spectrum, ExternalToolFailure> {
    if !matrix_fn.exists() {
        return Err(ExternalToolFailure::MissingOutput { path: matrix_fn.to_path_buf() });
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(matrix_fn)?;

    let mut spectrum = Spectrum::indel();
    for (row, result) in csv_reader.records().enumerate() {
        let record = result?;
        let label = record.get(0)
            .ok_or_else(|| ExternalToolFailure::MalformedOutput { row, detail: "missing feature code".to_string() })?;
        let raw_count = record.get(1)
            .ok_or_else(|| ExternalToolFailure::MalformedOutput { row, detail: "missing count".to_string() })?;
        let count: u64 = raw_count.trim().parse()
            .map_err(|e| ExternalToolFailure::MalformedOutput { row, detail: format!("bad count {raw_count:?}: {e}") })?;
        spectrum.add(label.trim(), count)?;
    }
    Ok(spectrum)
}
