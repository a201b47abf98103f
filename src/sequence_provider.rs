/*!
# Sequence provider
Reference sequence lookups for the context classifier.
The provider is constructed by the caller and passed into every classification call, so its lifetime is scoped to the caller.

## Example usage
```rust
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use varsieve::sequence_provider::{GenomeAssembly, ReferenceSequence, SequenceProvider};

let mut reference_genome = ReferenceGenome::empty_reference();
reference_genome.add_contig("mock_chr1".to_string(), "ACCGTTACCAGG").unwrap();
let provider = ReferenceSequence::new(GenomeAssembly::GRCh38, reference_genome);

// 1-based inclusive coordinates
assert_eq!(provider.sequence("mock_chr1", 2, 4).unwrap(), b"CCG".to_vec());
```
*/
use anyhow::{Context, bail};
use log::debug;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};

/// Supported genome assemblies; the identifier is also handed to the external indel classifier
#[derive(Clone, Copy, Debug, Default, Display, EnumString, Eq, Hash, PartialEq, Serialize)]
pub enum GenomeAssembly {
    #[default]
    GRCh37,
    GRCh38,
}

/// File extensions checked, in order, when resolving an assembly inside a reference folder
const FASTA_EXTENSIONS: [&str; 4] = ["fa", "fasta", "fa.gz", "fasta.gz"];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SequenceError {
    #[error("contig {chrom:?} is not present in the {assembly} reference")]
    UnknownContig { chrom: String, assembly: GenomeAssembly },
    #[error("invalid interval {start}-{end}, coordinates are 1-based and start must be <= end")]
    InvalidInterval { start: u64, end: u64 },
}

/// Anything that can return reference bases for a region
pub trait SequenceProvider: Send + Sync {
    /// Returns the upper-case reference bases for the 1-based inclusive interval [start, end].
    /// Intervals that run off the end of a contig are truncated rather than padded.
    /// # Errors
    /// * if the contig is unknown
    /// * if the interval is invalid (start of 0 or start > end)
    fn sequence(&self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>, SequenceError>;

    /// The assembly backing this provider
    fn assembly(&self) -> GenomeAssembly;
}

/// A reference genome pre-loaded into memory
pub struct ReferenceSequence {
    /// The assembly label
    assembly: GenomeAssembly,
    /// All contigs
    genome: ReferenceGenome,
    /// Contig names, for constant time membership checks
    contigs: FxHashSet<String>,
}

impl ReferenceSequence {
    /// Wraps an already loaded genome
    pub fn new(assembly: GenomeAssembly, genome: ReferenceGenome) -> Self {
        let contigs: FxHashSet<String> = genome.contig_keys().iter()
            .map(|k| k.to_string())
            .collect();
        Self { assembly, genome, contigs }
    }

    /// Loads a FASTA file into memory.
    /// # Arguments
    /// * `assembly` - the assembly this FASTA represents
    /// * `fasta_fn` - path to the FASTA file
    pub fn from_fasta(assembly: GenomeAssembly, fasta_fn: &Path) -> anyhow::Result<Self> {
        debug!("Loading {assembly} reference from {fasta_fn:?}...");
        let genome = ReferenceGenome::from_fasta(fasta_fn)
            .map_err(|e| anyhow::anyhow!("{e:?}"))
            .with_context(|| format!("Error while loading reference from {fasta_fn:?}:"))?;
        Ok(Self::new(assembly, genome))
    }

    /// Finds `<assembly>.<ext>` inside a reference folder and loads it.
    /// # Arguments
    /// * `assembly` - the assembly identifier, e.g. GRCh37
    /// * `reference_dir` - folder holding one FASTA per assembly
    /// # Errors
    /// * if no FASTA for the assembly exists in the folder
    /// * if the FASTA fails to load
    pub fn from_assembly(assembly: GenomeAssembly, reference_dir: &Path) -> anyhow::Result<Self> {
        let fasta_fn = resolve_assembly_fasta(assembly, reference_dir)?;
        Self::from_fasta(assembly, &fasta_fn)
    }
}

/// Returns the first `<assembly>.<ext>` path that exists in the folder
pub fn resolve_assembly_fasta(assembly: GenomeAssembly, reference_dir: &Path) -> anyhow::Result<PathBuf> {
    for ext in FASTA_EXTENSIONS.iter() {
        let candidate = reference_dir.join(format!("{assembly}.{ext}"));
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    bail!("No FASTA for {assembly} found in {reference_dir:?} (checked extensions: {FASTA_EXTENSIONS:?})");
}

impl SequenceProvider for ReferenceSequence {
    fn sequence(&self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>, SequenceError> {
        if start == 0 || start > end {
            return Err(SequenceError::InvalidInterval { start, end });
        }
        if !self.contigs.contains(chrom) {
            return Err(SequenceError::UnknownContig { chrom: chrom.to_string(), assembly: self.assembly });
        }

        let contig = self.genome.get_full_chromosome(chrom);
        let contig_len = contig.len() as u64;
        // convert to 0-based half-open and clip to the contig
        let first = (start - 1).min(contig_len) as usize;
        let last = end.min(contig_len) as usize;
        Ok(contig[first..last].to_ascii_uppercase())
    }

    fn assembly(&self) -> GenomeAssembly {
        self.assembly
    }
}
