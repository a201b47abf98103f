/*!
# Spectrum counter
Aggregates classified variants into a fixed-domain spectrum.
Every category is present from the start, and records that cannot be classified are reported back rather than dropped.
For point mutation and SV tables, `spectrum.total() + skipped.len() == table.len()` always holds.
*/
use log::{debug, info, warn};

use crate::context_classifier::{Classification, classify_snv, classify_sv_variant};
use crate::data_types::spectrum::{Spectrum, SpectrumError, SpectrumTally};
use crate::data_types::variant_table::{RowId, VariantTable};
use crate::data_types::variants::{IndelVariant, SnvVariant, SvVariant};
use crate::indel_classifier::IndelClassifier;
use crate::sequence_provider::{GenomeAssembly, SequenceError, SequenceProvider};

#[derive(thiserror::Error, Debug)]
pub enum CountError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}

/// Shared loop: classify every row, count labels, collect skips.
/// # Arguments
/// * `table` - the records to count
/// * `spectrum` - a zero-filled spectrum defining the vocabulary
/// * `classify` - the per-record classifier; hard errors abort the whole count
fn tally_table<V, F>(table: &VariantTable<V>, spectrum: Spectrum, mut classify: F) -> Result<SpectrumTally, CountError>
where
    F: FnMut(&V) -> Result<Classification, CountError>
{
    let mut tally = SpectrumTally::new(spectrum);
    for (row_id, record) in table.iter() {
        match classify(record)? {
            Classification::Label(label) => {
                tally.spectrum.increment(&label)?;
            },
            Classification::Skipped(reason) => {
                warn!("Skipping row {row_id}: {reason}");
                tally.skipped.push((row_id, reason));
            }
        }
    }
    debug!("Counted {} records, skipped {}", tally.spectrum.total(), tally.num_skipped());
    Ok(tally)
}

/// Builds the 96-category trinucleotide spectrum for a table of point mutations.
/// # Arguments
/// * `table` - the point mutations
/// * `provider` - reference sequence source for the context windows
/// # Errors
/// * if a record references a contig the provider does not know
pub fn count_snvs(table: &VariantTable<SnvVariant>, provider: &dyn SequenceProvider) -> Result<SpectrumTally, CountError> {
    tally_table(table, Spectrum::snv(), |variant| {
        Ok(classify_snv(variant, provider)?)
    })
}

/// Builds the type/length spectrum for a table of structural variants
pub fn count_svs(table: &VariantTable<SvVariant>) -> Result<SpectrumTally, CountError> {
    tally_table(table, Spectrum::sv(), |variant| Ok(classify_sv_variant(variant)))
}

/// Builds the indel feature spectrum by delegating to an external classifier.
/// Empty input never reaches the classifier. A classifier failure is logged, recorded on the tally, and yields all zeros.
/// # Arguments
/// * `table` - the indels
/// * `classifier` - the external classification backend
/// * `assembly` - the genome assembly handed to the backend
pub fn count_indels(table: &VariantTable<IndelVariant>, classifier: &dyn IndelClassifier, assembly: GenomeAssembly) -> SpectrumTally {
    if table.is_empty() {
        info!("No indels provided, returning an empty indel spectrum.");
        return SpectrumTally::new(Spectrum::indel());
    }

    match classifier.classify(table, assembly) {
        Ok(spectrum) => {
            debug!("Indel classifier reported {} of {} records", spectrum.total(), table.len());
            SpectrumTally::new(spectrum)
        },
        Err(e) => {
            warn!("Indel classification failed, reporting zero counts: {e}");
            SpectrumTally {
                spectrum: Spectrum::indel(),
                skipped: vec![],
                backend_failure: Some(e.to_string())
            }
        }
    }
}

/// Row ids skipped in a tally, in row order
pub fn skipped_rows(tally: &SpectrumTally) -> Vec<RowId> {
    tally.skipped.iter().map(|(r, _)| *r).collect()
}
