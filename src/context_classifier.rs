/*!
# Context classifier
Derives the category label for a single variant.
Point mutations get a pyrimidine-normalized trinucleotide label, e.g. `T[C>T]A`.
Structural variants get a `type:length-bin` label, or the bare `translocation`.

## Example usage
```rust
use varsieve::context_classifier::{Classification, classify_snv_window, classify_sv};
use varsieve::data_types::variants::SvType;

// G>A in a TGA context is reported on the opposite strand
let label = classify_snv_window(b"TGA", b'A');
assert_eq!(label, Classification::Label("T[C>T]A".to_string()));

assert_eq!(classify_sv(SvType::Deletion, Some(999)), Classification::Label("del:<1kb".to_string()));
assert_eq!(classify_sv(SvType::Translocation, None), Classification::Label("translocation".to_string()));
```
*/
use log::debug;

use crate::data_types::spectrum::{SV_LENGTH_BINS, SkipReason, TRANSLOCATION_LABEL};
use crate::data_types::variants::{SnvVariant, SvType, SvVariant, VariantError};
use crate::sequence_provider::{SequenceError, SequenceProvider};

/// Lower bounds (bp) of each SV length bin; the last bin is open-ended
const SV_BIN_LOWER_BOUNDS: [u64; 6] = [0, 1_000, 10_000, 100_000, 1_000_000, 10_000_000];

/// The result of classifying one record when no hard error occurred
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Classification {
    /// A label from the fixed vocabulary
    Label(String),
    /// The record cannot be labeled and should be excluded from counts
    Skipped(SkipReason),
}

/// Watson-Crick complement; anything else is returned unchanged
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        other => other
    }
}

/// Reverse complement of a sequence
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Rewrites a window and alternate base so the center base is a pyrimidine.
/// If the center is a purine, the window is reverse-complemented and the alternate complemented.
/// # Arguments
/// * `window` - exactly three upper-case bases
/// * `alt` - the alternate base
pub fn normalize_to_pyrimidine(window: &[u8], alt: u8) -> (Vec<u8>, u8) {
    match window.get(1) {
        Some(b'A') | Some(b'G') => (reverse_complement(window), complement(alt)),
        _ => (window.to_vec(), alt)
    }
}

/// Classifies a point mutation from its reference window.
/// This is a pure function of the window and the alternate base.
/// # Arguments
/// * `window` - the reference bases at [pos-1, pos+1]
/// * `alt` - the alternate base
pub fn classify_snv_window(window: &[u8], alt: u8) -> Classification {
    let window_str = String::from_utf8_lossy(window).to_string();
    if window.len() != 3 {
        return Classification::Skipped(SkipReason::MalformedContext { window: window_str, detail: "window is not 3 bases" });
    }
    if window.contains(&b'N') {
        return Classification::Skipped(SkipReason::MalformedContext { window: window_str, detail: "ambiguous base N" });
    }
    if !window.iter().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T')) {
        return Classification::Skipped(SkipReason::MalformedContext { window: window_str, detail: "non-ACGT base" });
    }
    if window[1] == alt {
        // the reference disagrees with the declared ref and happens to carry the alternate base
        return Classification::Skipped(SkipReason::MalformedContext { window: window_str, detail: "alternate equals reference base" });
    }

    let (context, alt) = normalize_to_pyrimidine(window, alt);
    Classification::Label(format!(
        "{}[{}>{}]{}",
        context[0] as char, context[1] as char, alt as char, context[2] as char
    ))
}

/// Fetches the reference window for a point mutation and classifies it.
/// # Arguments
/// * `variant` - the point mutation
/// * `provider` - the reference sequence source
/// # Errors
/// * if the provider cannot serve the contig at all
pub fn classify_snv(variant: &SnvVariant, provider: &dyn SequenceProvider) -> Result<Classification, SequenceError> {
    let position = variant.position();
    // a variant on the first base of a contig has no upstream flank, the window query starts at 1 and comes back short
    let window = provider.sequence(variant.chrom(), position.saturating_sub(1).max(1), position + 1)?;
    if window.len() == 3 && window[1] != variant.ref_base() {
        debug!(
            "Reference mismatch at {}:{}, expected {} but found {}",
            variant.chrom(), position, variant.ref_base() as char, window[1] as char
        );
    }
    Ok(classify_snv_window(&window, variant.alt_base()))
}

/// Returns the length bin label for an SV length in bp
pub fn length_bin(length: u64) -> &'static str {
    let bin_index = SV_BIN_LOWER_BOUNDS.iter()
        .rposition(|&lower| length >= lower)
        .unwrap_or(0);
    SV_LENGTH_BINS[bin_index]
}

/// Classifies an SV by type and length.
/// Translocations ignore the length entirely.
/// # Arguments
/// * `sv_type` - the normalized type
/// * `length` - the event length in bp, if known
pub fn classify_sv(sv_type: SvType, length: Option<i64>) -> Classification {
    if sv_type == SvType::Translocation {
        return Classification::Label(TRANSLOCATION_LABEL.to_string());
    }
    match length {
        None => Classification::Skipped(SkipReason::MissingLength),
        Some(l) if l < 0 => Classification::Skipped(SkipReason::NegativeLength { length: l }),
        Some(l) => Classification::Label(format!("{sv_type}:{}", length_bin(l as u64)))
    }
}

/// Convenience wrapper for a loaded SV record
pub fn classify_sv_variant(variant: &SvVariant) -> Classification {
    classify_sv(variant.sv_type(), variant.length())
}

/// Classifies an SV from a raw, un-normalized type string.
/// # Errors
/// * `UnknownVariantType` if the type does not belong to any accepted vocabulary
pub fn classify_sv_raw(raw_type: &str, length: Option<i64>) -> Result<Classification, VariantError> {
    let sv_type = SvType::normalize(raw_type)?;
    Ok(classify_sv(sv_type, length))
}
