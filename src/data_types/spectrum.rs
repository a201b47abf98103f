
use indexmap::IndexMap;
use itertools::iproduct;
use lazy_static::lazy_static;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::data_types::variant_table::RowId;
use crate::data_types::variants::SvType;

/// The six pyrimidine-referenced substitution classes
pub const SNV_SUBSTITUTIONS: [&str; 6] = ["C>A", "C>G", "C>T", "T>A", "T>C", "T>G"];
/// Unambiguous nucleotides, in label order
pub const NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'T'];
/// SV length bin labels, ascending
pub const SV_LENGTH_BINS: [&str; 6] = ["<1kb", "1-10kb", "10-100kb", "100kb-1Mb", "1-10Mb", ">10Mb"];
/// Translocations have no length and get a single bare label
pub const TRANSLOCATION_LABEL: &str = "translocation";

lazy_static! {
    /// 96 trinucleotide labels ordered by substitution, then 5' flank, then 3' flank
    pub static ref SNV_CATEGORIES: Vec<String> = SNV_SUBSTITUTIONS.iter()
        .flat_map(|sub| {
            iproduct!(NUCLEOTIDES.iter(), NUCLEOTIDES.iter())
                .map(move |(five, three)| format!("{five}[{sub}]{three}"))
        })
        .collect();

    /// type:length labels for every non-translocation type followed by the bare translocation label
    pub static ref SV_CATEGORIES: Vec<String> = SvType::iter()
        .flat_map(|sv_type| {
            if sv_type == SvType::Translocation {
                vec![TRANSLOCATION_LABEL.to_string()]
            } else {
                SV_LENGTH_BINS.iter().map(|bin| format!("{sv_type}:{bin}")).collect()
            }
        })
        .collect();

    /// The 83 SigProfiler indel feature codes, in matrix order
    pub static ref INDEL_CATEGORIES: Vec<String> = {
        let mut labels = vec![];
        // single base events, split by the deleted/inserted base and the homopolymer length
        for (kind, base) in iproduct!(["Del", "Ins"], ["C", "T"]) {
            labels.extend((0..6).map(|n| format!("1:{kind}:{base}:{n}")));
        }
        // longer events in repeat units
        for (kind, size) in iproduct!(["Del", "Ins"], 2..6) {
            labels.extend((0..6).map(|n| format!("{size}:{kind}:R:{n}")));
        }
        // deletions with microhomology; the homology length is capped below the deletion size
        for size in 2..6 {
            let max_homology = if size == 5 { 5 } else { size - 1 };
            labels.extend((1..=max_homology).map(|n| format!("{size}:Del:M:{n}")));
        }
        labels
    };
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SpectrumError {
    #[error("category {label:?} is not part of this spectrum")]
    UnknownCategory { label: String },
}

/// Why a record did not contribute to a spectrum
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum SkipReason {
    /// The reference window was unusable
    MalformedContext { window: String, detail: &'static str },
    /// A non-translocation SV without a length
    MissingLength,
    /// A non-translocation SV with a negative length
    NegativeLength { length: i64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MalformedContext { window, detail } => write!(f, "malformed context {window:?}: {detail}"),
            SkipReason::MissingLength => write!(f, "missing SV length"),
            SkipReason::NegativeLength { length } => write!(f, "negative SV length {length}"),
        }
    }
}

/// Fixed-domain category counts.
/// Every category of the vocabulary is always present so that spectra from different samples line up.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Spectrum {
    counts: IndexMap<String, u64>,
}

impl Spectrum {
    /// Creates a zero-filled spectrum over the given vocabulary
    pub fn with_categories(categories: &[String]) -> Self {
        Self {
            counts: categories.iter().map(|c| (c.clone(), 0)).collect()
        }
    }

    pub fn snv() -> Self {
        Self::with_categories(&SNV_CATEGORIES)
    }

    pub fn sv() -> Self {
        Self::with_categories(&SV_CATEGORIES)
    }

    pub fn indel() -> Self {
        Self::with_categories(&INDEL_CATEGORIES)
    }

    /// Adds `amount` to a category.
    /// # Errors
    /// * if the label is outside the fixed vocabulary
    pub fn add(&mut self, label: &str, amount: u64) -> Result<(), SpectrumError> {
        match self.counts.get_mut(label) {
            Some(count) => {
                *count += amount;
                Ok(())
            },
            None => Err(SpectrumError::UnknownCategory { label: label.to_string() })
        }
    }

    pub fn increment(&mut self, label: &str) -> Result<(), SpectrumError> {
        self.add(label, 1)
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.counts.get(label).copied()
    }

    /// Sum over all categories
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterates (label, count) in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.counts.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// A spectrum plus the bookkeeping of what was left out of it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpectrumTally {
    /// The counts over the full vocabulary
    pub spectrum: Spectrum,
    /// Records that could not be classified, with the reason
    pub skipped: Vec<(RowId, SkipReason)>,
    /// Set when an external backend failed and the counts were zero-filled instead
    pub backend_failure: Option<String>,
}

impl SpectrumTally {
    pub fn new(spectrum: Spectrum) -> Self {
        Self {
            spectrum,
            ..Default::default()
        }
    }

    pub fn num_skipped(&self) -> usize {
        self.skipped.len()
    }
}
