
use serde::Serialize;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VariantError {
    #[error("{field} must be a single base from A/C/G/T, found {value:?}")]
    InvalidBase { field: &'static str, value: String },
    #[error("{field} allele is empty")]
    EmptyAllele { field: &'static str },
    #[error("reference and alternate alleles are identical: {value:?}")]
    IdenticalAlleles { value: String },
    #[error("position must be 1-based and >0, found {value}")]
    InvalidPosition { value: u64 },
    #[error("unrecognized structural variant type {value:?}")]
    UnknownVariantType { value: String },
    #[error("unrecognized strand {value:?}, expected '+' or '-'")]
    UnknownStrand { value: String },
}

/// The canonical structural variant types.
/// Multiple upstream naming conventions are accepted when parsing, but they all collapse onto these five.
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
pub enum SvType {
    #[strum(to_string = "del", serialize = "DEL", serialize = "Deletion", serialize = "deletion")]
    Deletion,
    #[strum(to_string = "dup", serialize = "DUP", serialize = "Duplication", serialize = "duplication")]
    Duplication,
    #[strum(to_string = "ins", serialize = "INS", serialize = "Insertion", serialize = "insertion")]
    Insertion,
    #[strum(to_string = "inv", serialize = "INV", serialize = "Inversion", serialize = "inversion")]
    Inversion,
    #[strum(to_string = "translocation", serialize = "BND", serialize = "Translocation")]
    Translocation,
}

impl SvType {
    /// Maps any of the accepted type vocabularies onto the canonical type.
    /// # Arguments
    /// * `value` - the raw type string, e.g. "DEL", "Deletion", or "del"
    /// # Errors
    /// * if the value is not part of any known vocabulary; it is never coerced
    pub fn normalize(value: &str) -> Result<SvType, VariantError> {
        SvType::from_str(value.trim())
            .map_err(|_| VariantError::UnknownVariantType { value: value.to_string() })
    }
}

/// Breakend orientation
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
pub enum Strand {
    #[strum(to_string = "+")]
    Forward,
    #[strum(to_string = "-")]
    Reverse,
}

impl Strand {
    pub fn parse(value: &str) -> Result<Strand, VariantError> {
        Strand::from_str(value.trim())
            .map_err(|_| VariantError::UnknownStrand { value: value.to_string() })
    }
}

/// Checks and upper-cases a single-base allele
fn parse_base(field: &'static str, value: &str) -> Result<u8, VariantError> {
    match value.trim().as_bytes() {
        [b] if matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T') => Ok(b.to_ascii_uppercase()),
        _ => Err(VariantError::InvalidBase { field, value: value.to_string() })
    }
}

/// A single-nucleotide substitution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnvVariant {
    /// Contig name as it appears in the reference
    chrom: String,
    /// 1-based coordinate
    position: u64,
    /// Reference base, always one of A/C/G/T
    ref_base: u8,
    /// Alternate base, always one of A/C/G/T
    alt_base: u8,
}

impl SnvVariant {
    /// Creates a new point mutation.
    /// # Arguments
    /// * `chrom` - the contig name
    /// * `position` - the 1-based coordinate
    /// * `ref_base` - reference allele, must be a single A/C/G/T (case-insensitive)
    /// * `alt_base` - alternate allele, must be a single A/C/G/T (case-insensitive)
    /// # Errors
    /// * if either allele is not exactly one unambiguous base, or both alleles are identical
    /// * if the position is 0
    pub fn new(chrom: String, position: u64, ref_base: &str, alt_base: &str) -> Result<SnvVariant, VariantError> {
        if position == 0 {
            return Err(VariantError::InvalidPosition { value: position });
        }
        let ref_base = parse_base("reference", ref_base)?;
        let alt_base = parse_base("alternate", alt_base)?;
        if ref_base == alt_base {
            return Err(VariantError::IdenticalAlleles { value: (ref_base as char).to_string() });
        }
        Ok(SnvVariant {
            chrom,
            position,
            ref_base,
            alt_base
        })
    }

    pub fn key(&self) -> SnvKey {
        SnvKey {
            chrom: self.chrom.clone(),
            position: self.position,
            ref_base: self.ref_base,
            alt_base: self.alt_base
        }
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn ref_base(&self) -> u8 {
        self.ref_base
    }

    pub fn alt_base(&self) -> u8 {
        self.alt_base
    }
}

/// Value identity of a point mutation, used for joins and set algebra
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct SnvKey {
    pub chrom: String,
    pub position: u64,
    pub ref_base: u8,
    pub alt_base: u8,
}

/// A small insertion or deletion in VCF-style allele representation.
/// These are only ever handed to the external indel classifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndelVariant {
    chrom: String,
    position: u64,
    ref_allele: String,
    alt_allele: String,
}

impl IndelVariant {
    /// Creates a new indel; alleles are upper-cased but otherwise passed through as-is.
    /// # Errors
    /// * if either allele is empty, or both alleles are identical
    /// * if the position is 0
    pub fn new(chrom: String, position: u64, ref_allele: &str, alt_allele: &str) -> Result<IndelVariant, VariantError> {
        if position == 0 {
            return Err(VariantError::InvalidPosition { value: position });
        }
        let ref_allele = ref_allele.trim().to_ascii_uppercase();
        let alt_allele = alt_allele.trim().to_ascii_uppercase();
        if ref_allele.is_empty() {
            return Err(VariantError::EmptyAllele { field: "reference" });
        }
        if alt_allele.is_empty() {
            return Err(VariantError::EmptyAllele { field: "alternate" });
        }
        if ref_allele == alt_allele {
            return Err(VariantError::IdenticalAlleles { value: ref_allele });
        }
        Ok(IndelVariant {
            chrom,
            position,
            ref_allele,
            alt_allele
        })
    }

    pub fn key(&self) -> IndelKey {
        IndelKey {
            chrom: self.chrom.clone(),
            position: self.position,
            ref_allele: self.ref_allele.clone(),
            alt_allele: self.alt_allele.clone()
        }
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn ref_allele(&self) -> &str {
        &self.ref_allele
    }

    pub fn alt_allele(&self) -> &str {
        &self.alt_allele
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct IndelKey {
    pub chrom: String,
    pub position: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

/// One end of a rearrangement
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Breakend {
    pub chrom: String,
    /// 1-based coordinate
    pub position: u64,
    pub strand: Strand,
}

impl Breakend {
    pub fn new(chrom: String, position: u64, strand: Strand) -> Self {
        Self { chrom, position, strand }
    }
}

/// A structural rearrangement described by its two breakends.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SvVariant {
    /// First breakend
    end1: Breakend,
    /// Second breakend
    end2: Breakend,
    /// Normalized type
    sv_type: SvType,
    /// Event length in bp; callers leave this empty for translocations
    length: Option<i64>,
}

impl SvVariant {
    pub fn new(end1: Breakend, end2: Breakend, sv_type: SvType, length: Option<i64>) -> Self {
        Self { end1, end2, sv_type, length }
    }

    pub fn key(&self) -> SvKey {
        SvKey {
            end1: self.end1.clone(),
            end2: self.end2.clone(),
            sv_type: self.sv_type
        }
    }

    // getters
    pub fn end1(&self) -> &Breakend {
        &self.end1
    }

    pub fn end2(&self) -> &Breakend {
        &self.end2
    }

    pub fn sv_type(&self) -> SvType {
        self.sv_type
    }

    pub fn length(&self) -> Option<i64> {
        self.length
    }
}

/// Value identity of a structural variant: both breakends and the type, but not the length
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct SvKey {
    pub end1: Breakend,
    pub end2: Breakend,
    pub sv_type: SvType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_type_normalization() {
        for raw in ["DEL", "Deletion", "deletion", "del", " DEL "] {
            assert_eq!(SvType::normalize(raw).unwrap(), SvType::Deletion);
        }
        assert_eq!(SvType::normalize("DUP").unwrap(), SvType::Duplication);
        assert_eq!(SvType::normalize("Insertion").unwrap(), SvType::Insertion);
        assert_eq!(SvType::normalize("inversion").unwrap(), SvType::Inversion);
        assert_eq!(SvType::normalize("BND").unwrap(), SvType::Translocation);
        assert_eq!(SvType::normalize("Translocation").unwrap(), SvType::Translocation);
        assert_eq!(SvType::normalize("translocation").unwrap(), SvType::Translocation);
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            SvType::normalize("CNV"),
            Err(VariantError::UnknownVariantType { value: "CNV".to_string() })
        );
        assert!(SvType::normalize("").is_err());
    }

    #[test]
    fn test_type_display() {
        let labels: Vec<String> = SvType::iter().map(|t| t.to_string()).collect();
        assert_eq!(labels, vec!["del", "dup", "ins", "inv", "translocation"]);
    }

    #[test]
    fn test_strand() {
        assert_eq!(Strand::parse("+").unwrap(), Strand::Forward);
        assert_eq!(Strand::parse("-").unwrap(), Strand::Reverse);
        assert_eq!(Strand::Reverse.to_string(), "-");
        assert!(Strand::parse("1").is_err());
    }

    #[test]
    fn test_snv() {
        let variant = SnvVariant::new("1".to_string(), 100, "a", "T").unwrap();
        assert_eq!(variant.ref_base(), b'A');
        assert_eq!(variant.alt_base(), b'T');
        assert_eq!(variant.key(), SnvKey { chrom: "1".to_string(), position: 100, ref_base: b'A', alt_base: b'T' });

        assert_eq!(
            SnvVariant::new("1".to_string(), 100, "AG", "T"),
            Err(VariantError::InvalidBase { field: "reference", value: "AG".to_string() })
        );
        assert!(SnvVariant::new("1".to_string(), 100, "A", "N").is_err());
        assert!(SnvVariant::new("1".to_string(), 0, "A", "C").is_err());
        assert_eq!(
            SnvVariant::new("1".to_string(), 100, "g", "G"),
            Err(VariantError::IdenticalAlleles { value: "G".to_string() })
        );
    }

    #[test]
    fn test_indel() {
        let variant = IndelVariant::new("2".to_string(), 10, "AGT", "a").unwrap();
        assert_eq!(variant.ref_allele(), "AGT");
        assert_eq!(variant.alt_allele(), "A");
        assert!(IndelVariant::new("2".to_string(), 10, "", "A").is_err());
        assert!(IndelVariant::new("2".to_string(), 10, "A", "a").is_err());
    }

    #[test]
    fn test_sv_key_ignores_length() {
        let end1 = Breakend::new("1".to_string(), 1000, Strand::Forward);
        let end2 = Breakend::new("1".to_string(), 5000, Strand::Reverse);
        let a = SvVariant::new(end1.clone(), end2.clone(), SvType::Deletion, Some(4000));
        let b = SvVariant::new(end1, end2, SvType::Deletion, Some(3999));
        assert_eq!(a.key(), b.key());
    }
}
