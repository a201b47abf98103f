
use std::fmt::Debug;
use std::hash::Hash;

use crate::data_types::variants::{IndelKey, IndelVariant, SnvKey, SnvVariant, SvKey, SvVariant};

/// Opaque identity of a row in a `VariantTable`, independent of the row content.
/// Two rows with identical keys still have distinct `RowId`s.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct RowId(usize);

impl RowId {
    /// Wraps a raw arena index; only meaningful relative to the table it came from
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything that can live in a `VariantTable` and be compared by value
pub trait TableRecord {
    /// The value key used for joins and set algebra
    type Key: Clone + Debug + Eq + Hash + Ord;

    /// Derives the value key for this record
    fn key(&self) -> Self::Key;

    /// Column labels matching `key_fields`
    fn key_labels() -> &'static [&'static str];

    /// String rendering of each key field, for tabular output
    fn key_fields(key: &Self::Key) -> Vec<String>;
}

impl TableRecord for SnvVariant {
    type Key = SnvKey;

    fn key(&self) -> SnvKey {
        SnvVariant::key(self)
    }

    fn key_labels() -> &'static [&'static str] {
        &["chrom", "pos", "ref", "alt"]
    }

    fn key_fields(key: &SnvKey) -> Vec<String> {
        vec![
            key.chrom.clone(),
            key.position.to_string(),
            (key.ref_base as char).to_string(),
            (key.alt_base as char).to_string()
        ]
    }
}

impl TableRecord for IndelVariant {
    type Key = IndelKey;

    fn key(&self) -> IndelKey {
        IndelVariant::key(self)
    }

    fn key_labels() -> &'static [&'static str] {
        &["chrom", "pos", "ref", "alt"]
    }

    fn key_fields(key: &IndelKey) -> Vec<String> {
        vec![
            key.chrom.clone(),
            key.position.to_string(),
            key.ref_allele.clone(),
            key.alt_allele.clone()
        ]
    }
}

impl TableRecord for SvVariant {
    type Key = SvKey;

    fn key(&self) -> SvKey {
        SvVariant::key(self)
    }

    fn key_labels() -> &'static [&'static str] {
        &["chromosome_1", "position_1", "strand_1", "chromosome_2", "position_2", "strand_2", "type"]
    }

    fn key_fields(key: &SvKey) -> Vec<String> {
        vec![
            key.end1.chrom.clone(),
            key.end1.position.to_string(),
            key.end1.strand.to_string(),
            key.end2.chrom.clone(),
            key.end2.position.to_string(),
            key.end2.strand.to_string(),
            key.sv_type.to_string()
        ]
    }
}

/// An immutable, ordered collection of one kind of variant.
/// Row identities are the arena indices, so they stay stable for the life of the table.
#[derive(Clone, Debug)]
pub struct VariantTable<V> {
    /// The records in input order
    rows: Vec<V>,
}

impl<V> Default for VariantTable<V> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<V> From<Vec<V>> for VariantTable<V> {
    fn from(rows: Vec<V>) -> Self {
        Self { rows }
    }
}

impl<V> FromIterator<V> for VariantTable<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self { rows: iter.into_iter().collect() }
    }
}

impl<V> VariantTable<V> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the record for a row, or None if the id came from a larger table
    pub fn get(&self, row_id: RowId) -> Option<&V> {
        self.rows.get(row_id.0)
    }

    /// All row identities, in order
    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        (0..self.rows.len()).map(RowId)
    }

    /// Iterates over (row id, record) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &V)> + '_ {
        self.rows.iter().enumerate().map(|(i, v)| (RowId(i), v))
    }

    pub fn records(&self) -> &[V] {
        &self.rows
    }
}

impl<V: TableRecord> VariantTable<V> {
    /// Explicit conversion from row identity to value identity.
    /// # Panics
    /// * if `row_id` does not belong to this table
    pub fn key_of(&self, row_id: RowId) -> V::Key {
        self.rows[row_id.0].key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_identity_independent_of_value() {
        let table: VariantTable<SnvVariant> = vec![
            SnvVariant::new("1".to_string(), 100, "A", "T").unwrap(),
            SnvVariant::new("1".to_string(), 100, "A", "T").unwrap(),
        ].into();

        let ids: Vec<RowId> = table.row_ids().collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(table.key_of(ids[0]), table.key_of(ids[1]));
        assert_eq!(ids[1].index(), 1);
        assert!(table.get(ids[1]).is_some());
    }

    #[test]
    fn test_key_fields() {
        let variant = SnvVariant::new("chr2".to_string(), 55, "G", "c").unwrap();
        let fields = SnvVariant::key_fields(&variant.key());
        assert_eq!(fields, vec!["chr2", "55", "G", "C"]);
        assert_eq!(SnvVariant::key_labels().len(), fields.len());
    }
}
