
use std::collections::BTreeSet;

use crate::data_types::variant_table::{RowId, TableRecord, VariantTable};

/// A row that found at least one counterpart in the other table
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchedRow {
    /// The row in this table
    pub row: RowId,
    /// The matching rows in the other table, sorted
    pub counterparts: Vec<RowId>,
}

/// Splits one table into matched and unmatched rows; every row lands in exactly one side
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TablePartition {
    matched: Vec<MatchedRow>,
    unmatched: Vec<RowId>,
}

impl TablePartition {
    /// Builds a partition from a table length and a per-row counterpart lookup.
    /// Rows with an empty counterpart list are unmatched.
    /// # Arguments
    /// * `counterparts` - one entry per row, in row order
    pub fn from_counterparts(counterparts: Vec<BTreeSet<RowId>>) -> Self {
        let mut matched = vec![];
        let mut unmatched = vec![];
        for (i, others) in counterparts.into_iter().enumerate() {
            let row = RowId::from_index(i);
            if others.is_empty() {
                unmatched.push(row);
            } else {
                matched.push(MatchedRow { row, counterparts: others.into_iter().collect() });
            }
        }
        Self { matched, unmatched }
    }

    pub fn matched(&self) -> &[MatchedRow] {
        &self.matched
    }

    pub fn unmatched(&self) -> &[RowId] {
        &self.unmatched
    }

    pub fn matched_rows(&self) -> impl Iterator<Item = RowId> + '_ {
        self.matched.iter().map(|m| m.row)
    }

    pub fn len(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outcome of matching a reference table (table1) against a target table (table2)
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchResult {
    reference: TablePartition,
    target: TablePartition,
}

impl MatchResult {
    pub fn new(reference: TablePartition, target: TablePartition) -> Self {
        Self { reference, target }
    }

    /// Builds both partitions from a list of (reference row, target row) correspondences.
    /// # Arguments
    /// * `reference_len` - number of rows in the reference table
    /// * `target_len` - number of rows in the target table
    /// * `pairs` - correspondences; duplicates are tolerated
    pub fn from_pairs(reference_len: usize, target_len: usize, pairs: &[(RowId, RowId)]) -> Self {
        let mut reference_lookup: Vec<BTreeSet<RowId>> = vec![BTreeSet::new(); reference_len];
        let mut target_lookup: Vec<BTreeSet<RowId>> = vec![BTreeSet::new(); target_len];
        for &(r, t) in pairs.iter() {
            reference_lookup[r.index()].insert(t);
            target_lookup[t.index()].insert(r);
        }
        Self {
            reference: TablePartition::from_counterparts(reference_lookup),
            target: TablePartition::from_counterparts(target_lookup)
        }
    }

    pub fn reference(&self) -> &TablePartition {
        &self.reference
    }

    pub fn target(&self) -> &TablePartition {
        &self.target
    }
}

/// Collapses a set of rows into their value keys; duplicate keys become one element
pub fn key_set<V: TableRecord>(table: &VariantTable<V>, rows: impl Iterator<Item = RowId>) -> BTreeSet<V::Key> {
    rows.map(|r| table.key_of(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_partitions() {
        let pairs = [
            (RowId::from_index(0), RowId::from_index(2)),
            (RowId::from_index(0), RowId::from_index(1)),
            (RowId::from_index(3), RowId::from_index(1)),
        ];
        let result = MatchResult::from_pairs(4, 3, &pairs);

        let reference = result.reference();
        assert_eq!(reference.len(), 4);
        assert_eq!(reference.matched(), &[
            MatchedRow { row: RowId::from_index(0), counterparts: vec![RowId::from_index(1), RowId::from_index(2)] },
            MatchedRow { row: RowId::from_index(3), counterparts: vec![RowId::from_index(1)] },
        ]);
        assert_eq!(reference.unmatched(), &[RowId::from_index(1), RowId::from_index(2)]);

        let target = result.target();
        assert_eq!(target.len(), 3);
        assert_eq!(target.unmatched(), &[RowId::from_index(0)]);
        assert_eq!(target.matched()[0].counterparts, vec![RowId::from_index(0), RowId::from_index(3)]);
    }

    #[test]
    fn test_empty() {
        let result = MatchResult::from_pairs(0, 2, &[]);
        assert!(result.reference().is_empty());
        assert_eq!(result.target().unmatched().len(), 2);
    }
}
