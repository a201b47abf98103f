/*!
# Comparison report
Set algebra over the value keys of a `MatchResult`.
`A∩B` is taken from the reference table's matched rows, and the target's matched keys are tracked separately so that asymmetric matching is visible.
The matched part of `B` is expressed in the reference key space, which lets windowed SV matches count once even when their coordinates differ.
Duplicate keys collapse to one set element.
*/
use log::warn;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::data_types::match_result::{MatchResult, key_set};
use crate::data_types::variant_table::{TableRecord, VariantTable};

/// Column labels of the summary line, in order
pub const SUMMARY_HEADER: [&str; 6] = ["A", "B", "A-B", "B-A", "A&B", "A|B"];
/// Label of the optional leading name column
pub const NAME_HEADER: &str = "name";

/// The key sets derived from one comparison
#[derive(Clone, Debug)]
pub struct ComparisonReport<K: Ord> {
    /// Keys of all reference rows
    a: BTreeSet<K>,
    /// Keys of all target rows, with matched rows in reference key space
    b: BTreeSet<K>,
    /// Keys of the reference rows that matched
    a_and_b: BTreeSet<K>,
    /// Keys of the target rows that matched, in their own key space
    a_and_b_from_target: BTreeSet<K>,
}

/// The fixed six cardinalities of a comparison
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SetCounts {
    pub a: usize,
    pub b: usize,
    pub a_not_b: usize,
    pub b_not_a: usize,
    pub a_and_b: usize,
    pub a_or_b: usize,
}

impl SetCounts {
    /// Values in header order
    pub fn fields(&self) -> [usize; 6] {
        [self.a, self.b, self.a_not_b, self.b_not_a, self.a_and_b, self.a_or_b]
    }

    /// Header line matching `to_line`; gains a leading name column when `with_name` is set
    pub fn header(with_name: bool, delimiter: &str) -> String {
        let mut fields: Vec<&str> = vec![];
        if with_name {
            fields.push(NAME_HEADER);
        }
        fields.extend(SUMMARY_HEADER.iter());
        fields.join(delimiter)
    }

    /// Renders the counts as a delimited line, optionally prefixed by a sample name
    pub fn to_line(&self, name: Option<&str>, delimiter: &str) -> String {
        let mut fields: Vec<String> = vec![];
        if let Some(n) = name {
            fields.push(n.to_string());
        }
        fields.extend(self.fields().iter().map(|v| v.to_string()));
        fields.join(delimiter)
    }
}

impl<K: Clone + Ord + std::fmt::Debug> ComparisonReport<K> {
    /// Derives all key sets from a match result.
    /// # Arguments
    /// * `reference` - table1, the table the match result's reference partition refers to
    /// * `target` - table2
    /// * `result` - the partitions of both tables
    pub fn new<V: TableRecord<Key = K>>(reference: &VariantTable<V>, target: &VariantTable<V>, result: &MatchResult) -> Self {
        let a_and_b = key_set(reference, result.reference().matched_rows());
        let a_and_b_from_target = key_set(target, result.target().matched_rows());
        let a_not_b = key_set(reference, result.reference().unmatched().iter().copied());
        let b_not_a = key_set(target, result.target().unmatched().iter().copied());

        let a: BTreeSet<K> = a_and_b.union(&a_not_b).cloned().collect();
        let b: BTreeSet<K> = a_and_b.union(&b_not_a).cloned().collect();

        let report = Self { a, b, a_and_b, a_and_b_from_target };
        if report.is_asymmetric() {
            warn!(
                "Matched keys differ between tables ({} from reference, {} from target)",
                report.a_and_b.len(), report.a_and_b_from_target.len()
            );
        }
        report
    }

    pub fn a(&self) -> &BTreeSet<K> {
        &self.a
    }

    pub fn b(&self) -> &BTreeSet<K> {
        &self.b
    }

    /// The reported intersection, from the reference's matched rows
    pub fn a_and_b(&self) -> &BTreeSet<K> {
        &self.a_and_b
    }

    /// The intersection as seen from the target's matched rows
    pub fn a_and_b_from_target(&self) -> &BTreeSet<K> {
        &self.a_and_b_from_target
    }

    pub fn a_not_b(&self) -> BTreeSet<K> {
        self.a.difference(&self.b).cloned().collect()
    }

    pub fn b_not_a(&self) -> BTreeSet<K> {
        self.b.difference(&self.a).cloned().collect()
    }

    pub fn a_or_b(&self) -> BTreeSet<K> {
        self.a.union(&self.b).cloned().collect()
    }

    /// True when the two tables disagree on which keys matched.
    /// Always false for exact-key matching; windowed matching can diverge.
    pub fn is_asymmetric(&self) -> bool {
        self.a_and_b != self.a_and_b_from_target
    }

    pub fn counts(&self) -> SetCounts {
        SetCounts {
            a: self.a.len(),
            b: self.b.len(),
            a_not_b: self.a.difference(&self.b).count(),
            b_not_a: self.b.difference(&self.a).count(),
            a_and_b: self.a_and_b.len(),
            a_or_b: self.a.union(&self.b).count(),
        }
    }
}
