/*!
# Variant matcher
Matches the records of a reference table against a target table and partitions both into matched and unmatched rows.
Point mutations use an exact join on (chromosome, position, ref, alt).
Structural variants use windowed breakpoint matching through a `BreakpointMatcher`.

## Example usage
```rust
use varsieve::data_types::variant_table::VariantTable;
use varsieve::data_types::variants::SnvVariant;
use varsieve::variant_matcher::match_snvs;

let reference: VariantTable<SnvVariant> = vec![
    SnvVariant::new("1".to_string(), 100, "A", "T").unwrap(),
].into();
let target: VariantTable<SnvVariant> = vec![
    SnvVariant::new("1".to_string(), 100, "A", "T").unwrap(),
    SnvVariant::new("1".to_string(), 200, "C", "G").unwrap(),
].into();

let result = match_snvs(&reference, &target);
assert_eq!(result.reference().matched().len(), 1);
assert_eq!(result.target().unmatched().len(), 1);
```
*/
use derive_builder::Builder;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::breakpoint_matcher::{BreakpointMatcher, DEFAULT_WINDOW_SIZE};
use crate::data_types::match_result::MatchResult;
use crate::data_types::variant_table::{RowId, VariantTable};
use crate::data_types::variants::{SnvKey, SnvVariant, SvVariant};

/// Controls structural variant matching
#[derive(Builder, Clone, Copy, Debug)]
#[builder(default)]
pub struct MatchConfig {
    /// Maximum distance in bp between corresponding breakends
    window_size: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE
        }
    }
}

impl MatchConfig {
    pub fn window_size(&self) -> u64 {
        self.window_size
    }
}

/// Exact-key join of two point mutation tables.
/// Duplicate keys within a table stay as separate rows; each of them matches every target row with the same key.
/// # Arguments
/// * `reference` - table1
/// * `target` - table2
pub fn match_snvs(reference: &VariantTable<SnvVariant>, target: &VariantTable<SnvVariant>) -> MatchResult {
    // index the target by key
    let mut target_lookup: FxHashMap<SnvKey, Vec<RowId>> = Default::default();
    for (row_id, variant) in target.iter() {
        target_lookup.entry(variant.key()).or_default().push(row_id);
    }

    let pairs: Vec<(RowId, RowId)> = reference.iter()
        .flat_map(|(reference_id, variant)| {
            target_lookup.get(&variant.key())
                .into_iter()
                .flatten()
                .map(move |&target_id| (reference_id, target_id))
        })
        .collect();

    debug!("Exact-key join found {} correspondences", pairs.len());
    let result = MatchResult::from_pairs(reference.len(), target.len(), &pairs);
    log_partition_sizes(&result);
    result
}

/// Windowed breakpoint matching of two structural variant tables.
/// A backend failure is logged and treated as zero correspondences, so every row ends up unmatched.
/// # Arguments
/// * `reference` - table1
/// * `target` - table2
/// * `backend` - the breakpoint matching implementation
/// * `config` - matching parameters
pub fn match_svs(
    reference: &VariantTable<SvVariant>, target: &VariantTable<SvVariant>,
    backend: &dyn BreakpointMatcher, config: MatchConfig
) -> MatchResult {
    let pairs = match backend.match_breakpoints(reference, target, config.window_size()) {
        Ok(p) => p,
        Err(e) => {
            warn!("Breakpoint matching failed, treating as no matches: {e}");
            vec![]
        }
    };

    // guard against a backend handing back ids outside either table
    let pairs: Vec<(RowId, RowId)> = pairs.into_iter()
        .filter(|&(r, t)| {
            let valid = r.index() < reference.len() && t.index() < target.len();
            if !valid {
                warn!("Ignoring out-of-range correspondence ({r}, {t})");
            }
            valid
        })
        .collect();

    debug!("Breakpoint matching found {} correspondences with window {}", pairs.len(), config.window_size());
    let result = MatchResult::from_pairs(reference.len(), target.len(), &pairs);
    log_partition_sizes(&result);
    result
}

fn log_partition_sizes(result: &MatchResult) {
    info!(
        "Reference matched:unmatched = {} : {}",
        result.reference().matched().len(), result.reference().unmatched().len()
    );
    info!(
        "Target matched:unmatched = {} : {}",
        result.target().matched().len(), result.target().unmatched().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint_matcher::{MatchingBackendFailure, WindowedBreakpointMatcher};
    use crate::comparison_report::{ComparisonReport, SetCounts};
    use crate::data_types::match_result::MatchedRow;
    use crate::data_types::variants::{Breakend, Strand, SvType};

    fn snv(chrom: &str, pos: u64, r: &str, a: &str) -> SnvVariant {
        SnvVariant::new(chrom.to_string(), pos, r, a).unwrap()
    }

    fn del(pos1: u64, pos2: u64) -> SvVariant {
        SvVariant::new(
            Breakend::new("1".to_string(), pos1, Strand::Forward),
            Breakend::new("1".to_string(), pos2, Strand::Reverse),
            SvType::Deletion, Some((pos2 - pos1) as i64)
        )
    }

    fn row(i: usize) -> RowId {
        RowId::from_index(i)
    }

    #[test]
    fn test_exact_join() {
        let reference: VariantTable<SnvVariant> = vec![
            snv("1", 100, "A", "T"),
            snv("1", 101, "A", "T"),
        ].into();
        let target: VariantTable<SnvVariant> = vec![
            snv("1", 100, "A", "G"), // different alt
            snv("1", 100, "A", "T"),
            snv("2", 101, "A", "T"), // different chrom
        ].into();
        let result = match_snvs(&reference, &target);

        assert_eq!(result.reference().matched(), &[MatchedRow { row: row(0), counterparts: vec![row(1)] }]);
        assert_eq!(result.reference().unmatched(), &[row(1)]);
        assert_eq!(result.target().matched(), &[MatchedRow { row: row(1), counterparts: vec![row(0)] }]);
        assert_eq!(result.target().unmatched(), &[row(0), row(2)]);
    }

    #[test]
    fn test_duplicates_preserved() {
        let reference: VariantTable<SnvVariant> = vec![
            snv("1", 100, "A", "T"),
            snv("1", 100, "A", "T"),
        ].into();
        let target: VariantTable<SnvVariant> = vec![snv("1", 100, "A", "T")].into();
        let result = match_snvs(&reference, &target);

        assert_eq!(result.reference().matched().len(), 2);
        assert_eq!(result.target().matched(), &[MatchedRow { row: row(0), counterparts: vec![row(0), row(1)] }]);
    }

    #[test]
    fn test_partition_is_complete() {
        let reference: VariantTable<SnvVariant> = (1..=20)
            .map(|p| snv("1", p, "C", "T"))
            .collect();
        let target: VariantTable<SnvVariant> = (10..=35)
            .map(|p| snv("1", p, "C", "T"))
            .collect();
        let result = match_snvs(&reference, &target);

        for (partition, table_len) in [(result.reference(), reference.len()), (result.target(), target.len())] {
            let mut all: Vec<RowId> = partition.matched_rows().chain(partition.unmatched().iter().copied()).collect();
            all.sort();
            let expected: Vec<RowId> = (0..table_len).map(row).collect();
            assert_eq!(all, expected);
        }
        assert_eq!(result.reference().matched().len(), 11);
        assert_eq!(result.target().unmatched().len(), 15);
    }

    #[test]
    fn test_snv_permutation_invariant() {
        let reference = vec![snv("1", 100, "A", "T"), snv("1", 200, "C", "G"), snv("2", 5, "G", "A")];
        let target = vec![snv("2", 5, "G", "A"), snv("1", 100, "A", "T"), snv("3", 7, "T", "C")];

        let forward = match_snvs(&reference.clone().into(), &target.clone().into());
        let shuffled = match_snvs(
            &reference.into_iter().rev().collect(),
            &target.into_iter().rev().collect()
        );
        assert_eq!(forward.reference().matched().len(), shuffled.reference().matched().len());
        assert_eq!(forward.reference().unmatched().len(), shuffled.reference().unmatched().len());
        assert_eq!(forward.target().matched().len(), shuffled.target().matched().len());
        assert_eq!(forward.target().unmatched().len(), shuffled.target().unmatched().len());
    }

    #[test]
    fn test_match_svs() {
        let reference: VariantTable<SvVariant> = vec![del(1000, 5000), del(20_000, 30_000)].into();
        let target: VariantTable<SvVariant> = vec![del(1100, 4950), del(50_000, 60_000)].into();
        let result = match_svs(&reference, &target, &WindowedBreakpointMatcher, MatchConfig::default());

        assert_eq!(result.reference().matched(), &[MatchedRow { row: row(0), counterparts: vec![row(0)] }]);
        assert_eq!(result.reference().unmatched(), &[row(1)]);
        assert_eq!(result.target().unmatched(), &[row(1)]);

        // a tighter window drops the match
        let config = MatchConfigBuilder::default().window_size(50).build().unwrap();
        let result = match_svs(&reference, &target, &WindowedBreakpointMatcher, config);
        assert!(result.reference().matched().is_empty());
    }

    #[test]
    fn test_sv_permutation_invariant() {
        let inversion = SvVariant::new(
            Breakend::new("2".to_string(), 400, Strand::Forward),
            Breakend::new("2".to_string(), 9000, Strand::Forward),
            SvType::Inversion, Some(8600)
        );
        // the first three reference rows and first two target rows form a many-to-many cluster
        let reference = vec![
            del(1000, 5000), del(1050, 5050), del(1100, 4900),
            del(90_000, 95_000), del(300_000, 310_000), inversion
        ];
        let target = vec![del(1020, 5020), del(1150, 4950), del(90_100, 95_100), del(500_000, 600_000)];

        let orders = |rows: &Vec<SvVariant>| -> Vec<VariantTable<SvVariant>> {
            let mut rotated = rows.clone();
            rotated.rotate_left(2);
            vec![
                rows.clone().into(),
                rows.iter().rev().cloned().collect(),
                rotated.into(),
            ]
        };

        let expected_counts = SetCounts { a: 6, b: 5, a_not_b: 2, b_not_a: 1, a_and_b: 4, a_or_b: 7 };
        for reference_table in orders(&reference).iter() {
            for target_table in orders(&target).iter() {
                let result = match_svs(reference_table, target_table, &WindowedBreakpointMatcher, MatchConfig::default());
                assert_eq!(result.reference().matched().len(), 4);
                assert_eq!(result.reference().unmatched().len(), 2);
                assert_eq!(result.target().matched().len(), 3);
                assert_eq!(result.target().unmatched().len(), 1);
                let counterpart_total: usize = result.reference().matched().iter().map(|m| m.counterparts.len()).sum();
                assert_eq!(counterpart_total, 7);

                let report = ComparisonReport::new(reference_table, target_table, &result);
                assert_eq!(report.counts(), expected_counts);
            }
        }
    }

    #[test]
    fn test_match_svs_out_of_range_row_unmatched() {
        let far = i32::MAX as u64 + 1;
        let reference: VariantTable<SvVariant> = vec![del(1000, 5000), del(far, far + 10)].into();
        let target: VariantTable<SvVariant> = vec![del(far, far + 10), del(1000, 5000)].into();
        let result = match_svs(&reference, &target, &WindowedBreakpointMatcher, MatchConfig::default());
        assert_eq!(result.reference().matched(), &[MatchedRow { row: row(0), counterparts: vec![row(1)] }]);
        assert_eq!(result.reference().unmatched(), &[row(1)]);
        assert_eq!(result.target().unmatched(), &[row(0)]);
    }

    #[test]
    fn test_match_svs_empty_recovers() {
        let reference: VariantTable<SvVariant> = VariantTable::default();
        let target: VariantTable<SvVariant> = vec![del(1000, 5000)].into();
        let result = match_svs(&reference, &target, &WindowedBreakpointMatcher, MatchConfig::default());
        assert!(result.reference().is_empty());
        assert_eq!(result.target().unmatched(), &[row(0)]);
    }

    struct FailingMatcher;

    impl BreakpointMatcher for FailingMatcher {
        fn match_breakpoints(
            &self, _reference: &VariantTable<SvVariant>, _target: &VariantTable<SvVariant>, _window: u64
        ) -> Result<Vec<(RowId, RowId)>, MatchingBackendFailure> {
            Err(MatchingBackendFailure::EmptyInput { side: "reference" })
        }
    }

    struct OutOfRangeMatcher;

    impl BreakpointMatcher for OutOfRangeMatcher {
        fn match_breakpoints(
            &self, _reference: &VariantTable<SvVariant>, _target: &VariantTable<SvVariant>, _window: u64
        ) -> Result<Vec<(RowId, RowId)>, MatchingBackendFailure> {
            Ok(vec![(row(0), row(0)), (row(7), row(0))])
        }
    }

    #[test]
    fn test_backend_failure_is_zero_matches() {
        let reference: VariantTable<SvVariant> = vec![del(1000, 5000)].into();
        let target: VariantTable<SvVariant> = vec![del(1000, 5000)].into();
        let result = match_svs(&reference, &target, &FailingMatcher, MatchConfig::default());
        assert!(result.reference().matched().is_empty());
        assert!(result.target().matched().is_empty());
        assert_eq!(result.reference().unmatched().len(), 1);
        assert_eq!(result.target().unmatched().len(), 1);
    }

    #[test]
    fn test_out_of_range_pairs_ignored() {
        let reference: VariantTable<SvVariant> = vec![del(1000, 5000)].into();
        let target: VariantTable<SvVariant> = vec![del(1000, 5000)].into();
        let result = match_svs(&reference, &target, &OutOfRangeMatcher, MatchConfig::default());
        assert_eq!(result.reference().matched().len(), 1);
        assert_eq!(result.reference().len(), 1);
    }
}
