/*!
# Breakpoint matcher
Windowed matching of structural variant breakends.
A reference and target SV correspond when both breakends agree on chromosome and strand, both positions are within `window` bp,
and the types are identical.
*/
use coitrees::{COITree, Interval, IntervalTree};
use log::{trace, warn};
use rustc_hash::FxHashMap;

use crate::data_types::variant_table::{RowId, VariantTable};
use crate::data_types::variants::{Strand, SvType, SvVariant};

/// Default breakend tolerance in bp
pub const DEFAULT_WINDOW_SIZE: u64 = 200;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MatchingBackendFailure {
    #[error("cannot match breakpoints with an empty {side} table")]
    EmptyInput { side: &'static str },
}

/// Anything that can produce (reference row, target row) correspondences for two SV tables
pub trait BreakpointMatcher {
    /// # Arguments
    /// * `reference` - the first table
    /// * `target` - the second table
    /// * `window` - maximum distance in bp between corresponding breakends
    /// # Errors
    /// * if the backend cannot handle the input; callers typically treat this as "no correspondences"
    fn match_breakpoints(
        &self, reference: &VariantTable<SvVariant>, target: &VariantTable<SvVariant>, window: u64
    ) -> Result<Vec<(RowId, RowId)>, MatchingBackendFailure>;
}

/// Lookup key for the first breakend; everything that must be exactly equal for the first end to match
type EndKey = (String, Strand, SvType);

/// Interval-tree backed matcher: one tree of first-breakend windows per (chromosome, strand, type)
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowedBreakpointMatcher;

/// Converts a 1-based position into the i32 coordinate space of the trees.
/// Positions beyond that range are reported and the row is left out of matching, so it ends up unmatched.
fn tree_coordinate(side: &str, row_id: RowId, chrom: &str, position: u64) -> Option<i32> {
    match i32::try_from(position) {
        Ok(c) => Some(c),
        Err(_) => {
            warn!("Skipping {side} row {row_id}: breakend {chrom}:{position} is outside the supported coordinate range");
            None
        }
    }
}

impl BreakpointMatcher for WindowedBreakpointMatcher {
    fn match_breakpoints(
        &self, reference: &VariantTable<SvVariant>, target: &VariantTable<SvVariant>, window: u64
    ) -> Result<Vec<(RowId, RowId)>, MatchingBackendFailure> {
        if reference.is_empty() {
            return Err(MatchingBackendFailure::EmptyInput { side: "reference" });
        }
        if target.is_empty() {
            return Err(MatchingBackendFailure::EmptyInput { side: "target" });
        }

        // group the target first-breakends into padded intervals, metadata is the target row index
        let window = i32::try_from(window).unwrap_or(i32::MAX);
        let mut grouped: FxHashMap<EndKey, Vec<Interval<usize>>> = Default::default();
        for (row_id, sv) in target.iter() {
            let end1 = sv.end1();
            let Some(center) = tree_coordinate("target", row_id, &end1.chrom, end1.position) else {
                continue;
            };
            let interval = Interval::new(center.saturating_sub(window), center.saturating_add(window), row_id.index());
            grouped.entry((end1.chrom.clone(), end1.strand, sv.sv_type()))
                .or_default()
                .push(interval);
        }
        let trees: FxHashMap<EndKey, COITree<usize, usize>> = grouped.iter()
            .map(|(k, intervals)| (k.clone(), COITree::new(intervals)))
            .collect();

        let mut pairs = vec![];
        for (reference_id, sv) in reference.iter() {
            let end1 = sv.end1();
            let key = (end1.chrom.clone(), end1.strand, sv.sv_type());
            let Some(tree) = trees.get(&key) else {
                continue;
            };

            let Some(center) = tree_coordinate("reference", reference_id, &end1.chrom, end1.position) else {
                continue;
            };
            let mut candidates: Vec<usize> = vec![];
            tree.query(center, center, |hit| {
                candidates.push(hit.metadata.clone());
            });

            // the second breakend has to line up as well
            candidates.sort_unstable();
            for target_index in candidates.into_iter() {
                let target_id = RowId::from_index(target_index);
                let Some(other) = target.get(target_id) else {
                    continue;
                };
                let (a, b) = (sv.end2(), other.end2());
                if a.chrom == b.chrom && a.strand == b.strand && a.position.abs_diff(b.position) <= window as u64 {
                    trace!("Breakpoint match: reference {reference_id} <-> target {target_id}");
                    pairs.push((reference_id, target_id));
                }
            }
        }
        Ok(pairs)
    }
}
