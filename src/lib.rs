/*!
# varsieve
Reconciles pairs of somatic variant call sets and profiles their mutation spectra.

Point mutations are matched on exact (chromosome, position, ref, alt) keys, structural variants with a windowed breakpoint search.
Both produce a `MatchResult` that the `ComparisonReport` turns into the fixed six set cardinalities.
Spectra are counted over fixed vocabularies: 96 trinucleotide contexts, SV type and length bins, and ID83 indel features.
*/

/// Windowed breakpoint matching backends for structural variants
pub mod breakpoint_matcher;
/// Command line interface functionality
pub mod cli;
/// Set algebra over match results
pub mod comparison_report;
/// Maps single variants onto spectrum categories
pub mod context_classifier;
/// Contains various shared data types
pub mod data_types;
/// Contract with the external indel classification tool
pub mod indel_classifier;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Reference sequence lookups
pub mod sequence_provider;
/// Aggregates classifications into spectra
pub mod spectrum_counter;
/// Various utility functions that tend to be very generic
pub mod util;
/// Partitions two tables into matched and unmatched rows
pub mod variant_matcher;
/// All output writers
pub mod writers;
