/// Matched/unmatched partitions of two tables
pub mod match_result;
/// Fixed-domain spectra and their vocabularies
pub mod spectrum;
/// Row-addressed variant tables and the record trait
pub mod variant_table;
/// Contains variant definition functionality and checks
pub mod variants;
