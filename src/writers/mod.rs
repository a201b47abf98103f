/*!
# Writers module
Contains the logic for writing the output files for the compare and spectrum commands.
*/
/// Writes the single-line set summary of a comparison
pub mod comparison_summary;
/// Writes the per-row match listing
pub mod partition_table;
/// Writes spectra and skipped records
pub mod spectrum_table;
