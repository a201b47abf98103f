/*!
# Parsing module
Contains the logic for parsing input files into meaningful structs / data.
*/
/// Loads point mutation, indel, and SV tables with configurable columns
pub mod table_loader;
