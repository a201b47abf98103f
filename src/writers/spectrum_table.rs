
use serde::Serialize;
use std::fs::File;
use std::path::Path;

use crate::data_types::spectrum::{Spectrum, SpectrumTally};

/// One category of the spectrum table
#[derive(Serialize)]
struct SpectrumRow<'a> {
    /// Category label, e.g. "T[C>T]A"
    category: &'a str,
    /// Number of records in the category
    count: u64,
}

/// One record that did not make it into the spectrum
#[derive(Serialize)]
struct SkippedRow {
    /// 0-based row in the input table
    row: usize,
    /// Why the row was left out
    reason: String,
}

/// Opens a csv writer whose delimiter follows the file extension
fn open_writer(filename: &Path) -> csv::Result<csv::Writer<File>> {
    // modify the delimiter to "," if it ends with .csv
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)
}

/// Writes every category of the spectrum, in vocabulary order, including zero counts
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `spectrum` - the counts to save
pub fn write_spectrum(filename: &Path, spectrum: &Spectrum) -> csv::Result<()> {
    let mut csv_writer = open_writer(filename)?;
    for (category, count) in spectrum.iter() {
        csv_writer.serialize(SpectrumRow { category, count })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the skipped records of a tally
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `tally` - the counting result
pub fn write_skipped(filename: &Path, tally: &SpectrumTally) -> csv::Result<()> {
    let mut csv_writer = open_writer(filename)?;
    for (row_id, reason) in tally.skipped.iter() {
        csv_writer.serialize(SkippedRow { row: row_id.index(), reason: reason.to_string() })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::spectrum::SkipReason;
    use crate::data_types::variant_table::RowId;

    #[test]
    fn test_write_spectrum() {
        let tmp = tempfile::tempdir().unwrap();
        let mut spectrum = Spectrum::snv();
        spectrum.add("T[C>T]A", 3).unwrap();

        let tsv_fn = tmp.path().join("spectrum.tsv");
        write_spectrum(&tsv_fn, &spectrum).unwrap();
        let content = std::fs::read_to_string(&tsv_fn).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 97);
        assert_eq!(lines[0], "category\tcount");
        assert_eq!(lines[1], "A[C>A]A\t0");
        assert!(lines.contains(&"T[C>T]A\t3"));

        let csv_fn = tmp.path().join("spectrum.csv");
        write_spectrum(&csv_fn, &spectrum).unwrap();
        let content = std::fs::read_to_string(&csv_fn).unwrap();
        assert!(content.starts_with("category,count\n"));
    }

    #[test]
    fn test_write_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut tally = SpectrumTally::new(Spectrum::sv());
        tally.skipped.push((RowId::from_index(4), SkipReason::NegativeLength { length: -10 }));

        let filename = tmp.path().join("skipped.tsv");
        write_skipped(&filename, &tally).unwrap();
        let content = std::fs::read_to_string(&filename).unwrap();
        assert_eq!(content, "row\treason\n4\tnegative SV length -10\n");
    }
}
