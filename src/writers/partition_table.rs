
use itertools::Itertools;
use std::fs::File;
use std::path::Path;

use crate::data_types::match_result::{MatchResult, TablePartition};
use crate::data_types::variant_table::{RowId, TableRecord, VariantTable};

/// Label written for the first table
pub const REFERENCE_LABEL: &str = "reference";
/// Label written for the second table
pub const TARGET_LABEL: &str = "target";

/// Fixed leading columns; the key columns of the record type follow
const LEADING_COLUMNS: [&str; 4] = ["table", "row", "status", "counterparts"];

/// Writes one line per input row, listing whether it matched and which rows of the other table it matched.
/// Counterparts are ';' separated row ids.
/// # Arguments
/// * `filename` - the filename for the output (tsv/csv)
/// * `reference` - the first table
/// * `target` - the second table
/// * `result` - the partitions of both tables
pub fn write_partitions<V: TableRecord>(
    filename: &Path, reference: &VariantTable<V>, target: &VariantTable<V>, result: &MatchResult
) -> csv::Result<()> {
    let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
    let delimiter: u8 = if is_csv { b',' } else { b'\t' };
    let mut csv_writer: csv::Writer<File> = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(filename)?;

    let header: Vec<&str> = LEADING_COLUMNS.iter()
        .chain(V::key_labels().iter())
        .copied()
        .collect();
    csv_writer.write_record(&header)?;

    write_partition(&mut csv_writer, REFERENCE_LABEL, reference, result.reference())?;
    write_partition(&mut csv_writer, TARGET_LABEL, target, result.target())?;
    csv_writer.flush()?;
    Ok(())
}

/// Writes the rows of one table in row order
fn write_partition<V: TableRecord>(
    csv_writer: &mut csv::Writer<File>, label: &str, table: &VariantTable<V>, partition: &TablePartition
) -> csv::Result<()> {
    let mut rows: Vec<(RowId, Option<&[RowId]>)> = partition.matched().iter()
        .map(|m| (m.row, Some(m.counterparts.as_slice())))
        .chain(partition.unmatched().iter().map(|&r| (r, None)))
        .collect();
    rows.sort_by_key(|(r, _)| *r);

    for (row_id, counterparts) in rows.into_iter() {
        let Some(record) = table.get(row_id) else {
            continue;
        };
        let (status, counterpart_str) = match counterparts {
            Some(c) => ("matched", c.iter().map(|r| r.index()).join(";")),
            None => ("unmatched", String::new())
        };
        let mut fields = vec![label.to_string(), row_id.index().to_string(), status.to_string(), counterpart_str];
        fields.extend(V::key_fields(&record.key()));
        csv_writer.write_record(&fields)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::variants::SnvVariant;
    use crate::variant_matcher::match_snvs;

    #[test]
    fn test_write_partitions() {
        let reference: VariantTable<SnvVariant> = vec![
            SnvVariant::new("1".to_string(), 100, "A", "T").unwrap(),
            SnvVariant::new("1".to_string(), 150, "G", "C").unwrap(),
        ].into();
        let target: VariantTable<SnvVariant> = vec![
            SnvVariant::new("1".to_string(), 200, "C", "G").unwrap(),
            SnvVariant::new("1".to_string(), 100, "A", "T").unwrap(),
        ].into();
        let result = match_snvs(&reference, &target);

        let tmp = tempfile::tempdir().unwrap();
        let filename = tmp.path().join("partitions.tsv");
        write_partitions(&filename, &reference, &target, &result).unwrap();

        let content = std::fs::read_to_string(&filename).unwrap();
        let expected = [
            "table\trow\tstatus\tcounterparts\tchrom\tpos\tref\talt",
            "reference\t0\tmatched\t1\t1\t100\tA\tT",
            "reference\t1\tunmatched\t\t1\t150\tG\tC",
            "target\t0\tunmatched\t\t1\t200\tC\tG",
            "target\t1\tmatched\t0\t1\t100\tA\tT",
        ];
        assert_eq!(content.lines().collect::<Vec<_>>(), expected);
    }
}
