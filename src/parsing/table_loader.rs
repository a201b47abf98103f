
use flate2::read::MultiGzDecoder;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::data_types::variant_table::VariantTable;
use crate::data_types::variants::{Breakend, IndelVariant, SnvVariant, Strand, SvType, SvVariant};

/// Number of leading bytes inspected when choosing between tab and comma delimiters
const SNIFF_BYTES: usize = 10_000;
/// Values of the variant type column that are kept for point mutation tables
const SNV_VARIANT_TYPES: [&str; 1] = ["SNP"];
/// Values of the variant type column that are kept for indel tables
const INDEL_VARIANT_TYPES: [&str; 2] = ["INS", "DEL"];
/// Length values treated as missing
const MISSING_VALUES: [&str; 5] = ["", "NA", "NaN", "nan", "."];

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("I/O error while reading table: {0}")]
    Io(#[from] std::io::Error),
    #[error("error while parsing table: {0}")]
    Csv(#[from] csv::Error),
    #[error("{filename:?} is missing required columns: {missing:?}")]
    MissingColumns { filename: PathBuf, missing: Vec<String> },
    #[error("{filename:?} row {row}: {detail}")]
    InvalidRow { filename: PathBuf, row: usize, detail: String },
}

/// Source column names for point mutation and indel tables.
/// Defaults follow the MAF conventions.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SnvColumns {
    pub chrom: String,
    pub pos: String,
    pub ref_allele: String,
    pub alt_allele: String,
    /// Optional column used to select SNPs (or INS/DEL); ignored when absent from the table
    pub variant_type: String,
}

impl Default for SnvColumns {
    fn default() -> Self {
        Self {
            chrom: "Chromosome".to_string(),
            pos: "Start_Position".to_string(),
            ref_allele: "Reference_Allele".to_string(),
            alt_allele: "Tumor_Seq_Allele2".to_string(),
            variant_type: "Variant_Type".to_string()
        }
    }
}

/// Source column names for structural variant tables
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SvColumns {
    pub chromosome_1: String,
    pub position_1: String,
    pub strand_1: String,
    pub chromosome_2: String,
    pub position_2: String,
    pub strand_2: String,
    pub sv_type: String,
    pub length: String,
}

impl Default for SvColumns {
    fn default() -> Self {
        Self {
            chromosome_1: "chromosome_1".to_string(),
            position_1: "position_1".to_string(),
            strand_1: "strand_1".to_string(),
            chromosome_2: "chromosome_2".to_string(),
            position_2: "position_2".to_string(),
            strand_2: "strand_2".to_string(),
            sv_type: "type".to_string(),
            length: "length".to_string()
        }
    }
}

/// The full column mapping, typically loaded from JSON
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub snv: SnvColumns,
    pub sv: SvColumns,
}

/// Opens a plain or gzipped table and picks tab or comma from the leading bytes
/// # Arguments
/// * `filename` - the table; ".gz" files are decompressed
pub fn open_table(filename: &Path) -> Result<csv::Reader<Box<dyn Read>>, TableError> {
    let mut raw: Box<dyn Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(MultiGzDecoder::new(File::open(filename)?))
    } else {
        Box::new(File::open(filename)?)
    };

    // sniff the delimiter, then stitch the sniffed bytes back in front of the stream
    let mut head = Vec::with_capacity(SNIFF_BYTES);
    (&mut raw).take(SNIFF_BYTES as u64).read_to_end(&mut head)?;
    let delimiter = if head.contains(&b'\t') { b'\t' } else { b',' };
    debug!("Using delimiter {:?} for {filename:?}", delimiter as char);

    let stream: Box<dyn Read> = Box::new(Cursor::new(head).chain(raw));
    let csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .has_headers(true)
        .from_reader(stream);
    Ok(csv_reader)
}

/// Resolved positions of the requested columns
struct ColumnIndex {
    indices: Vec<usize>,
}

impl ColumnIndex {
    /// Looks up every required column; all missing names are reported together
    fn resolve(filename: &Path, headers: &csv::StringRecord, required: &[&str]) -> Result<Self, TableError> {
        let mut indices = vec![];
        let mut missing = vec![];
        for &name in required.iter() {
            match headers.iter().position(|h| h.trim() == name) {
                Some(i) => indices.push(i),
                None => missing.push(name.to_string())
            }
        }
        if !missing.is_empty() {
            return Err(TableError::MissingColumns { filename: filename.to_path_buf(), missing });
        }
        Ok(Self { indices })
    }

    /// Field `i` of the required list
    fn get<'r>(&self, record: &'r csv::StringRecord, i: usize) -> &'r str {
        record.get(self.indices[i]).unwrap_or_default().trim()
    }
}

/// Parses integers, tolerating the "123.0" form that spreadsheet exports produce
fn parse_integer(value: &str) -> Result<i64, String> {
    if let Ok(v) = value.parse::<i64>() {
        return Ok(v);
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(format!("{value:?} is not an integer"))
    }
}

fn parse_position(value: &str) -> Result<u64, String> {
    let v = parse_integer(value)?;
    u64::try_from(v).map_err(|_| format!("position {v} is negative"))
}

fn parse_length(value: &str) -> Result<Option<i64>, String> {
    if MISSING_VALUES.contains(&value) {
        Ok(None)
    } else {
        parse_integer(value).map(Some)
    }
}

/// Shared loading loop.
/// # Arguments
/// * `filename` - the table to load
/// * `required` - source column names that must be present, in the order `parse_row` expects them
/// * `selection` - optional (column, accepted values) filter, only applied if the column exists
/// * `parse_row` - turns the required fields of one row into a record
fn load_table<V, F>(
    filename: &Path, required: &[&str], selection: Option<(&str, &[&str])>, mut parse_row: F
) -> Result<VariantTable<V>, TableError>
where
    F: FnMut(&ColumnIndex, &csv::StringRecord) -> Result<V, String>
{
    let mut csv_reader = open_table(filename)?;
    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::resolve(filename, &headers, required)?;

    let selection_index = selection.and_then(|(column, accepted)| {
        headers.iter()
            .position(|h| h.trim() == column)
            .map(|i| (i, accepted))
    });
    if let Some((column, _)) = selection {
        if selection_index.is_none() {
            debug!("Column {column:?} not found in {filename:?}, keeping all rows");
        }
    }

    let mut rows = vec![];
    let mut filtered: usize = 0;
    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        if let Some((index, accepted)) = selection_index {
            if !accepted.contains(&record.get(index).unwrap_or_default().trim()) {
                filtered += 1;
                continue;
            }
        }
        // rows are reported 1-based, not counting the header
        let variant = parse_row(&columns, &record)
            .map_err(|detail| TableError::InvalidRow { filename: filename.to_path_buf(), row: i + 1, detail })?;
        rows.push(variant);
    }

    info!("Loaded {} records from {filename:?} ({filtered} filtered by type)", rows.len());
    Ok(rows.into())
}

/// Loads point mutations, keeping only SNP rows when the variant type column is present
pub fn load_snv_table(filename: &Path, columns: &SnvColumns) -> Result<VariantTable<SnvVariant>, TableError> {
    let required = [columns.chrom.as_str(), columns.pos.as_str(), columns.ref_allele.as_str(), columns.alt_allele.as_str()];
    load_table(
        filename, &required, Some((columns.variant_type.as_str(), &SNV_VARIANT_TYPES[..])),
        |index, record| {
            let position = parse_position(index.get(record, 1))?;
            SnvVariant::new(index.get(record, 0).to_string(), position, index.get(record, 2), index.get(record, 3))
                .map_err(|e| e.to_string())
        }
    )
}

/// Loads indels, keeping only INS/DEL rows when the variant type column is present
pub fn load_indel_table(filename: &Path, columns: &SnvColumns) -> Result<VariantTable<IndelVariant>, TableError> {
    let required = [columns.chrom.as_str(), columns.pos.as_str(), columns.ref_allele.as_str(), columns.alt_allele.as_str()];
    load_table(
        filename, &required, Some((columns.variant_type.as_str(), &INDEL_VARIANT_TYPES[..])),
        |index, record| {
            let position = parse_position(index.get(record, 1))?;
            IndelVariant::new(index.get(record, 0).to_string(), position, index.get(record, 2), index.get(record, 3))
                .map_err(|e| e.to_string())
        }
    )
}

/// Loads structural variants, normalizing the type vocabulary.
/// An unrecognized type fails the whole load with the offending row.
pub fn load_sv_table(filename: &Path, columns: &SvColumns) -> Result<VariantTable<SvVariant>, TableError> {
    let required = [
        columns.chromosome_1.as_str(), columns.position_1.as_str(), columns.strand_1.as_str(),
        columns.chromosome_2.as_str(), columns.position_2.as_str(), columns.strand_2.as_str(),
        columns.sv_type.as_str(), columns.length.as_str()
    ];
    load_table(filename, &required, None, |index, record| {
        let end1 = Breakend::new(
            index.get(record, 0).to_string(),
            parse_position(index.get(record, 1))?,
            Strand::parse(index.get(record, 2)).map_err(|e| e.to_string())?
        );
        let end2 = Breakend::new(
            index.get(record, 3).to_string(),
            parse_position(index.get(record, 4))?,
            Strand::parse(index.get(record, 5)).map_err(|e| e.to_string())?
        );
        let sv_type = SvType::normalize(index.get(record, 6)).map_err(|e| e.to_string())?;
        let length = parse_length(index.get(record, 7))?;
        Ok(SvVariant::new(end1, end2, sv_type, length))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let filename = dir.join(name);
        std::fs::write(&filename, content).unwrap();
        filename
    }

    #[test]
    fn test_load_snv_fixture() {
        let filename = PathBuf::from("test_data/tables/snvs.maf");
        let table = load_snv_table(&filename, &SnvColumns::default()).unwrap();
        // the DEL row is dropped by the Variant_Type selection
        assert_eq!(table.len(), 3);
        let first = &table.records()[0];
        assert_eq!(first.chrom(), "1");
        assert_eq!(first.position(), 100);
        assert_eq!(first.ref_base(), b'A');
        assert_eq!(first.alt_base(), b'T');
    }

    #[test]
    fn test_load_indel_fixture() {
        let filename = PathBuf::from("test_data/tables/snvs.maf");
        let table = load_indel_table(&filename, &SnvColumns::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].ref_allele(), "TC");
    }

    #[test]
    fn test_load_sv_fixture() {
        let filename = PathBuf::from("test_data/tables/svs.csv");
        let table = load_sv_table(&filename, &SvColumns::default()).unwrap();
        assert_eq!(table.len(), 4);
        let types: Vec<SvType> = table.records().iter().map(|sv| sv.sv_type()).collect();
        assert_eq!(types, vec![SvType::Deletion, SvType::Duplication, SvType::Inversion, SvType::Translocation]);
        assert_eq!(table.records()[0].length(), Some(4000));
        assert_eq!(table.records()[3].length(), None);
        assert_eq!(table.records()[3].end2().chrom, "5");
        assert_eq!(table.records()[1].end1().strand, Strand::Reverse);
    }

    #[test]
    fn test_gzip_and_custom_columns() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = tmp.path().join("custom.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&filename).unwrap(), Compression::default());
        encoder.write_all(b"#comment line\nchr\tposition\tr\ta\nX\t55\tc\tg\nX\t56.0\tG\tT\n").unwrap();
        encoder.finish().unwrap();

        let columns = SnvColumns {
            chrom: "chr".to_string(),
            pos: "position".to_string(),
            ref_allele: "r".to_string(),
            alt_allele: "a".to_string(),
            ..Default::default()
        };
        let table = load_snv_table(&filename, &columns).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].ref_base(), b'C');
        assert_eq!(table.records()[1].position(), 56);
    }

    #[test]
    fn test_missing_columns_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = write_file(tmp.path(), "bad.tsv", "Chromosome\tStart_Position\tReference_Allele\n1\t100\tA\n");
        match load_snv_table(&filename, &SnvColumns::default()) {
            Err(TableError::MissingColumns { missing, .. }) => assert_eq!(missing, vec!["Tumor_Seq_Allele2".to_string()]),
            other => panic!("unexpected result: {other:?}")
        }
    }

    #[test]
    fn test_unknown_sv_type_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = write_file(
            tmp.path(), "cnv.csv",
            "chromosome_1,position_1,strand_1,chromosome_2,position_2,strand_2,type,length\n1,100,+,1,900,-,CNV,800\n"
        );
        match load_sv_table(&filename, &SvColumns::default()) {
            Err(TableError::InvalidRow { row, detail, .. }) => {
                assert_eq!(row, 1);
                assert!(detail.contains("CNV"), "{detail}");
            },
            other => panic!("unexpected result: {other:?}")
        }
    }

    #[test]
    fn test_invalid_base_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = write_file(
            tmp.path(), "multi.tsv",
            "Chromosome\tStart_Position\tReference_Allele\tTumor_Seq_Allele2\n1\t100\tA\tT\n1\t200\tAC\tT\n"
        );
        assert!(matches!(
            load_snv_table(&filename, &SnvColumns::default()),
            Err(TableError::InvalidRow { row: 2, .. })
        ));
    }

    #[test]
    fn test_column_config_json() {
        let config: ColumnConfig = serde_json::from_str(r#"{"snv": {"chrom": "CHROM", "pos": "POS"}}"#).unwrap();
        assert_eq!(config.snv.chrom, "CHROM");
        assert_eq!(config.snv.ref_allele, "Reference_Allele");
        assert_eq!(config.sv, SvColumns::default());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_integer("42"), Ok(42));
        assert_eq!(parse_integer("42.0"), Ok(42));
        assert!(parse_integer("42.5").is_err());
        assert!(parse_position("-1").is_err());
        assert_eq!(parse_length("NA"), Ok(None));
        assert_eq!(parse_length("-300"), Ok(Some(-300)));
    }
}
