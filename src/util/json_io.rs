
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Loads a column mapping, spectrum, or any other deserializable struct from (optionally gzipped) JSON
/// # Arguments
/// * `filename` - the file path to open and parse
/// # Errors
/// * if the file does not open properly
/// * if the deserialization throws errors
pub fn load_json<T: serde::de::DeserializeOwned>(filename: &Path) -> anyhow::Result<T> {
    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let fp: Box<dyn Read> = if filename.extension().unwrap_or_default() == "gz" {
        Box::new(flate2::read::MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let result: T = serde_json::from_reader(BufReader::new(fp))
        .with_context(|| format!("Error while deserializing {filename:?}:"))?;
    Ok(result)
}

/// Saves a serializable struct as pretty JSON, gzipped if the path ends in ".gz"
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file = File::create(out_filename)
        .with_context(|| format!("Error while creating {out_filename:?}:"))?;
    let file: Box<dyn Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(flate2::write::GzEncoder::new(file, flate2::Compression::best()))
    } else {
        Box::new(file)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::spectrum::Spectrum;
    use crate::parsing::table_loader::ColumnConfig;

    #[test]
    fn test_spectrum_json() {
        let tmp = tempfile::tempdir().unwrap();
        let mut spectrum = Spectrum::sv();
        spectrum.increment("del:<1kb").unwrap();

        for name in ["spectrum.json", "spectrum.json.gz"] {
            let filename = tmp.path().join(name);
            save_json(&spectrum, &filename).unwrap();
            let loaded: indexmap::IndexMap<String, u64> = load_json(&filename).unwrap();
            assert_eq!(loaded.len(), spectrum.len());
            assert_eq!(loaded.get("del:<1kb"), Some(&1));
            // order of the vocabulary is kept
            assert_eq!(loaded.keys().next().map(|s| s.as_str()), spectrum.labels().next());
        }
    }

    #[test]
    fn test_load_column_config() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = tmp.path().join("columns.json");
        std::fs::write(&filename, r#"{"sv": {"sv_type": "svtype"}}"#).unwrap();
        let config: ColumnConfig = load_json(&filename).unwrap();
        assert_eq!(config.sv.sv_type, "svtype");
        assert_eq!(config.sv.chromosome_1, "chromosome_1");
    }

    #[test]
    fn test_missing_file() {
        let result: anyhow::Result<ColumnConfig> = load_json(Path::new("test_data/does_not_exist.json"));
        assert!(result.is_err());
    }
}
