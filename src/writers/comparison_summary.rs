
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::comparison_report::SetCounts;

/// Formatting options for the summary line
#[derive(Clone, Debug)]
pub struct SummaryFormat {
    /// Optional sample label prepended to the line
    pub name: Option<String>,
    /// Emit the header line first
    pub include_header: bool,
    /// Field separator
    pub delimiter: String,
}

impl Default for SummaryFormat {
    fn default() -> Self {
        Self {
            name: None,
            include_header: true,
            delimiter: "\t".to_string()
        }
    }
}

/// Writes the optional header plus the single summary line to a writer
/// # Arguments
/// * `writer` - destination
/// * `counts` - the six cardinalities
/// * `format` - naming and layout options
pub fn write_summary_line<W: Write>(writer: &mut W, counts: &SetCounts, format: &SummaryFormat) -> std::io::Result<()> {
    if format.include_header {
        writeln!(writer, "{}", SetCounts::header(format.name.is_some(), &format.delimiter))?;
    }
    writeln!(writer, "{}", counts.to_line(format.name.as_deref(), &format.delimiter))?;
    Ok(())
}

/// Writes the summary to a file, or to stdout if no file is given
/// # Errors
/// * if the output cannot be created or written
pub fn write_summary(output: Option<&Path>, counts: &SetCounts, format: &SummaryFormat) -> anyhow::Result<()> {
    let sink: Box<dyn Write> = match output {
        Some(filename) => {
            let file = File::create(filename)
                .with_context(|| format!("Error while creating {filename:?}:"))?;
            Box::new(file)
        },
        None => Box::new(std::io::stdout().lock())
    };
    let mut writer = BufWriter::new(sink);
    write_summary_line(&mut writer, counts, format)
        .context("Error while writing summary:")?;
    writer.flush()
        .context("Error while flushing summary:")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> SetCounts {
        SetCounts { a: 1, b: 2, a_not_b: 0, b_not_a: 1, a_and_b: 1, a_or_b: 2 }
    }

    #[test]
    fn test_summary_line_default() {
        let mut buffer = vec![];
        write_summary_line(&mut buffer, &counts(), &SummaryFormat::default()).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "A\tB\tA-B\tB-A\tA&B\tA|B\n1\t2\t0\t1\t1\t2\n");
    }

    #[test]
    fn test_summary_line_named_no_header() {
        let format = SummaryFormat {
            name: Some("tumor_01".to_string()),
            include_header: false,
            delimiter: " ".to_string()
        };
        let mut buffer = vec![];
        write_summary_line(&mut buffer, &counts(), &format).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "tumor_01 1 2 0 1 1 2\n");
    }

    #[test]
    fn test_write_summary_file() {
        let tmp = tempfile::tempdir().unwrap();
        let filename = tmp.path().join("summary.tsv");
        let format = SummaryFormat { name: Some("s1".to_string()), ..Default::default() };
        write_summary(Some(&filename), &counts(), &format).unwrap();
        let content = std::fs::read_to_string(&filename).unwrap();
        assert_eq!(content, "name\tA\tB\tA-B\tB-A\tA&B\tA|B\ns1\t1\t2\t0\t1\t1\t2\n");
    }
}
