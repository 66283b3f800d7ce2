//! Raw CSV source
//!
//! Reads the sales export without interpreting any field. Exports come out
//! of spreadsheet tools in Latin-1 as often as UTF-8, so each field is
//! decoded on its own and falls back to Latin-1 when it is not valid UTF-8.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input has no header row")]
    MissingHeader,
}

/// Headers plus text records, every record exactly as wide as the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table in memory. Records are padded or truncated to the
    /// header width, the same way [`read_raw`] treats ragged lines.
    pub fn from_records<I, R, S>(headers: &[&str], records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let width = headers.len();
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            records: records
                .into_iter()
                .map(|record| fit_width(record.into_iter().map(Into::into).collect(), width))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read a headered CSV file
pub fn read_raw_csv(path: impl AsRef<Path>) -> Result<RawTable, SourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let table = read_raw(file)?;
    info!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.records.len(),
        "Read raw sales export"
    );
    Ok(table)
}

/// Read a headered CSV from any reader
pub fn read_raw<R: Read>(reader: R) -> Result<RawTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut headers: Vec<String> = reader.byte_headers()?.iter().map(decode_field).collect();
    if headers.is_empty() {
        return Err(SourceError::MissingHeader);
    }
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    let width = headers.len();
    let mut records = Vec::new();
    let mut ragged = 0usize;
    for record in reader.byte_records() {
        let record = record?;
        if record.len() != width {
            ragged += 1;
        }
        records.push(fit_width(record.iter().map(decode_field).collect(), width));
    }

    if ragged > 0 {
        debug!(ragged, width, "Padded or truncated ragged records");
    }
    Ok(RawTable { headers, records })
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Latin-1 maps every byte to the code point of the same value
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn fit_width(mut fields: Vec<String>, width: usize) -> Vec<String> {
    fields.resize(width, String::new());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_pads_and_truncates_ragged_lines() {
        let data = "a,b,c\n1,2,3\n4,5\n6,7,8,9\n";
        let table = read_raw(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.records[1], vec!["4", "5", ""]);
        assert_eq!(table.records[2], vec!["6", "7", "8"]);
    }

    #[test]
    fn test_latin1_fields_are_decoded() {
        let mut data = b"city\n".to_vec();
        data.extend_from_slice(b"Montr\xe9al\n");
        let table = read_raw(data.as_slice()).unwrap();
        assert_eq!(table.records[0][0], "Montréal");
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let data = "\u{feff}Row ID,Sales\n1,2\n";
        let table = read_raw(data.as_bytes()).unwrap();
        assert_eq!(table.headers[0], "Row ID");
    }

    #[test]
    fn test_missing_file() {
        let err = read_raw_csv("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "Order ID,Sales\nCA-1,\"1,200.50\"\n").unwrap();

        let table = read_raw_csv(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0], vec!["CA-1", "1,200.50"]);
    }

    #[test]
    fn test_from_records_fits_width() {
        let table = RawTable::from_records(&["a", "b"], vec![vec!["1"], vec!["2", "3", "4"]]);
        assert_eq!(table.records, vec![vec!["1", ""], vec!["2", "3"]]);
    }
}
