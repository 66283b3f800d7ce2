//! Schema normalizer
//!
//! Produces typed [`TransactionRow`]s from a [`RawTable`]:
//!
//! 1. exact duplicate records are removed, first occurrence kept
//! 2. column names are trimmed, lower-cased and spaces become `_`
//! 3. duplicate column names are reported; the first occurrence is read
//! 4. text fields are trimmed and title-cased
//! 5. numeric fields lose `,` separators; empty, `-` and unparseable values
//!    become 0 and are counted
//! 6. dates are parsed leniently; a row without a usable order date is
//!    dropped, a bad ship date becomes `None`
//!
//! Quantity, postal code and row id are unsigned. Negative or fractional
//! values coerce to 0, and postal codes lose leading zeros.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use insights_ir::TransactionRow;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::source::RawTable;

pub const TEXT_COLUMNS: [&str; 13] = [
    "order_id",
    "ship_mode",
    "customer_id",
    "customer_name",
    "segment",
    "country",
    "city",
    "state",
    "region",
    "product_id",
    "category",
    "sub_category",
    "product_name",
];

pub const FLOAT_COLUMNS: [&str; 3] = ["sales", "discount", "profit"];

pub const INTEGER_COLUMNS: [&str; 3] = ["row_id", "quantity", "postal_code"];

pub const DATE_COLUMNS: [&str; 2] = ["order_date", "ship_date"];

// Slashed two-digit years come before %Y, which would read "16" as the
// year 16. Dashed ones rely on MIN_YEAR to fall through past "%Y-%m-%d".
const DATE_FORMATS: [&str; 10] = [
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%y",
    "%y-%m-%d",
    "%m-%d-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Parses giving an earlier year matched a two- or three-digit year token
const MIN_YEAR: i32 = 1000;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Required column missing: {0}")]
    MissingColumn(String),
}

/// What normalization changed or could not parse. Nothing here is fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub input_rows: usize,
    pub duplicate_rows: usize,
    /// Normalized names that occur more than once in the header
    pub duplicate_columns: Vec<String>,
    /// Expected columns absent from the header
    pub missing_columns: Vec<String>,
    /// Numeric fields coerced to 0, per column
    pub numeric_coercions: BTreeMap<String, usize>,
    /// Rows whose order date could not be parsed
    pub dropped_rows: usize,
    pub ship_date_failures: usize,
    pub output_rows: usize,
}

impl NormalizeReport {
    pub fn total_coercions(&self) -> usize {
        self.numeric_coercions.values().sum()
    }

    pub fn has_warnings(&self) -> bool {
        !self.duplicate_columns.is_empty()
            || !self.missing_columns.is_empty()
            || self.dropped_rows > 0
            || self.ship_date_failures > 0
            || self.total_coercions() > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub rows: Vec<TransactionRow>,
    pub report: NormalizeReport,
}

/// Normalize a raw export into typed rows
pub fn normalize(raw: &RawTable) -> Result<Normalized, NormalizeError> {
    let mut report = NormalizeReport {
        input_rows: raw.records.len(),
        ..Default::default()
    };

    let mut seen: HashSet<&[String]> = HashSet::with_capacity(raw.records.len());
    let unique: Vec<&[String]> = raw
        .records
        .iter()
        .map(Vec::as_slice)
        .filter(|record| seen.insert(*record))
        .collect();
    report.duplicate_rows = raw.records.len() - unique.len();

    let columns = ColumnIndex::new(&raw.headers);
    report.duplicate_columns = columns.duplicates.clone();
    report.missing_columns = expected_columns()
        .filter(|name| !columns.contains(name))
        .map(str::to_string)
        .collect();

    if !columns.contains("order_date") {
        return Err(NormalizeError::MissingColumn("order_date".to_string()));
    }

    let mut rows = Vec::with_capacity(unique.len());
    for record in unique {
        let mut parser = RowParser {
            columns: &columns,
            record,
            coercions: &mut report.numeric_coercions,
        };

        let Some(order_date) = parser.raw("order_date").and_then(parse_date) else {
            report.dropped_rows += 1;
            continue;
        };
        let ship_date = match parser.raw("ship_date") {
            Some(text) => {
                let parsed = parse_date(text);
                if parsed.is_none() {
                    report.ship_date_failures += 1;
                }
                parsed
            }
            None => None,
        };

        rows.push(TransactionRow {
            order_id: parser.text("order_id"),
            order_date,
            ship_date,
            ship_mode: parser.text("ship_mode"),
            customer_id: parser.text("customer_id"),
            customer_name: parser.text("customer_name"),
            segment: parser.text("segment"),
            country: parser.text("country"),
            city: parser.text("city"),
            state: parser.text("state"),
            postal_code: parser.integer("postal_code"),
            region: parser.text("region"),
            product_id: parser.text("product_id"),
            category: parser.text("category"),
            sub_category: parser.text("sub_category"),
            product_name: parser.text("product_name"),
            sales: parser.float("sales"),
            quantity: parser.integer("quantity"),
            discount: parser.float("discount"),
            profit: parser.float("profit"),
            row_id: parser.integer("row_id"),
        });
    }
    report.output_rows = rows.len();

    log_report(&report);
    Ok(Normalized { rows, report })
}

fn expected_columns() -> impl Iterator<Item = &'static str> {
    DATE_COLUMNS
        .into_iter()
        .chain(TEXT_COLUMNS)
        .chain(FLOAT_COLUMNS)
        .chain(INTEGER_COLUMNS)
}

fn log_report(report: &NormalizeReport) {
    if report.duplicate_rows > 0 {
        debug!(removed = report.duplicate_rows, "Removed duplicate rows");
    }
    if !report.duplicate_columns.is_empty() {
        warn!(columns = ?report.duplicate_columns, "Duplicate column names after normalization");
    }
    if !report.missing_columns.is_empty() {
        warn!(columns = ?report.missing_columns, "Expected columns missing, using defaults");
    }
    if report.dropped_rows > 0 {
        warn!(dropped = report.dropped_rows, "Dropped rows with unparseable order date");
    }
    if report.ship_date_failures > 0 {
        warn!(failures = report.ship_date_failures, "Unparseable ship dates set to null");
    }
    for (column, count) in &report.numeric_coercions {
        warn!(column = %column, count, "Numeric values coerced to 0");
    }
    info!(
        input = report.input_rows,
        output = report.output_rows,
        "Normalized sales rows"
    );
}

/// `" Order Date "` -> `"order_date"`
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Upper-case a cased letter that follows a non-cased character, lower-case
/// every other cased letter: `"o'neil"` -> `"O'Neil"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && previous_cased {
            out.extend(c.to_lowercase());
        } else if cased {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        previous_cased = cased;
    }
    out
}

/// Lenient date parser. Accepts plain dates, common datetimes and RFC 3339.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let plausible = |date: NaiveDate| Some(date).filter(|d| d.year() >= MIN_YEAR);

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok().and_then(plausible))
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|format| {
                NaiveDateTime::parse_from_str(text, format)
                    .ok()
                    .and_then(|dt| plausible(dt.date()))
            })
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .and_then(|dt| plausible(dt.date_naive()))
        })
}

/// Text with separators removed, or `None` for the empty/`-` sentinels
fn numeric_text(raw: &str) -> Option<String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || cleaned == "-" {
        None
    } else {
        Some(cleaned)
    }
}

/// Finite float, or `None` when the field must be coerced
pub fn parse_float(raw: &str) -> Option<f64> {
    numeric_text(raw)?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Non-negative integer. Integral float text such as `"3.0"` is accepted.
pub fn parse_unsigned(raw: &str) -> Option<u64> {
    let text = numeric_text(raw)?;
    if let Ok(value) = text.parse::<u64>() {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

/// Normalized header name to the position of its first occurrence
struct ColumnIndex {
    positions: BTreeMap<String, usize>,
    duplicates: Vec<String>,
}

impl ColumnIndex {
    fn new(headers: &[String]) -> Self {
        let mut positions = BTreeMap::new();
        let mut duplicates = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let name = normalize_column_name(header);
            if positions.contains_key(&name) {
                if !duplicates.contains(&name) {
                    duplicates.push(name);
                }
            } else {
                positions.insert(name, idx);
            }
        }
        Self {
            positions,
            duplicates,
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    fn get<'r>(&self, record: &'r [String], name: &str) -> Option<&'r str> {
        self.positions
            .get(name)
            .and_then(|&idx| record.get(idx))
            .map(String::as_str)
    }
}

struct RowParser<'a> {
    columns: &'a ColumnIndex,
    record: &'a [String],
    coercions: &'a mut BTreeMap<String, usize>,
}

impl<'a> RowParser<'a> {
    fn raw(&self, name: &str) -> Option<&'a str> {
        self.columns.get(self.record, name)
    }

    fn text(&self, name: &str) -> String {
        self.raw(name).map(|text| title_case(text.trim())).unwrap_or_default()
    }

    fn float(&mut self, name: &str) -> f64 {
        let Some(text) = self.raw(name) else {
            return 0.0;
        };
        match parse_float(text) {
            Some(value) => value,
            None => {
                self.coerced(name);
                0.0
            }
        }
    }

    fn integer<T: TryFrom<u64> + Default>(&mut self, name: &str) -> T {
        let Some(text) = self.raw(name) else {
            return T::default();
        };
        match parse_unsigned(text).and_then(|value| T::try_from(value).ok()) {
            Some(value) => value,
            None => {
                self.coerced(name);
                T::default()
            }
        }
    }

    fn coerced(&mut self, name: &str) {
        *self.coercions.entry(name.to_string()).or_insert(0) += 1;
    }
}
