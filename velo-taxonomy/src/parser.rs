//! CSV parsing for the taxonomy input stream.
//!
//! The export format is one row per make/model/variant combination with
//! a header line:
//!
//! ```text
//! Make,Model,Model_Variant,Year_Start,Year_End
//! ABARTH,500,,2009,2015
//! ABARTH,500,Turismo,2023,
//! ```
//!
//! Parsing is fail-fast: the first malformed row aborts the whole
//! ingestion before any write reaches the store.

use chrono::{Datelike, Utc};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use velo_common::{Error, Result};

/// One validated input row: a make/model pair, an optional variant and
/// the variant's production year range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    pub make: String,
    pub model: String,
    pub variant: Option<String>,
    pub year_start: i32,
    pub year_end: i32,
}

/// Raw CSV row, matched to the header by column name. Columns beyond
/// these are ignored (the source exports carry a trailing flag column).
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Make")]
    make: String,
    #[serde(rename = "Model")]
    model: String,
    #[serde(rename = "Model_Variant")]
    variant: Option<String>,
    #[serde(rename = "Year_Start")]
    year_start: String,
    #[serde(rename = "Year_End")]
    year_end: Option<String>,
}

/// Lazy, non-restartable stream of validated [`FlatRecord`]s over any
/// CSV source.
pub struct RecordStream<R: Read> {
    rows: StringRecordsIntoIter<R>,
    headers: StringRecord,
    fallback_year: i32,
}

impl RecordStream<File> {
    /// Open a taxonomy CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read> RecordStream<R> {
    /// Wrap a CSV source, defaulting absent end years to the current
    /// calendar year.
    pub fn new(source: R) -> Result<Self> {
        Self::with_fallback_year(source, Utc::now().year())
    }

    /// Wrap a CSV source with an explicit fallback year for rows whose
    /// `Year_End` is absent.
    pub fn with_fallback_year(source: R, fallback_year: i32) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(source);
        let headers = reader.headers().map_err(csv_error)?.clone();

        Ok(Self {
            rows: reader.into_records(),
            headers,
            fallback_year,
        })
    }

    fn parse_record(&self, record: &StringRecord, line: u64) -> Result<FlatRecord> {
        let raw: RawRow = record
            .deserialize(Some(&self.headers))
            .map_err(|e| Error::MalformedRow {
                line,
                message: e.to_string(),
            })?;

        let make = required(raw.make, "Make", line)?;
        let model = required(raw.model, "Model", line)?;
        // An empty variant field means "no named variant", not a
        // variant with an empty name
        let variant = raw.variant.filter(|v| !v.is_empty());

        let year_start = parse_year(&raw.year_start, "Year_Start", line)?;
        let year_end = match raw.year_end.as_deref() {
            Some(value) if !value.is_empty() => parse_year(value, "Year_End", line)?,
            _ => self.fallback_year,
        };

        if year_end < year_start {
            return Err(Error::MalformedRow {
                line,
                message: format!("Year_End {} precedes Year_Start {}", year_end, year_start),
            });
        }

        Ok(FlatRecord {
            make,
            model,
            variant,
            year_start,
            year_end,
        })
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<FlatRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.rows.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(csv_error(e))),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        Some(self.parse_record(&record, line))
    }
}

/// Read and validate a whole taxonomy CSV file.
///
/// Fails on the first malformed row with no partial result.
pub fn read_taxonomy_file(path: &Path) -> Result<Vec<FlatRecord>> {
    RecordStream::from_path(path)?.collect()
}

fn required(value: String, column: &str, line: u64) -> Result<String> {
    if value.is_empty() {
        return Err(Error::MalformedRow {
            line,
            message: format!("{} must not be empty", column),
        });
    }
    Ok(value)
}

fn parse_year(value: &str, column: &str, line: u64) -> Result<i32> {
    value.parse::<i32>().map_err(|_| Error::MalformedRow {
        line,
        message: format!("{} is not a valid year: '{}'", column, value),
    })
}

fn csv_error(err: csv::Error) -> Error {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        _ => Error::MalformedRow { line, message },
    }
}
