use std::fs;
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::domain::{TVConfig, TVError};
use crate::table::{self, Table};

// Joins whitespace separated fields before handing them to the csv reader.
const FIELD_SEPARATOR: u8 = 0x1f;

// Preference order when several candidates are consistent.
const SNIFF_CANDIDATES: [u8; 6] = [b',', b'\t', b';', b'|', b':', b' '];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Runs of whitespace, leading and trailing whitespace ignored.
    Whitespace,
    /// Guessed from the first lines of the file.
    Sniffed,
    Char(u8),
}

#[derive(Debug)]
pub struct ParseStrategy {
    pub separator: Separator,
    pub description: &'static str,
}

/// Tried top to bottom, the first one that parses wins.
pub const STRATEGIES: [ParseStrategy; 5] = [
    ParseStrategy {
        separator: Separator::Whitespace,
        description: "Whitespace Separated",
    },
    ParseStrategy {
        separator: Separator::Sniffed,
        description: "Auto-Detected",
    },
    ParseStrategy {
        separator: Separator::Char(b','),
        description: "Comma Separated",
    },
    ParseStrategy {
        separator: Separator::Char(b';'),
        description: "Semicolon Separated",
    },
    ParseStrategy {
        separator: Separator::Char(b'\t'),
        description: "Tab Separated",
    },
];

pub enum LoadOutcome {
    Loaded { table: Table, description: String },
    Failed { error: String },
}

/// Parses a file with the first strategy in [`STRATEGIES`] that does not fail.
///
/// Only the error of the last strategy is kept when none succeeds.
pub fn load(path: &Path, config: &TVConfig) -> LoadOutcome {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = match e.kind() {
                ErrorKind::NotFound => TVError::FileNotFound,
                ErrorKind::PermissionDenied => TVError::PermissionDenied,
                _ => TVError::IoError(e),
            };
            warn!("Could not read {}: {err}", path.display());
            return LoadOutcome::Failed {
                error: err.to_string(),
            };
        }
    };

    let mut last_error = String::new();
    for strategy in STRATEGIES.iter() {
        let start_time = Instant::now();
        match parse(&bytes, strategy.separator, config) {
            Ok(table) => {
                info!(
                    "Loaded {} using {} in {}ms ({} rows, {} columns)",
                    path.display(),
                    strategy.description,
                    start_time.elapsed().as_millis(),
                    table.nrows(),
                    table.ncols()
                );
                for c in table.columns() {
                    debug!("Column: {}", c.as_string());
                }
                return LoadOutcome::Loaded {
                    table,
                    description: format!("Loaded successfully using {}", strategy.description),
                };
            }
            Err(e) => {
                debug!("{} failed for {}: {e}", strategy.description, path.display());
                last_error = e.to_string();
            }
        }
    }
    warn!("No strategy could parse {}: {last_error}", path.display());
    LoadOutcome::Failed { error: last_error }
}

fn parse(bytes: &[u8], separator: Separator, config: &TVConfig) -> Result<Table, TVError> {
    let (data, separator, quote_char) = match separator {
        Separator::Whitespace => (normalize_whitespace(bytes)?, FIELD_SEPARATOR, None),
        Separator::Sniffed => {
            let delimiter = sniff_delimiter(bytes, config.sniff_lines)?;
            (bytes.to_vec(), delimiter, Some(b'"'))
        }
        Separator::Char(c) => (bytes.to_vec(), c, Some(b'"')),
    };
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(config.infer_schema_length))
        .map_parse_options(|opts| opts.with_separator(separator).with_quote_char(quote_char))
        .into_reader_with_file_handle(Cursor::new(data))
        .finish()?;
    frame_to_table(&df)
}

fn decode(bytes: &[u8]) -> Result<&str, TVError> {
    std::str::from_utf8(bytes)
        .map_err(|e| TVError::LoadingFailed(format!("Invalid UTF-8: {e}")))
}

fn normalize_whitespace(bytes: &[u8]) -> Result<Vec<u8>, TVError> {
    let text = decode(bytes)?;
    let mut out = Vec::with_capacity(bytes.len());
    for line in text.lines() {
        let mut fields = line.split_whitespace().peekable();
        if fields.peek().is_none() {
            continue;
        }
        for (idx, field) in fields.enumerate() {
            if idx > 0 {
                out.push(FIELD_SEPARATOR);
            }
            out.extend_from_slice(field.as_bytes());
        }
        out.push(b'\n');
    }
    Ok(out)
}

/// Picks the first candidate that occurs equally often, and at least once,
/// on every sampled line. Characters inside double quotes are not counted.
pub fn sniff_delimiter(bytes: &[u8], sample_lines: usize) -> Result<u8, TVError> {
    let text = decode(bytes)?;
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(sample_lines.max(1))
        .collect();

    SNIFF_CANDIDATES
        .iter()
        .copied()
        .find(|&candidate| {
            let mut counts = sample.iter().map(|line| count_unquoted(line, candidate));
            match counts.next() {
                Some(first) if first > 0 => counts.all(|c| c == first),
                _ => false,
            }
        })
        .ok_or_else(|| TVError::LoadingFailed("Could not determine delimiter".into()))
}

fn count_unquoted(line: &str, candidate: u8) -> usize {
    let mut quoted = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            quoted = !quoted;
        } else if b == candidate && !quoted {
            count += 1;
        }
    }
    count
}

// Every column is turned into display strings up front, one thread per column.
fn frame_to_table(df: &DataFrame) -> Result<Table, TVError> {
    let columns: Result<Vec<table::Column>, PolarsError> = df
        .get_column_names()
        .par_iter()
        .map(|name| load_column(df, name))
        .collect();
    Table::new(columns?)
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<table::Column, PolarsError> {
    let native_dtype = df.column(col_name)?.dtype().clone();

    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let data = series
        .into_iter()
        .map(|value| value.map(|s| s.replace("\r\n", " ↵ ").replace('\n', " ↵ ")))
        .collect();

    Ok(table::Column::new(col_name, native_dtype, data))
}
