//! docbridge CSV ingest
//!
//! Uploaded CSV files enter the system here. We read the header, type every
//! column from all of its cells, and emit one [`Document`] per data row with
//! one field per column, in header order.
//!
//! ## What we do here
//!
//! - **Decode** - UTF-8 only, a leading byte-order mark is dropped.
//! - **Name columns** - duplicate headers become `name.1`, `name.2`, ...;
//!   blank headers become `Unnamed: <index>`.
//! - **Type columns** - integers, floats, booleans or text (see [`ColumnKind`]).
//!   Missing cells in numeric and text columns become NaN, which the server's
//!   sanitizer later renders as `null`.
//! - **Reject malformed files** - rows wider than the header are an error;
//!   narrower rows are padded with missing values.
//!
//! ## Example
//!
//! ```
//! use document::Value;
//! use ingest::{parse_csv, CsvConfig};
//!
//! let docs = parse_csv(b"a,b\n1,2\n3,4\n", &CsvConfig::default()).unwrap();
//! assert_eq!(docs.len(), 2);
//! assert_eq!(docs[1].get("b"), Some(&Value::Int(4)));
//! ```
use std::collections::HashSet;
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord};
use document::Document;
use tracing::{debug, info, warn};

mod config;
mod error;
mod infer;

pub use crate::config::{ConfigError, CsvConfig, DEFAULT_MISSING_MARKERS};
pub use crate::error::IngestError;
pub use crate::infer::{convert_cell, infer_column, ColumnKind};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse CSV bytes into documents, one per data row.
pub fn parse_csv(bytes: &[u8], cfg: &CsvConfig) -> Result<Vec<Document>, IngestError> {
    let start = Instant::now();
    match parse_inner(bytes, cfg) {
        Ok(docs) => {
            info!(
                rows = docs.len(),
                bytes = bytes.len(),
                elapsed_micros = start.elapsed().as_micros(),
                "csv_parse_success"
            );
            Ok(docs)
        }
        Err(err) => {
            warn!(
                bytes = bytes.len(),
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "csv_parse_failure"
            );
            Err(err)
        }
    }
}

fn parse_inner(bytes: &[u8], cfg: &CsvConfig) -> Result<Vec<Document>, IngestError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| IngestError::InvalidUtf8(e.to_string()))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(cfg.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
        return Err(IngestError::NoColumns);
    }
    let columns = column_names(&headers);

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        if record.len() > columns.len() {
            return Err(IngestError::Malformed {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: columns.len(),
                found: record.len(),
            });
        }
        if let Some(limit) = cfg.max_rows {
            if rows.len() >= limit {
                return Err(IngestError::TooManyRows(limit));
            }
        }
        let row = (0..columns.len())
            .map(|i| {
                record
                    .get(i)
                    .filter(|cell| !cfg.is_missing(cell))
                    .map(str::to_string)
            })
            .collect();
        rows.push(row);
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|i| infer_column(rows.iter().map(|row| row[i].as_deref())))
        .collect();
    debug!(columns = ?columns, kinds = ?kinds, "csv_columns_inferred");

    Ok(rows
        .into_iter()
        .map(|row| {
            let mut doc = Document::with_capacity(columns.len());
            for ((name, kind), cell) in columns.iter().zip(&kinds).zip(row) {
                doc.push(name.clone(), convert_cell(*kind, cell.as_deref()));
            }
            doc
        })
        .collect())
}

/// Column names with blanks filled in and duplicates suffixed.
fn column_names(headers: &StringRecord) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    for (i, raw) in headers.iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            raw.to_string()
        };
        let mut name = base.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty()) && record.len() <= 1
}

#[cfg(test)]
mod tests {
    use document::Value;

    use super::*;

    fn parse(input: &str) -> Result<Vec<Document>, IngestError> {
        parse_csv(input.as_bytes(), &CsvConfig::default())
    }

    #[test]
    fn numeric_columns_become_integers() {
        let docs = parse("a,b\n1,2\n3,4\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(docs[0].get("a"), Some(&Value::Int(1)));
        assert_eq!(docs[0].get("b"), Some(&Value::Int(2)));
        assert_eq!(docs[1].get("a"), Some(&Value::Int(3)));
        assert_eq!(docs[1].get("b"), Some(&Value::Int(4)));
    }

    #[test]
    fn mixed_types_per_column() {
        let docs = parse("name,price,active\nwidget,1.5,True\ngadget,,False\n").unwrap();
        assert_eq!(docs[0].get("name"), Some(&Value::from("widget")));
        assert_eq!(docs[0].get("price"), Some(&Value::Float(1.5)));
        assert_eq!(docs[0].get("active"), Some(&Value::Bool(true)));
        assert!(matches!(docs[1].get("price"), Some(Value::Float(f)) if f.is_nan()));
        assert_eq!(docs[1].get("active"), Some(&Value::Bool(false)));
    }

    #[test]
    fn missing_text_cell_becomes_nan() {
        let docs = parse("city\nParis\nNA\n").unwrap();
        assert_eq!(docs[0].get("city"), Some(&Value::from("Paris")));
        assert!(matches!(docs[1].get("city"), Some(Value::Float(f)) if f.is_nan()));
    }

    #[test]
    fn short_rows_are_padded() {
        let docs = parse("a,b\n1\n").unwrap();
        assert_eq!(docs[0].len(), 2);
        assert!(matches!(docs[0].get("b"), Some(Value::Float(f)) if f.is_nan()));
    }

    #[test]
    fn wide_rows_are_rejected() {
        let err = parse("a,b\n1,2\n3,4,5\n").unwrap_err();
        assert_eq!(
            err,
            IngestError::Malformed {
                line: 3,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn empty_input_has_no_columns() {
        assert_eq!(parse("").unwrap_err(), IngestError::NoColumns);
    }

    #[test]
    fn header_only_yields_no_documents() {
        assert!(parse("a,b\n").unwrap().is_empty());
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let docs = parse("a,a,,a\n1,2,3,4\n").unwrap();
        assert_eq!(
            docs[0].keys().collect::<Vec<_>>(),
            vec!["a", "a.1", "Unnamed: 2", "a.2"]
        );
    }

    #[test]
    fn bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"id\n1\n");
        let docs = parse_csv(&bytes, &CsvConfig::default()).unwrap();
        assert!(docs[0].contains_key("id"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = parse_csv(b"a\n\xff\xfe\n", &CsvConfig::default()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidUtf8(_)));
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let docs = parse("title,n\n\"Hello, world\",1\n").unwrap();
        assert_eq!(docs[0].get("title"), Some(&Value::from("Hello, world")));
    }

    #[test]
    fn custom_delimiter() {
        let cfg = CsvConfig::default().with_delimiter(b';');
        let docs = parse_csv(b"a;b\n1;x\n", &cfg).unwrap();
        assert_eq!(docs[0].get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn boolean_column_with_gap_stays_boolean() {
        let docs = parse("active\nTrue\n\nFalse\nNA\n").unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].get("active"), Some(&Value::Bool(true)));
        assert_eq!(docs[1].get("active"), Some(&Value::Bool(false)));
        assert!(matches!(docs[2].get("active"), Some(Value::Float(f)) if f.is_nan()));
    }

    #[test]
    fn wide_file_parses_in_linear_time() {
        let columns = 20_000;
        let header: Vec<String> = (0..columns).map(|i| format!("c{}", i % 100)).collect();
        let row: Vec<String> = (0..columns).map(|i| i.to_string()).collect();
        let mut input = header.join(",");
        for _ in 0..5 {
            input.push('\n');
            input.push_str(&row.join(","));
        }
        input.push('\n');

        let start = Instant::now();
        let docs = parse(&input).unwrap();
        assert!(
            start.elapsed().as_secs() < 5,
            "parsing {columns} columns took {:?}",
            start.elapsed()
        );

        assert_eq!(docs.len(), 5);
        assert_eq!(docs[0].len(), columns);
        let keys: Vec<&str> = docs[0].keys().collect();
        assert_eq!(keys[0], "c0");
        assert_eq!(keys[100], "c0.1");
        assert_eq!(keys[columns - 1], "c99.199");
        assert_eq!(docs[4].get("c99.199"), Some(&Value::Int(columns as i64 - 1)));
    }

    #[test]
    fn row_limit_is_enforced() {
        let cfg = CsvConfig::default().with_max_rows(1);
        let err = parse_csv(b"a\n1\n2\n", &cfg).unwrap_err();
        assert_eq!(err, IngestError::TooManyRows(1));
    }
}
