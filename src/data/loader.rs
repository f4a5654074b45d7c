use std::collections::BTreeMap;

use thiserror::Error;

use super::model::{CellValue, RecordTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why an upload could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No columns to parse from file")]
    NoColumns,

    #[error("Error tokenizing data: expected {expected} fields in line {line}, saw {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Field contents treated as missing values, besides the empty field.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Turn the current upload into a table. No upload is not an error: it
/// yields `Ok(None)`.
pub fn load_upload(upload: Option<&[u8]>) -> Result<Option<RecordTable>, LoadError> {
    upload.map(parse_csv).transpose()
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// CSV layout: a header row with column names, then one record per line.
/// Short records are padded with missing values; long records are rejected.
pub fn parse_csv(bytes: &[u8]) -> Result<RecordTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if raw_headers.is_empty() || (raw_headers.len() == 1 && raw_headers[0].is_empty()) {
        return Err(LoadError::NoColumns);
    }
    let headers = dedupe_headers(raw_headers);
    let width = headers.len();

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) && record.len() <= 1 {
            continue;
        }
        if record.len() > width {
            return Err(LoadError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: width,
                found: record.len(),
            });
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|field| (!NA_TOKENS.contains(&field)).then(|| field.to_string()))
            .collect();
        row.resize(width, None);
        raw_rows.push(row);
    }

    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| infer_kind(raw_rows.iter().map(|r| r[col].as_deref())))
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(field, kind)| convert(field, *kind))
                .collect()
        })
        .collect();

    Ok(RecordTable::new(headers, rows))
}

/// Unnamed columns become `Unnamed: {i}`; repeated names get `.1`, `.2`, ...
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut out = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        while seen.contains_key(&candidate) {
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{base}.{n}");
        }
        seen.insert(candidate.clone(), 0);
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// Column typing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

/// One kind per column, chosen over all non-missing fields. Integer columns
/// with gaps widen to float, as a dataframe reader would.
fn infer_kind<'a>(fields: impl Iterator<Item = Option<&'a str>>) -> ColumnKind {
    let mut any_missing = false;
    let mut all_int = true;
    let mut all_num = true;
    let mut all_bool = true;
    let mut any_present = false;

    for field in fields {
        let Some(s) = field else {
            any_missing = true;
            continue;
        };
        any_present = true;
        let is_int = s.parse::<i64>().is_ok();
        all_int &= is_int;
        all_num &= is_int || s.parse::<f64>().is_ok();
        all_bool &= parse_bool(s).is_some();
    }

    if !any_present {
        return ColumnKind::Float;
    }
    if all_int {
        if any_missing {
            ColumnKind::Float
        } else {
            ColumnKind::Integer
        }
    } else if all_num {
        ColumnKind::Float
    } else if all_bool {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn convert(field: Option<String>, kind: ColumnKind) -> CellValue {
    let Some(s) = field else {
        return CellValue::Null;
    };
    let parsed = match kind {
        ColumnKind::Integer => s.parse::<i64>().ok().map(CellValue::Integer),
        ColumnKind::Float => match s.parse::<f64>() {
            // Any NaN spelling the token list missed (`NAN`, `+nan`, ...) is missing too.
            Ok(v) if v.is_nan() => return CellValue::Null,
            Ok(v) => Some(CellValue::Float(v)),
            Err(_) => None,
        },
        ColumnKind::Bool => parse_bool(&s).map(CellValue::Bool),
        ColumnKind::Text => None,
    };
    parsed.unwrap_or(CellValue::Text(s))
}
