use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
/// Used as a key in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{}", format_float(*v)),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Missing, or text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell, used for ages. NaN counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

/// Shortest round-trip representation that always shows a decimal part,
/// so `20.0` stays `20.0` rather than `20`.
pub fn format_float(v: f64) -> String {
    format!("{v:?}")
}

// ---------------------------------------------------------------------------
// RecordTable – the complete uploaded dataset
// ---------------------------------------------------------------------------

/// The parsed upload. Built once per upload and never mutated; filter stages
/// work on lists of row indices into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    /// Column names in file order (already de-duplicated).
    pub headers: Vec<String>,
    /// Rows; every row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl RecordTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        RecordTable { headers, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (`row`, `col`); out-of-range lookups read as `Null`.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL)
    }

    /// All row indices, in order.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }

    /// Sorted distinct non-missing values of `col` among `rows`.
    pub fn distinct_values(&self, col: usize, rows: &[usize]) -> BTreeSet<CellValue> {
        rows.iter()
            .map(|&r| self.cell(r, col))
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_always_show_a_decimal_part() {
        assert_eq!(CellValue::Float(20.0).to_string(), "20.0");
        assert_eq!(CellValue::Float(10.5).to_string(), "10.5");
        assert_eq!(CellValue::Integer(10).to_string(), "10");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn ordering_groups_by_kind_then_value() {
        let mut v = vec![
            CellValue::Text("b".into()),
            CellValue::Integer(3),
            CellValue::Null,
            CellValue::Text("a".into()),
            CellValue::Integer(-1),
        ];
        v.sort();
        assert_eq!(
            v,
            vec![
                CellValue::Null,
                CellValue::Integer(-1),
                CellValue::Integer(3),
                CellValue::Text("a".into()),
                CellValue::Text("b".into()),
            ]
        );
    }

    #[test]
    fn blank_covers_missing_and_whitespace() {
        assert!(CellValue::Null.is_blank());
        assert!(CellValue::Text("   ".into()).is_blank());
        assert!(!CellValue::Text("x".into()).is_blank());
        assert!(!CellValue::Integer(0).is_blank());
    }

    #[test]
    fn nan_has_no_numeric_value() {
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Text("3".into()).as_f64(), None);
    }

    #[test]
    fn distinct_values_skip_missing_and_respect_view() {
        let table = RecordTable::new(
            vec!["Sex".into()],
            vec![
                vec![CellValue::Text("M".into())],
                vec![CellValue::Null],
                vec![CellValue::Text("F".into())],
                vec![CellValue::Text("M".into())],
            ],
        );
        let all: Vec<_> = table.distinct_values(0, &table.all_rows()).into_iter().collect();
        assert_eq!(all, vec![CellValue::Text("F".into()), CellValue::Text("M".into())]);

        let some: Vec<_> = table.distinct_values(0, &[0, 1]).into_iter().collect();
        assert_eq!(some, vec![CellValue::Text("M".into())]);
    }
}
