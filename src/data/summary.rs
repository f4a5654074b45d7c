use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{format_float, CellValue, RecordTable};
use super::schema::{KnownColumn, Schema};

/// Headroom added above the oldest mouse on the plot's y axis.
pub const Y_AXIS_PADDING: f64 = 8.0;

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics of the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub mice: usize,
    pub colonies: usize,
    pub min_age: Option<f64>,
    pub max_age: Option<f64>,
    pub median_age: Option<f64>,
    /// Whether the age column holds whole numbers only (controls formatting).
    #[serde(skip)]
    pub integral_ages: bool,
}

impl Summary {
    /// `None` unless both `Colony Name` and `Age (Weeks)` exist.
    pub fn compute(table: &RecordTable, schema: &Schema, rows: &[usize]) -> Option<Self> {
        if !schema.supports_distribution() {
            return None;
        }
        let colony_col = schema.index(KnownColumn::ColonyName)?;
        let age_col = schema.index(KnownColumn::AgeWeeks)?;

        let colonies: BTreeSet<&CellValue> = rows
            .iter()
            .map(|&r| table.cell(r, colony_col))
            .filter(|v| !v.is_null())
            .collect();

        let mut ages: Vec<f64> = rows
            .iter()
            .filter_map(|&r| table.cell(r, age_col).as_f64())
            .collect();
        ages.sort_by(f64::total_cmp);

        let integral_ages = table
            .rows
            .iter()
            .all(|row| matches!(row.get(age_col), Some(CellValue::Integer(_))));

        Some(Summary {
            mice: rows.len(),
            colonies: colonies.len(),
            min_age: ages.first().copied(),
            max_age: ages.last().copied(),
            median_age: median_sorted(&ages),
            integral_ages,
        })
    }

    /// Upper bound of the plot's y axis. Never shown as a statistic.
    pub fn axis_max(&self) -> Option<f64> {
        self.max_age.map(|m| m + Y_AXIS_PADDING)
    }

    fn fmt_age(&self, v: f64) -> String {
        if self.integral_ages {
            format!("{}", v as i64)
        } else {
            format_float(v)
        }
    }

    /// One-line description for the dashboard.
    pub fn sentence(&self) -> String {
        let head = format!(
            "Filtered dataset includes {} mice across {} unique colonies",
            self.mice, self.colonies
        );
        match (self.min_age, self.max_age, self.median_age) {
            (Some(min), Some(max), Some(median)) => format!(
                "{head}, with ages ranging from {} to {} weeks (median age: {} weeks).",
                self.fmt_age(min),
                self.fmt_age(max),
                format_float(median)
            ),
            _ => format!("{head}, with no recorded ages."),
        }
    }
}

/// Median of an already sorted slice; mean of the middle pair when even.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
