use std::collections::BTreeMap;
use std::fmt;

use super::model::RecordTable;

// ---------------------------------------------------------------------------
// Known columns
// ---------------------------------------------------------------------------

/// The optional columns the dashboard knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KnownColumn {
    LifeStatus,
    Sex,
    ColonyName,
    AllCohorts,
    CurrentMating,
    AgeWeeks,
}

impl KnownColumn {
    pub const ALL: [KnownColumn; 6] = [
        KnownColumn::LifeStatus,
        KnownColumn::Sex,
        KnownColumn::ColonyName,
        KnownColumn::AllCohorts,
        KnownColumn::CurrentMating,
        KnownColumn::AgeWeeks,
    ];

    /// Header text as it appears in the upload.
    pub fn header(self) -> &'static str {
        match self {
            KnownColumn::LifeStatus => "Life Status",
            KnownColumn::Sex => "Sex",
            KnownColumn::ColonyName => "Colony Name",
            KnownColumn::AllCohorts => "All Cohorts",
            KnownColumn::CurrentMating => "Current Mating",
            KnownColumn::AgeWeeks => "Age (Weeks)",
        }
    }
}

impl fmt::Display for KnownColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Schema probe
// ---------------------------------------------------------------------------

/// Which known columns an upload carries, and where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: BTreeMap<KnownColumn, usize>,
}

impl Schema {
    /// Probe a table once; every later branch asks the schema.
    pub fn probe(table: &RecordTable) -> Self {
        let columns = KnownColumn::ALL
            .iter()
            .filter_map(|&col| table.column_index(col.header()).map(|idx| (col, idx)))
            .collect();
        Schema { columns }
    }

    pub fn has(&self, col: KnownColumn) -> bool {
        self.columns.contains_key(&col)
    }

    pub fn index(&self, col: KnownColumn) -> Option<usize> {
        self.columns.get(&col).copied()
    }

    /// Summary and plot need both the colony and the age column.
    pub fn supports_distribution(&self) -> bool {
        self.has(KnownColumn::ColonyName) && self.has(KnownColumn::AgeWeeks)
    }

    pub fn present(&self) -> impl Iterator<Item = KnownColumn> + '_ {
        self.columns.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_finds_known_columns_by_exact_header() {
        let table = RecordTable::new(
            vec!["id".into(), "Age (Weeks)".into(), "sex".into(), "Colony Name".into()],
            Vec::new(),
        );
        let schema = Schema::probe(&table);
        assert_eq!(schema.index(KnownColumn::AgeWeeks), Some(1));
        assert_eq!(schema.index(KnownColumn::ColonyName), Some(3));
        assert!(!schema.has(KnownColumn::Sex));
        assert!(schema.supports_distribution());
        assert_eq!(
            schema.present().collect::<Vec<_>>(),
            vec![KnownColumn::ColonyName, KnownColumn::AgeWeeks]
        );
    }

    #[test]
    fn distribution_needs_both_columns() {
        let table = RecordTable::new(vec!["Colony Name".into()], Vec::new());
        assert!(!Schema::probe(&table).supports_distribution());
    }
}
