use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::model::{CellValue, RecordTable};
use super::schema::{KnownColumn, Schema};

// ---------------------------------------------------------------------------
// Filter options and selections
// ---------------------------------------------------------------------------

/// One entry of a multi-select control.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterOption {
    /// A literal value observed in the column.
    Value(CellValue),
    /// Rows with no cohort at all.
    NotInAnyCohort,
    /// Rows with a non-blank `Current Mating` entry.
    Mating,
    /// Rows with a missing or blank `Current Mating` entry.
    NotMating,
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOption::Value(v) => write!(f, "{v}"),
            FilterOption::NotInAnyCohort => write!(f, "Not in any Cohort"),
            FilterOption::Mating => write!(f, "Mating"),
            FilterOption::NotMating => write!(f, "Not Mating"),
        }
    }
}

/// Per-column selection state: maps column → set of selected options.
/// If a column is absent or its set is empty, it means "no filter" (show all).
pub type FilterState = BTreeMap<KnownColumn, BTreeSet<FilterOption>>;

/// Filter stages in the order they run.
pub const STAGES: [KnownColumn; 5] = [
    KnownColumn::LifeStatus,
    KnownColumn::Sex,
    KnownColumn::ColonyName,
    KnownColumn::AllCohorts,
    KnownColumn::CurrentMating,
];

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

/// A multi-select control as it should be shown for the current table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    pub column: KnownColumn,
    pub options: Vec<FilterOption>,
}

impl FilterControl {
    /// Widget caption: `Select <header>`, except mating which is a status.
    pub fn label(&self) -> String {
        match self.column {
            KnownColumn::CurrentMating => "Select Mating Status".to_string(),
            column => format!("Select {column}"),
        }
    }

    /// Options are built from the rows that reached this stage.
    fn build(table: &RecordTable, column: KnownColumn, col: usize, rows: &[usize]) -> Self {
        let options = match column {
            KnownColumn::CurrentMating => vec![FilterOption::Mating, FilterOption::NotMating],
            _ => {
                let mut opts: Vec<FilterOption> = table
                    .distinct_values(col, rows)
                    .into_iter()
                    .map(FilterOption::Value)
                    .collect();
                if column == KnownColumn::AllCohorts {
                    opts.push(FilterOption::NotInAnyCohort);
                }
                opts
            }
        };
        FilterControl { column, options }
    }
}

// ---------------------------------------------------------------------------
// Stage predicates
// ---------------------------------------------------------------------------

/// Row predicate for one stage, or `None` when the stage is a no-op.
fn stage_predicate(
    column: KnownColumn,
    selected: &BTreeSet<FilterOption>,
) -> Option<Box<dyn Fn(&CellValue) -> bool + '_>> {
    if selected.is_empty() {
        return None;
    }
    let is_member = move |v: &CellValue| selected.contains(&FilterOption::Value(v.clone()));

    match column {
        KnownColumn::AllCohorts if selected.contains(&FilterOption::NotInAnyCohort) => {
            Some(Box::new(move |v: &CellValue| v.is_null() || is_member(v)))
        }
        KnownColumn::CurrentMating => {
            let mating = selected.contains(&FilterOption::Mating);
            let not_mating = selected.contains(&FilterOption::NotMating);
            match (mating, not_mating) {
                (true, false) => Some(Box::new(|v: &CellValue| !v.is_blank())),
                (false, true) => Some(Box::new(|v: &CellValue| v.is_blank())),
                _ => None,
            }
        }
        _ => Some(Box::new(move |v: &CellValue| !v.is_null() && is_member(v))),
    }
}

/// Narrow `rows` by one stage. Never re-introduces a row.
pub fn apply_stage(
    table: &RecordTable,
    col: usize,
    column: KnownColumn,
    selected: Option<&BTreeSet<FilterOption>>,
    rows: Vec<usize>,
) -> Vec<usize> {
    let Some(pred) = selected.and_then(|s| stage_predicate(column, s)) else {
        return rows;
    };
    rows.into_iter()
        .filter(|&r| pred(table.cell(r, col)))
        .collect()
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Controls shown for this pass plus the rows that survived every stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineOutcome {
    pub controls: Vec<FilterControl>,
    pub rows: Vec<usize>,
}

/// Run every stage in order over the whole table.
///
/// A stage is skipped when its column is missing from the upload or nothing
/// is selected for it. Each control's options reflect the rows left by the
/// stages before it.
pub fn run_pipeline(table: &RecordTable, schema: &Schema, filters: &FilterState) -> PipelineOutcome {
    run_pipeline_on(table, schema, filters, table.all_rows())
}

/// Same as [`run_pipeline`], starting from an existing view.
pub fn run_pipeline_on(
    table: &RecordTable,
    schema: &Schema,
    filters: &FilterState,
    mut rows: Vec<usize>,
) -> PipelineOutcome {
    let mut controls = Vec::new();
    for column in STAGES {
        let Some(col) = schema.index(column) else {
            continue;
        };
        controls.push(FilterControl::build(table, column, col, &rows));
        rows = apply_stage(table, col, column, filters.get(&column), rows);
    }
    PipelineOutcome { controls, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn value(s: &str) -> FilterOption {
        FilterOption::Value(text(s))
    }

    fn select(col: KnownColumn, opts: &[FilterOption]) -> FilterState {
        let mut f = FilterState::new();
        f.insert(col, opts.iter().cloned().collect());
        f
    }

    fn colony_table() -> RecordTable {
        let row = |ls: &str, sex: &str, colony: &str, cohort: Option<&str>, mating: Option<&str>| {
            vec![
                text(ls),
                text(sex),
                text(colony),
                cohort.map(text).unwrap_or(CellValue::Null),
                mating.map(text).unwrap_or(CellValue::Null),
            ]
        };
        RecordTable::new(
            vec![
                "Life Status".into(),
                "Sex".into(),
                "Colony Name".into(),
                "All Cohorts".into(),
                "Current Mating".into(),
            ],
            vec![
                row("Alive", "M", "A", Some("C1"), Some("pair-1")),
                row("Alive", "F", "A", None, None),
                row("Dead", "F", "B", Some("C2"), Some("  ")),
                row("Alive", "M", "B", Some("C1"), None),
                row("Alive", "F", "C", None, Some("trio")),
            ],
        )
    }

    fn run(table: &RecordTable, filters: &FilterState) -> PipelineOutcome {
        run_pipeline(table, &Schema::probe(table), filters)
    }

    #[test]
    fn no_selection_keeps_everything() {
        let table = colony_table();
        let out = run(&table, &FilterState::new());
        assert_eq!(out.rows, vec![0, 1, 2, 3, 4]);
        let cols: Vec<_> = out.controls.iter().map(|c| c.column).collect();
        assert_eq!(cols, STAGES.to_vec());
    }

    #[test]
    fn controls_are_labelled_in_stage_order() {
        let table = colony_table();
        let labels: Vec<String> = run(&table, &FilterState::new())
            .controls
            .iter()
            .map(FilterControl::label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Select Life Status",
                "Select Sex",
                "Select Colony Name",
                "Select All Cohorts",
                "Select Mating Status",
            ]
        );
    }

    #[test]
    fn membership_stages_compose() {
        let table = colony_table();
        let mut filters = select(KnownColumn::LifeStatus, &[value("Alive")]);
        filters.insert(KnownColumn::Sex, [value("F")].into_iter().collect());
        assert_eq!(run(&table, &filters).rows, vec![1, 4]);
    }

    #[test]
    fn later_controls_see_narrowed_options() {
        let table = colony_table();
        let filters = select(KnownColumn::Sex, &[value("M")]);
        let out = run(&table, &filters);
        let colony = out
            .controls
            .iter()
            .find(|c| c.column == KnownColumn::ColonyName)
            .unwrap();
        assert_eq!(colony.options, vec![value("A"), value("B")]);
        let sex = out.controls.iter().find(|c| c.column == KnownColumn::Sex).unwrap();
        assert_eq!(sex.options, vec![value("F"), value("M")]);
    }

    #[test]
    fn cohort_options_end_with_sentinel() {
        let table = colony_table();
        let out = run(&table, &FilterState::new());
        let cohort = out
            .controls
            .iter()
            .find(|c| c.column == KnownColumn::AllCohorts)
            .unwrap();
        assert_eq!(
            cohort.options,
            vec![value("C1"), value("C2"), FilterOption::NotInAnyCohort]
        );
        assert_eq!(cohort.label(), "Select All Cohorts");
        assert_eq!(FilterOption::NotInAnyCohort.to_string(), "Not in any Cohort");
    }

    #[test]
    fn cohort_sentinel_keeps_rows_without_cohort() {
        let table = colony_table();
        let only_sentinel = select(KnownColumn::AllCohorts, &[FilterOption::NotInAnyCohort]);
        assert_eq!(run(&table, &only_sentinel).rows, vec![1, 4]);

        let with_value = select(
            KnownColumn::AllCohorts,
            &[FilterOption::NotInAnyCohort, value("C2")],
        );
        assert_eq!(run(&table, &with_value).rows, vec![1, 2, 4]);

        let value_only = select(KnownColumn::AllCohorts, &[value("C1")]);
        assert_eq!(run(&table, &value_only).rows, vec![0, 3]);
    }

    #[test]
    fn literal_sentinel_text_is_not_the_sentinel() {
        let table = RecordTable::new(
            vec!["All Cohorts".into()],
            vec![vec![text("Not in any Cohort")], vec![CellValue::Null]],
        );
        let filters = select(KnownColumn::AllCohorts, &[FilterOption::NotInAnyCohort]);
        assert_eq!(run(&table, &filters).rows, vec![1]);
    }

    #[test]
    fn mating_choices() {
        let table = colony_table();
        let mating = select(KnownColumn::CurrentMating, &[FilterOption::Mating]);
        assert_eq!(run(&table, &mating).rows, vec![0, 4]);

        let not_mating = select(KnownColumn::CurrentMating, &[FilterOption::NotMating]);
        assert_eq!(run(&table, &not_mating).rows, vec![1, 2, 3]);

        let both = select(
            KnownColumn::CurrentMating,
            &[FilterOption::Mating, FilterOption::NotMating],
        );
        assert_eq!(run(&table, &both).rows, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn mating_control_is_gated_only_on_presence() {
        let table = RecordTable::new(vec!["Current Mating".into()], Vec::new());
        let out = run(&table, &FilterState::new());
        assert_eq!(
            out.controls,
            vec![FilterControl {
                column: KnownColumn::CurrentMating,
                options: vec![FilterOption::Mating, FilterOption::NotMating],
            }]
        );
        assert_eq!(out.controls[0].label(), "Select Mating Status");
    }

    #[test]
    fn selections_for_absent_columns_are_ignored() {
        let table = RecordTable::new(vec!["Sex".into()], vec![vec![text("M")]]);
        let filters = select(KnownColumn::ColonyName, &[value("Z")]);
        assert_eq!(run(&table, &filters).rows, vec![0]);
    }

    #[test]
    fn empty_table_yields_empty_result() {
        let table = RecordTable::new(vec!["Sex".into()], Vec::new());
        let filters = select(KnownColumn::Sex, &[value("M")]);
        let out = run(&table, &filters);
        assert!(out.rows.is_empty());
        assert!(out.controls[0].options.is_empty());
    }

    // -- property tests --

    const LIFE: [&str; 2] = ["Alive", "Dead"];
    const SEX: [&str; 2] = ["F", "M"];
    const COLONY: [&str; 3] = ["A", "B", "C"];
    const COHORT: [&str; 2] = ["C1", "C2"];
    const MATING: [&str; 3] = ["pair", " ", ""];

    fn arb_cell(choices: &'static [&'static str]) -> impl Strategy<Value = CellValue> {
        prop_oneof![
            1 => Just(CellValue::Null),
            4 => proptest::sample::select(choices).prop_map(text),
        ]
    }

    fn arb_table() -> impl Strategy<Value = RecordTable> {
        let row = (
            arb_cell(&LIFE),
            arb_cell(&SEX),
            arb_cell(&COLONY),
            arb_cell(&COHORT),
            arb_cell(&MATING),
        )
            .prop_map(|(a, b, c, d, e)| vec![a, b, c, d, e]);
        proptest::collection::vec(row, 0..30).prop_map(|rows| {
            RecordTable::new(
                STAGES.iter().map(|c| c.header().to_string()).collect(),
                rows,
            )
        })
    }

    fn arb_values(choices: &'static [&'static str]) -> impl Strategy<Value = BTreeSet<FilterOption>> {
        proptest::sample::subsequence(choices, 0..=choices.len())
            .prop_map(|v| v.into_iter().map(value).collect())
    }

    fn arb_filters() -> impl Strategy<Value = FilterState> {
        (
            arb_values(&LIFE),
            arb_values(&SEX),
            arb_values(&COLONY),
            arb_values(&COHORT),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(life, sex, colony, mut cohort, sentinel, mating, not_mating)| {
                if sentinel {
                    cohort.insert(FilterOption::NotInAnyCohort);
                }
                let mut m = BTreeSet::new();
                if mating {
                    m.insert(FilterOption::Mating);
                }
                if not_mating {
                    m.insert(FilterOption::NotMating);
                }
                let mut f = FilterState::new();
                f.insert(KnownColumn::LifeStatus, life);
                f.insert(KnownColumn::Sex, sex);
                f.insert(KnownColumn::ColonyName, colony);
                f.insert(KnownColumn::AllCohorts, cohort);
                f.insert(KnownColumn::CurrentMating, m);
                f
            })
    }

    proptest! {
        #[test]
        fn empty_selection_equals_skipping_stage(table in arb_table(), filters in arb_filters(), stage in 0usize..5) {
            let column = STAGES[stage];
            let mut emptied = filters.clone();
            emptied.insert(column, BTreeSet::new());
            let mut removed = filters.clone();
            removed.remove(&column);
            prop_assert_eq!(run(&table, &emptied).rows, run(&table, &removed).rows);
        }

        #[test]
        fn survivors_satisfy_every_active_stage(table in arb_table(), filters in arb_filters()) {
            let out = run(&table, &filters);
            for &r in &out.rows {
                for (col, column) in STAGES.iter().enumerate() {
                    if let Some(pred) = filters.get(column).and_then(|s| stage_predicate(*column, s)) {
                        prop_assert!(pred(table.cell(r, col)));
                    }
                }
            }
            // Conversely, every dropped row fails at least one active stage.
            for r in table.all_rows().into_iter().filter(|r| !out.rows.contains(r)) {
                let fails = STAGES.iter().enumerate().any(|(col, column)| {
                    filters
                        .get(column)
                        .and_then(|s| stage_predicate(*column, s))
                        .is_some_and(|pred| !pred(table.cell(r, col)))
                });
                prop_assert!(fails);
            }
        }

        #[test]
        fn cohort_missing_rows_follow_sentinel(table in arb_table(), filters in arb_filters()) {
            let only_cohort = {
                let mut f = FilterState::new();
                f.insert(KnownColumn::AllCohorts, filters[&KnownColumn::AllCohorts].clone());
                f
            };
            let sentinel = only_cohort[&KnownColumn::AllCohorts].contains(&FilterOption::NotInAnyCohort);
            let active = !only_cohort[&KnownColumn::AllCohorts].is_empty();
            let out = run(&table, &only_cohort);
            for r in table.all_rows() {
                if table.cell(r, 3).is_null() {
                    prop_assert_eq!(out.rows.contains(&r), sentinel || !active);
                }
            }
        }

        #[test]
        fn mating_predicates(table in arb_table(), mating in any::<bool>(), not_mating in any::<bool>()) {
            let mut opts = Vec::new();
            if mating { opts.push(FilterOption::Mating); }
            if not_mating { opts.push(FilterOption::NotMating); }
            let out = run(&table, &select(KnownColumn::CurrentMating, &opts));
            let expected: Vec<usize> = table
                .all_rows()
                .into_iter()
                .filter(|&r| {
                    let blank = table.cell(r, 4).is_blank();
                    match (mating, not_mating) {
                        (true, false) => !blank,
                        (false, true) => blank,
                        _ => true,
                    }
                })
                .collect();
            prop_assert_eq!(out.rows, expected);
        }

        #[test]
        fn pipeline_is_idempotent(table in arb_table(), filters in arb_filters()) {
            let schema = Schema::probe(&table);
            let once = run_pipeline(&table, &schema, &filters);
            let twice = run_pipeline_on(&table, &schema, &filters, once.rows.clone());
            prop_assert_eq!(&once.rows, &twice.rows);
            prop_assert_eq!(once, run_pipeline(&table, &schema, &filters));
        }
    }
}
