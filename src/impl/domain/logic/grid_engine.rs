use std::collections::{BTreeSet, HashMap, HashSet};

use fractic_server_error::ServerError;

use crate::{
    entities::{CellValue, ColumnFilter, FilterSet, GridConfig, Row, RowEdit, RowId, SortSpec},
    errors::{DuplicateRowId, UnknownColumn, UnknownRowColumn, UnknownRowId},
};

use super::{column_sort::sort_rows, duplicate_detector::DuplicateDetector};

/// In-memory filter, sort and selection state for one grid.
///
/// The baseline holds every loaded row. The visible view is derived from the
/// baseline and the active filters only; the selection is keyed by [`RowId`]
/// and survives filter changes, sorting and reloads.
#[derive(Debug, Clone)]
pub struct GridEngine {
    columns: Vec<String>,
    duplicate_ignore_columns: Vec<String>,
    baseline: Vec<Row>,
    positions: HashMap<RowId, usize>,
    filters: FilterSet,
    sort: Option<SortSpec>,
    selection: HashSet<RowId>,
    /// Baseline positions of the rows passing every filter.
    visible: Vec<usize>,
    pending_edits: Vec<RowEdit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadOutcome {
    pub rows: usize,
    pub visible: usize,
    /// Selected ids dropped because their rows are gone.
    pub pruned_selection: usize,
}

impl GridEngine {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            duplicate_ignore_columns: Vec::new(),
            baseline: Vec::new(),
            positions: HashMap::new(),
            filters: FilterSet::new(),
            sort: None,
            selection: HashSet::new(),
            visible: Vec::new(),
            pending_edits: Vec::new(),
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.schema())
            .with_duplicate_ignore_columns(config.duplicate_ignore_columns.clone())
    }

    pub fn with_duplicate_ignore_columns(mut self, columns: Vec<String>) -> Self {
        self.duplicate_ignore_columns = columns;
        self
    }

    // Accessors.
    // ---

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.baseline.len()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.positions.get(&id).map(|&i| &self.baseline[i])
    }

    /// All loaded rows, in the current sort order.
    pub fn rows(&self) -> &[Row] {
        &self.baseline
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.visible.iter().map(|&i| &self.baseline[i])
    }

    pub fn visible_ids(&self) -> Vec<RowId> {
        self.visible_rows().map(|r| r.id).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn filter(&self, column: &str) -> Option<&ColumnFilter> {
        self.filters.get(column)
    }

    pub fn active_sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    // Filtering.
    // ---

    /// Installs or replaces the filter on `column`. An empty value set clears
    /// the column's filter instead of hiding every row.
    pub fn set_filter<I, S>(&mut self, column: &str, allowed_values: I) -> Result<(), ServerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_column(column)?;
        let filter = ColumnFilter::new(column, allowed_values);
        if filter.allowed_values.is_empty() {
            self.filters.remove(column);
        } else {
            self.filters.insert(column.to_string(), filter);
        }
        self.refresh_visible();
        Ok(())
    }

    pub fn clear_filter(&mut self, column: &str) -> Result<(), ServerError> {
        self.check_column(column)?;
        self.filters.remove(column);
        self.refresh_visible();
        Ok(())
    }

    pub fn clear_all_filters(&mut self) {
        self.filters.clear();
        self.refresh_visible();
    }

    /// Sorted canonical values offered in `column`'s filter list: taken from
    /// rows passing every other active filter.
    pub fn distinct_values(&self, column: &str) -> Result<Vec<String>, ServerError> {
        self.check_column(column)?;
        let other_filters: FilterSet = self
            .filters
            .iter()
            .filter(|(c, _)| c.as_str() != column)
            .map(|(c, f)| (c.clone(), f.clone()))
            .collect();
        let values: BTreeSet<String> = apply_filters(&self.baseline, &other_filters)
            .into_iter()
            .map(|i| self.baseline[i].get(column).canonical_string())
            .collect();
        Ok(values.into_iter().collect())
    }

    // Sorting.
    // ---

    /// Reorders the baseline by `column`. The sort is remembered and applied
    /// again to reloaded rows.
    pub fn sort(&mut self, column: &str, ascending: bool) -> Result<(), ServerError> {
        self.check_column(column)?;
        let rows = std::mem::take(&mut self.baseline);
        self.baseline = sort_rows(rows, column, ascending);
        self.sort = Some(SortSpec {
            column: column.to_string(),
            ascending,
        });
        self.reindex();
        self.refresh_visible();
        Ok(())
    }

    /// Forgets the active sort. Rows keep their current order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    // Selection.
    // ---

    /// Flips the selection of one row and returns its new state. Does not
    /// touch filters or the visible view.
    pub fn toggle_selection(&mut self, id: RowId) -> Result<bool, ServerError> {
        self.check_row(id)?;
        if self.selection.remove(&id) {
            Ok(false)
        } else {
            self.selection.insert(id);
            Ok(true)
        }
    }

    pub fn set_selected(&mut self, id: RowId, selected: bool) -> Result<(), ServerError> {
        self.check_row(id)?;
        if selected {
            self.selection.insert(id);
        } else {
            self.selection.remove(&id);
        }
        Ok(())
    }

    pub fn is_selected(&self, id: RowId) -> bool {
        self.selection.contains(&id)
    }

    /// Adds every visible row to the selection, keeping rows selected outside
    /// the view. Returns how many rows were newly selected.
    pub fn select_all_visible(&mut self) -> usize {
        let before = self.selection.len();
        self.selection
            .extend(self.visible.iter().map(|&i| self.baseline[i].id));
        self.selection.len() - before
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Selected ids in baseline order, visible or not.
    pub fn selected_ids(&self) -> Vec<RowId> {
        self.selected_rows().map(|r| r.id).collect()
    }

    pub fn selected_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.baseline
            .iter()
            .filter(|r| self.selection.contains(&r.id))
    }

    pub fn selection_count(&self) -> usize {
        self.selection.len()
    }

    /// Ids the database layer should delete; the following [`reload`] prunes
    /// them from the baseline and the selection.
    ///
    /// [`reload`]: GridEngine::reload
    pub fn deletion_request(&self) -> Vec<RowId> {
        self.selected_ids()
    }

    // Reload.
    // ---

    /// Replaces the baseline with freshly loaded rows, keeping filters,
    /// sort and selection. Selected ids with no row in `new_rows` are
    /// dropped. Rows with duplicate ids or fields outside the column schema
    /// reject the whole reload and leave the grid unchanged.
    pub fn reload(&mut self, new_rows: Vec<Row>) -> Result<ReloadOutcome, ServerError> {
        self.validate_rows(&new_rows)?;

        let new_ids: HashSet<RowId> = new_rows.iter().map(|r| r.id).collect();
        let selected_before = self.selection.len();
        self.selection.retain(|id| new_ids.contains(id));
        let pruned_selection = selected_before - self.selection.len();
        if pruned_selection > 0 {
            log::warn!(
                "reload dropped {} selected row(s) no longer present",
                pruned_selection
            );
        }

        // Unsaved edits stay applied on top of the reloaded values.
        self.pending_edits.retain(|e| new_ids.contains(&e.id));
        let mut new_rows = new_rows;
        if !self.pending_edits.is_empty() {
            let edits_by_id: HashMap<RowId, Vec<&RowEdit>> =
                self.pending_edits
                    .iter()
                    .fold(HashMap::new(), |mut map, edit| {
                        map.entry(edit.id).or_default().push(edit);
                        map
                    });
            for row in new_rows.iter_mut() {
                for edit in edits_by_id.get(&row.id).into_iter().flatten() {
                    row.fields.insert(edit.column.clone(), edit.value.clone());
                }
            }
        }

        self.baseline = match &self.sort {
            Some(sort) => sort_rows(new_rows, &sort.column, sort.ascending),
            None => new_rows,
        };
        self.reindex();
        self.refresh_visible();

        let outcome = ReloadOutcome {
            rows: self.baseline.len(),
            visible: self.visible.len(),
            pruned_selection,
        };
        log::debug!(
            "reloaded grid: {} rows, {} visible, {} filter(s) kept",
            outcome.rows,
            outcome.visible,
            self.filters.len()
        );
        Ok(outcome)
    }

    // Editing.
    // ---

    /// Changes one cell and records the change for persistence. The visible
    /// view is recomputed, so the row may leave it; its selection does not
    /// change.
    pub fn edit_cell(
        &mut self,
        id: RowId,
        column: &str,
        value: impl Into<CellValue>,
    ) -> Result<RowEdit, ServerError> {
        self.check_column(column)?;
        let position = *self
            .positions
            .get(&id)
            .ok_or_else(|| UnknownRowId::new(&id))?;
        let value = value.into();
        self.baseline[position]
            .fields
            .insert(column.to_string(), value.clone());

        let edit = RowEdit {
            id,
            column: column.to_string(),
            value,
        };
        self.pending_edits
            .retain(|e| !(e.id == edit.id && e.column == edit.column));
        self.pending_edits.push(edit.clone());
        self.refresh_visible();
        Ok(edit)
    }

    /// Drains the edits recorded since the last call.
    pub fn take_pending_edits(&mut self) -> Vec<RowEdit> {
        std::mem::take(&mut self.pending_edits)
    }

    // Derived views.
    // ---

    /// Ids of rows equal to another row on every column except the configured
    /// ignore list.
    pub fn duplicate_ids(&self) -> HashSet<RowId> {
        DuplicateDetector::new(&self.columns, &self.duplicate_ignore_columns)
            .process(&self.baseline)
    }

    /// Sum of the numeric values of `column` over the visible view.
    pub fn column_total(&self, column: &str) -> Result<f64, ServerError> {
        self.check_column(column)?;
        Ok(self
            .visible_rows()
            .filter_map(|r| r.get(column).as_number())
            .sum())
    }

    // Internal.
    // ---

    fn check_column(&self, column: &str) -> Result<(), ServerError> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            log::error!(
                "grid has no column '{}' (columns: {:?})",
                column,
                self.columns
            );
            Err(UnknownColumn::new(column))
        }
    }

    fn check_row(&self, id: RowId) -> Result<(), ServerError> {
        if self.positions.contains_key(&id) {
            Ok(())
        } else {
            Err(UnknownRowId::new(&id))
        }
    }

    fn validate_rows(&self, rows: &[Row]) -> Result<(), ServerError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in rows {
            if !seen.insert(row.id) {
                return Err(DuplicateRowId::new(&row.id));
            }
            if let Some(column) = row.fields.keys().find(|c| !self.columns.contains(c)) {
                return Err(UnknownRowColumn::new(&row.id, column));
            }
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.positions = self
            .baseline
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
    }

    fn refresh_visible(&mut self) {
        self.visible = apply_filters(&self.baseline, &self.filters);
    }
}

/// Positions of the rows passing every filter. Depends on nothing but its
/// arguments; in particular never on the selection.
pub(crate) fn apply_filters(baseline: &[Row], filters: &FilterSet) -> Vec<usize> {
    baseline
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            filters
                .values()
                .all(|f| f.allows(&row.get(&f.column).canonical_string()))
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    const COLUMNS: [&str; 4] = ["doc_no", "project", "status", "hours"];

    fn row(id: u64, project: &str, status: &str, hours: f64) -> Row {
        Row::new(RowId(id))
            .with("doc_no", (1000 + id) as f64)
            .with("project", project)
            .with("status", status)
            .with("hours", hours)
    }

    /// Ten rows; odd ids are "Open", even ids "Closed".
    fn ten_rows() -> Vec<Row> {
        (1..=10)
            .map(|id| {
                row(
                    id,
                    if id <= 5 { "Apollo" } else { "Gemini" },
                    if id % 2 == 1 { "Open" } else { "Closed" },
                    id as f64,
                )
            })
            .collect()
    }

    fn engine() -> GridEngine {
        let mut engine = GridEngine::new(COLUMNS)
            .with_duplicate_ignore_columns(vec!["doc_no".to_string()]);
        engine.reload(ten_rows()).unwrap();
        engine
    }

    fn ids(values: &[u64]) -> Vec<RowId> {
        values.iter().map(|&v| RowId(v)).collect()
    }

    #[test]
    fn filters_combine_with_and() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        engine.set_filter("project", ["Apollo"]).unwrap();
        assert_eq!(engine.visible_ids(), ids(&[1, 3, 5]));

        engine.clear_filter("project").unwrap();
        assert_eq!(engine.visible_ids(), ids(&[1, 3, 5, 7, 9]));

        engine.clear_all_filters();
        assert_eq!(engine.visible_count(), 10);
    }

    #[test]
    fn replacing_a_filter_keeps_one_per_column() {
        let mut engine = engine();
        engine.set_filter("hours", ["1", "2"]).unwrap();
        engine.set_filter("hours", ["3"]).unwrap();
        assert_eq!(engine.filters().len(), 1);
        assert_eq!(engine.visible_ids(), ids(&[3]));
    }

    #[test]
    fn empty_value_set_clears_the_filter() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        engine.set_filter("status", Vec::<String>::new()).unwrap();
        assert!(engine.filter("status").is_none());
        assert_eq!(engine.visible_count(), 10);
    }

    #[test]
    fn filter_values_absent_from_data_show_nothing() {
        let mut engine = engine();
        engine.set_filter("status", ["Cancelled"]).unwrap();
        assert_eq!(engine.visible_count(), 0);
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let mut engine = engine();
        assert!(engine.set_filter("nope", ["x"]).is_err());
        assert!(engine.clear_filter("nope").is_err());
        assert!(engine.sort("nope", true).is_err());
        assert!(engine.distinct_values("nope").is_err());
        assert!(engine.column_total("nope").is_err());
        assert!(engine.filters().is_empty());
    }

    #[test]
    fn toggling_selection_leaves_filters_and_view_alone() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        let view = engine.visible_ids();
        for id in 1..=10 {
            engine.toggle_selection(RowId(id)).unwrap();
        }
        assert_eq!(engine.visible_ids(), view);
        assert_eq!(engine.filter("status").unwrap().allowed_values.len(), 1);
        assert_eq!(engine.selection_count(), 10);

        assert_eq!(engine.toggle_selection(RowId(4)).unwrap(), false);
        assert!(!engine.is_selected(RowId(4)));
        assert!(engine.toggle_selection(RowId(99)).is_err());
    }

    #[test]
    fn filtering_never_reads_the_selection() {
        let mut selected = engine();
        let plain = engine();
        selected.select_all_visible();
        assert_eq!(
            apply_filters(selected.rows(), selected.filters()),
            apply_filters(plain.rows(), plain.filters())
        );
    }

    #[test]
    fn select_all_visible_is_additive_and_view_scoped() {
        let mut engine = engine();
        engine.set_filter("hours", ["1", "3", "5"]).unwrap();
        assert_eq!(engine.select_all_visible(), 3);
        assert_eq!(engine.selected_ids(), ids(&[1, 3, 5]));

        engine.set_filter("hours", ["2", "4"]).unwrap();
        assert_eq!(engine.selected_ids(), ids(&[1, 3, 5]));

        assert_eq!(engine.select_all_visible(), 2);
        assert_eq!(engine.selected_ids(), ids(&[1, 2, 3, 4, 5]));

        engine.deselect_all();
        assert_eq!(engine.selection_count(), 0);
        assert_eq!(engine.visible_ids(), ids(&[2, 4]));
    }

    #[test]
    fn reload_preserves_filters_and_selection() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        engine.toggle_selection(RowId(7)).unwrap();

        let mut rows = ten_rows();
        rows.push(row(11, "Gemini", "Open", 11.0));
        let outcome = engine.reload(rows).unwrap();

        assert_eq!(outcome.pruned_selection, 0);
        assert_eq!(engine.filter("status").unwrap().allowed_values.len(), 1);
        assert!(engine.is_selected(RowId(7)));
        assert_eq!(engine.visible_ids(), ids(&[1, 3, 5, 7, 9, 11]));
    }

    #[test]
    fn reload_prunes_orphaned_selection() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        engine.toggle_selection(RowId(7)).unwrap();
        engine.toggle_selection(RowId(2)).unwrap();

        let rows = ten_rows().into_iter().filter(|r| r.id != RowId(7)).collect();
        let outcome = engine.reload(rows).unwrap();

        assert_eq!(outcome.pruned_selection, 1);
        assert!(!engine.is_selected(RowId(7)));
        assert!(engine.is_selected(RowId(2)));
        assert!(engine.filter("status").is_some());
    }

    #[test]
    fn deletion_request_then_reload_drops_rows_and_selection() {
        let mut engine = engine();
        engine.set_selected(RowId(2), true).unwrap();
        engine.set_selected(RowId(9), true).unwrap();
        let deleted = engine.deletion_request();
        assert_eq!(deleted, ids(&[2, 9]));

        let rows = ten_rows()
            .into_iter()
            .filter(|r| !deleted.contains(&r.id))
            .collect();
        engine.reload(rows).unwrap();
        assert_eq!(engine.row_count(), 8);
        assert_eq!(engine.selection_count(), 0);
    }

    #[test]
    fn malformed_reload_leaves_state_untouched() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        engine.toggle_selection(RowId(3)).unwrap();

        let mut duplicated = ten_rows();
        duplicated.push(row(3, "Apollo", "Open", 3.0));
        assert!(engine.reload(duplicated).is_err());

        let stray = vec![row(1, "Apollo", "Open", 1.0).with("unknown", "x")];
        assert!(engine.reload(stray).is_err());

        assert_eq!(engine.row_count(), 10);
        assert!(engine.is_selected(RowId(3)));
        assert_eq!(engine.visible_ids(), ids(&[1, 3, 5, 7, 9]));
    }

    #[test]
    fn sort_reorders_baseline_and_survives_reload() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        engine.sort("hours", false).unwrap();
        assert_eq!(engine.visible_ids(), ids(&[9, 7, 5, 3, 1]));

        engine.reload(ten_rows()).unwrap();
        assert_eq!(engine.visible_ids(), ids(&[9, 7, 5, 3, 1]));

        engine.clear_all_filters();
        assert_eq!(engine.visible_ids(), ids(&[10, 9, 8, 7, 6, 5, 4, 3, 2, 1]));

        engine.clear_sort();
        engine.reload(ten_rows()).unwrap();
        assert_eq!(engine.visible_ids()[0], RowId(1));
    }

    #[test]
    fn distinct_values_ignore_the_columns_own_filter() {
        let mut engine = engine();
        engine.set_filter("project", ["Apollo"]).unwrap();
        engine.set_filter("status", ["Open"]).unwrap();
        assert_eq!(
            engine.distinct_values("status").unwrap(),
            vec!["Closed".to_string(), "Open".to_string()]
        );
        assert_eq!(engine.distinct_values("hours").unwrap(), vec!["1", "3", "5"]);
    }

    #[test]
    fn edits_are_recorded_and_reapplied_over_reloads() {
        let mut engine = engine();
        engine.set_filter("status", ["Open"]).unwrap();
        engine.toggle_selection(RowId(1)).unwrap();

        let edit = engine.edit_cell(RowId(1), "status", "Closed").unwrap();
        assert_eq!(edit.value, CellValue::from("Closed"));
        assert_eq!(engine.visible_ids(), ids(&[3, 5, 7, 9]));
        assert!(engine.is_selected(RowId(1)));

        engine.reload(ten_rows()).unwrap();
        assert_eq!(engine.row(RowId(1)).unwrap().get("status"), &CellValue::from("Closed"));

        assert_eq!(engine.take_pending_edits(), vec![edit]);
        assert!(engine.take_pending_edits().is_empty());
        assert!(engine.edit_cell(RowId(42), "status", "Closed").is_err());
    }

    #[test]
    fn totals_follow_the_visible_view() {
        let mut engine = engine();
        assert_eq!(engine.column_total("hours").unwrap(), 55.0);
        engine.set_filter("project", ["Apollo"]).unwrap();
        assert_eq!(engine.column_total("hours").unwrap(), 15.0);
    }

    #[test]
    fn duplicates_ignore_the_document_number() {
        let mut engine = engine();
        let mut rows = ten_rows();
        rows.push(row(11, "Apollo", "Open", 1.0));
        engine.reload(rows).unwrap();
        assert_eq!(engine.duplicate_ids(), HashSet::from([RowId(1), RowId(11)]));
        assert_eq!(engine.visible_count(), 11);
    }
}
