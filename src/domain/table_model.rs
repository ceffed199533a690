use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::domain::entities::directory::{SortDirection, SortState};
use crate::domain::entities::worker::{WorkerField, WorkerId, WorkerRow, WorkerStatus};

/// Rows as fetched (insertion order), plus the single-column sort and the
/// selected ids.
#[derive(Debug, Clone, Default)]
pub struct TableModel {
    rows: Vec<WorkerRow>,
    sort: Option<SortState>,
    selection: BTreeSet<WorkerId>,
}

impl TableModel {
    pub fn new(rows: Vec<WorkerRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[WorkerRow] {
        &self.rows
    }

    /// New data set from a fresh fetch. Selection does not carry over.
    pub fn replace_rows(&mut self, rows: Vec<WorkerRow>) {
        self.rows = rows;
        self.selection.clear();
    }

    /// Next page of the same result set; selected ids are kept.
    pub fn swap_page(&mut self, rows: Vec<WorkerRow>) {
        self.rows = rows;
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Unsorted -> ascending -> descending -> unsorted.
    pub fn toggle_sort(&mut self, column: WorkerField) {
        self.sort = match self.sort {
            Some(SortState {
                column: active,
                direction: SortDirection::Asc,
            }) if active == column => Some(SortState {
                column,
                direction: SortDirection::Desc,
            }),
            Some(SortState {
                column: active,
                direction: SortDirection::Desc,
            }) if active == column => None,
            _ => Some(SortState {
                column,
                direction: SortDirection::Asc,
            }),
        };
    }

    pub fn sorted_rows(&self) -> Vec<&WorkerRow> {
        sort_rows(self.rows.iter().collect(), self.sort)
    }

    pub fn is_selected(&self, id: &WorkerId) -> bool {
        self.selection.contains(id)
    }

    pub fn toggle_row_selected(&mut self, id: &WorkerId) {
        if !self.selection.remove(id) {
            self.selection.insert(id.clone());
        }
    }

    /// Selects or deselects exactly the rows given, normally the visible page.
    pub fn toggle_all_selected<'a>(
        &mut self,
        selected: bool,
        visible: impl IntoIterator<Item = &'a WorkerRow>,
    ) {
        for row in visible {
            if selected {
                self.selection.insert(row.id.clone());
            } else {
                self.selection.remove(&row.id);
            }
        }
    }

    pub fn all_selected<'a>(&self, visible: impl IntoIterator<Item = &'a WorkerRow>) -> bool {
        let mut any = false;
        for row in visible {
            any = true;
            if !self.selection.contains(&row.id) {
                return false;
            }
        }
        any
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn selected_ids(&self) -> Vec<WorkerId> {
        self.selection.iter().cloned().collect()
    }

    pub fn selected_rows(&self) -> Vec<&WorkerRow> {
        self.rows
            .iter()
            .filter(|row| self.selection.contains(&row.id))
            .collect()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Applies a status locally before the backend confirms it. Returns the
    /// rows as they were so the change can be rolled back.
    pub fn apply_local_status(
        &mut self,
        ids: &[WorkerId],
        status: WorkerStatus,
        at: DateTime<Utc>,
    ) -> Vec<WorkerRow> {
        let mut previous = Vec::new();
        for row in self.rows.iter_mut().filter(|row| ids.contains(&row.id)) {
            previous.push(row.clone());
            row.set_status(status, at);
        }
        previous
    }

    pub fn rollback_status(&mut self, previous: &[WorkerRow]) {
        for before in previous {
            if let Some(row) = self.rows.iter_mut().find(|row| row.id == before.id) {
                *row = before.clone();
            }
        }
    }

    pub fn status_breakdown(&self) -> BTreeMap<WorkerStatus, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.status).or_insert(0) += 1;
        }
        counts
    }
}

/// Stable single-column sort. Missing values go last when ascending.
pub fn sort_rows(mut rows: Vec<&WorkerRow>, sort: Option<SortState>) -> Vec<&WorkerRow> {
    let Some(sort) = sort else {
        return rows;
    };
    rows.sort_by(|a, b| {
        let ordering = compare_rows(a, b, sort.column);
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    rows
}

fn compare_rows(a: &WorkerRow, b: &WorkerRow, column: WorkerField) -> Ordering {
    if column.is_date() {
        return compare_missing_last(a.date_value(column), b.date_value(column));
    }
    let left = a.field_value(column).trim().to_lowercase();
    let right = b.field_value(column).trim().to_lowercase();
    let left = (!left.is_empty()).then_some(left);
    let right = (!right.is_empty()).then_some(right);
    compare_missing_last(left, right)
}

fn compare_missing_last<T: Ord>(left: Option<T>, right: Option<T>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
