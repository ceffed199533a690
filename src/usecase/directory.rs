use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DirectoryConfig;
use crate::domain::entities::directory::{PageQuery, PageResult, SortState};
use crate::domain::entities::worker::{WorkerField, WorkerId, WorkerRow, WorkerStatus};
use crate::domain::filter::{AdvancedFilter, DirectoryCriteria, FilterPreset};
use crate::domain::pagination::{clamp_page, paginate, server_page, PageSlice, PaginationState};
use crate::domain::table_model::{sort_rows, TableModel};
use crate::usecase::mode::{ModePolicy, ModeSwitch, TableMode};
use crate::usecase::ports::repo::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("page size {0} is not one of the allowed sizes {1:?}")]
    UnsupportedPageSize(usize, Vec<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    FullSet,
    Page(PageQuery),
}

/// Issued for every backend request. Only the ticket with the latest
/// generation may change the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub plan: FetchPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    FullSet(Vec<WorkerRow>),
    Page(PageResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale,
    Failed,
}

/// What the caller has to do after a user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryAction {
    /// Already handled in memory.
    Local,
    /// Run this backend query and hand the result to `complete`.
    Fetch(FetchTicket),
    /// Row count must be re-estimated because the mode may change.
    Recount,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryView {
    pub mode: Option<TableMode>,
    pub slice: PageSlice<WorkerRow>,
    pub page_size: usize,
    pub sort: Option<SortState>,
    pub selected_count: usize,
    pub all_visible_selected: bool,
    pub has_previous: bool,
    pub has_next: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// State behind the worker directory table: criteria, sort, paging,
/// selection, the last loaded rows and the request generation counter.
#[derive(Debug, Clone)]
pub struct WorkerDirectory {
    page_sizes: Vec<usize>,
    bgc_warning_days: i64,
    switch: ModeSwitch,
    criteria: DirectoryCriteria,
    model: TableModel,
    pagination: PaginationState,
    requested_page: usize,
    requested_page_size: usize,
    loaded_result_key: Option<(DirectoryCriteria, Option<SortState>)>,
    generation: u64,
    in_flight: bool,
    last_plan: Option<FetchPlan>,
    error: Option<String>,
    today: NaiveDate,
}

impl WorkerDirectory {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            page_sizes: config.page_sizes.clone(),
            bgc_warning_days: config.bgc_warning_days,
            switch: ModeSwitch::new(ModePolicy {
                threshold: config.client_mode_threshold,
                criteria_force_server: config.criteria_force_server,
            }),
            criteria: DirectoryCriteria::default(),
            model: TableModel::default(),
            pagination: PaginationState::new(config.default_page_size),
            requested_page: 1,
            requested_page_size: config.default_page_size,
            loaded_result_key: None,
            generation: 0,
            in_flight: false,
            last_plan: None,
            error: None,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Reference date for relative date filters.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn mode(&self) -> Option<TableMode> {
        self.switch.mode()
    }

    pub fn criteria(&self) -> &DirectoryCriteria {
        &self.criteria
    }

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn page_sizes(&self) -> &[usize] {
        &self.page_sizes
    }

    pub fn bgc_warning_days(&self) -> i64 {
        self.bgc_warning_days
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn model(&self) -> &TableModel {
        &self.model
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a (re)load after the caller estimated the total row count.
    /// A mode transition resets to page 1 and drops the selection.
    pub fn begin_refresh(&mut self, total_row_estimate: usize) -> FetchTicket {
        if self
            .switch
            .evaluate(total_row_estimate, self.criteria.is_active())
        {
            self.requested_page = 1;
            self.pagination.page = 1;
            self.model.clear_selection();
            self.loaded_result_key = None;
        }
        let plan = match self.switch.mode() {
            Some(TableMode::Server) => FetchPlan::Page(self.page_query()),
            _ => FetchPlan::FullSet,
        };
        self.issue(plan)
    }

    /// Re-issues the last request. Nothing is retried automatically.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        let plan = self.last_plan.clone()?;
        self.error = None;
        Some(self.issue(plan))
    }

    fn issue(&mut self, plan: FetchPlan) -> FetchTicket {
        self.generation += 1;
        self.in_flight = true;
        self.last_plan = Some(plan.clone());
        debug!(generation = self.generation, ?plan, "issuing directory fetch");
        FetchTicket {
            generation: self.generation,
            plan,
        }
    }

    fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.requested_page,
            page_size: self.requested_page_size,
            criteria: self.criteria.clone(),
            sort: self.model.sort(),
        }
    }

    /// Applies a finished request unless a newer one has been issued since.
    /// On failure the rows loaded before stay visible.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<FetchOutcome, RepoError>,
    ) -> ApplyOutcome {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding superseded directory fetch"
            );
            return ApplyOutcome::Stale;
        }
        self.in_flight = false;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "directory fetch failed");
                self.record_error(&err);
                return ApplyOutcome::Failed;
            }
        };

        match outcome {
            FetchOutcome::FullSet(rows) => {
                self.model.replace_rows(rows);
                self.loaded_result_key = None;
                self.pagination.page_size = self.requested_page_size;
                self.pagination.page = self.requested_page;
                self.pagination.set_total(self.filtered_rows().len());
                self.requested_page = self.pagination.page;
            }
            FetchOutcome::Page(result) => {
                let query = match &ticket.plan {
                    FetchPlan::Page(query) => query.clone(),
                    FetchPlan::FullSet => self.page_query(),
                };
                let key = (query.criteria.clone(), query.sort);
                if self.loaded_result_key.as_ref() == Some(&key) {
                    self.model.swap_page(result.rows);
                } else {
                    self.model.replace_rows(result.rows);
                    self.loaded_result_key = Some(key);
                }
                self.pagination.page_size = query.page_size;
                self.pagination.page = query.page;
                self.pagination.set_total(result.total_count);
                self.requested_page = self.pagination.page;
            }
        }
        self.error = None;
        ApplyOutcome::Applied
    }

    /// Surfaces a failure that happened before a ticket could be issued.
    pub fn record_error(&mut self, err: &RepoError) {
        self.error = Some(err.to_string());
        self.requested_page = self.pagination.page;
        self.requested_page_size = self.pagination.page_size;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> DirectoryAction {
        let search = search.into();
        if search == self.criteria.search {
            return DirectoryAction::Local;
        }
        self.criteria.search = search;
        self.criteria_changed()
    }

    pub fn set_filter_values(&mut self, field: WorkerField, values: Vec<String>) -> DirectoryAction {
        self.criteria.filters.set(field, values);
        self.criteria_changed()
    }

    pub fn toggle_filter_value(&mut self, field: WorkerField, value: &str) -> DirectoryAction {
        self.criteria.filters.toggle_value(field, value);
        self.criteria_changed()
    }

    pub fn set_advanced_filters(&mut self, filters: Vec<AdvancedFilter>) -> DirectoryAction {
        self.criteria.advanced = filters;
        self.criteria_changed()
    }

    pub fn apply_preset(&mut self, preset: &FilterPreset) -> DirectoryAction {
        self.set_advanced_filters(preset.filters.clone())
    }

    pub fn clear_criteria(&mut self) -> DirectoryAction {
        if !self.criteria.is_active() {
            return DirectoryAction::Local;
        }
        self.criteria = DirectoryCriteria::default();
        self.criteria_changed()
    }

    fn criteria_changed(&mut self) -> DirectoryAction {
        self.requested_page = 1;
        let active = self.criteria.is_active();
        match self.switch.mode() {
            Some(TableMode::Server) => {
                if !active {
                    // Clearing everything may bring the set back under the threshold.
                    return DirectoryAction::Recount;
                }
                self.model.clear_selection();
                DirectoryAction::Fetch(self.issue(FetchPlan::Page(self.page_query())))
            }
            Some(TableMode::Client) => {
                if active && self.forces_server() {
                    return DirectoryAction::Recount;
                }
                self.pagination.page = 1;
                self.pagination.set_total(self.filtered_rows().len());
                DirectoryAction::Local
            }
            None => DirectoryAction::Recount,
        }
    }

    fn forces_server(&self) -> bool {
        self.switch.policy().criteria_force_server
    }

    pub fn toggle_sort(&mut self, column: WorkerField) -> DirectoryAction {
        self.model.toggle_sort(column);
        self.requested_page = 1;
        match self.switch.mode() {
            Some(TableMode::Server) => {
                DirectoryAction::Fetch(self.issue(FetchPlan::Page(self.page_query())))
            }
            _ => {
                self.pagination.page = 1;
                DirectoryAction::Local
            }
        }
    }

    pub fn set_page(&mut self, page: usize) -> DirectoryAction {
        match self.switch.mode() {
            Some(TableMode::Server) => {
                let page = clamp_page(page, self.pagination.page_count());
                self.requested_page = page;
                DirectoryAction::Fetch(self.issue(FetchPlan::Page(self.page_query())))
            }
            _ => {
                self.pagination.go_to(page);
                self.requested_page = self.pagination.page;
                DirectoryAction::Local
            }
        }
    }

    pub fn next_page(&mut self) -> DirectoryAction {
        self.set_page(self.pagination.page + 1)
    }

    pub fn previous_page(&mut self) -> DirectoryAction {
        self.set_page(self.pagination.page.saturating_sub(1))
    }

    /// Selection survives a page size change.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<DirectoryAction, DirectoryError> {
        if !self.page_sizes.contains(&page_size) {
            return Err(DirectoryError::UnsupportedPageSize(
                page_size,
                self.page_sizes.clone(),
            ));
        }
        match self.switch.mode() {
            Some(TableMode::Server) => {
                let mut next = self.pagination;
                next.set_page_size(page_size);
                self.requested_page = next.page;
                self.requested_page_size = page_size;
                Ok(DirectoryAction::Fetch(
                    self.issue(FetchPlan::Page(self.page_query())),
                ))
            }
            _ => {
                self.pagination.set_page_size(page_size);
                self.requested_page = self.pagination.page;
                self.requested_page_size = page_size;
                Ok(DirectoryAction::Local)
            }
        }
    }

    /// Rows after search, filters and sort; the full set in client mode, the
    /// loaded page in server mode.
    pub fn filtered_rows(&self) -> Vec<&WorkerRow> {
        match self.switch.mode() {
            Some(TableMode::Server) => self.model.rows().iter().collect(),
            _ => sort_rows(
                self.criteria.apply(self.model.rows(), self.today),
                self.model.sort(),
            ),
        }
    }

    pub fn visible_rows(&self) -> Vec<WorkerRow> {
        self.slice().visible_rows
    }

    fn slice(&self) -> PageSlice<WorkerRow> {
        match self.switch.mode() {
            Some(TableMode::Server) => server_page(
                self.model.rows().to_vec(),
                self.pagination.total_rows,
                self.pagination.page,
                self.pagination.page_size,
            ),
            _ => {
                let rows: Vec<WorkerRow> = self.filtered_rows().into_iter().cloned().collect();
                paginate(&rows, self.pagination.page, self.pagination.page_size)
            }
        }
    }

    pub fn toggle_row_selected(&mut self, id: &WorkerId) {
        self.model.toggle_row_selected(id);
    }

    /// Acts on the visible page only, in both modes.
    pub fn toggle_all_selected(&mut self, selected: bool) {
        let visible = self.visible_rows();
        self.model.toggle_all_selected(selected, &visible);
    }

    pub fn selected_ids(&self) -> Vec<WorkerId> {
        self.model.selected_ids()
    }

    /// Selected rows that are currently materialized.
    pub fn selected_rows(&self) -> Vec<WorkerRow> {
        self.model.selected_rows().into_iter().cloned().collect()
    }

    pub fn apply_local_status(
        &mut self,
        ids: &[WorkerId],
        status: WorkerStatus,
        at: DateTime<Utc>,
    ) -> Vec<WorkerRow> {
        self.model.apply_local_status(ids, status, at)
    }

    pub fn rollback_status(&mut self, previous: &[WorkerRow]) {
        self.model.rollback_status(previous);
    }

    pub fn bulk_action_succeeded(&mut self) {
        self.model.clear_selection();
    }

    /// Distinct values of a column among the loaded rows.
    pub fn local_filter_options(&self, field: WorkerField) -> Vec<String> {
        self.model
            .rows()
            .iter()
            .map(|row| row.field_value(field).trim().to_string())
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn view(&self) -> DirectoryView {
        let slice = self.slice();
        let all_visible_selected = self.model.all_selected(&slice.visible_rows);
        DirectoryView {
            mode: self.switch.mode(),
            page_size: self.pagination.page_size,
            sort: self.model.sort(),
            selected_count: self.model.selected_count(),
            all_visible_selected,
            has_previous: self.pagination.has_previous(),
            has_next: self.pagination.has_next(),
            loading: self.in_flight,
            error: self.error.clone(),
            slice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::directory::SortDirection;
    use crate::domain::test_support::synthetic_workers;

    fn config() -> DirectoryConfig {
        DirectoryConfig::default()
    }

    fn server_page_for(rows: &[WorkerRow], query: &PageQuery) -> FetchOutcome {
        let start = query.offset().min(rows.len());
        let end = (start + query.page_size).min(rows.len());
        FetchOutcome::Page(PageResult {
            rows: rows[start..end].to_vec(),
            total_count: rows.len(),
        })
    }

    fn page_query(ticket: &FetchTicket) -> &PageQuery {
        match &ticket.plan {
            FetchPlan::Page(query) => query,
            FetchPlan::FullSet => panic!("expected a page query"),
        }
    }

    fn fetch(action: DirectoryAction) -> FetchTicket {
        match action {
            DirectoryAction::Fetch(ticket) => ticket,
            other => panic!("expected fetch, got {other:?}"),
        }
    }

    #[test]
    fn six_hundred_workers_use_server_pages() {
        let rows = synthetic_workers(600, 600);
        let mut directory = WorkerDirectory::new(&config());
        let ticket = directory.begin_refresh(rows.len());
        assert_eq!(directory.mode(), Some(TableMode::Server));
        let outcome = server_page_for(&rows, page_query(&ticket));
        assert_eq!(directory.complete(&ticket, Ok(outcome)), ApplyOutcome::Applied);

        let ticket = fetch(directory.set_page(2));
        assert_eq!(page_query(&ticket).page, 2);
        assert_eq!(page_query(&ticket).page_size, 20);
        let outcome = server_page_for(&rows, page_query(&ticket));
        directory.complete(&ticket, Ok(outcome));

        let view = directory.view();
        assert_eq!(view.slice.page_count, 30);
        assert_eq!(view.slice.display_bounds(), (21, 40, 600));
        assert_eq!(view.slice.visible_rows.len(), 20);
        assert_eq!(view.slice.visible_rows[0].full_name, "Worker 21");
        assert_eq!(view.slice.visible_rows[19].full_name, "Worker 40");
    }

    #[test]
    fn fifty_workers_filter_in_memory() {
        let rows = synthetic_workers(50, 12);
        let mut directory = WorkerDirectory::new(&config());
        let ticket = directory.begin_refresh(rows.len());
        assert_eq!(ticket.plan, FetchPlan::FullSet);
        directory.complete(&ticket, Ok(FetchOutcome::FullSet(rows)));

        let action = directory.set_filter_values(WorkerField::Status, vec!["active".to_string()]);
        assert_eq!(action, DirectoryAction::Local);
        assert_eq!(directory.mode(), Some(TableMode::Client));
        assert_eq!(directory.filtered_rows().len(), 12);

        directory.set_page_size(10).expect("10 is allowed");
        let view = directory.view();
        assert_eq!(view.slice.page_count, 2);
        assert_eq!(view.slice.visible_rows.len(), 10);

        directory.set_page(2);
        assert_eq!(directory.view().slice.visible_rows.len(), 2);
    }

    #[test]
    fn previous_and_next_step_within_page_bounds() {
        let rows = synthetic_workers(50, 0);
        let mut directory = WorkerDirectory::new(&config());
        let ticket = directory.begin_refresh(rows.len());
        directory.complete(&ticket, Ok(FetchOutcome::FullSet(rows)));

        let view = directory.view();
        assert!(!view.has_previous);
        assert!(view.has_next);

        assert_eq!(directory.next_page(), DirectoryAction::Local);
        directory.next_page();
        directory.next_page();
        let view = directory.view();
        assert_eq!(view.slice.page, 3);
        assert!(view.has_previous);
        assert!(!view.has_next);

        directory.previous_page();
        assert_eq!(directory.pagination().page, 2);

        let rows = synthetic_workers(600, 0);
        let mut directory = WorkerDirectory::new(&config());
        let first = directory.begin_refresh(rows.len());
        directory.complete(&first, Ok(server_page_for(&rows, page_query(&first))));
        let ticket = fetch(directory.next_page());
        assert_eq!(page_query(&ticket).page, 2);
        directory.complete(&ticket, Ok(server_page_for(&rows, page_query(&ticket))));
        assert!(directory.view().has_previous);
        let ticket = fetch(directory.previous_page());
        assert_eq!(page_query(&ticket).page, 1);
    }

    #[test]
    fn superseded_fetch_is_discarded() {
        let rows = synthetic_workers(600, 0);
        let mut directory = WorkerDirectory::new(&config());
        let first = directory.begin_refresh(rows.len());
        directory.complete(&first, Ok(server_page_for(&rows, page_query(&first))));

        let slow = fetch(directory.set_page(2));
        let fast = fetch(directory.set_page(3));
        let fast_outcome = server_page_for(&rows, page_query(&fast));
        let slow_outcome = server_page_for(&rows, page_query(&slow));
        assert_eq!(directory.complete(&fast, Ok(fast_outcome)), ApplyOutcome::Applied);
        assert_eq!(directory.complete(&slow, Ok(slow_outcome)), ApplyOutcome::Stale);
        assert_eq!(directory.pagination().page, 3);
        assert_eq!(directory.visible_rows()[0].full_name, "Worker 41");

        let late_error = fetch(directory.set_page(4));
        let newest = fetch(directory.set_page(5));
        directory.complete(&newest, Ok(server_page_for(&rows, page_query(&newest))));
        let outcome = directory.complete(&late_error, Err(RepoError::Message("timeout".into())));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(directory.error().is_none());
    }

    #[test]
    fn failed_fetch_keeps_previous_page() {
        let rows = synthetic_workers(600, 0);
        let mut directory = WorkerDirectory::new(&config());
        let first = directory.begin_refresh(rows.len());
        directory.complete(&first, Ok(server_page_for(&rows, page_query(&first))));

        let ticket = fetch(directory.set_page(7));
        let outcome = directory.complete(&ticket, Err(RepoError::Message("connection reset".into())));
        assert_eq!(outcome, ApplyOutcome::Failed);
        let view = directory.view();
        assert_eq!(view.error.as_deref(), Some("connection reset"));
        assert_eq!(view.slice.page, 1);
        assert_eq!(view.slice.visible_rows[0].full_name, "Worker 1");

        let retry = directory.retry().expect("last plan is kept");
        assert_eq!(page_query(&retry).page, 7);
        assert!(directory.error().is_none());
        directory.complete(&retry, Ok(server_page_for(&rows, page_query(&retry))));
        assert_eq!(directory.pagination().page, 7);
    }

    #[test]
    fn selection_survives_page_size_change_not_data_replacement() {
        let rows = synthetic_workers(30, 30);
        let mut directory = WorkerDirectory::new(&config());
        let ticket = directory.begin_refresh(rows.len());
        directory.complete(&ticket, Ok(FetchOutcome::FullSet(rows.clone())));

        directory.toggle_all_selected(true);
        assert_eq!(directory.view().selected_count, 20);
        assert!(directory.view().all_visible_selected);

        directory.set_page_size(50).expect("50 is allowed");
        assert_eq!(directory.view().selected_count, 20);
        assert!(!directory.view().all_visible_selected);

        let ticket = directory.begin_refresh(rows.len());
        directory.complete(&ticket, Ok(FetchOutcome::FullSet(rows)));
        assert_eq!(directory.view().selected_count, 0);
    }

    #[test]
    fn mode_transition_resets_page_and_selection() {
        let rows = synthetic_workers(600, 0);
        let mut directory = WorkerDirectory::new(&config());
        let ticket = directory.begin_refresh(rows.len());
        directory.complete(&ticket, Ok(server_page_for(&rows, page_query(&ticket))));
        let ticket = fetch(directory.set_page(3));
        directory.complete(&ticket, Ok(server_page_for(&rows, page_query(&ticket))));
        let first_id = directory.visible_rows()[0].id.clone();
        directory.toggle_row_selected(&first_id);

        let small = synthetic_workers(40, 0);
        let ticket = directory.begin_refresh(small.len());
        assert_eq!(directory.mode(), Some(TableMode::Client));
        assert_eq!(directory.view().selected_count, 0);
        directory.complete(&ticket, Ok(FetchOutcome::FullSet(small)));
        assert_eq!(directory.pagination().page, 1);
    }

    #[test]
    fn server_mode_criteria_changes_fetch_page_one() {
        let rows = synthetic_workers(600, 0);
        let mut directory = WorkerDirectory::new(&config());
        let ticket = directory.begin_refresh(rows.len());
        directory.complete(&ticket, Ok(server_page_for(&rows, page_query(&ticket))));
        let ticket = fetch(directory.set_page(4));
        directory.complete(&ticket, Ok(server_page_for(&rows, page_query(&ticket))));

        let ticket = fetch(directory.set_search("worker 1"));
        assert_eq!(page_query(&ticket).page, 1);
        assert_eq!(page_query(&ticket).criteria.search, "worker 1");

        let ticket = fetch(directory.toggle_sort(WorkerField::FullName));
        assert_eq!(
            page_query(&ticket).sort.map(|sort| sort.direction),
            Some(SortDirection::Asc)
        );

        assert_eq!(directory.clear_criteria(), DirectoryAction::Recount);
    }

    #[test]
    fn strict_policy_moves_filtered_queries_to_server() {
        let config = DirectoryConfig {
            criteria_force_server: true,
            ..DirectoryConfig::default()
        };
        let rows = synthetic_workers(50, 12);
        let mut directory = WorkerDirectory::new(&config);
        let ticket = directory.begin_refresh(rows.len());
        directory.complete(&ticket, Ok(FetchOutcome::FullSet(rows.clone())));

        let action = directory.set_filter_values(WorkerField::Status, vec!["active".to_string()]);
        assert_eq!(action, DirectoryAction::Recount);
        let ticket = directory.begin_refresh(rows.len());
        assert_eq!(directory.mode(), Some(TableMode::Server));
        assert!(matches!(ticket.plan, FetchPlan::Page(_)));
    }

    #[test]
    fn rejects_unknown_page_size() {
        let mut directory = WorkerDirectory::new(&config());
        assert!(matches!(
            directory.set_page_size(33),
            Err(DirectoryError::UnsupportedPageSize(33, _))
        ));
    }
}
