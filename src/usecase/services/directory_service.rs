use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::directory::PageQuery;
use crate::domain::entities::worker::{WorkerField, WorkerRow};
use crate::usecase::directory::{
    ApplyOutcome, DirectoryAction, FetchOutcome, FetchPlan, FetchTicket, WorkerDirectory,
};
use crate::usecase::mode::TableMode;
use crate::usecase::ports::repo::{RepoError, WorkerRepository};

/// Runs directory fetches against the repository. The directory decides
/// what to fetch; this service performs the call and hands the result back.
#[derive(Clone)]
pub struct DirectoryService {
    repo: Arc<dyn WorkerRepository>,
}

impl DirectoryService {
    pub fn new(repo: Arc<dyn WorkerRepository>) -> Self {
        Self { repo }
    }

    pub fn estimate_total(&self) -> Result<usize, RepoError> {
        self.repo.count_workers(None)
    }

    pub fn execute(&self, ticket: &FetchTicket) -> Result<FetchOutcome, RepoError> {
        match &ticket.plan {
            FetchPlan::FullSet => self.repo.fetch_all_workers().map(FetchOutcome::FullSet),
            FetchPlan::Page(query) => self.repo.fetch_workers(query).map(FetchOutcome::Page),
        }
    }

    /// Re-estimates the row count, re-evaluates the mode and loads the
    /// matching data.
    pub fn refresh(&self, directory: &mut WorkerDirectory) -> ApplyOutcome {
        let estimate = match self.estimate_total() {
            Ok(estimate) => estimate,
            Err(err) => {
                warn!(error = %err, "failed to estimate worker count");
                directory.record_error(&err);
                return ApplyOutcome::Failed;
            }
        };
        let ticket = directory.begin_refresh(estimate);
        let result = self.execute(&ticket);
        let outcome = directory.complete(&ticket, result);
        if outcome == ApplyOutcome::Applied {
            info!(
                estimate,
                mode = ?directory.mode(),
                visible = directory.pagination().total_rows,
                "worker directory loaded"
            );
        }
        outcome
    }

    pub fn dispatch(&self, directory: &mut WorkerDirectory, action: DirectoryAction) -> ApplyOutcome {
        match action {
            DirectoryAction::Local => ApplyOutcome::Applied,
            DirectoryAction::Fetch(ticket) => {
                let result = self.execute(&ticket);
                directory.complete(&ticket, result)
            }
            DirectoryAction::Recount => self.refresh(directory),
        }
    }

    pub fn retry(&self, directory: &mut WorkerDirectory) -> ApplyOutcome {
        match directory.retry() {
            Some(ticket) => {
                let result = self.execute(&ticket);
                directory.complete(&ticket, result)
            }
            None => self.refresh(directory),
        }
    }

    /// Distinct values for a filter dropdown. Client mode reads the loaded
    /// rows; server mode asks the backend.
    pub fn filter_options(
        &self,
        directory: &WorkerDirectory,
        field: WorkerField,
    ) -> Result<Vec<String>, RepoError> {
        match directory.mode() {
            Some(TableMode::Server) => self.repo.filter_options(field),
            _ => Ok(directory.local_filter_options(field)),
        }
    }

    /// Every row matching the current criteria, in display order. Server
    /// mode runs one unpaged query instead of exporting a single page.
    pub fn matching_rows(&self, directory: &WorkerDirectory) -> Result<Vec<WorkerRow>, RepoError> {
        match directory.mode() {
            Some(TableMode::Server) => {
                let total = self.repo.count_workers(Some(directory.criteria()))?;
                let query = PageQuery {
                    page: 1,
                    page_size: total.max(1),
                    criteria: directory.criteria().clone(),
                    sort: directory.model().sort(),
                };
                Ok(self.repo.fetch_workers(&query)?.rows)
            }
            _ => Ok(directory.filtered_rows().into_iter().cloned().collect()),
        }
    }
}
