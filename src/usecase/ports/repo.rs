use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::entities::directory::{PageQuery, PageResult};
use crate::domain::entities::worker::{
    EngagementModel, WorkerField, WorkerId, WorkerRow, WorkerStatus,
};
use crate::domain::filter::DirectoryCriteria;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("worker not found: {0}")]
    NotFound(WorkerId),
    #[error("malformed worker row: {0}")]
    InvalidRow(String),
    #[error("{0}")]
    Message(String),
}

impl RepoError {
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        RepoError::Message(format!("{err:#}"))
    }
}

/// Row-level access to the worker table. Implemented by the SQLite store;
/// a hosted backend plugs in at the same seam.
pub trait WorkerRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    /// Number of rows matching `criteria`, or all rows when `None`.
    fn count_workers(&self, criteria: Option<&DirectoryCriteria>) -> Result<usize, RepoError>;
    fn fetch_workers(&self, query: &PageQuery) -> Result<PageResult, RepoError>;
    fn fetch_all_workers(&self) -> Result<Vec<WorkerRow>, RepoError>;
    fn fetch_worker_by_id(&self, id: &WorkerId) -> Result<WorkerRow, RepoError>;
    fn filter_options(&self, field: WorkerField) -> Result<Vec<String>, RepoError>;
    fn existing_identities(&self) -> Result<ExistingIdentities, RepoError>;

    fn create_worker(&self, worker: NewWorker) -> Result<WorkerId, RepoError>;
    fn update_worker(&self, id: &WorkerId, patch: WorkerPatch) -> Result<(), RepoError>;
    fn bulk_insert_workers(&self, workers: Vec<NewWorker>) -> Result<usize, RepoError>;
    /// Sets `status` and the dates it requires; `at` fills a missing
    /// ready-to-work time and dates terminations.
    fn bulk_update_status(
        &self,
        ids: &[WorkerId],
        status: WorkerStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, RepoError>;
}

/// Remote bulk account provisioning.
pub trait ProvisioningGateway: Send + Sync {
    fn provision_users(&self, emails: Vec<String>) -> Result<BulkProvisionReport, RepoError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorker {
    pub hr_id: String,
    pub full_name: String,
    pub engagement_model: EngagementModel,
    pub email: String,
    pub email_pph: Option<String>,
    pub country: String,
    pub locale: String,
    pub locale_all: Vec<String>,
    pub role: Option<String>,
    pub hire_date: NaiveDate,
    pub status: WorkerStatus,
    pub rtw_at: Option<DateTime<Utc>>,
    pub termination_date: Option<NaiveDate>,
    pub bgc_expiration: Option<NaiveDate>,
}

/// Partial update. `None` leaves a column untouched; `Some(None)` clears
/// a nullable column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerPatch {
    pub full_name: Option<String>,
    pub status: Option<WorkerStatus>,
    pub email: Option<Option<String>>,
    pub role: Option<Option<String>>,
    pub country: Option<String>,
    pub locale: Option<String>,
    pub rtw_at: Option<Option<DateTime<Utc>>>,
    pub termination_date: Option<Option<NaiveDate>>,
    pub bgc_expiration: Option<Option<NaiveDate>>,
}

impl WorkerPatch {
    pub fn is_empty(&self) -> bool {
        self == &WorkerPatch::default()
    }

    pub fn apply_to(&self, row: &WorkerRow) -> WorkerRow {
        let mut next = row.clone();
        if let Some(full_name) = &self.full_name {
            next.full_name = full_name.clone();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(email) = &self.email {
            next.email = email.clone();
        }
        if let Some(role) = &self.role {
            next.role = role.clone();
        }
        if let Some(country) = &self.country {
            next.country = country.clone();
        }
        if let Some(locale) = &self.locale {
            next.locale = locale.clone();
        }
        if let Some(rtw_at) = self.rtw_at {
            next.rtw_at = rtw_at;
        }
        if let Some(termination_date) = self.termination_date {
            next.termination_date = termination_date;
        }
        if let Some(bgc_expiration) = self.bgc_expiration {
            next.bgc_expiration = bgc_expiration;
        }
        next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingIdentities {
    pub hr_ids: HashSet<String>,
    pub emails: HashSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStatus {
    Created,
    Skipped,
    Error,
}

impl ProvisionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProvisionStatus::Created => "created",
            ProvisionStatus::Skipped => "skipped",
            ProvisionStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub email: String,
    pub status: ProvisionStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkProvisionReport {
    pub total: usize,
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
    pub results: Vec<ProvisionResult>,
}

impl BulkProvisionReport {
    pub fn push(&mut self, result: ProvisionResult) {
        self.total += 1;
        match result.status {
            ProvisionStatus::Created => self.created += 1,
            ProvisionStatus::Skipped => self.skipped += 1,
            ProvisionStatus::Error => self.errors += 1,
        }
        self.results.push(result);
    }

    pub fn summary(&self) -> String {
        format!(
            "{} created, {} skipped, {} errors",
            self.created, self.skipped, self.errors
        )
    }
}
