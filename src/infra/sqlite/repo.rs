use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entities::directory::{PageQuery, PageResult};
use crate::domain::entities::worker::{WorkerField, WorkerId, WorkerRow, WorkerStatus};
use crate::domain::filter::DirectoryCriteria;
use crate::infra::sqlite::queries::{
    count_workers, distinct_values, find_worker, insert_worker, insert_workers, list_workers,
    load_identities, provision_users, query_page, update_status, update_worker,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{
    BulkProvisionReport, ExistingIdentities, NewWorker, ProvisioningGateway, RepoError,
    WorkerPatch, WorkerRepository,
};

pub struct SqliteRepo {
    pub db_path: PathBuf,
    /// Reference date for relative date filters; the local date when unset.
    pub today: Option<NaiveDate>,
}

impl SqliteRepo {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            today: None,
        }
    }

    fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    fn row_id(id: &WorkerId) -> Result<i64, RepoError> {
        id.0.parse::<i64>()
            .map_err(|_| RepoError::NotFound(id.clone()))
    }
}

impl WorkerRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(RepoError::from_anyhow)
    }

    fn count_workers(&self, criteria: Option<&DirectoryCriteria>) -> Result<usize, RepoError> {
        count_workers(&self.db_path, criteria, self.today()).map_err(RepoError::from_anyhow)
    }

    fn fetch_workers(&self, query: &PageQuery) -> Result<PageResult, RepoError> {
        let (rows, total_count) =
            query_page(&self.db_path, query, self.today()).map_err(RepoError::from_anyhow)?;
        Ok(PageResult { rows, total_count })
    }

    fn fetch_all_workers(&self) -> Result<Vec<WorkerRow>, RepoError> {
        list_workers(&self.db_path).map_err(RepoError::from_anyhow)
    }

    fn fetch_worker_by_id(&self, id: &WorkerId) -> Result<WorkerRow, RepoError> {
        find_worker(&self.db_path, Self::row_id(id)?)
            .map_err(RepoError::from_anyhow)?
            .ok_or_else(|| RepoError::NotFound(id.clone()))
    }

    fn filter_options(&self, field: WorkerField) -> Result<Vec<String>, RepoError> {
        distinct_values(&self.db_path, field).map_err(RepoError::from_anyhow)
    }

    fn existing_identities(&self) -> Result<ExistingIdentities, RepoError> {
        load_identities(&self.db_path).map_err(RepoError::from_anyhow)
    }

    fn create_worker(&self, worker: NewWorker) -> Result<WorkerId, RepoError> {
        let id = insert_worker(&self.db_path, &worker).map_err(RepoError::from_anyhow)?;
        Ok(WorkerId(id.to_string()))
    }

    fn update_worker(&self, id: &WorkerId, patch: WorkerPatch) -> Result<(), RepoError> {
        let current = self.fetch_worker_by_id(id)?;
        let next = patch.apply_to(&current);
        let updated = update_worker(&self.db_path, Self::row_id(id)?, &next)
            .map_err(RepoError::from_anyhow)?;
        if updated == 0 {
            return Err(RepoError::NotFound(id.clone()));
        }
        Ok(())
    }

    fn bulk_insert_workers(&self, workers: Vec<NewWorker>) -> Result<usize, RepoError> {
        insert_workers(&self.db_path, &workers).map_err(RepoError::from_anyhow)
    }

    fn bulk_update_status(
        &self,
        ids: &[WorkerId],
        status: WorkerStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, RepoError> {
        let row_ids = ids
            .iter()
            .map(Self::row_id)
            .collect::<Result<Vec<_>, _>>()?;
        update_status(&self.db_path, &row_ids, status, at).map_err(RepoError::from_anyhow)
    }
}

impl ProvisioningGateway for SqliteRepo {
    fn provision_users(&self, emails: Vec<String>) -> Result<BulkProvisionReport, RepoError> {
        provision_users(&self.db_path, &emails).map_err(RepoError::from_anyhow)
    }
}
