use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::entities::worker::{WorkerId, WorkerRow, WorkerStatus};
use crate::usecase::directory::WorkerDirectory;
use crate::usecase::ports::repo::{RepoError, WorkerPatch, WorkerRepository};
use crate::usecase::validation::{validate_draft, validate_row, ValidationErrors, WorkerDraft};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct EditService {
    repo: Arc<dyn WorkerRepository>,
}

impl EditService {
    pub fn new(repo: Arc<dyn WorkerRepository>) -> Self {
        Self { repo }
    }

    pub fn create_worker(&self, draft: &WorkerDraft) -> Result<WorkerId, EditError> {
        let existing = self.repo.existing_identities()?;
        let worker = validate_draft(draft, &existing)?;
        let hr_id = worker.hr_id.clone();
        let id = self.repo.create_worker(worker)?;
        info!(%id, hr_id = %hr_id, "worker created");
        Ok(id)
    }

    /// Validates the merged row before anything is written.
    pub fn update_worker(&self, id: &WorkerId, patch: WorkerPatch) -> Result<WorkerRow, EditError> {
        let current = self.repo.fetch_worker_by_id(id)?;
        if patch.is_empty() {
            return Ok(current);
        }
        let next = patch.apply_to(&current);
        validate_row(&next)?;
        self.repo.update_worker(id, patch)?;
        info!(%id, "worker updated");
        Ok(next)
    }

    /// Sets the status of every selected worker. The change shows locally
    /// right away and is rolled back if the backend rejects it.
    pub fn bulk_update_status(
        &self,
        directory: &mut WorkerDirectory,
        status: WorkerStatus,
    ) -> Result<usize, EditError> {
        let ids = directory.selected_ids();
        if ids.is_empty() {
            return Ok(0);
        }
        let at = Utc::now();
        let previous = directory.apply_local_status(&ids, status, at);
        match self.repo.bulk_update_status(&ids, status, at) {
            Ok(updated) => {
                directory.bulk_action_succeeded();
                info!(updated, %status, "bulk status update applied");
                Ok(updated)
            }
            Err(err) => {
                directory.rollback_status(&previous);
                warn!(error = %err, selected = ids.len(), "bulk status update failed");
                Err(err.into())
            }
        }
    }
}
