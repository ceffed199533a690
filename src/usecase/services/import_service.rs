use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::infra::import::csv::{read_email_list_from_path, read_worker_drafts_from_path};
use crate::usecase::ports::repo::{
    BulkProvisionReport, ExistingIdentities, NewWorker, ProvisioningGateway, WorkerRepository,
};
use crate::usecase::validation::{validate_draft, WorkerDraft};

pub const IMPORT_BATCH_SIZE: usize = 100;

/// Spreadsheet row number of the `index`-th data row (header is row 1).
pub fn row_number(index: usize) -> usize {
    index + 2
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPreview {
    /// Valid workers with their row numbers.
    pub valid: Vec<(usize, NewWorker)>,
    pub errors: Vec<RowError>,
}

impl ImportPreview {
    pub fn can_import(&self) -> bool {
        self.errors.is_empty() && !self.valid.is_empty()
    }

    pub fn invalid_row_count(&self) -> usize {
        let mut rows: Vec<usize> = self.errors.iter().map(|err| err.row).collect();
        rows.dedup();
        rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<BatchFailure>,
}

/// Validates every draft. Rows later in the file that repeat an HR id or
/// email seen earlier are reported as duplicates.
pub fn preview_drafts(drafts: &[WorkerDraft], existing: &ExistingIdentities) -> ImportPreview {
    let mut known = existing.clone();
    let mut preview = ImportPreview::default();

    for (index, draft) in drafts.iter().enumerate() {
        let row = row_number(index);
        match validate_draft(draft, &known) {
            Ok(worker) => preview.valid.push((row, worker)),
            Err(errors) => preview.errors.extend(errors.0.into_iter().map(|err| RowError {
                row,
                field: err.field,
                message: err.message,
                value: err.value,
            })),
        }
        if let Some(hr_id) = draft.get("hr_id") {
            known.hr_ids.insert(hr_id.to_string());
        }
        if let Some(email) = draft.get("email_personal") {
            known.emails.insert(email.to_lowercase());
        }
    }
    preview
}

pub struct ImportService {
    repo: Arc<dyn WorkerRepository>,
    gateway: Arc<dyn ProvisioningGateway>,
}

impl ImportService {
    pub fn new(repo: Arc<dyn WorkerRepository>, gateway: Arc<dyn ProvisioningGateway>) -> Self {
        Self { repo, gateway }
    }

    pub fn preview(&self, drafts: &[WorkerDraft]) -> Result<ImportPreview> {
        let existing = self.repo.existing_identities()?;
        let preview = preview_drafts(drafts, &existing);
        info!(
            rows = drafts.len(),
            valid = preview.valid.len(),
            errors = preview.errors.len(),
            "validated worker import"
        );
        Ok(preview)
    }

    pub fn preview_csv(&self, path: &Path) -> Result<ImportPreview> {
        let drafts = read_worker_drafts_from_path(path)?;
        self.preview(&drafts)
    }

    /// Inserts in batches; a failed batch is reported row by row and the
    /// remaining batches still run.
    pub fn import(&self, preview: &ImportPreview) -> Result<ImportReport> {
        if !preview.errors.is_empty() {
            anyhow::bail!(
                "Found {} validation error(s). Please fix these issues before importing.",
                preview.errors.len()
            )
        }

        let mut report = ImportReport::default();
        for batch in preview.valid.chunks(IMPORT_BATCH_SIZE) {
            let workers: Vec<NewWorker> = batch.iter().map(|(_, worker)| worker.clone()).collect();
            match self.repo.bulk_insert_workers(workers) {
                Ok(inserted) => report.successful += inserted,
                Err(err) => {
                    warn!(error = %err, rows = batch.len(), "worker import batch failed");
                    report.failed += batch.len();
                    report.errors.extend(batch.iter().map(|(row, _)| BatchFailure {
                        row: *row,
                        error: err.to_string(),
                    }));
                }
            }
        }
        info!(
            successful = report.successful,
            failed = report.failed,
            "worker import finished"
        );
        Ok(report)
    }

    pub fn provision(&self, emails: Vec<String>) -> Result<BulkProvisionReport> {
        if emails.is_empty() {
            anyhow::bail!("No emails found in CSV")
        }
        let report = self.gateway.provision_users(emails)?;
        info!(
            total = report.total,
            created = report.created,
            skipped = report.skipped,
            errors = report.errors,
            "bulk provisioning finished"
        );
        Ok(report)
    }

    pub fn provision_csv(&self, path: &Path) -> Result<BulkProvisionReport> {
        let emails = read_email_list_from_path(path)?;
        self.provision(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(hr_id: &str, email: &str) -> WorkerDraft {
        WorkerDraft::from_pairs([
            ("hr_id", hr_id),
            ("full_name", "Sam Park"),
            ("engagement_model", "upwork"),
            ("email_personal", email),
            ("country_residence", "CA"),
            ("locale_primary", "en-CA"),
            ("hire_date", "2024-05-01"),
            ("status", "pending"),
        ])
    }

    #[test]
    fn errors_carry_spreadsheet_row_numbers() {
        let mut bad = draft("HR2", "not-an-email");
        bad.set("hire_date", "05/01/2024");
        let drafts = vec![draft("HR1", "a@example.com"), bad];
        let preview = preview_drafts(&drafts, &ExistingIdentities::default());

        assert_eq!(preview.valid.len(), 1);
        assert_eq!(preview.valid[0].0, 2);
        assert_eq!(preview.errors.len(), 2);
        assert!(preview.errors.iter().all(|err| err.row == 3));
        assert_eq!(preview.invalid_row_count(), 1);
        assert!(!preview.can_import());
    }

    #[test]
    fn duplicates_within_the_file_are_rejected() {
        let drafts = vec![
            draft("HR1", "a@example.com"),
            draft("HR1", "b@example.com"),
            draft("HR3", "A@Example.com"),
        ];
        let preview = preview_drafts(&drafts, &ExistingIdentities::default());
        assert_eq!(preview.valid.len(), 1);
        let messages: Vec<_> = preview
            .errors
            .iter()
            .map(|err| (err.row, err.message.as_str()))
            .collect();
        assert_eq!(
            messages,
            vec![(3, "HR ID already exists: HR1"), (4, "Email already exists")]
        );
    }
}
