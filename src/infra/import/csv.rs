use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;

use crate::usecase::validation::{WorkerDraft, REQUIRED_COLUMNS};

fn normalized_headers(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .map(|header| header.trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect()
}

/// One draft per data row, keyed by the lower-cased header names.
pub fn read_worker_drafts<R: Read>(reader: R) -> Result<Vec<WorkerDraft>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = normalized_headers(reader.headers().context("failed to read csv headers")?);

    if headers.iter().all(|header| header.is_empty()) {
        anyhow::bail!("csv header is required")
    }
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|header| header == column))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("Missing required columns: {}", missing.join(", "))
    }

    let mut drafts = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        drafts.push(WorkerDraft::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(col_idx, header)| (header.as_str(), record.get(col_idx).unwrap_or(""))),
        ));
    }
    Ok(drafts)
}

pub fn read_worker_drafts_from_path(csv_path: &Path) -> Result<Vec<WorkerDraft>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    read_worker_drafts(file).with_context(|| format!("failed to import {}", csv_path.display()))
}

/// Values of the `email` column, blanks dropped.
pub fn read_email_list<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = normalized_headers(reader.headers().context("failed to read csv headers")?);
    let Some(email_idx) = headers.iter().position(|header| header == "email") else {
        anyhow::bail!("CSV must have an \"email\" column")
    };

    let mut emails = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let email = record.get(email_idx).unwrap_or("").trim();
        if !email.is_empty() {
            emails.push(email.to_string());
        }
    }
    Ok(emails)
}

pub fn read_email_list_from_path(csv_path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    read_email_list(file).with_context(|| format!("failed to read {}", csv_path.display()))
}
