use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::domain::entities::worker::{WorkerRow, DATE_FORMAT};
use crate::usecase::services::import_service::RowError;

pub const EXPORT_HEADERS: [&str; 13] = [
    "HR ID",
    "Full Name",
    "Email",
    "PPH Email",
    "Status",
    "Engagement Model",
    "Role",
    "Hire Date",
    "RTW Date",
    "BGC Expiration",
    "Termination Date",
    "Country",
    "Primary Locale",
];

pub fn export_file_name(today: NaiveDate) -> String {
    format!("workers-{}.csv", today.format(DATE_FORMAT))
}

fn export_record(row: &WorkerRow) -> [String; 13] {
    let date = |value: Option<NaiveDate>| {
        value
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    };
    [
        row.hr_id.clone(),
        row.full_name.clone(),
        row.email.clone().unwrap_or_default(),
        row.email_pph.clone().unwrap_or_default(),
        row.status.as_str().to_string(),
        row.engagement_model.as_str().to_string(),
        row.role.clone().unwrap_or_default(),
        row.hire_date.format(DATE_FORMAT).to_string(),
        row.rtw_at.map(|value| value.to_rfc3339()).unwrap_or_default(),
        date(row.bgc_expiration),
        date(row.termination_date),
        row.country.clone(),
        row.locale.clone(),
    ]
}

pub fn write_workers_csv<'a, W: Write>(
    writer: W,
    rows: impl IntoIterator<Item = &'a WorkerRow>,
) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(EXPORT_HEADERS)
        .context("failed to write csv header")?;
    let mut count = 0;
    for row in rows {
        writer
            .write_record(export_record(row))
            .with_context(|| format!("failed to write worker {}", row.hr_id))?;
        count += 1;
    }
    writer.flush().context("failed to flush csv")?;
    Ok(count)
}

pub fn export_workers_to_path<'a>(
    csv_path: &Path,
    rows: impl IntoIterator<Item = &'a WorkerRow>,
) -> Result<usize> {
    let file = std::fs::File::create(csv_path)
        .with_context(|| format!("failed to create csv: {}", csv_path.display()))?;
    write_workers_csv(file, rows)
}

/// Validation errors of a rejected import, one line per field error.
pub fn write_row_errors_csv<W: Write>(writer: W, errors: &[RowError]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(["Row", "Field", "Error", "Value"])
        .context("failed to write error report header")?;
    for error in errors {
        writer
            .write_record([
                error.row.to_string(),
                error.field.clone(),
                error.message.clone(),
                error.value.clone().unwrap_or_default(),
            ])
            .with_context(|| format!("failed to write error for row {}", error.row))?;
    }
    writer.flush().context("failed to flush error report")?;
    Ok(())
}

pub fn export_row_errors_to_path(csv_path: &Path, errors: &[RowError]) -> Result<()> {
    let file = std::fs::File::create(csv_path)
        .with_context(|| format!("failed to create csv: {}", csv_path.display()))?;
    write_row_errors_csv(file, errors)
}
