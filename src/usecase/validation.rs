use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::entities::worker::{EngagementModel, WorkerRow, WorkerStatus, DATE_FORMAT};
use crate::usecase::ports::repo::{ExistingIdentities, NewWorker};

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "hr_id",
    "full_name",
    "engagement_model",
    "email_personal",
    "country_residence",
    "locale_primary",
    "hire_date",
    "status",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            value: value.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation error(s): {}", .0.len(), first_message(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn first_message(errors: &[FieldError]) -> String {
    errors
        .first()
        .map(|err| err.to_string())
        .unwrap_or_default()
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Raw text of a worker as typed into the create form or read from a CSV
/// row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerDraft {
    values: HashMap<String, String>,
}

impl WorkerDraft {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into().trim().to_string(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.values.insert(column.to_string(), value.into());
    }
}

/// Checks every rule and either returns the typed worker or all field errors
/// found for the draft.
pub fn validate_draft(
    draft: &WorkerDraft,
    existing: &ExistingIdentities,
) -> Result<NewWorker, ValidationErrors> {
    let mut errors = Vec::new();

    for column in REQUIRED_COLUMNS {
        if draft.get(column).is_none() {
            errors.push(FieldError::new(column, format!("{column} is required"), None));
        }
    }

    let email = draft.get("email_personal");
    if let Some(email) = email {
        if !is_valid_email(email) {
            errors.push(FieldError::new("email_personal", "Invalid email format", Some(email)));
        } else if existing.emails.contains(&email.to_lowercase()) {
            errors.push(FieldError::new("email_personal", "Email already exists", Some(email)));
        }
    }
    let email_pph = draft.get("email_pph");
    if let Some(email_pph) = email_pph {
        if !is_valid_email(email_pph) {
            errors.push(FieldError::new("email_pph", "Invalid email format", Some(email_pph)));
        }
    }

    let hr_id = draft.get("hr_id");
    if let Some(hr_id) = hr_id.filter(|hr_id| existing.hr_ids.contains(*hr_id)) {
        errors.push(FieldError::new(
            "hr_id",
            format!("HR ID already exists: {hr_id}"),
            Some(hr_id),
        ));
    }

    let engagement_model = draft.get("engagement_model").and_then(|value| {
        value
            .parse::<EngagementModel>()
            .map_err(|message| {
                errors.push(FieldError::new("engagement_model", message, Some(value)))
            })
            .ok()
    });

    let status = draft.get("status").and_then(|value| {
        value
            .parse::<WorkerStatus>()
            .map_err(|message| errors.push(FieldError::new("status", message, Some(value))))
            .ok()
    });

    let hire_date = parse_date_field(draft, "hire_date", &mut errors);
    let termination_date = parse_date_field(draft, "termination_date", &mut errors);
    let bgc_expiration = parse_date_field(draft, "bgc_expiration_date", &mut errors);

    let country = draft.get("country_residence");
    if let Some(country) = country.filter(|country| country.chars().count() != 2) {
        errors.push(FieldError::new(
            "country_residence",
            "Country must be 2-letter ISO code (e.g., US, CA, MX)",
            Some(country),
        ));
    }

    let rtw_raw = draft.get("rtw_datetime");
    let rtw_at = rtw_raw.and_then(|value| {
        let parsed = parse_datetime(value);
        if parsed.is_none() {
            errors.push(FieldError::new(
                "rtw_datetime",
                "Invalid datetime format. Use ISO format (e.g., 2024-06-15T09:00:00Z)",
                Some(value),
            ));
        }
        parsed
    });

    if let Some(status) = status {
        errors.extend(status_requirement_errors(
            status,
            rtw_raw.is_some(),
            draft.get("termination_date"),
        ));
    }

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    match (hr_id, draft.get("full_name"), engagement_model, email, country, draft.get("locale_primary"), hire_date, status) {
        (
            Some(hr_id),
            Some(full_name),
            Some(engagement_model),
            Some(email),
            Some(country),
            Some(locale),
            Some(hire_date),
            Some(status),
        ) => Ok(NewWorker {
            hr_id: hr_id.to_string(),
            full_name: full_name.to_string(),
            engagement_model,
            email: email.to_string(),
            email_pph: email_pph.map(str::to_string),
            country: country.to_uppercase(),
            locale: locale.to_string(),
            locale_all: draft
                .get("locale_all")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|locale| !locale.is_empty())
                        .map(str::to_string)
                        .collect::<Vec<_>>()
                })
                .filter(|locales| !locales.is_empty())
                .unwrap_or_else(|| vec![locale.to_string()]),
            role: draft.get("worker_role").map(str::to_string),
            hire_date,
            status,
            rtw_at,
            termination_date,
            bgc_expiration,
        }),
        _ => Err(ValidationErrors(vec![FieldError::new(
            "row",
            "incomplete worker record",
            None,
        )])),
    }
}

fn parse_date_field(
    draft: &WorkerDraft,
    column: &str,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    let value = draft.get(column)?;
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.push(FieldError::new(
            column,
            "Invalid date format. Use YYYY-MM-DD",
            Some(value),
        ));
    }
    parsed
}

/// Pending workers have neither a ready-to-work time nor a termination
/// date; active and inactive workers need the former and not the latter;
/// terminated workers need both.
pub fn status_requirement_errors(
    status: WorkerStatus,
    has_rtw: bool,
    termination_date: Option<&str>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match status {
        WorkerStatus::Pending => {
            if has_rtw {
                errors.push(FieldError::new(
                    "rtw_datetime",
                    "Pending workers must not have rtw_datetime set",
                    None,
                ));
            }
            if let Some(termination_date) = termination_date {
                errors.push(FieldError::new(
                    "termination_date",
                    "Pending workers must not have termination_date set",
                    Some(termination_date),
                ));
            }
        }
        WorkerStatus::Active | WorkerStatus::Inactive => {
            if !has_rtw {
                errors.push(FieldError::new(
                    "rtw_datetime",
                    format!("{status} workers must have rtw_datetime set"),
                    None,
                ));
            }
            if let Some(termination_date) = termination_date {
                errors.push(FieldError::new(
                    "termination_date",
                    format!("{status} workers must not have termination_date set"),
                    Some(termination_date),
                ));
            }
        }
        WorkerStatus::Terminated => {
            if !has_rtw {
                errors.push(FieldError::new(
                    "rtw_datetime",
                    "Terminated workers must have rtw_datetime set",
                    None,
                ));
            }
            if termination_date.is_none() {
                errors.push(FieldError::new(
                    "termination_date",
                    "Terminated workers must have termination_date set",
                    None,
                ));
            }
        }
    }
    errors
}

/// Rules that still apply after a patch has been merged into a stored row.
pub fn validate_row(row: &WorkerRow) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if row.full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "full_name is required", None));
    }
    if let Some(email) = row.email.as_deref() {
        if !is_valid_email(email) {
            errors.push(FieldError::new("email_personal", "Invalid email format", Some(email)));
        }
    }
    if row.country.chars().count() != 2 {
        errors.push(FieldError::new(
            "country_residence",
            "Country must be 2-letter ISO code (e.g., US, CA, MX)",
            Some(&row.country),
        ));
    }
    let termination = row
        .termination_date
        .map(|date| date.format(DATE_FORMAT).to_string());
    errors.extend(status_requirement_errors(
        row.status,
        row.rtw_at.is_some(),
        termination.as_deref(),
    ));
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
