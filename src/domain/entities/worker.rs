use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub String);

impl From<&str> for WorkerId {
    fn from(value: &str) -> Self {
        WorkerId(value.to_string())
    }
}

impl From<String> for WorkerId {
    fn from(value: String) -> Self {
        WorkerId(value)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkerStatus {
    Pending,
    Active,
    Inactive,
    Terminated,
}

impl WorkerStatus {
    pub const ALL: [WorkerStatus; 4] = [
        WorkerStatus::Pending,
        WorkerStatus::Active,
        WorkerStatus::Inactive,
        WorkerStatus::Terminated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkerStatus::Pending => "pending",
            WorkerStatus::Active => "active",
            WorkerStatus::Inactive => "inactive",
            WorkerStatus::Terminated => "terminated",
        }
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        WorkerStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim())
            .ok_or_else(|| {
                format!(
                    "Invalid status. Must be one of: {}",
                    join_names(WorkerStatus::ALL.iter().map(|s| s.as_str()))
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EngagementModel {
    Core,
    Upwork,
    External,
    Internal,
}

impl EngagementModel {
    pub const ALL: [EngagementModel; 4] = [
        EngagementModel::Core,
        EngagementModel::Upwork,
        EngagementModel::External,
        EngagementModel::Internal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EngagementModel::Core => "core",
            EngagementModel::Upwork => "upwork",
            EngagementModel::External => "external",
            EngagementModel::Internal => "internal",
        }
    }
}

impl fmt::Display for EngagementModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngagementModel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EngagementModel::ALL
            .into_iter()
            .find(|model| model.as_str() == value.trim())
            .ok_or_else(|| {
                format!(
                    "Invalid engagement model. Must be one of: {}",
                    join_names(EngagementModel::ALL.iter().map(|m| m.as_str()))
                )
            })
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Outcome of the project access check attached to a worker row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessGate {
    pub allowed: bool,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRow {
    pub id: WorkerId,
    pub hr_id: String,
    pub full_name: String,
    pub status: WorkerStatus,
    pub engagement_model: EngagementModel,
    pub email: Option<String>,
    pub email_pph: Option<String>,
    pub country: String,
    pub locale: String,
    pub role: Option<String>,
    pub hire_date: NaiveDate,
    pub rtw_at: Option<DateTime<Utc>>,
    pub termination_date: Option<NaiveDate>,
    pub bgc_expiration: Option<NaiveDate>,
    pub access: Option<AccessGate>,
}

/// Columns of the worker directory. Used as filter keys and sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkerField {
    HrId,
    FullName,
    Email,
    Status,
    EngagementModel,
    Country,
    Locale,
    Role,
    HireDate,
    BgcExpiration,
}

impl WorkerField {
    pub const ALL: [WorkerField; 10] = [
        WorkerField::HrId,
        WorkerField::FullName,
        WorkerField::Email,
        WorkerField::Status,
        WorkerField::EngagementModel,
        WorkerField::Country,
        WorkerField::Locale,
        WorkerField::Role,
        WorkerField::HireDate,
        WorkerField::BgcExpiration,
    ];

    /// Key used in filter sets, URLs and the `workers` table.
    pub fn key(self) -> &'static str {
        match self {
            WorkerField::HrId => "hr_id",
            WorkerField::FullName => "full_name",
            WorkerField::Email => "email_personal",
            WorkerField::Status => "status",
            WorkerField::EngagementModel => "engagement_model",
            WorkerField::Country => "country_residence",
            WorkerField::Locale => "locale_primary",
            WorkerField::Role => "worker_role",
            WorkerField::HireDate => "hire_date",
            WorkerField::BgcExpiration => "bgc_expiration_date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkerField::HrId => "HR ID",
            WorkerField::FullName => "Full Name",
            WorkerField::Email => "Email",
            WorkerField::Status => "Status",
            WorkerField::EngagementModel => "Engagement Model",
            WorkerField::Country => "Country",
            WorkerField::Locale => "Primary Locale",
            WorkerField::Role => "Role",
            WorkerField::HireDate => "Hire Date",
            WorkerField::BgcExpiration => "BGC Expiration",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, WorkerField::HireDate | WorkerField::BgcExpiration)
    }
}

impl FromStr for WorkerField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        WorkerField::ALL
            .into_iter()
            .find(|field| field.key() == value)
            .ok_or_else(|| format!("unknown worker field: {value}"))
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

impl WorkerRow {
    /// Display value of a column; missing values render as an empty string.
    pub fn field_value(&self, field: WorkerField) -> String {
        match field {
            WorkerField::HrId => self.hr_id.clone(),
            WorkerField::FullName => self.full_name.clone(),
            WorkerField::Email => self.email.clone().unwrap_or_default(),
            WorkerField::Status => self.status.as_str().to_string(),
            WorkerField::EngagementModel => self.engagement_model.as_str().to_string(),
            WorkerField::Country => self.country.clone(),
            WorkerField::Locale => self.locale.clone(),
            WorkerField::Role => self.role.clone().unwrap_or_default(),
            WorkerField::HireDate => self.hire_date.format(DATE_FORMAT).to_string(),
            WorkerField::BgcExpiration => self
                .bgc_expiration
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    /// Moves the row to `status` and fills or clears the dates that status
    /// requires. `at` becomes the ready-to-work time when none is set and,
    /// for terminations, the termination date.
    pub fn set_status(&mut self, status: WorkerStatus, at: DateTime<Utc>) {
        match status {
            WorkerStatus::Pending => {
                self.rtw_at = None;
                self.termination_date = None;
            }
            WorkerStatus::Active | WorkerStatus::Inactive => {
                self.rtw_at.get_or_insert(at);
                self.termination_date = None;
            }
            WorkerStatus::Terminated => {
                self.rtw_at.get_or_insert(at);
                self.termination_date = Some(at.date_naive());
            }
        }
        self.status = status;
    }

    pub fn date_value(&self, field: WorkerField) -> Option<NaiveDate> {
        match field {
            WorkerField::HireDate => Some(self.hire_date),
            WorkerField::BgcExpiration => self.bgc_expiration,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BgcStatus {
    NotSet,
    Expired { days_ago: i64 },
    Expiring { days_left: i64 },
    Valid { days_left: i64 },
}

impl BgcStatus {
    pub fn classify(expiration: Option<NaiveDate>, today: NaiveDate, warning_days: i64) -> Self {
        let Some(expiration) = expiration else {
            return BgcStatus::NotSet;
        };
        let days_left = (expiration - today).num_days();
        if days_left < 0 {
            BgcStatus::Expired {
                days_ago: days_left.abs(),
            }
        } else if days_left < warning_days {
            BgcStatus::Expiring { days_left }
        } else {
            BgcStatus::Valid { days_left }
        }
    }

    pub fn text(self) -> String {
        match self {
            BgcStatus::NotSet => "Not set".to_string(),
            BgcStatus::Expired { days_ago } => format!("Expired {days_ago} days ago"),
            BgcStatus::Expiring { days_left } => format!("Expiring in {days_left} days"),
            BgcStatus::Valid { days_left } => format!("Valid ({days_left} days remaining)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, DATE_FORMAT).expect("valid date")
    }

    #[test]
    fn status_parses_known_values_and_rejects_others() {
        assert_eq!("active".parse::<WorkerStatus>(), Ok(WorkerStatus::Active));
        assert_eq!(" terminated ".parse::<WorkerStatus>(), Ok(WorkerStatus::Terminated));
        let err = "retired".parse::<WorkerStatus>().unwrap_err();
        assert!(err.contains("pending, active, inactive, terminated"));
    }

    #[test]
    fn field_keys_round_trip() {
        for field in WorkerField::ALL {
            assert_eq!(field.key().parse::<WorkerField>(), Ok(field));
        }
    }

    #[test]
    fn bgc_status_buckets() {
        let today = date("2025-01-01");
        assert_eq!(BgcStatus::classify(None, today, 30), BgcStatus::NotSet);
        assert_eq!(
            BgcStatus::classify(Some(date("2024-12-22")), today, 30),
            BgcStatus::Expired { days_ago: 10 }
        );
        assert_eq!(
            BgcStatus::classify(Some(date("2025-01-16")), today, 30),
            BgcStatus::Expiring { days_left: 15 }
        );
        assert_eq!(
            BgcStatus::classify(Some(date("2025-01-31")), today, 30),
            BgcStatus::Valid { days_left: 30 }
        );
        assert_eq!(
            BgcStatus::classify(Some(date("2025-01-31")), today, 30).text(),
            "Valid (30 days remaining)"
        );
    }

    #[test]
    fn status_change_fills_and_clears_required_dates() {
        let at = DateTime::parse_from_rfc3339("2025-03-04T10:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        let mut row = crate::domain::test_support::worker("1", "Ana Lima", WorkerStatus::Pending);

        row.set_status(WorkerStatus::Terminated, at);
        assert_eq!(row.rtw_at, Some(at));
        assert_eq!(row.termination_date, Some(date("2025-03-04")));

        let later = at + chrono::Duration::days(1);
        row.set_status(WorkerStatus::Active, later);
        assert_eq!(row.rtw_at, Some(at), "existing ready-to-work time is kept");
        assert_eq!(row.termination_date, None);

        row.set_status(WorkerStatus::Pending, later);
        assert_eq!((row.rtw_at, row.termination_date), (None, None));
        assert_eq!(row.status, WorkerStatus::Pending);
    }
}
