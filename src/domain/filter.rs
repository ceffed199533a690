use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::entities::worker::{WorkerField, WorkerRow, WorkerStatus};

/// Allowed values per column. A column that is missing, or mapped to an
/// empty set, does not restrict anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    allowed: BTreeMap<WorkerField, BTreeSet<String>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, S>(mut self, field: WorkerField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(field, values);
        self
    }

    pub fn set<I, S>(&mut self, field: WorkerField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values
            .into_iter()
            .map(|value| value.into().trim().to_string())
            .collect();
        if values.is_empty() {
            self.allowed.remove(&field);
        } else {
            self.allowed.insert(field, values);
        }
    }

    /// Adds the value if absent, removes it if present.
    pub fn toggle_value(&mut self, field: WorkerField, value: &str) {
        let value = value.trim().to_string();
        let entry = self.allowed.entry(field).or_default();
        if !entry.remove(&value) {
            entry.insert(value);
        }
        if entry.is_empty() {
            self.allowed.remove(&field);
        }
    }

    pub fn allowed(&self, field: WorkerField) -> Option<&BTreeSet<String>> {
        self.allowed.get(&field).filter(|values| !values.is_empty())
    }

    /// Columns with at least one allowed value.
    pub fn active(&self) -> impl Iterator<Item = (WorkerField, &BTreeSet<String>)> {
        self.allowed
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(field, values)| (*field, values))
    }

    pub fn is_open(&self) -> bool {
        self.active().next().is_none()
    }

    /// True when every constraint in `self` is also present, at least as
    /// strictly, in `other`.
    pub fn is_subset_of(&self, other: &FilterSet) -> bool {
        self.active().all(|(field, values)| {
            other
                .allowed(field)
                .is_some_and(|narrower| narrower.is_subset(values))
        })
    }
}

pub fn matches(row: &WorkerRow, filters: &FilterSet) -> bool {
    filters.active().all(|(field, values)| {
        let value = row.field_value(field);
        values.contains(value.trim())
    })
}

pub fn filter_rows<'a>(rows: &'a [WorkerRow], filters: &FilterSet) -> Vec<&'a WorkerRow> {
    rows.iter().filter(|row| matches(row, filters)).collect()
}

/// Case-insensitive substring search over name, email and HR id.
pub fn matches_search(row: &WorkerRow, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    row.full_name.to_lowercase().contains(&term)
        || row
            .email
            .as_deref()
            .is_some_and(|email| email.to_lowercase().contains(&term))
        || row.hr_id.to_lowercase().contains(&term)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOperator {
    In(BTreeSet<String>),
    NotIn(BTreeSet<String>),
    Between { start: NaiveDate, end: NaiveDate },
    Before(NaiveDate),
    After(NaiveDate),
    On(NaiveDate),
    WithinNextDays(i64),
    WithinLastDays(i64),
    IsEmpty,
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedFilter {
    pub field: WorkerField,
    pub operator: FilterOperator,
}

impl AdvancedFilter {
    pub fn new(field: WorkerField, operator: FilterOperator) -> Self {
        Self { field, operator }
    }

    /// Date operators never match a row whose date is missing.
    pub fn matches(&self, row: &WorkerRow, today: NaiveDate) -> bool {
        let value = row.field_value(self.field);
        let date = row.date_value(self.field);
        match &self.operator {
            FilterOperator::In(values) => values.contains(value.trim()),
            FilterOperator::NotIn(values) => !values.contains(value.trim()),
            FilterOperator::Between { start, end } => {
                date.is_some_and(|date| date >= *start && date <= *end)
            }
            FilterOperator::Before(bound) => date.is_some_and(|date| date < *bound),
            FilterOperator::After(bound) => date.is_some_and(|date| date > *bound),
            FilterOperator::On(day) => date.is_some_and(|date| date == *day),
            FilterOperator::WithinNextDays(days) => date.is_some_and(|date| {
                let diff = (date - today).num_days();
                diff >= 0 && diff <= *days
            }),
            FilterOperator::WithinLastDays(days) => date.is_some_and(|date| {
                let diff = (today - date).num_days();
                diff >= 0 && diff <= *days
            }),
            FilterOperator::IsEmpty => value.trim().is_empty(),
            FilterOperator::IsNotEmpty => !value.trim().is_empty(),
        }
    }
}

/// Everything that narrows the directory: search box, column filters and
/// operator filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryCriteria {
    pub search: String,
    pub filters: FilterSet,
    pub advanced: Vec<AdvancedFilter>,
}

impl DirectoryCriteria {
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || !self.filters.is_open() || !self.advanced.is_empty()
    }

    pub fn matches(&self, row: &WorkerRow, today: NaiveDate) -> bool {
        matches_search(row, &self.search)
            && matches(row, &self.filters)
            && self.advanced.iter().all(|filter| filter.matches(row, today))
    }

    pub fn apply<'a>(&self, rows: &'a [WorkerRow], today: NaiveDate) -> Vec<&'a WorkerRow> {
        rows.iter().filter(|row| self.matches(row, today)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPreset {
    pub name: String,
    pub filters: Vec<AdvancedFilter>,
}

pub fn default_presets(bgc_warning_days: i64) -> Vec<FilterPreset> {
    let active = || {
        AdvancedFilter::new(
            WorkerField::Status,
            FilterOperator::In(BTreeSet::from([WorkerStatus::Active.as_str().to_string()])),
        )
    };
    vec![
        FilterPreset {
            name: "Active Workers".to_string(),
            filters: vec![active()],
        },
        FilterPreset {
            name: "BGC Expiring Soon".to_string(),
            filters: vec![
                AdvancedFilter::new(
                    WorkerField::BgcExpiration,
                    FilterOperator::WithinNextDays(bgc_warning_days),
                ),
                active(),
            ],
        },
        FilterPreset {
            name: "Recently Hired".to_string(),
            filters: vec![AdvancedFilter::new(
                WorkerField::HireDate,
                FilterOperator::WithinLastDays(90),
            )],
        },
        FilterPreset {
            name: "No Email".to_string(),
            filters: vec![AdvancedFilter::new(WorkerField::Email, FilterOperator::IsEmpty)],
        },
    ]
}
