use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::{debug, warn};

use crate::domain::entities::directory::{PageQuery, SortDirection, SortState};
use crate::domain::entities::worker::{
    AccessGate, EngagementModel, WorkerField, WorkerId, WorkerRow, WorkerStatus, DATE_FORMAT,
};
use crate::domain::filter::{AdvancedFilter, DirectoryCriteria, FilterOperator};
use crate::infra::sqlite::schema::{open_connection, UNICODE_LOWER};
use crate::usecase::ports::repo::{
    BulkProvisionReport, ExistingIdentities, NewWorker, ProvisionResult, ProvisionStatus,
    RepoError,
};
use crate::usecase::validation::is_valid_email;

const WORKER_COLUMNS: &str = "id, hr_id, full_name, status, engagement_model, email_personal, \
     email_pph, country_residence, locale_primary, worker_role, hire_date, rtw_datetime, \
     termination_date, bgc_expiration_date, access_allowed, access_reasons";

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(RepoError::InvalidRow(message)))
}

fn optional_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    let value: Option<String> = row.get(idx)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    optional_text(row, idx)?
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map_err(|err| conversion_error(idx, format!("invalid date {raw:?}: {err}")))
        })
        .transpose()
}

fn parse_access_reasons(worker_id: i64, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(reasons) => reasons,
        Err(err) => {
            warn!(worker_id, error = %err, "malformed access reasons, treating as empty");
            Vec::new()
        }
    }
}

/// Maps a `workers` row. Unknown enum values and unparsable dates are
/// rejected rather than defaulted.
fn map_worker_row(row: &Row<'_>) -> rusqlite::Result<WorkerRow> {
    let id: i64 = row.get(0)?;
    let status_raw: String = row.get(3)?;
    let status = status_raw
        .parse::<WorkerStatus>()
        .map_err(|err: String| conversion_error(3, err))?;
    let engagement_raw: String = row.get(4)?;
    let engagement_model = engagement_raw
        .parse::<EngagementModel>()
        .map_err(|err: String| conversion_error(4, err))?;
    let hire_date = date_column(row, 10)?
        .ok_or_else(|| conversion_error(10, "hire_date is empty".to_string()))?;
    let rtw_at = optional_text(row, 11)?
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|value| value.with_timezone(&Utc))
                .map_err(|err| conversion_error(11, format!("invalid rtw_datetime {raw:?}: {err}")))
        })
        .transpose()?;
    let access_allowed: Option<i64> = row.get(14)?;
    let access_reasons: Option<String> = row.get(15)?;

    Ok(WorkerRow {
        id: WorkerId(id.to_string()),
        hr_id: row.get(1)?,
        full_name: row.get(2)?,
        status,
        engagement_model,
        email: optional_text(row, 5)?,
        email_pph: optional_text(row, 6)?,
        country: row.get(7)?,
        locale: row.get(8)?,
        role: optional_text(row, 9)?,
        hire_date,
        rtw_at,
        termination_date: date_column(row, 12)?,
        bgc_expiration: date_column(row, 13)?,
        access: access_allowed.map(|allowed| AccessGate {
            allowed: allowed != 0,
            reasons: parse_access_reasons(id, access_reasons.as_deref()),
        }),
    })
}

fn date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|date| date.format(DATE_FORMAT).to_string())
}

fn column_expr(field: WorkerField) -> String {
    format!("TRIM(COALESCE({}, ''))", field.key())
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn placeholders(count: usize) -> String {
    std::iter::repeat_n("?", count).collect::<Vec<_>>().join(",")
}

fn push_in_clause<'a>(
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
    field: WorkerField,
    values: impl ExactSizeIterator<Item = &'a String>,
    negate: bool,
) {
    let count = values.len();
    if count == 0 {
        if !negate {
            clauses.push("0".to_string());
        }
        return;
    }
    let not = if negate { "NOT " } else { "" };
    clauses.push(format!("{} {not}IN ({})", column_expr(field), placeholders(count)));
    params.extend(values.map(|value| Value::Text(value.clone())));
}

fn push_date_range(
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
    field: WorkerField,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    strict: bool,
) {
    let column = field.key();
    let mut parts = vec![format!("{column} IS NOT NULL"), format!("{column} <> ''")];
    let (lower, upper) = if strict { (">", "<") } else { (">=", "<=") };
    if let Some(start) = date_text(start) {
        parts.push(format!("{column} {lower} ?"));
        params.push(Value::Text(start));
    }
    if let Some(end) = date_text(end) {
        parts.push(format!("{column} {upper} ?"));
        params.push(Value::Text(end));
    }
    clauses.push(format!("({})", parts.join(" AND ")));
}

fn push_advanced_clause(
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
    filter: &AdvancedFilter,
    today: NaiveDate,
) {
    let field = filter.field;
    let shift = |days: i64| today.checked_add_signed(Duration::days(days));
    match &filter.operator {
        FilterOperator::In(values) => push_in_clause(clauses, params, field, values.iter(), false),
        FilterOperator::NotIn(values) => push_in_clause(clauses, params, field, values.iter(), true),
        FilterOperator::IsEmpty => clauses.push(format!("{} = ''", column_expr(field))),
        FilterOperator::IsNotEmpty => clauses.push(format!("{} <> ''", column_expr(field))),
        _ if !field.is_date() => clauses.push("0".to_string()),
        FilterOperator::Between { start, end } => {
            push_date_range(clauses, params, field, Some(*start), Some(*end), false)
        }
        FilterOperator::Before(bound) => {
            push_date_range(clauses, params, field, None, Some(*bound), true)
        }
        FilterOperator::After(bound) => {
            push_date_range(clauses, params, field, Some(*bound), None, true)
        }
        FilterOperator::On(day) => {
            push_date_range(clauses, params, field, Some(*day), Some(*day), false)
        }
        FilterOperator::WithinNextDays(days) => match shift(*days) {
            Some(end) => push_date_range(clauses, params, field, Some(today), Some(end), false),
            None => clauses.push("0".to_string()),
        },
        FilterOperator::WithinLastDays(days) => match shift(-*days) {
            Some(start) => push_date_range(clauses, params, field, Some(start), Some(today), false),
            None => clauses.push("0".to_string()),
        },
    }
}

/// WHERE clause for the directory criteria. Mirrors `DirectoryCriteria::matches`.
pub fn criteria_clause(criteria: &DirectoryCriteria, today: NaiveDate) -> (String, Vec<Value>) {
    let mut clauses = vec!["1 = 1".to_string()];
    let mut params = Vec::<Value>::new();

    let search = criteria.search.trim().to_lowercase();
    if !search.is_empty() {
        clauses.push(
            format!(
                "({UNICODE_LOWER}(full_name) LIKE ? ESCAPE '\\'
                  OR {UNICODE_LOWER}(COALESCE(email_personal, '')) LIKE ? ESCAPE '\\'
                  OR {UNICODE_LOWER}(hr_id) LIKE ? ESCAPE '\\')"
            ),
        );
        let pattern = format!("%{}%", escape_like(&search));
        params.extend(std::iter::repeat_n(Value::Text(pattern), 3));
    }

    for (field, values) in criteria.filters.active() {
        push_in_clause(&mut clauses, &mut params, field, values.iter(), false);
    }

    for filter in &criteria.advanced {
        push_advanced_clause(&mut clauses, &mut params, filter, today);
    }

    (clauses.join(" AND "), params)
}

/// Missing values sort last ascending and first descending; ties keep
/// insertion order.
pub fn order_clause(sort: Option<SortState>) -> String {
    let Some(sort) = sort else {
        return "id ASC".to_string();
    };
    let expr = column_expr(sort.column);
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    format!("({expr} = '') {direction}, {UNICODE_LOWER}({expr}) {direction}, id ASC")
}

pub fn count_workers(
    db_path: &Path,
    criteria: Option<&DirectoryCriteria>,
    today: NaiveDate,
) -> Result<usize> {
    let conn = open_connection(db_path)?;
    let (where_sql, params) = match criteria {
        Some(criteria) => criteria_clause(criteria, today),
        None => ("1 = 1".to_string(), Vec::new()),
    };
    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM workers WHERE {where_sql}"),
            params_from_iter(params),
            |row| row.get(0),
        )
        .context("failed to query worker count")?;
    Ok(total.max(0) as usize)
}

pub fn query_page(db_path: &Path, query: &PageQuery, today: NaiveDate) -> Result<(Vec<WorkerRow>, usize)> {
    if query.page_size == 0 {
        anyhow::bail!("page_size must be greater than zero")
    }

    let conn = open_connection(db_path)?;
    let (where_sql, filter_params) = criteria_clause(&query.criteria, today);

    let total_rows: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM workers WHERE {where_sql}"),
            params_from_iter(filter_params.iter().cloned()),
            |row| row.get(0),
        )
        .context("failed to query filtered row count")?;

    let row_sql = format!(
        "SELECT {WORKER_COLUMNS}
         FROM workers
         WHERE {where_sql}
         ORDER BY {}
         LIMIT ? OFFSET ?",
        order_clause(query.sort)
    );
    let mut row_params = filter_params;
    row_params.push(Value::Integer(query.page_size as i64));
    row_params.push(Value::Integer(query.offset() as i64));

    let mut stmt = conn
        .prepare(&row_sql)
        .context("failed to prepare worker page query")?;
    let rows = stmt
        .query_map(params_from_iter(row_params), map_worker_row)
        .context("failed to query worker page")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read worker page")?;

    debug!(
        page = query.page,
        page_size = query.page_size,
        total_rows,
        returned = rows.len(),
        "loaded worker page"
    );
    Ok((rows, total_rows.max(0) as usize))
}

pub fn list_workers(db_path: &Path) -> Result<Vec<WorkerRow>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(&format!("SELECT {WORKER_COLUMNS} FROM workers ORDER BY id ASC"))
        .context("failed to prepare workers query")?;
    let rows = stmt
        .query_map([], map_worker_row)
        .context("failed to query workers")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to read workers")?;
    Ok(rows)
}

pub fn find_worker(db_path: &Path, worker_id: i64) -> Result<Option<WorkerRow>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(&format!("SELECT {WORKER_COLUMNS} FROM workers WHERE id = ?1"))
        .context("failed to prepare worker lookup")?;
    let mut rows = stmt
        .query_map([worker_id], map_worker_row)
        .with_context(|| format!("failed to look up worker #{worker_id}"))?;
    rows.next()
        .transpose()
        .with_context(|| format!("failed to read worker #{worker_id}"))
}

fn insert_worker_row(conn: &Connection, worker: &NewWorker) -> Result<i64> {
    let locale_all =
        serde_json::to_string(&worker.locale_all).context("failed to encode locale_all")?;
    conn.execute(
        "INSERT INTO workers(
             hr_id, full_name, status, engagement_model, email_personal, email_pph,
             country_residence, locale_primary, locale_all, worker_role, hire_date,
             rtw_datetime, termination_date, bgc_expiration_date
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            worker.hr_id,
            worker.full_name,
            worker.status.as_str(),
            worker.engagement_model.as_str(),
            worker.email,
            worker.email_pph,
            worker.country,
            worker.locale,
            locale_all,
            worker.role,
            worker.hire_date.format(DATE_FORMAT).to_string(),
            worker.rtw_at.map(|value| value.to_rfc3339()),
            date_text(worker.termination_date),
            date_text(worker.bgc_expiration),
        ],
    )
    .with_context(|| format!("failed to insert worker {}", worker.hr_id))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_worker(db_path: &Path, worker: &NewWorker) -> Result<i64> {
    let conn = open_connection(db_path)?;
    insert_worker_row(&conn, worker)
}

/// All rows or none.
pub fn insert_workers(db_path: &Path, workers: &[NewWorker]) -> Result<usize> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start bulk insert transaction")?;
    for worker in workers {
        insert_worker_row(&tx, worker)?;
    }
    tx.commit().context("failed to commit bulk insert")?;
    Ok(workers.len())
}

pub fn update_worker(db_path: &Path, worker_id: i64, row: &WorkerRow) -> Result<usize> {
    let conn = open_connection(db_path)?;
    let updated = conn
        .execute(
            "UPDATE workers
             SET full_name = ?1, status = ?2, email_personal = ?3, worker_role = ?4,
                 country_residence = ?5, locale_primary = ?6, rtw_datetime = ?7,
                 termination_date = ?8, bgc_expiration_date = ?9
             WHERE id = ?10",
            params![
                row.full_name,
                row.status.as_str(),
                row.email,
                row.role,
                row.country,
                row.locale,
                row.rtw_at.map(|value| value.to_rfc3339()),
                date_text(row.termination_date),
                date_text(row.bgc_expiration),
                worker_id,
            ],
        )
        .with_context(|| format!("failed to update worker #{worker_id}"))?;
    Ok(updated)
}

/// Same column rules as `WorkerRow::set_status`, so every updated row still
/// satisfies the status requirements.
pub fn update_status(
    db_path: &Path,
    worker_ids: &[i64],
    status: WorkerStatus,
    at: DateTime<Utc>,
) -> Result<usize> {
    if worker_ids.is_empty() {
        return Ok(0);
    }
    let keep_rtw = "rtw_datetime = COALESCE(NULLIF(TRIM(rtw_datetime), ''), ?)";
    let (set_clause, mut params) = match status {
        WorkerStatus::Pending => (
            "status = ?, rtw_datetime = NULL, termination_date = NULL".to_string(),
            vec![Value::Text(status.as_str().to_string())],
        ),
        WorkerStatus::Active | WorkerStatus::Inactive => (
            format!("status = ?, {keep_rtw}, termination_date = NULL"),
            vec![
                Value::Text(status.as_str().to_string()),
                Value::Text(at.to_rfc3339()),
            ],
        ),
        WorkerStatus::Terminated => (
            format!("status = ?, {keep_rtw}, termination_date = ?"),
            vec![
                Value::Text(status.as_str().to_string()),
                Value::Text(at.to_rfc3339()),
                Value::Text(at.date_naive().format(DATE_FORMAT).to_string()),
            ],
        ),
    };
    params.extend(worker_ids.iter().copied().map(Value::Integer));

    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start status update transaction")?;
    let updated = tx
        .execute(
            &format!(
                "UPDATE workers SET {set_clause} WHERE id IN ({})",
                placeholders(worker_ids.len())
            ),
            params_from_iter(params),
        )
        .with_context(|| format!("failed to set status {status}"))?;
    tx.commit().context("failed to commit status update")?;
    Ok(updated)
}

pub fn distinct_values(db_path: &Path, field: WorkerField) -> Result<Vec<String>> {
    let conn = open_connection(db_path)?;
    let expr = column_expr(field);
    let mut stmt = conn
        .prepare(&format!(
            "SELECT DISTINCT {expr} FROM workers WHERE {expr} <> '' ORDER BY 1 ASC"
        ))
        .with_context(|| format!("failed to prepare options query for {}", field.key()))?;
    let values = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .with_context(|| format!("failed to query options for {}", field.key()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect filter options")?;
    Ok(values)
}

pub fn load_identities(db_path: &Path) -> Result<ExistingIdentities> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare("SELECT hr_id, email_personal FROM workers")
        .context("failed to prepare identities query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })
        .context("failed to query identities")?;

    let mut identities = ExistingIdentities::default();
    for row in rows {
        let (hr_id, email) = row.context("failed to read identity row")?;
        identities.hr_ids.insert(hr_id.trim().to_string());
        if let Some(email) = email.filter(|email| !email.trim().is_empty()) {
            identities.emails.insert(email.trim().to_lowercase());
        }
    }
    Ok(identities)
}

/// Creates one app user per new address. Malformed addresses are errors;
/// known or repeated addresses are skipped.
pub fn provision_users(db_path: &Path, emails: &[String]) -> Result<BulkProvisionReport> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start provisioning transaction")?;

    let mut known = HashSet::new();
    {
        let mut stmt = tx
            .prepare("SELECT email FROM app_users")
            .context("failed to prepare app user query")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("failed to query app users")?;
        for row in rows {
            known.insert(row.context("failed to read app user")?.to_lowercase());
        }
    }

    let mut report = BulkProvisionReport::default();
    let mut seen = HashSet::new();
    for raw in emails {
        let email = raw.trim().to_lowercase();
        let result = if !is_valid_email(&email) {
            ProvisionResult {
                email: raw.trim().to_string(),
                status: ProvisionStatus::Error,
                reason: Some("Invalid email format".to_string()),
            }
        } else if !seen.insert(email.clone()) {
            ProvisionResult {
                email,
                status: ProvisionStatus::Skipped,
                reason: Some("Duplicate email in request".to_string()),
            }
        } else if known.contains(&email) {
            ProvisionResult {
                email,
                status: ProvisionStatus::Skipped,
                reason: Some("User already exists".to_string()),
            }
        } else {
            tx.execute("INSERT INTO app_users(email) VALUES (?1)", [&email])
                .with_context(|| format!("failed to create app user {email}"))?;
            ProvisionResult {
                email,
                status: ProvisionStatus::Created,
                reason: None,
            }
        };
        report.push(result);
    }

    tx.commit().context("failed to commit provisioning")?;
    Ok(report)
}
