use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// SQL name of the Unicode-aware lowercase function. SQLite's built-in
/// `LOWER` only folds ASCII.
pub const UNICODE_LOWER: &str = "unicode_lower";

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    register_functions(&conn)?;
    Ok(conn)
}

fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        UNICODE_LOWER,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
    .with_context(|| format!("failed to register sql function {UNICODE_LOWER}"))
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    // Column names match `WorkerField::key`.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS workers (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            hr_id               TEXT NOT NULL UNIQUE,
            full_name           TEXT NOT NULL,
            status              TEXT NOT NULL,
            engagement_model    TEXT NOT NULL,
            email_personal      TEXT,
            email_pph           TEXT,
            country_residence   TEXT NOT NULL,
            locale_primary      TEXT NOT NULL,
            locale_all          TEXT NOT NULL DEFAULT '[]',
            worker_role         TEXT,
            hire_date           TEXT NOT NULL,
            rtw_datetime        TEXT,
            termination_date    TEXT,
            bgc_expiration_date TEXT,
            access_allowed      INTEGER,
            access_reasons      TEXT,
            created_at          TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS app_users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            email       TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_workers_status
            ON workers(status);

        CREATE INDEX IF NOT EXISTS idx_workers_email
            ON workers(email_personal);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
