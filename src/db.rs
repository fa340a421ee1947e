use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY,
    group_id INTEGER,
    name TEXT NOT NULL,
    target_brand TEXT NOT NULL,
    created_at TEXT NOT NULL,
    cost_credits INTEGER NOT NULL DEFAULT 0,
    statistics_json TEXT
);
CREATE TABLE IF NOT EXISTS report_competitors (
    report_id INTEGER NOT NULL REFERENCES reports(id),
    name TEXT NOT NULL,
    position INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS report_items (
    report_id INTEGER NOT NULL REFERENCES reports(id),
    prompt_id INTEGER NOT NULL,
    prompt_text TEXT NOT NULL,
    evaluation_id INTEGER,
    status TEXT NOT NULL,
    answer_json TEXT,
    completed_at TEXT,
    brand_mentions_json TEXT,
    domain_mentions_json TEXT,
    PRIMARY KEY (report_id, prompt_id)
);
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL,
    credits INTEGER NOT NULL DEFAULT 0
);
";

const ITEM_COLUMNS: &str = "prompt_id, prompt_text, evaluation_id, status, answer_json,
            completed_at, brand_mentions_json, domain_mentions_json";

/// Open the report database
pub fn open(config: &AppConfig) -> AppResult<Connection> {
    let exists = Path::new(&config.db_path).exists();
    if !exists && !config.create_if_missing {
        return Err(AppError::DatabaseMissing(config.db_path.clone()));
    }

    let conn = Connection::open(&config.db_path)?;
    if !exists {
        tracing::info!(path = %config.db_path, "created report database");
        init_schema(&conn)?;
    }
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Get reports, newest first, optionally for one prompt group
pub fn list_reports(conn: &Connection, group_id: Option<i64>) -> AppResult<Vec<Report>> {
    let mut stmt = conn.prepare(
        "SELECT id, group_id, name, target_brand, created_at, cost_credits
         FROM reports
         WHERE ?1 IS NULL OR group_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;

    let reports = stmt
        .query_map([group_id], report_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    reports
        .into_iter()
        .map(|mut report| -> AppResult<Report> {
            report.competitors = get_competitors(conn, report.id)?;
            Ok(report)
        })
        .collect()
}

/// Get a single report with its competitor roster
pub fn get_report(conn: &Connection, report_id: i64) -> AppResult<Report> {
    let mut report = conn
        .query_row(
            "SELECT id, group_id, name, target_brand, created_at, cost_credits
             FROM reports
             WHERE id = ?",
            [report_id],
            report_from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("report {}", report_id)))?;

    report.competitors = get_competitors(conn, report_id)?;
    Ok(report)
}

fn get_competitors(conn: &Connection, report_id: i64) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM report_competitors WHERE report_id = ? ORDER BY position, rowid",
    )?;
    let names = stmt
        .query_map([report_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

/// Get all items of a report in prompt order
pub fn get_report_items(conn: &Connection, report_id: i64) -> AppResult<Vec<ReportItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM report_items WHERE report_id = ? ORDER BY prompt_id",
        ITEM_COLUMNS
    ))?;

    let items = stmt
        .query_map([report_id], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Get one item of a report
pub fn get_report_item(conn: &Connection, report_id: i64, prompt_id: i64) -> AppResult<ReportItem> {
    conn.query_row(
        &format!(
            "SELECT {} FROM report_items WHERE report_id = ? AND prompt_id = ?",
            ITEM_COLUMNS
        ),
        params![report_id, prompt_id],
        item_from_row,
    )
    .optional()?
    .ok_or_else(|| {
        AppError::NotFound(format!("prompt {} in report {}", prompt_id, report_id))
    })
}

/// Get backend-computed statistics of a report, if any were stored
pub fn get_report_statistics(conn: &Connection, report_id: i64) -> AppResult<Option<ReportStatistics>> {
    let raw: Option<Option<String>> = conn
        .query_row(
            "SELECT statistics_json FROM reports WHERE id = ?",
            [report_id],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        None => Err(AppError::NotFound(format!("report {}", report_id))),
        Some(raw) => Ok(parse_payload(raw, "statistics_json")),
    }
}

/// Get a user's raw credit balance as `(email, credits)`
pub fn get_user_balance(conn: &Connection, user_id: i64) -> AppResult<(String, i64)> {
    conn.query_row(
        "SELECT email, credits FROM users WHERE id = ?",
        [user_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
    let created_at: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);

    Ok(Report {
        id: row.get(0)?,
        group_id: row.get(1)?,
        name: row.get(2)?,
        target_brand: row.get(3)?,
        competitors: Vec::new(),
        created_at,
        cost_credits: row.get(5)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ReportItem> {
    Ok(ReportItem {
        prompt_id: row.get(0)?,
        prompt_text: row.get(1)?,
        evaluation_id: row.get(2)?,
        status: row.get(3)?,
        answer: parse_payload(row.get(4)?, "answer_json"),
        completed_at: row.get(5)?,
        brand_mentions: parse_payload(row.get(6)?, "brand_mentions_json"),
        domain_mentions: parse_payload(row.get(7)?, "domain_mentions_json"),
    })
}

/// Decode a JSON payload column. A broken payload reads as absent so one
/// bad row cannot take down the whole report.
fn parse_payload<T: DeserializeOwned>(raw: Option<String>, column: &str) -> Option<T> {
    let raw = raw.filter(|s| !s.trim().is_empty())?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(column, error = %e, "ignoring malformed payload");
            None
        }
    }
}
