//! Database acquisition: fetch an entire sales table from PostgreSQL.
//!
//! One run opens one connection, fetches all rows, and closes it; there is
//! no pooling and no retry. The table identifier comes from user input, so
//! it is validated against a strict identifier allow-list before it is ever
//! interpolated into the query text.

use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, warn};
use regex::Regex;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, Connection, Row, TypeInfo};

use crate::record::CANONICAL_HEADERS;

#[derive(Debug, Clone)]
pub struct DbParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub table: String,
}

static IDENTIFIER: OnceLock<Regex> = OnceLock::new();

/// Accepts `table` or `schema.table`, ordinary identifiers only.
pub fn validate_table_name(name: &str) -> Result<()> {
    let pattern = IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("valid pattern")
    });
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(anyhow!(
            "Table name '{name}' is not a valid identifier (letters, digits, and underscores only)"
        ))
    }
}

/// Fetch every row of the configured table as (headers, string rows).
///
/// A query that returns zero rows yields the canonical header set and no
/// rows rather than an error.
pub fn fetch_table(params: &DbParams) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    validate_table_name(&params.table)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Starting async runtime for the database query")?;
    runtime.block_on(fetch_all_rows(params))
}

async fn fetch_all_rows(params: &DbParams) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let options = PgConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .database(&params.database)
        .username(&params.user)
        .password(&params.password);

    let mut connection = PgConnection::connect_with(&options)
        .await
        .with_context(|| {
            format!(
                "Connecting to database '{}' on {}:{}",
                params.database, params.host, params.port
            )
        })?;

    let query = format!("SELECT * FROM {}", params.table);
    debug!("Executing '{query}'");
    let rows = sqlx::query(&query)
        .fetch_all(&mut connection)
        .await
        .with_context(|| format!("Querying table '{}'", params.table))?;
    connection
        .close()
        .await
        .context("Closing database connection")?;

    if rows.is_empty() {
        warn!("No data found in table '{}'", params.table);
        let headers = CANONICAL_HEADERS
            .iter()
            .map(|name| name.to_string())
            .collect();
        return Ok((headers, Vec::new()));
    }

    let headers: Vec<String> = rows[0]
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut record = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            record.push(field_to_string(row, idx)?);
        }
        records.push(record);
    }
    Ok((headers, records))
}

/// Render one result cell as text, trying the column types a sales table can
/// reasonably contain. NULL renders as an empty string.
fn field_to_string(row: &PgRow, idx: usize) -> Result<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(idx) {
        return Ok(value.unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<f32>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<Decimal>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return Ok(value
            .map(|v| v.format("%Y-%m-%d").to_string())
            .unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return Ok(value
            .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return Ok(value
            .map(|v| v.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default());
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(idx) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    let column = &row.columns()[idx];
    bail!(
        "Column '{}' has unsupported type {}",
        column.name(),
        column.type_info().name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_qualified_identifiers() {
        assert!(validate_table_name("fashion_sales").is_ok());
        assert!(validate_table_name("analytics.fashion_sales").is_ok());
        assert!(validate_table_name("_staging").is_ok());
    }

    #[test]
    fn rejects_injection_shaped_names() {
        assert!(validate_table_name("sales; DROP TABLE users").is_err());
        assert!(validate_table_name("sales--").is_err());
        assert!(validate_table_name("sales data").is_err());
        assert!(validate_table_name("1sales").is_err());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("a.b.c").is_err());
    }
}
