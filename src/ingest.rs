//! Bulk ingestion pipeline.
//!
//! Consumes semicolon-delimited customer and incident tables and loads them
//! in two phases: customers first, so that incident rows may reference
//! customers from the same batch. Each phase runs in its own transaction,
//! committed at phase end; phase 1's commit is durable before phase 2
//! begins. Per-row problems (missing fields, unknown customer references)
//! are recovered locally and reported in the skip log; only a structurally
//! unreadable file or an unexpected store error fails the call.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::classify::classify;
use crate::config::Config;
use crate::db;
use crate::error::CoreError;
use crate::store;

/// Outcome of one ingestion call. `lines_read` counts data rows across both
/// inputs regardless of accept/reject outcome; `rows_inserted` counts
/// accepted rows of both kinds; `message` concatenates the skip log.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub lines_read: u64,
    pub rows_inserted: u64,
    pub skip_log: Vec<String>,
    pub message: String,
}

/// A parsed semicolon-delimited table: lowercased header names plus data
/// rows tagged with their 1-based row number (header and blank lines
/// excluded).
#[derive(Debug)]
pub(crate) struct Table {
    header: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

impl Table {
    pub(crate) fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Column lookup that fails the whole call: a file without a required
    /// column is structurally unreadable.
    pub(crate) fn require_column(&self, name: &str) -> Result<usize, CoreError> {
        self.column(name)
            .ok_or_else(|| CoreError::MalformedInput(format!("missing required column '{}'", name)))
    }

    /// Non-empty field at `idx`, if present.
    pub(crate) fn field<'a>(row: &'a [String], idx: usize) -> Option<&'a str> {
        row.get(idx).map(|s| s.as_str()).filter(|s| !s.is_empty())
    }
}

/// Parse semicolon-delimited text into a header and data rows. Blank lines
/// are skipped. An input with no header row at all is malformed.
pub(crate) fn parse_table(text: &str) -> Result<Table, CoreError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| CoreError::MalformedInput("input is empty".to_string()))?;

    let header = header_line
        .split(';')
        .map(|h| h.trim().to_lowercase())
        .collect();

    let rows = lines
        .enumerate()
        .map(|(i, line)| {
            let fields = line.split(';').map(|f| f.trim().to_string()).collect();
            (i + 1, fields)
        })
        .collect();

    Ok(Table { header, rows })
}

/// Run a full ingestion call over optional customer and incident inputs.
pub async fn run_ingest(
    config: &Config,
    customers_csv: Option<&str>,
    incidents_csv: Option<&str>,
) -> Result<IngestReport, CoreError> {
    let pool = db::connect(config).await?;
    let result = ingest_phases(&pool, config, customers_csv, incidents_csv).await;
    pool.close().await;
    result
}

async fn ingest_phases(
    pool: &SqlitePool,
    config: &Config,
    customers_csv: Option<&str>,
    incidents_csv: Option<&str>,
) -> Result<IngestReport, CoreError> {
    let mut lines_read = 0u64;
    let mut rows_inserted = 0u64;
    let mut skip_log: Vec<String> = Vec::new();

    // Phase 1: customers. Committed before incidents are parsed so that
    // incident rows can resolve customers from the same batch.
    if let Some(text) = customers_csv {
        let table = parse_table(text)?;
        let name_col = table.require_column("name")?;
        let email_col = table.require_column("email")?;
        let phone_col = table.require_column("phone")?;
        lines_read += table.rows.len() as u64;

        let mut tx = pool.begin().await.map_err(CoreError::IngestionFailed)?;
        for (line, row) in &table.rows {
            let Some(email) = Table::field(row, email_col) else {
                skip_log.push(format!("customer row {} skipped: missing email", line));
                continue;
            };
            let Some(name) = Table::field(row, name_col) else {
                skip_log.push(format!("customer row {} skipped: missing name", line));
                continue;
            };
            let phone = Table::field(row, phone_col).unwrap_or("");

            // Existing email: logical duplicate, skipped without a log entry.
            if store::find_customer_by_email(&mut *tx, email)
                .await
                .map_err(phase_failure)?
                .is_some()
            {
                continue;
            }

            store::create_customer(&mut *tx, name, email, phone)
                .await
                .map_err(phase_failure)?;
            rows_inserted += 1;
        }
        tx.commit().await.map_err(CoreError::IngestionFailed)?;
    }

    // Phase 2: incidents.
    if let Some(text) = incidents_csv {
        let table = parse_table(text)?;
        let customer_id_col = table.require_column("customer_id")?;
        let date_col = table.require_column("date")?;
        let description_col = table.require_column("description")?;
        let status_col = table.require_column("status")?;
        lines_read += table.rows.len() as u64;

        let mut tx = pool.begin().await.map_err(CoreError::IngestionFailed)?;
        for (line, row) in &table.rows {
            let customer_id = match Table::field(row, customer_id_col) {
                Some(raw) => match raw.parse::<i64>() {
                    Ok(id) => id,
                    Err(_) => {
                        skip_log.push(format!(
                            "incident row {} skipped: invalid customer id '{}'",
                            line, raw
                        ));
                        continue;
                    }
                },
                None => {
                    skip_log.push(format!("incident row {} skipped: missing customer id", line));
                    continue;
                }
            };
            let Some(date) = Table::field(row, date_col) else {
                skip_log.push(format!("incident row {} skipped: missing date", line));
                continue;
            };
            let Some(description) = Table::field(row, description_col) else {
                skip_log.push(format!("incident row {} skipped: missing description", line));
                continue;
            };
            let Some(status) = Table::field(row, status_col) else {
                skip_log.push(format!("incident row {} skipped: missing status", line));
                continue;
            };
            if description.chars().count() > config.ingest.description_max_len {
                skip_log.push(format!(
                    "incident row {} skipped: description exceeds {} chars",
                    line, config.ingest.description_max_len
                ));
                continue;
            }

            let customer = store::find_customer_by_id(&mut *tx, customer_id)
                .await
                .map_err(phase_failure)?;
            if customer.is_none() {
                skip_log.push(format!(
                    "incident skipped: customer id {} does not exist",
                    customer_id
                ));
                continue;
            }

            // Dedup key (customer_id, date, description): silent skip.
            if store::find_incident_by_key(&mut *tx, customer_id, date, description)
                .await
                .map_err(phase_failure)?
                .is_some()
            {
                continue;
            }

            let class = classify(description);
            store::create_incident(&mut *tx, customer_id, date, description, status, &class)
                .await
                .map_err(phase_failure)?;
            rows_inserted += 1;
        }
        tx.commit().await.map_err(CoreError::IngestionFailed)?;
    }

    let message = if skip_log.is_empty() {
        "ingest complete".to_string()
    } else {
        format!("ingest complete. {}", skip_log.join(" | "))
    };

    Ok(IngestReport {
        lines_read,
        rows_inserted,
        skip_log,
        message,
    })
}

/// Unexpected store errors abort the phase; the invariant-violation
/// variants pass through unchanged (they cannot occur here, since every
/// insert is preceded by the corresponding check inside the same
/// transaction).
fn phase_failure(err: CoreError) -> CoreError {
    match err {
        CoreError::Db(db) => CoreError::IngestionFailed(db),
        other => other,
    }
}

/// CLI wrapper: read the given files and print the report.
pub async fn run_ingest_cmd(
    config: &Config,
    customers_path: Option<&std::path::Path>,
    incidents_path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let customers = match customers_path {
        Some(p) => Some(std::fs::read_to_string(p).map_err(|e| {
            anyhow::anyhow!("failed to read customers file {}: {}", p.display(), e)
        })?),
        None => None,
    };
    let incidents = match incidents_path {
        Some(p) => Some(std::fs::read_to_string(p).map_err(|e| {
            anyhow::anyhow!("failed to read incidents file {}: {}", p.display(), e)
        })?),
        None => None,
    };

    let report = run_ingest(config, customers.as_deref(), incidents.as_deref()).await?;

    println!("ingest");
    println!("  lines read: {}", report.lines_read);
    println!("  rows inserted: {}", report.rows_inserted);
    if !report.skip_log.is_empty() {
        println!("  skip log:");
        for entry in &report.skip_log {
            println!("    - {}", entry);
        }
    }
    println!("ok");

    Ok(())
}
