//! Record-store primitives.
//!
//! All functions operate on `&mut SqliteConnection` so they compose both
//! with pooled connections (single-record operations) and with the
//! ingestion pipeline's per-phase transactions. Uniqueness and referential
//! invariants are checked here, at write time.

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::classify::Classification;
use crate::error::CoreError;
use crate::models::{Customer, Incident};

/// Dedup key for bulk-ingested incidents: (customer_id, date, description).
pub fn incident_dedup_hash(customer_id: i64, date: &str, description: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(customer_id.to_le_bytes());
    hasher.update(date.as_bytes());
    hasher.update(description.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn customer_from_row(row: &SqliteRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        created_at: row.get("created_at"),
    }
}

fn incident_from_row(row: &SqliteRow) -> Incident {
    Incident {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        date: row.get("date"),
        description: row.get("description"),
        status: row.get("status"),
        priority_tier: row.get("priority_tier"),
        priority_score: row.get("priority_score"),
        created_at: row.get("created_at"),
    }
}

const CUSTOMER_COLS: &str = "id, name, email, phone, created_at";
const INCIDENT_COLS: &str =
    "id, customer_id, date, description, status, priority_tier, priority_score, created_at";

/// Insert a customer. Fails with `DuplicateEmail` if the email is taken.
pub async fn create_customer(
    conn: &mut SqliteConnection,
    name: &str,
    email: &str,
    phone: &str,
) -> Result<Customer, CoreError> {
    if find_customer_by_email(conn, email).await?.is_some() {
        return Err(CoreError::DuplicateEmail(email.to_string()));
    }

    let created_at = Utc::now().timestamp();
    let result = sqlx::query(
        "INSERT INTO customers (name, email, phone, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(created_at)
    .execute(&mut *conn)
    .await?;

    Ok(Customer {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        created_at,
    })
}

pub async fn find_customer_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<Customer>, CoreError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM customers WHERE email = ?",
        CUSTOMER_COLS
    ))
    .bind(email)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(customer_from_row))
}

pub async fn find_customer_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Customer>, CoreError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM customers WHERE id = ?",
        CUSTOMER_COLS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(customer_from_row))
}

/// Insert an incident. Fails with `UnknownCustomer` if the customer id does
/// not resolve. The classification is computed from the description by the
/// caller at write time and never recomputed afterward.
pub async fn create_incident(
    conn: &mut SqliteConnection,
    customer_id: i64,
    date: &str,
    description: &str,
    status: &str,
    class: &Classification,
) -> Result<Incident, CoreError> {
    if find_customer_by_id(conn, customer_id).await?.is_none() {
        return Err(CoreError::UnknownCustomer(customer_id));
    }

    let created_at = Utc::now().timestamp();
    let dedup_hash = incident_dedup_hash(customer_id, date, description);
    let result = sqlx::query(
        r#"
        INSERT INTO incidents
            (customer_id, date, description, status, priority_tier, priority_score, created_at, dedup_hash)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(customer_id)
    .bind(date)
    .bind(description)
    .bind(status)
    .bind(class.tier.as_str())
    .bind(class.score)
    .bind(created_at)
    .bind(&dedup_hash)
    .execute(&mut *conn)
    .await?;

    Ok(Incident {
        id: result.last_insert_rowid(),
        customer_id,
        date: date.to_string(),
        description: description.to_string(),
        status: status.to_string(),
        priority_tier: class.tier.as_str().to_string(),
        priority_score: class.score,
        created_at,
    })
}

/// Look up an incident by its bulk-ingestion dedup key.
pub async fn find_incident_by_key(
    conn: &mut SqliteConnection,
    customer_id: i64,
    date: &str,
    description: &str,
) -> Result<Option<Incident>, CoreError> {
    let hash = incident_dedup_hash(customer_id, date, description);
    let row = sqlx::query(&format!(
        "SELECT {} FROM incidents WHERE dedup_hash = ?",
        INCIDENT_COLS
    ))
    .bind(&hash)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(incident_from_row))
}

pub async fn find_incident_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Incident>, CoreError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM incidents WHERE id = ?",
        INCIDENT_COLS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(incident_from_row))
}

/// All customers, ordered by name ascending (byte-wise lexicographic).
pub async fn list_customers_sorted_by_name(
    conn: &mut SqliteConnection,
) -> Result<Vec<Customer>, CoreError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM customers ORDER BY name ASC",
        CUSTOMER_COLS
    ))
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(customer_from_row).collect())
}

/// A customer's incidents, most recent first. Insertion order breaks ties
/// within the same second.
pub async fn list_incidents_for_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> Result<Vec<Incident>, CoreError> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM incidents WHERE customer_id = ? ORDER BY created_at DESC, id DESC",
        INCIDENT_COLS
    ))
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(incident_from_row).collect())
}

pub async fn set_incident_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: &str,
) -> Result<(), CoreError> {
    sqlx::query("UPDATE incidents SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn count_customers(conn: &mut SqliteConnection) -> Result<i64, CoreError> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&mut *conn)
        .await?;
    Ok(n)
}

pub async fn count_incidents(conn: &mut SqliteConnection) -> Result<i64, CoreError> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM incidents")
        .fetch_one(&mut *conn)
        .await?;
    Ok(n)
}

/// Incident counts grouped by stored priority tier.
pub async fn incident_tier_counts(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, i64)>, CoreError> {
    let rows = sqlx::query("SELECT priority_tier, COUNT(*) AS n FROM incidents GROUP BY priority_tier")
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("priority_tier"), row.get("n")))
        .collect())
}

/// Incident counts grouped by the raw stored status text. Bucketing onto
/// the three fixed reporting buckets happens in the stats layer.
pub async fn incident_status_counts(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, i64)>, CoreError> {
    let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM incidents GROUP BY status")
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("status"), row.get("n")))
        .collect())
}
