//! Single-record creation operations.
//!
//! Validates typed creation requests, classifies incident descriptions at
//! write time, and inserts through the store primitives. Used by both the
//! CLI (`desk add-customer`, `desk add-incident`) and the HTTP API.

use chrono::Utc;

use crate::classify::classify;
use crate::config::Config;
use crate::db;
use crate::error::CoreError;
use crate::models::{Customer, Incident, NewCustomer, NewIncident};
use crate::store;

pub async fn create_customer(config: &Config, new: &NewCustomer) -> Result<Customer, CoreError> {
    if new.name.trim().is_empty() {
        return Err(CoreError::validation("name", "must not be empty"));
    }
    if new.email.trim().is_empty() {
        return Err(CoreError::validation("email", "must not be empty"));
    }

    let pool = db::connect(config).await?;
    let result = async {
        let mut conn = pool.acquire().await?;
        store::create_customer(&mut *conn, new.name.trim(), new.email.trim(), &new.phone).await
    }
    .await;
    pool.close().await;
    result
}

pub async fn create_incident(config: &Config, new: &NewIncident) -> Result<Incident, CoreError> {
    if new.description.trim().is_empty() {
        return Err(CoreError::validation("description", "must not be empty"));
    }
    if new.description.chars().count() > config.ingest.description_max_len {
        return Err(CoreError::validation(
            "description",
            &format!("exceeds {} chars", config.ingest.description_max_len),
        ));
    }
    if new.status.trim().is_empty() {
        return Err(CoreError::validation("status", "must not be empty"));
    }

    // The date label is opaque text; when absent it defaults to today.
    let date = match &new.date {
        Some(d) if !d.trim().is_empty() => d.trim().to_string(),
        _ => Utc::now().format("%d-%m-%Y").to_string(),
    };

    let class = classify(&new.description);

    let pool = db::connect(config).await?;
    let result = async {
        let mut conn = pool.acquire().await?;
        store::create_incident(
            &mut *conn,
            new.customer_id,
            &date,
            &new.description,
            &new.status,
            &class,
        )
        .await
    }
    .await;
    pool.close().await;
    result
}

/// CLI wrapper for `desk add-customer`.
pub async fn run_add_customer(config: &Config, new: &NewCustomer) -> anyhow::Result<()> {
    let customer = create_customer(config, new).await?;
    println!(
        "created customer {}: {} <{}>",
        customer.id, customer.name, customer.email
    );
    Ok(())
}

/// CLI wrapper for `desk add-incident`.
pub async fn run_add_incident(config: &Config, new: &NewIncident) -> anyhow::Result<()> {
    let incident = create_incident(config, new).await?;
    println!(
        "created incident {} for customer {} [{} score {:.2}]",
        incident.id, incident.customer_id, incident.priority_tier, incident.priority_score
    );
    Ok(())
}
