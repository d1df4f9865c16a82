//! Incident status updates.
//!
//! `status` is an open set of text values; the update records whatever the
//! caller supplies and returns a human-readable transition summary that
//! embeds the customer's contact details and both status values.

use serde::Serialize;

use crate::config::Config;
use crate::db;
use crate::error::CoreError;
use crate::store;

/// Outcome of a status update.
#[derive(Debug, Clone, Serialize)]
pub struct StatusTransition {
    pub incident_id: i64,
    pub previous_status: String,
    pub new_status: String,
    pub message: String,
}

pub async fn update_status(
    config: &Config,
    incident_id: i64,
    new_status: &str,
) -> Result<StatusTransition, CoreError> {
    if new_status.trim().is_empty() {
        return Err(CoreError::validation("status", "must not be empty"));
    }
    let new_status = new_status.trim();

    let pool = db::connect(config).await?;
    let result = async {
        let mut conn = pool.acquire().await?;

        let incident = store::find_incident_by_id(&mut *conn, incident_id)
            .await?
            .ok_or_else(|| CoreError::not_found("incident", incident_id))?;

        // Should not occur under the store invariants; checked defensively.
        let customer = store::find_customer_by_id(&mut *conn, incident.customer_id)
            .await?
            .ok_or(CoreError::OrphanedIncident {
                incident_id,
                customer_id: incident.customer_id,
            })?;

        store::set_incident_status(&mut *conn, incident_id, new_status).await?;

        let message = format!(
            "Incident {} for customer {} (email {}, phone {}), dated {}, described as '{}', changed status from {} to {}",
            incident.id,
            customer.name,
            customer.email,
            customer.phone,
            incident.date,
            incident.description,
            incident.status,
            new_status
        );

        Ok(StatusTransition {
            incident_id,
            previous_status: incident.status,
            new_status: new_status.to_string(),
            message,
        })
    }
    .await;
    pool.close().await;
    result
}

/// CLI wrapper for `desk set-status`.
pub async fn run_set_status(
    config: &Config,
    incident_id: i64,
    new_status: &str,
) -> anyhow::Result<()> {
    let transition = update_status(config, incident_id, new_status).await?;
    println!("{}", transition.message);
    Ok(())
}
