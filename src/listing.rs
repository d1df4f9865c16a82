//! Read-only listings over the record store.

use crate::config::Config;
use crate::db;
use crate::error::CoreError;
use crate::models::{format_ts, Customer, Incident};
use crate::store;

/// All customers, ordered by name ascending.
pub async fn customers_sorted(config: &Config) -> Result<Vec<Customer>, CoreError> {
    let pool = db::connect(config).await?;
    let result = async {
        let mut conn = pool.acquire().await?;
        store::list_customers_sorted_by_name(&mut *conn).await
    }
    .await;
    pool.close().await;
    result
}

/// A customer's incidents, most recent first. Fails with `NotFound` if the
/// customer id does not exist.
pub async fn incidents_for_customer(
    config: &Config,
    customer_id: i64,
) -> Result<Vec<Incident>, CoreError> {
    let pool = db::connect(config).await?;
    let result = async {
        let mut conn = pool.acquire().await?;
        if store::find_customer_by_id(&mut *conn, customer_id)
            .await?
            .is_none()
        {
            return Err(CoreError::not_found("customer", customer_id));
        }
        store::list_incidents_for_customer(&mut *conn, customer_id).await
    }
    .await;
    pool.close().await;
    result
}

/// CLI wrapper for `desk customers`.
pub async fn run_customers(config: &Config) -> anyhow::Result<()> {
    let customers = customers_sorted(config).await?;

    if customers.is_empty() {
        println!("No customers.");
        return Ok(());
    }

    println!("{:>6}  {:<24} {:<28} {}", "ID", "NAME", "EMAIL", "PHONE");
    for c in &customers {
        println!("{:>6}  {:<24} {:<28} {}", c.id, c.name, c.email, c.phone);
    }

    Ok(())
}

/// CLI wrapper for `desk incidents <customer_id>`.
pub async fn run_incidents(config: &Config, customer_id: i64) -> anyhow::Result<()> {
    let incidents = incidents_for_customer(config, customer_id).await?;

    if incidents.is_empty() {
        println!("No incidents for customer {}.", customer_id);
        return Ok(());
    }

    for i in &incidents {
        println!(
            "#{} [{} {:.2}] {} | {} | {} (created {})",
            i.id,
            i.priority_tier,
            i.priority_score,
            i.date,
            i.status,
            i.description,
            format_ts(i.created_at)
        );
    }

    Ok(())
}
