//! Aggregate statistics over the record store.
//!
//! Exact point-in-time snapshots, recomputed on every call: entity totals,
//! incident counts per priority tier, and incident counts per status
//! bucket. Used by `desk stats` and `GET /api/stats`.

use serde::Serialize;

use crate::config::Config;
use crate::db;
use crate::error::CoreError;
use crate::store;

/// The three fixed reporting buckets for the free-text status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Open,
    Closed,
    InProgress,
}

/// Map a stored status value onto a reporting bucket. Matching is
/// case-insensitive and accepts English and Spanish forms; anything else
/// falls outside the buckets.
pub fn status_bucket(status: &str) -> Option<StatusBucket> {
    match status.trim().to_lowercase().as_str() {
        "open" | "abierta" | "abierto" => Some(StatusBucket::Open),
        "closed" | "cerrada" | "cerrado" => Some(StatusBucket::Closed),
        "in progress" | "in-progress" | "in_progress" | "en proceso" => {
            Some(StatusBucket::InProgress)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TierCounts {
    pub critical: i64,
    pub high: i64,
    pub medium: i64,
    pub normal: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusCounts {
    pub open: i64,
    pub closed: i64,
    pub in_progress: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub total_customers: i64,
    pub total_incidents: i64,
    pub by_tier: TierCounts,
    pub by_status: StatusCounts,
}

pub async fn collect_stats(config: &Config) -> Result<StatsReport, CoreError> {
    let pool = db::connect(config).await?;
    let result = async {
        let mut conn = pool.acquire().await?;

        let total_customers = store::count_customers(&mut *conn).await?;
        let total_incidents = store::count_incidents(&mut *conn).await?;

        let mut by_tier = TierCounts::default();
        for (tier, n) in store::incident_tier_counts(&mut *conn).await? {
            match tier.as_str() {
                "CRITICAL" => by_tier.critical = n,
                "HIGH" => by_tier.high = n,
                "MEDIUM" => by_tier.medium = n,
                "NORMAL" => by_tier.normal = n,
                _ => {}
            }
        }

        let mut by_status = StatusCounts::default();
        for (status, n) in store::incident_status_counts(&mut *conn).await? {
            match status_bucket(&status) {
                Some(StatusBucket::Open) => by_status.open += n,
                Some(StatusBucket::Closed) => by_status.closed += n,
                Some(StatusBucket::InProgress) => by_status.in_progress += n,
                None => {}
            }
        }

        Ok(StatsReport {
            total_customers,
            total_incidents,
            by_tier,
            by_status,
        })
    }
    .await;
    pool.close().await;
    result
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> anyhow::Result<()> {
    let report = collect_stats(config).await?;

    println!("incident-desk — store stats");
    println!("===========================");
    println!();
    println!("  Customers:   {}", report.total_customers);
    println!("  Incidents:   {}", report.total_incidents);
    println!();
    println!("  By tier:");
    println!("    CRITICAL:  {}", report.by_tier.critical);
    println!("    HIGH:      {}", report.by_tier.high);
    println!("    MEDIUM:    {}", report.by_tier.medium);
    println!("    NORMAL:    {}", report.by_tier.normal);
    println!();
    println!("  By status:");
    println!("    open:        {}", report.by_status.open);
    println!("    closed:      {}", report.by_status.closed);
    println!("    in progress: {}", report.by_status.in_progress);
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_english_forms() {
        assert_eq!(status_bucket("open"), Some(StatusBucket::Open));
        assert_eq!(status_bucket("Closed"), Some(StatusBucket::Closed));
        assert_eq!(status_bucket("in progress"), Some(StatusBucket::InProgress));
        assert_eq!(status_bucket("in-progress"), Some(StatusBucket::InProgress));
    }

    #[test]
    fn test_bucket_spanish_forms() {
        assert_eq!(status_bucket("ABIERTA"), Some(StatusBucket::Open));
        assert_eq!(status_bucket("CERRADA"), Some(StatusBucket::Closed));
        assert_eq!(status_bucket("EN PROCESO"), Some(StatusBucket::InProgress));
    }

    #[test]
    fn test_bucket_unrecognized_is_none() {
        assert_eq!(status_bucket("escalated"), None);
        assert_eq!(status_bucket(""), None);
    }
}
