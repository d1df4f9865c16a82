//! Core data models for customers and incidents.
//!
//! Entities mirror the store schema (epoch-second timestamps); the
//! `*Response` views are the JSON shapes returned by the API and carry
//! ISO-8601 timestamps instead.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A customer as stored. Immutable once created.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: i64,
}

/// An incident as stored. Only `status` ever changes after creation;
/// the priority fields are derived from the description at write time and
/// never recomputed.
#[derive(Debug, Clone)]
pub struct Incident {
    pub id: i64,
    pub customer_id: i64,
    /// Opaque date label, preserved exactly as given. Never parsed.
    pub date: String,
    pub description: String,
    pub status: String,
    pub priority_tier: String,
    pub priority_score: f64,
    pub created_at: i64,
}

/// Creation request for a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Creation request for an incident. `date` defaults to today when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIncident {
    pub customer_id: i64,
    #[serde(default)]
    pub date: Option<String>,
    pub description: String,
    pub status: String,
}

/// JSON view of a customer.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: String,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            created_at: format_ts(c.created_at),
        }
    }
}

/// JSON view of an incident.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentResponse {
    pub id: i64,
    pub customer_id: i64,
    pub date: String,
    pub description: String,
    pub status: String,
    pub priority_tier: String,
    pub priority_score: f64,
    pub created_at: String,
}

impl From<Incident> for IncidentResponse {
    fn from(i: Incident) -> Self {
        Self {
            id: i.id,
            customer_id: i.customer_id,
            date: i.date,
            description: i.description,
            status: i.status,
            priority_tier: i.priority_tier,
            priority_score: i.priority_score,
            created_at: format_ts(i.created_at),
        }
    }
}

/// Format an epoch-second timestamp as ISO-8601 (RFC 3339, UTC).
pub fn format_ts(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
