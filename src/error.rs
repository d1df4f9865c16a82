//! Structured error types shared by the store, pipeline, and transport.

use thiserror::Error;

/// Error taxonomy for record-store and ingestion operations.
///
/// Per-row problems during bulk ingestion never surface here; they are
/// recovered locally and reported in the ingestion skip log. These variants
/// cover whole-call failures and single-record operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field is missing or malformed. User-correctable.
    #[error("validation: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The email is already registered to another customer.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// An incident was created against a customer id that does not resolve.
    #[error("customer {0} does not exist")]
    UnknownCustomer(i64),

    /// Id-not-found on a read or update.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// An incident's customer reference is missing. Should not occur under
    /// the store invariants; checked anyway on the update path.
    #[error("incident {incident_id} references missing customer {customer_id}")]
    OrphanedIncident { incident_id: i64, customer_id: i64 },

    /// A bulk input file is structurally unreadable (bad header, empty).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// An unexpected store error aborted an ingestion phase. The phase's
    /// uncommitted rows were rolled back.
    #[error("ingestion failed: {0}")]
    IngestionFailed(#[source] sqlx::Error),

    #[error("database: {0}")]
    Db(#[from] sqlx::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}
