//! JSON HTTP API.
//!
//! Exposes the record store, ingestion pipeline, and reporting layer over
//! axum. Every handler opens its own store pool, does its work, and
//! releases it on every exit path; the server itself holds no database
//! state.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/customers` | Create a customer |
//! | `GET`  | `/api/customers/sorted` | List customers by name |
//! | `GET`  | `/api/customers/{id}/incidents` | List a customer's incidents, newest first |
//! | `POST` | `/api/incidents` | Create an incident (classified at write time) |
//! | `PUT`  | `/api/incidents/{id}/status` | Update status, returns a transition summary |
//! | `POST` | `/api/etl/upload` | Bulk ingest semicolon-CSV text |
//! | `GET`  | `/api/stats` | Aggregate statistics |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses share one envelope:
//!
//! ```json
//! { "error": { "code": "duplicate_email", "message": "email already registered: ana@x.com" } }
//! ```
//!
//! Codes: `bad_request` (400), `duplicate_email` (400), `unknown_customer`
//! (400), `malformed_input` (400), `not_found` (404), `orphaned_incident`
//! (404), `ingestion_failed` (500), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! dashboards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::create;
use crate::error::CoreError;
use crate::ingest::{self, IngestReport};
use crate::listing;
use crate::models::{CustomerResponse, IncidentResponse, NewCustomer, NewIncident};
use crate::stats::{self, StatsReport};
use crate::status::{self, StatusTransition};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Starts the HTTP server. Binds to the address configured in
/// `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/customers", post(handle_create_customer))
        .route("/api/customers/sorted", get(handle_list_customers))
        .route(
            "/api/customers/{id}/incidents",
            get(handle_customer_incidents),
        )
        .route("/api/incidents", post(handle_create_incident))
        .route("/api/incidents/{id}/status", put(handle_update_status))
        .route("/api/etl/upload", post(handle_etl_upload))
        .route("/api/stats", get(handle_stats))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    info!(bind = %bind_addr, "starting incident-desk API");
    println!("incident-desk API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"duplicate_email"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let (status, code) = match &err {
            CoreError::Validation { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            CoreError::DuplicateEmail(_) => (StatusCode::BAD_REQUEST, "duplicate_email"),
            CoreError::UnknownCustomer(_) => (StatusCode::BAD_REQUEST, "unknown_customer"),
            CoreError::MalformedInput(_) => (StatusCode::BAD_REQUEST, "malformed_input"),
            CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            CoreError::OrphanedIncident { .. } => (StatusCode::NOT_FOUND, "orphaned_incident"),
            CoreError::IngestionFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ingestion_failed")
            }
            CoreError::Db(_) | CoreError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Customers ============

async fn handle_create_customer(
    State(state): State<AppState>,
    Json(new): Json<NewCustomer>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer = create::create_customer(&state.config, &new).await?;
    Ok(Json(customer.into()))
}

async fn handle_list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let customers = listing::customers_sorted(&state.config).await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

async fn handle_customer_incidents(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<IncidentResponse>>, AppError> {
    let incidents = listing::incidents_for_customer(&state.config, id).await?;
    Ok(Json(incidents.into_iter().map(Into::into).collect()))
}

// ============ Incidents ============

async fn handle_create_incident(
    State(state): State<AppState>,
    Json(new): Json<NewIncident>,
) -> Result<Json<IncidentResponse>, AppError> {
    let incident = create::create_incident(&state.config, &new).await?;
    Ok(Json(incident.into()))
}

#[derive(Deserialize)]
struct StatusUpdate {
    status: String,
}

async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<StatusTransition>, AppError> {
    let transition = status::update_status(&state.config, id, &update.status).await?;
    Ok(Json(transition))
}

// ============ Bulk ingestion ============

/// Bulk upload body: the two semicolon-CSV files as text, both optional.
#[derive(Deserialize)]
struct EtlUpload {
    #[serde(default)]
    customers: Option<String>,
    #[serde(default)]
    incidents: Option<String>,
}

async fn handle_etl_upload(
    State(state): State<AppState>,
    Json(upload): Json<EtlUpload>,
) -> Result<Json<IngestReport>, AppError> {
    let report = ingest::run_ingest(
        &state.config,
        upload.customers.as_deref(),
        upload.incidents.as_deref(),
    )
    .await?;
    Ok(Json(report))
}

// ============ Statistics ============

async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsReport>, AppError> {
    let report = stats::collect_stats(&state.config).await?;
    Ok(Json(report))
}
