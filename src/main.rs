//! # incident-desk CLI (`desk`)
//!
//! The `desk` binary is the primary interface for incident-desk. It
//! provides commands for database initialization, record creation, bulk
//! ingestion, listings, status updates, statistics, and starting the HTTP
//! server.
//!
//! ## Usage
//!
//! ```bash
//! desk --config ./config/desk.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `desk init` | Create the SQLite database and schema |
//! | `desk add-customer` | Create a customer |
//! | `desk add-incident` | Create an incident (classified at write time) |
//! | `desk customers` | List customers sorted by name |
//! | `desk incidents <customer_id>` | List a customer's incidents, newest first |
//! | `desk set-status <incident_id> <status>` | Update an incident's status |
//! | `desk ingest` | Bulk ingest semicolon-CSV files |
//! | `desk stats` | Print aggregate statistics |
//! | `desk serve` | Start the HTTP server |

mod classify;
mod config;
mod create;
mod db;
mod error;
mod ingest;
mod listing;
mod migrate;
mod models;
mod server;
mod stats;
mod status;
mod store;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{NewCustomer, NewIncident};

/// incident-desk CLI — a local-first customer and incident tracking
/// service with rule-based triage.
#[derive(Parser)]
#[command(
    name = "desk",
    about = "incident-desk — customer and incident tracking with rule-based triage",
    version,
    long_about = "incident-desk ingests customer and incident records (single calls or bulk \
    semicolon-CSV files), deduplicates them against the store, classifies each incident's \
    severity from a fixed keyword table, and exposes listings and aggregate statistics via \
    a CLI and a JSON HTTP API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/desk.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, both entity tables, and all
    /// indexes. This command is idempotent; running it multiple times is
    /// safe.
    Init,

    /// Create a customer.
    AddCustomer {
        /// Customer name (must not be empty).
        #[arg(long)]
        name: String,

        /// Email address (globally unique).
        #[arg(long)]
        email: String,

        /// Phone number (free text).
        #[arg(long, default_value = "")]
        phone: String,
    },

    /// Create an incident. The priority tier and score are derived from
    /// the description at write time and never recomputed.
    AddIncident {
        /// Id of an existing customer.
        #[arg(long)]
        customer_id: i64,

        /// Date label (opaque text). Defaults to today as DD-MM-YYYY.
        #[arg(long)]
        date: Option<String>,

        /// Incident description (drives classification).
        #[arg(long)]
        description: String,

        /// Initial status (free text, e.g. "open").
        #[arg(long)]
        status: String,
    },

    /// List customers ordered by name.
    Customers,

    /// List a customer's incidents, most recent first.
    Incidents {
        /// Customer id.
        customer_id: i64,
    },

    /// Update an incident's status and print the transition summary.
    SetStatus {
        /// Incident id.
        incident_id: i64,

        /// New status value (free text).
        status: String,
    },

    /// Bulk ingest semicolon-CSV files.
    ///
    /// Customers are loaded before incidents so incident rows may
    /// reference customers from the same batch. Duplicate rows are
    /// skipped; per-row problems land in the skip log without aborting
    /// the batch.
    Ingest {
        /// Customers file (`id;name;email;phone`, the id column is ignored).
        #[arg(long)]
        customers: Option<PathBuf>,

        /// Incidents file (`id;customer_id;date;description;status`).
        #[arg(long)]
        incidents: Option<PathBuf>,
    },

    /// Print aggregate statistics.
    Stats,

    /// Start the JSON HTTP API server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::AddCustomer { name, email, phone } => {
            create::run_add_customer(&cfg, &NewCustomer { name, email, phone }).await?;
        }
        Commands::AddIncident {
            customer_id,
            date,
            description,
            status,
        } => {
            create::run_add_incident(
                &cfg,
                &NewIncident {
                    customer_id,
                    date,
                    description,
                    status,
                },
            )
            .await?;
        }
        Commands::Customers => {
            listing::run_customers(&cfg).await?;
        }
        Commands::Incidents { customer_id } => {
            listing::run_incidents(&cfg, customer_id).await?;
        }
        Commands::SetStatus {
            incident_id,
            status,
        } => {
            status::run_set_status(&cfg, incident_id, &status).await?;
        }
        Commands::Ingest {
            customers,
            incidents,
        } => {
            ingest::run_ingest_cmd(&cfg, customers.as_deref(), incidents.as_deref()).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
