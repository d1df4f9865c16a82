//! # incident-desk
//!
//! A local-first customer and incident tracking service with rule-based
//! triage.
//!
//! incident-desk ingests customer and incident records from single API
//! calls or bulk semicolon-CSV files, deduplicates them against the store,
//! classifies each incident's severity from a fixed keyword table, and
//! exposes listings and aggregate statistics via a CLI (`desk`) and a JSON
//! HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Batch rows / │──▶│   Pipeline   │──▶│  SQLite   │
//! │ API requests │   │ Dedup+Triage │   │  (sqlx)   │
//! └──────────────┘   └──────────────┘   └────┬─────┘
//!                                            │
//!                        ┌───────────────────┤
//!                        ▼                   ▼
//!                   ┌──────────┐       ┌──────────┐
//!                   │   CLI    │       │   HTTP   │
//!                   │  (desk)  │       │  (axum)  │
//!                   └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! desk init                                  # create database
//! desk ingest --customers c.csv --incidents i.csv
//! desk customers
//! desk set-status 1 closed
//! desk stats
//! desk serve                                 # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`classify`] | Keyword severity classifier |
//! | [`store`] | Record-store primitives and invariants |
//! | [`ingest`] | Two-phase bulk ingestion pipeline |
//! | [`create`] | Single-record creation operations |
//! | [`listing`] | Read-only listings |
//! | [`status`] | Incident status updates |
//! | [`stats`] | Aggregate statistics |
//! | [`server`] | JSON HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod classify;
pub mod config;
pub mod create;
pub mod db;
pub mod error;
pub mod ingest;
pub mod listing;
pub mod migrate;
pub mod models;
pub mod server;
pub mod stats;
pub mod status;
pub mod store;
