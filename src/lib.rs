//! healthbar: deduplicated warning/error counter.
//!
//! The aggregation engine lives in [`healthbar_core`]; this crate adds the
//! surfaces around it: the HTTP JSON endpoint with its browser viewer, the
//! logging setup shared by both binaries, and re-exports so integration
//! tests can import everything from one place.
//!
//! # Architecture
//!
//! ```text
//! healthbar-log <msg> ──► ingest ──► health_log.csv
//!                                        │
//!               ┌────────────────────────┼──────────────────┐
//!               ▼                        ▼                  ▼
//!        healthbar serve          healthbar tui      healthbar status
//!        (/api/logs, viewer)      (gauge, polls)     (one-shot label)
//! ```

pub mod logging;
pub mod server;

pub use healthbar_core::{
    config::Config, display_message, ingest, ingest_at, log_views, normalize, HealthLevel,
    HealthSummary, LogEntry, LogView, Store, StoreError, Upsert,
};
