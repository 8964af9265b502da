//! healthbar-core: the aggregation engine behind the health bar.
//!
//! Raw warning/error messages are normalized into a deduplication key and
//! counted in a flat CSV table, one row per distinct key. Everything that
//! presents the health bar (terminal gauge, JSON endpoint) is a read-only
//! consumer of that table.
//!
//! # Architecture
//!
//! ```text
//! raw message ──► Normalizer ──► Store::upsert ──► Store::persist
//!                                      │
//!                  summary / view ◄────┘ (readers poll the file)
//! ```
//!
//! Every ingestion is a full load/modify/persist cycle held under an
//! exclusive lock on a sidecar file, so concurrent ingestions never lose an
//! increment.

pub mod config;
pub mod error;
pub mod ingest;
pub mod normalizer;
pub mod store;
pub mod summary;
pub mod types;
pub mod view;

pub use error::StoreError;
pub use ingest::{ingest, ingest_at};
pub use normalizer::{display_message, normalize, NUMBER_TOKEN};
pub use store::{upsert, Store, StoreLock, Upsert};
pub use summary::{HealthLevel, HealthSummary};
pub use types::LogEntry;
pub use view::{log_views, LogView};
