//! Ingestion: one raw message in, one updated store out.
//!
//! Each call is a complete cycle: take the writer lock, load the table,
//! normalize the message, upsert it, persist, release. Nothing is kept
//! between calls, so the entry point can be invoked once per event from a
//! shell hook or a log monitor.

use crate::error::StoreError;
use crate::normalizer::normalize;
use crate::store::{upsert, Store, Upsert};
use chrono::NaiveDateTime;

/// Record `raw` in `store`, stamped with the local wall clock.
pub fn ingest(store: &Store, raw: &str) -> Result<Upsert, StoreError> {
    ingest_at(store, raw, chrono::Local::now().naive_local())
}

/// Record `raw` in `store` as observed at `now`.
pub fn ingest_at(store: &Store, raw: &str, now: NaiveDateTime) -> Result<Upsert, StoreError> {
    let _lock = store.lock()?;

    let mut entries = store.load()?;
    let key = normalize(raw);
    let outcome = upsert(&mut entries, &key, now);
    store.persist(&entries)?;

    tracing::debug!(key = %key, outcome = ?outcome, rows = entries.len(), "message ingested");
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
