//! Test builders: ergonomic constructors for `LogEntry` rows and stores.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{NaiveDate, NaiveDateTime};
use healthbar_core::{LogEntry, Store};

/// `2024-01-15 10:00:00` plus `secs` seconds.
pub fn at(secs: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .expect("valid fixture date")
        + chrono::Duration::seconds(secs.into())
}

/// Fluent builder for [`LogEntry`] fixtures.
///
/// ```rust
/// let entry = EntryBuilder::new("X [NUMBER] Y").count("5").build();
/// ```
pub struct EntryBuilder {
    entry: LogEntry,
}

impl EntryBuilder {
    pub fn new(message: &str) -> Self {
        Self { entry: LogEntry::new(message, at(0)) }
    }

    pub fn count(mut self, count: &str) -> Self {
        self.entry.count = count.to_string();
        self
    }

    pub fn last_seen(mut self, ts: NaiveDateTime) -> Self {
        self.entry.last_seen = healthbar_core::types::format_timestamp(ts);
        self
    }

    pub fn solution(mut self, solution: &str) -> Self {
        self.entry.solution = solution.to_string();
        self
    }

    pub fn build(self) -> LogEntry {
        self.entry
    }
}

/// A store inside a fresh temp dir. Keep the `TempDir` alive for the test.
pub fn scratch_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = Store::new(dir.path().join(".health_bar").join("health_log.csv"));
    (dir, store)
}

/// A scratch store pre-populated with `entries`.
pub fn store_with(entries: &[LogEntry]) -> (tempfile::TempDir, Store) {
    let (dir, store) = scratch_store();
    store.persist(entries).expect("persist fixture rows");
    (dir, store)
}
