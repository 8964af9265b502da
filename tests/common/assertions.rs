//! Domain-specific assertions for healthbar harnesses.
//!
//! They add context to failures: which row, which key, and the whole table
//! when a key is missing.

use healthbar_core::LogEntry;

/// Assert that `entries` holds exactly one row for `message`, with `count`.
///
/// ```rust
/// assert_row!(entries, "Retry [NUMBER]", "2");
/// ```
#[macro_export]
macro_rules! assert_row {
    ($entries:expr, $message:expr, $count:expr) => {{
        let entries: &[healthbar_core::LogEntry] = &$entries;
        let message: &str = $message;
        let matching: Vec<_> = entries.iter().filter(|e| e.message == message).collect();
        match matching.as_slice() {
            [row] if row.count == $count => {}
            [row] => panic!(
                "assert_row! failed for {:?}:\n  expected count: {}\n  actual count:   {}",
                message, $count, row.count
            ),
            [] => panic!(
                "assert_row! failed: no row for {:?}.\n  rows: {:?}",
                message,
                entries.iter().map(|e| &e.message).collect::<Vec<_>>()
            ),
            many => panic!(
                "assert_row! failed: {} rows for {:?}, the key must be unique",
                many.len(),
                message
            ),
        }
    }};
}

/// Assert that no two rows share a normalized message.
pub fn assert_unique_keys(entries: &[LogEntry]) {
    let mut seen = std::collections::HashSet::new();
    for entry in entries {
        assert!(
            seen.insert(entry.message.as_str()),
            "duplicate key {:?} in store",
            entry.message
        );
    }
}

/// Assert the table's messages, in file order.
pub fn assert_order(entries: &[LogEntry], expected: &[&str]) {
    let actual: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
    pretty_assertions::assert_eq!(actual, expected);
}
