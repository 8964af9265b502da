//! JSON view rows served to the browser viewer.

use crate::normalizer::display_message;
use crate::types::LogEntry;
use serde::Serialize;

/// One row of `/api/logs`. `count` stays text so the payload matches the
/// table cell for cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogView {
    pub count: String,
    pub timestamp: String,
    pub message: String,
}

impl From<&LogEntry> for LogView {
    fn from(entry: &LogEntry) -> Self {
        Self {
            count: entry.count.clone(),
            timestamp: entry.last_seen.clone(),
            message: display_message(&entry.message),
        }
    }
}

/// Rows sorted by count, highest first. Ties keep file order; malformed
/// and negative counts sort as zero.
pub fn log_views(entries: &[LogEntry]) -> Vec<LogView> {
    let mut ranked: Vec<(u64, LogView)> = entries
        .iter()
        .map(|e| (e.tally(), LogView::from(e)))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    ranked.into_iter().map(|(_, view)| view).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
