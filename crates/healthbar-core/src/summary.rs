//! Health summary: the two numbers and the bar the tray shows.

use crate::types::LogEntry;
use serde::Serialize;

/// Aggregate view of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    /// Distinct normalized messages (row count).
    pub unique: u64,
    /// Sum of all counts. Malformed and negative count cells contribute 0.
    pub total: u64,
    /// `max_health - unique`, clamped to `[0, max_health]`.
    pub health: u64,
    pub max_health: u64,
}

/// Coarse bucket of [`HealthSummary::health`], used to pick a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Dead,
    Critical,
    Wounded,
    Healthy,
}

impl std::fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthLevel::Dead => write!(f, "dead"),
            HealthLevel::Critical => write!(f, "critical"),
            HealthLevel::Wounded => write!(f, "wounded"),
            HealthLevel::Healthy => write!(f, "healthy"),
        }
    }
}

impl HealthSummary {
    pub fn from_entries(entries: &[LogEntry], max_health: u64) -> Self {
        let unique = entries.len() as u64;
        let total = entries
            .iter()
            .map(LogEntry::tally)
            .fold(0u64, u64::saturating_add);
        Self {
            unique,
            total,
            health: max_health.saturating_sub(unique),
            max_health,
        }
    }

    /// Remaining health as a fraction in `[0.0, 1.0]`.
    pub fn ratio(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f64 / self.max_health as f64
    }

    pub fn level(&self) -> HealthLevel {
        // Integer thirds so the boundaries don't depend on float rounding.
        let scaled = self.health.saturating_mul(3);
        if self.health == 0 {
            HealthLevel::Dead
        } else if scaled > self.max_health.saturating_mul(2) {
            HealthLevel::Healthy
        } else if scaled > self.max_health {
            HealthLevel::Wounded
        } else {
            HealthLevel::Critical
        }
    }

    /// Indicator label, e.g. `"97/100 | unique 3 | total 12"`.
    pub fn label(&self) -> String {
        format!(
            "{}/{} | unique {} | total {}",
            self.health, self.max_health, self.unique, self.total
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
