//! Presentation session: everything the indicator knows between frames.
//!
//! The session is passed explicitly to the event handler and the renderer;
//! there is no process-wide state. It polls the store on a fixed interval
//! and keeps the last summary and rows for drawing.

use healthbar_core::{config::TrayConfig, log_views, HealthSummary, LogView, Store};
use std::time::{Duration, Instant};

/// Items of the indicator menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    ViewLogs,
    Refresh,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::ViewLogs, MenuItem::Refresh, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::ViewLogs => "View Logs",
            MenuItem::Refresh => "Refresh",
            MenuItem::Quit => "Quit",
        }
    }
}

pub struct Session {
    pub store: Store,
    pub max_health: u64,
    pub poll_interval: Duration,
    pub menu_open: bool,
    /// Index into [`MenuItem::ALL`] of the highlighted item.
    pub menu_cursor: usize,
    pub show_help: bool,
    pub summary: HealthSummary,
    pub views: Vec<LogView>,
    /// First visible row of the entry table.
    pub scroll: usize,
    /// One-line feedback from the last menu action.
    pub status: Option<String>,
    pub last_refresh: Option<Instant>,
    pub quit: bool,
}

impl Session {
    pub fn new(store: Store, tray: &TrayConfig) -> Self {
        Self {
            store,
            max_health: tray.max_health,
            poll_interval: Duration::from_secs(tray.poll_interval_secs.max(1)),
            menu_open: false,
            menu_cursor: 0,
            show_help: false,
            summary: HealthSummary::from_entries(&[], tray.max_health),
            views: Vec::new(),
            scroll: 0,
            status: None,
            last_refresh: None,
            quit: false,
        }
    }

    /// Re-read the store. Unreadable files show up as an empty table.
    pub fn refresh(&mut self, now: Instant) {
        let entries = self.store.load_or_empty();
        self.summary = HealthSummary::from_entries(&entries, self.max_health);
        self.views = log_views(&entries);
        self.scroll = self.scroll.min(self.views.len().saturating_sub(1));
        self.last_refresh = Some(now);
        tracing::debug!(
            unique = self.summary.unique,
            total = self.summary.total,
            health = self.summary.health,
            "session refreshed"
        );
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        match self.last_refresh {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.poll_interval,
        }
    }

    /// Refresh if the poll interval has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if self.refresh_due(now) {
            self.refresh(now);
        }
    }

    pub fn selected_menu_item(&self) -> MenuItem {
        MenuItem::ALL[self.menu_cursor.min(MenuItem::ALL.len() - 1)]
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
        self.menu_cursor = 0;
    }

    pub fn menu_up(&mut self) {
        self.menu_cursor = self.menu_cursor.saturating_sub(1);
    }

    pub fn menu_down(&mut self) {
        self.menu_cursor = (self.menu_cursor + 1).min(MenuItem::ALL.len() - 1);
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.views.len().saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
