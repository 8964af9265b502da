//! Ratatui widgets for the healthbar TUI.

pub mod entry_table;
pub mod health_gauge;
pub mod help;
pub mod menu;
