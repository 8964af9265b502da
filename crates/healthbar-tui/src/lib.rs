//! healthbar TUI: a terminal stand-in for the tray indicator.
//!
//! Shows the health gauge, the unique/total label and the message table,
//! re-reading the store on the configured poll interval.

pub mod app;
pub mod event;
pub mod session;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use session::{MenuItem, Session};

use healthbar_core::{config::TrayConfig, Store};

/// Start the TUI against `store`.
pub fn run(store: Store, tray: &TrayConfig) -> anyhow::Result<()> {
    let session = Session::new(store, tray);
    App::new(session, theme::Theme::load_default()).run()
}
