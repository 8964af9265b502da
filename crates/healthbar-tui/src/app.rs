//! Top-level application and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Between key presses the
//! loop ticks the [`Session`], which re-reads the store once per poll
//! interval.

use crate::{
    event::{self, AppEvent},
    session::{MenuItem, Session},
    theme::Theme,
    widgets::{entry_table::EntryTable, health_gauge::HealthGauge, help::HelpPopup, menu::Menu},
};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::Line,
    Frame, Terminal,
};
use std::{
    io,
    path::Path,
    process::{Command, Stdio},
    time::{Duration, Instant},
};

const PAGE_STEP: isize = 10;

pub struct App {
    session: Session,
    theme: Theme,
}

impl App {
    pub fn new(session: Session, theme: Theme) -> Self {
        Self { session, theme }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.session.tick(Instant::now());
            terminal.draw(|frame| draw(frame, &self.session, &self.theme))?;

            if self.session.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(250))? {
                let raw = ct_event::read()?;
                if let Event::Key(key) = &raw {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                }
                if let Some(ev) = event::to_app_event(raw) {
                    tracing::debug!(event = ?ev, menu_open = self.session.menu_open, "key event");
                    self.handle(ev);
                }
            }
        }
        Ok(())
    }

    pub fn handle(&mut self, event: AppEvent) {
        let s = &mut self.session;

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            match event {
                AppEvent::ToggleHelp | AppEvent::Escape => s.show_help = false,
                AppEvent::Quit => s.quit = true,
                _ => {}
            }
            return;
        }

        // Open menu intercepts navigation.
        if s.menu_open {
            match event {
                AppEvent::Up => s.menu_up(),
                AppEvent::Down => s.menu_down(),
                AppEvent::Enter => {
                    let item = s.selected_menu_item();
                    s.toggle_menu();
                    activate(s, item);
                }
                AppEvent::ToggleMenu | AppEvent::Escape => s.toggle_menu(),
                AppEvent::Quit => s.quit = true,
                _ => {}
            }
            return;
        }

        match event {
            AppEvent::Quit => s.quit = true,
            AppEvent::ToggleMenu => s.toggle_menu(),
            AppEvent::ToggleHelp => s.show_help = true,
            AppEvent::Refresh => activate(s, MenuItem::Refresh),
            AppEvent::Up => s.scroll_by(-1),
            AppEvent::Down => s.scroll_by(1),
            AppEvent::PageUp => s.scroll_by(-PAGE_STEP),
            AppEvent::PageDown => s.scroll_by(PAGE_STEP),
            AppEvent::Escape => s.status = None,
            // Terminal resize is handled automatically by ratatui
            AppEvent::Enter | AppEvent::Resize(_, _) => {}
        }
    }
}

/// Run a menu action against the session.
fn activate(s: &mut Session, item: MenuItem) {
    tracing::debug!(item = item.label(), "menu action");
    match item {
        MenuItem::ViewLogs => {
            s.status = Some(match open_with_desktop(s.store.path()) {
                Ok(()) => format!("opened {}", s.store.path().display()),
                Err(error) => {
                    tracing::warn!(%error, "failed to open health log");
                    format!("could not open health log: {error}")
                }
            });
        }
        MenuItem::Refresh => {
            s.refresh(Instant::now());
            s.status = Some("refreshed".to_string());
        }
        MenuItem::Quit => s.quit = true,
    }
}

/// Hand the store file to the desktop's default application.
fn open_with_desktop(path: &Path) -> io::Result<()> {
    let mut child = Command::new("xdg-open")
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    // Reap in the background so the TUI never waits on the viewer.
    std::thread::spawn(move || child.wait());
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn draw(frame: &mut Frame, session: &Session, theme: &Theme) {
    let area = frame.area();

    // Vertical: 3-line gauge | entry table | 1-line status
    let [gauge_area, table_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(HealthGauge::new(&session.summary, theme), gauge_area);
    frame.render_widget(
        EntryTable::new(&session.views, session.scroll, !session.menu_open, theme),
        table_area,
    );

    let status = match &session.status {
        Some(msg) => format!(" {msg}  ·  m:menu  ?:help  q:quit "),
        None => " m:menu  r:refresh  ?:help  q:quit ".to_string(),
    };
    frame.render_widget(
        Line::styled(status, Style::default().add_modifier(Modifier::DIM)),
        status_area,
    );

    if session.menu_open {
        frame.render_widget(Menu::new(session.menu_cursor, theme), area);
    }
    if session.show_help {
        frame.render_widget(HelpPopup::new(theme), area);
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
