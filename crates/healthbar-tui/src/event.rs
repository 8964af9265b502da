//! Semantic application events: crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! # Keybindings
//!
//! | Key(s)                  | Event          |
//! |-------------------------|----------------|
//! | `q`, `Ctrl+c`           | `Quit`         |
//! | `m`                     | `ToggleMenu`   |
//! | `r`                     | `Refresh`      |
//! | `?`                     | `ToggleHelp`   |
//! | `↑` / `k`               | `Up`           |
//! | `↓` / `j`               | `Down`         |
//! | `PageUp`, `Ctrl+u`      | `PageUp`       |
//! | `PageDown`, `Ctrl+d`    | `PageDown`     |
//! | `Enter`                 | `Enter`        |
//! | `Esc`                   | `Escape`       |
//! | terminal resize         | `Resize(w, h)` |

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    /// Open or close the indicator menu.
    ToggleMenu,
    /// Re-read the store now instead of waiting for the next poll.
    Refresh,
    ToggleHelp,
    Up,
    Down,
    PageUp,
    PageDown,
    /// Activate the highlighted menu item.
    Enter,
    /// Dismiss the open menu or help popup.
    Escape,
    Resize(u16, u16),
}

/// Map a raw crossterm [`Event`] to an [`AppEvent`].
///
/// Returns `None` for mouse events, key releases and unbound keys.
pub fn to_app_event(event: Event) -> Option<AppEvent> {
    match event {
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Key(key) => map_key(key),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Char('q') if key.modifiers == Mod::NONE => Some(AppEvent::Quit),
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Char('m') if key.modifiers == Mod::NONE => Some(AppEvent::ToggleMenu),
        Char('r') if key.modifiers == Mod::NONE => Some(AppEvent::Refresh),
        // '?' arrives with or without SHIFT depending on the terminal
        Char('?') => Some(AppEvent::ToggleHelp),

        Up | Char('k') if key.modifiers == Mod::NONE => Some(AppEvent::Up),
        Down | Char('j') if key.modifiers == Mod::NONE => Some(AppEvent::Down),

        PageUp => Some(AppEvent::PageUp),
        PageDown => Some(AppEvent::PageDown),
        Char('u') if key.modifiers == Mod::CONTROL => Some(AppEvent::PageUp),
        Char('d') if key.modifiers == Mod::CONTROL => Some(AppEvent::PageDown),

        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
