//! Colour theme for the healthbar TUI.
//!
//! Themes are TOML files embedded in the binary via [`include_str!`], so the
//! gauge works without any files on disk. Call [`Theme::load_default`] at
//! startup and pass the result through as a shared reference.

use config::{Config, File, FileFormat};
use healthbar_core::HealthLevel;
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");
const GRUVBOX_DARK_THEME_SRC: &str = include_str!("themes/gruvbox_dark.toml");

// ---------------------------------------------------------------------------
// Raw (serde) types: mirror the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    underlined: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(c) = self.fg.as_deref().and_then(parse_color) {
            style = style.fg(c);
        }
        if let Some(c) = self.bg.as_deref().and_then(parse_color) {
            style = style.bg(c);
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.underlined {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawHealth {
    healthy: RawStyle,
    wounded: RawStyle,
    critical: RawStyle,
    dead: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    header: RawStyle,
    count: RawStyle,
    timestamp: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawMenu {
    selected: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    health: RawHealth,
    borders: RawBorders,
    table: RawTable,
    menu: RawMenu,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Pre-resolved ratatui styles; nothing is parsed at render time.
#[derive(Debug, Clone)]
pub struct Theme {
    pub health_healthy: Style,
    pub health_wounded: Style,
    pub health_critical: Style,
    pub health_dead: Style,

    pub border_focused: Style,
    pub border_unfocused: Style,

    pub table_header: Style,
    pub table_count: Style,
    pub table_timestamp: Style,

    pub menu_selected: Style,
}

impl Theme {
    /// Load and parse the embedded default theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed; the theme tests catch that.
    pub fn load_default() -> Self {
        Self::from_toml_str(DEFAULT_THEME_SRC).expect("embedded default theme must be valid TOML")
    }

    /// Load and parse the embedded Gruvbox Dark theme.
    pub fn load_gruvbox_dark() -> Self {
        Self::from_toml_str(GRUVBOX_DARK_THEME_SRC)
            .expect("embedded gruvbox dark theme must be valid TOML")
    }

    /// Parse a theme from a TOML string. Unknown keys are ignored.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            health_healthy: raw.health.healthy.into_style(),
            health_wounded: raw.health.wounded.into_style(),
            health_critical: raw.health.critical.into_style(),
            health_dead: raw.health.dead.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            table_header: raw.table.header.into_style(),
            table_count: raw.table.count.into_style(),
            table_timestamp: raw.table.timestamp.into_style(),
            menu_selected: raw.menu.selected.into_style(),
        })
    }

    /// Gauge style for a health bucket.
    pub fn health_style(&self, level: HealthLevel) -> Style {
        match level {
            HealthLevel::Healthy => self.health_healthy,
            HealthLevel::Wounded => self.health_wounded,
            HealthLevel::Critical => self.health_critical,
            HealthLevel::Dead => self.health_dead,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts named terminal colours (case-insensitive), `#rrggbb`, and
/// `indexed:N`.
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
