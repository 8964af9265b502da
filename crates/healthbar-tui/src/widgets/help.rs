//! Help popup: centred floating overlay listing all keybindings.
//!
//! Toggle with `?`; close with `?` or `Escape`.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

pub struct HelpPopup<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        const BINDINGS: &[(&str, &str)] = &[
            ("q  /  Ctrl+c", "Quit"),
            ("m", "Open / close the menu"),
            ("Enter", "Run the highlighted menu item"),
            ("r", "Re-read the health log now"),
            ("↑ k  /  ↓ j", "Scroll messages or move in the menu"),
            ("PageUp  /  Ctrl+u", "Scroll up one page"),
            ("PageDown / Ctrl+d", "Scroll down one page"),
            ("Escape", "Close menu or help"),
            ("?", "Toggle this help popup"),
        ];

        let popup = centered_rect(64, BINDINGS.len() as u16 + 2, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" healthbar — keybindings (? to close) ")
            .border_style(self.theme.border_focused);

        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(
                        format!("  {:<22}", key),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*desc),
                ])
            })
            .collect();

        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
