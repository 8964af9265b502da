//! Indicator menu: small popup anchored to the top-right corner.

use crate::session::MenuItem;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Clear, Paragraph, Widget},
};

const WIDTH: u16 = 24;

pub struct Menu<'a> {
    cursor: usize,
    theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(cursor: usize, theme: &'a Theme) -> Self {
        Self { cursor, theme }
    }
}

impl Widget for Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = MenuItem::ALL.len() as u16 + 2;
        let popup = Rect {
            x: area.right().saturating_sub(WIDTH + 1),
            y: area.y + 1,
            width: WIDTH.min(area.width),
            height,
        }
        .intersection(area);
        Clear.render(popup, buf);

        let lines: Vec<Line> = MenuItem::ALL
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == self.cursor {
                    self.theme.menu_selected
                } else {
                    Style::default()
                };
                Line::styled(format!(" {:<width$}", item.label(), width = WIDTH as usize - 3), style)
            })
            .collect();

        Paragraph::new(lines)
            .block(Block::bordered().title(" menu ").border_style(self.theme.border_focused))
            .render(popup, buf);
    }
}
