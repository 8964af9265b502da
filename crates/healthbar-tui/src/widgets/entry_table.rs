//! Entry table: one row per distinct message, highest count first.

use crate::theme::Theme;
use healthbar_core::LogView;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    widgets::{Block, Cell, Row, Table, Widget},
};

pub struct EntryTable<'a> {
    views: &'a [LogView],
    scroll: usize,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> EntryTable<'a> {
    pub fn new(views: &'a [LogView], scroll: usize, focused: bool, theme: &'a Theme) -> Self {
        Self { views, scroll, focused, theme }
    }
}

impl Widget for EntryTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };
        let block = Block::bordered()
            .title(format!(" messages ({}) ", self.views.len()))
            .border_style(border);

        let header = Row::new(["count", "last seen", "message"]).style(self.theme.table_header);
        let rows = self.views.iter().skip(self.scroll).map(|view| {
            Row::new([
                Cell::from(view.count.as_str()).style(self.theme.table_count),
                Cell::from(view.timestamp.as_str()).style(self.theme.table_timestamp),
                Cell::from(view.message.as_str()),
            ])
        });

        Table::new(
            rows,
            [Constraint::Length(7), Constraint::Length(19), Constraint::Fill(1)],
        )
        .header(header)
        .column_spacing(2)
        .block(block)
        .render(area, buf);
    }
}
