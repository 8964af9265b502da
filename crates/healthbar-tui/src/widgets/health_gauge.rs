//! Health gauge: the bar itself, coloured by how much health is left.

use crate::theme::Theme;
use healthbar_core::HealthSummary;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Gauge, Widget},
};

pub struct HealthGauge<'a> {
    summary: &'a HealthSummary,
    theme: &'a Theme,
}

impl<'a> HealthGauge<'a> {
    pub fn new(summary: &'a HealthSummary, theme: &'a Theme) -> Self {
        Self { summary, theme }
    }
}

impl Widget for HealthGauge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let level = self.summary.level();
        let block = Block::bordered()
            .title(format!(" health — {level} "))
            .border_style(self.theme.border_unfocused);

        Gauge::default()
            .block(block)
            .gauge_style(self.theme.health_style(level))
            .ratio(self.summary.ratio().clamp(0.0, 1.0))
            .label(self.summary.label())
            .render(area, buf);
    }
}
