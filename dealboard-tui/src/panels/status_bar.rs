//! One-line status bar: panel tabs, last fetch time, current message.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Panel, StatusLevel};
use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let mut spans = Vec::new();

    for panel in [Panel::Bars, Panel::Pipeline, Panel::Outlook, Panel::Help] {
        let style = if panel == app.active_panel {
            Style::default()
                .fg(theme.background)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        spans.push(Span::styled(format!(" {} ", panel.label()), style));
    }

    if let Some(data) = &app.data {
        spans.push(Span::styled(
            format!("  取得 {}", data.fetched_at.format("%H:%M:%S")),
            Style::default().fg(theme.text_secondary),
        ));
    }

    if let Some((level, message)) = &app.status {
        let color = match level {
            StatusLevel::Info => theme.positive,
            StatusLevel::Warning => theme.warning,
            StatusLevel::Error => theme.negative,
        };
        spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(color),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
