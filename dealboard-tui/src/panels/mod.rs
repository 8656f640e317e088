//! Panel rendering — one module per dashboard view plus the status bar.

pub mod bar_chart;
pub mod help;
pub mod outlook;
pub mod pipeline;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Panel};
use crate::theme::Theme;

/// Draw the entire UI: active panel plus a one-line status bar.
pub fn draw(f: &mut Frame, app: &AppState, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    draw_panel(f, chunks[0], app, theme);
    status_bar::render(f, chunks[1], app, theme);
}

fn draw_panel(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let panel = app.active_panel;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(Style::default().fg(theme.text_primary));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Bars => bar_chart::render(f, inner, app, theme),
        Panel::Pipeline => pipeline::render(f, inner, app, theme),
        Panel::Outlook => outlook::render(f, inner, app, theme),
        Panel::Help => help::render(f, inner, theme),
    }
}
