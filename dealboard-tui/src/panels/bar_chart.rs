//! Stage bars panel — stacked deal counts by owner, with the owner/stage
//! selection list alongside.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, FilterKind};
use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let Some(data) = &app.data else {
        let hint = Paragraph::new("データ未取得 — r で取得します")
            .style(Style::default().fg(theme.muted));
        f.render_widget(hint, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(20)])
        .split(area);

    render_filter_list(f, chunks[0], app, theme);
    render_bars(f, chunks[1], app, theme, data);
}

/// Owner and stage toggles. Space flips the row under the cursor.
fn render_filter_list(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let rows = app.filter_rows();
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mark = if row.selected { "[x]" } else { "[ ]" };
            let tag = match row.kind {
                FilterKind::Owner => "担当",
                FilterKind::Stage => "段階",
            };
            let mut style = Style::default().fg(if row.selected {
                theme.text_primary
            } else {
                theme.muted
            });
            if i == app.cursor.row {
                style = style.bg(theme.accent).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![Span::styled(
                format!("{mark} {tag} {}", row.label),
                style,
            )]))
        })
        .collect();

    f.render_widget(List::new(items), area);
}

/// One stacked horizontal bar per owner, segments colored by stage.
fn render_bars(
    f: &mut Frame,
    area: Rect,
    _app: &AppState,
    theme: &Theme,
    data: &crate::app::DashboardData,
) {
    let matrix = &data.matrix;
    if matrix.is_empty() {
        let hint = Paragraph::new("選択条件に一致する案件がありません")
            .style(Style::default().fg(theme.muted));
        f.render_widget(hint, area);
        return;
    }

    let label_width = 16usize;
    let bar_width = (area.width as usize).saturating_sub(label_width + 6).max(10);
    let max_total = matrix
        .owners
        .iter()
        .map(|o| matrix.owner_total(o))
        .max()
        .unwrap_or(1)
        .max(1);

    let mut lines: Vec<Line> = Vec::new();
    for owner in &matrix.owners {
        let total = matrix.owner_total(owner);
        let mut spans = vec![Span::styled(
            format!("{:<label_width$}", truncate(owner, label_width)),
            Style::default().fg(theme.text_primary),
        )];

        for (si, stage) in matrix.stages.iter().enumerate() {
            let count = matrix.count(owner, stage);
            if count == 0 {
                continue;
            }
            let cells = ((count as f64 / max_total as f64) * bar_width as f64).round() as usize;
            spans.push(Span::styled(
                "█".repeat(cells.max(1)),
                Style::default().fg(theme.series_color(si)),
            ));
        }
        spans.push(Span::styled(
            format!(" {total}件"),
            Style::default().fg(theme.text_secondary),
        ));
        lines.push(Line::from(spans));
        lines.push(Line::default());
    }

    // Legend: stage name per series color.
    let mut legend = vec![Span::styled("凡例: ", Style::default().fg(theme.muted))];
    for (si, stage) in matrix.stages.iter().enumerate() {
        legend.push(Span::styled(
            "■ ",
            Style::default().fg(theme.series_color(si)),
        ));
        legend.push(Span::styled(
            format!("{stage}  "),
            Style::default().fg(theme.text_secondary),
        ));
    }
    lines.push(Line::from(legend));

    f.render_widget(Paragraph::new(lines), area);
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
