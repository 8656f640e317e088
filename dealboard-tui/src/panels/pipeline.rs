//! Pipeline panel — won deals as horizontal time bars from first meeting
//! to close, with the won amount at the finish marker.

use chrono::NaiveDate;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use dealboard_core::timeline::{layout_rows, MarkerKind, TimelineRow};

use crate::app::AppState;
use crate::theme::Theme;

const LABEL_WIDTH: usize = 26;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let Some(data) = &app.data else {
        let hint = Paragraph::new("データ未取得 — r で取得します")
            .style(Style::default().fg(theme.muted));
        f.render_widget(hint, area);
        return;
    };

    let segments = data.timeline.segments();
    if segments.is_empty() {
        // Informational, not an error: the fetch worked, nothing qualified.
        let hint = Paragraph::new("条件に一致する受注案件がありませんでした")
            .style(Style::default().fg(theme.text_secondary));
        f.render_widget(hint, area);
        return;
    }

    let rows = layout_rows(segments);
    let track_width = (area.width as usize)
        .saturating_sub(LABEL_WIDTH + 12)
        .max(20);

    // Chart window: span of everything drawable, markers included.
    let min_date = rows
        .iter()
        .flat_map(|r| r.markers.iter().map(|m| m.date).chain([r.span.0]))
        .min()
        .unwrap_or(app.today);
    let max_date = rows
        .iter()
        .flat_map(|r| r.markers.iter().map(|m| m.date).chain([r.span.1]))
        .max()
        .unwrap_or(app.today);
    let total_days = (max_date - min_date).num_days().max(1);

    let col_of = |date: NaiveDate| -> usize {
        let offset = (date - min_date).num_days().clamp(0, total_days);
        ((offset as f64 / total_days as f64) * (track_width - 1) as f64).round() as usize
    };

    let mut lines: Vec<Line> = vec![axis_line(min_date, max_date, track_width, theme)];

    for row in &rows {
        lines.push(row_line(row, track_width, &col_of, theme));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn axis_line(min: NaiveDate, max: NaiveDate, track_width: usize, theme: &Theme) -> Line<'static> {
    let left = min.format("%Y-%m").to_string();
    let right = max.format("%Y-%m").to_string();
    let gap = track_width.saturating_sub(left.len() + right.len());
    Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH)),
        Span::styled(
            format!("{left}{}{right}", " ".repeat(gap)),
            Style::default().fg(theme.muted),
        ),
    ])
}

fn row_line(
    row: &TimelineRow,
    track_width: usize,
    col_of: &dyn Fn(NaiveDate) -> usize,
    theme: &Theme,
) -> Line<'static> {
    // Track characters: bar fill between span endpoints, then markers on
    // top. A negative-duration span collapses to its start column.
    let (start, finish) = row.span;
    let start_col = col_of(start);
    let finish_col = col_of(finish.max(start));

    let mut cells: Vec<(char, Style)> = vec![(' ', Style::default()); track_width];
    for cell in cells.iter_mut().take(finish_col + 1).skip(start_col) {
        *cell = ('─', Style::default().fg(theme.text_secondary));
    }

    let mut amount_label = String::new();
    for marker in &row.markers {
        let (glyph, col) = match marker.kind {
            MarkerKind::Start => ('●', col_of(marker.date)),
            MarkerKind::Finish => {
                amount_label = marker.label.clone();
                ('◆', col_of(marker.date))
            }
            MarkerKind::Report => ('▲', col_of(marker.date)),
        };
        cells[col] = (glyph, Style::default().fg(theme.marker_color(marker.kind)));
    }

    let label = row
        .markers
        .iter()
        .find(|m| m.kind == MarkerKind::Start)
        .map(|m| m.label.clone())
        .unwrap_or_default();

    let mut spans = vec![Span::styled(
        format!("{:<LABEL_WIDTH$}", truncate(&label, LABEL_WIDTH - 1)),
        Style::default().fg(theme.text_primary),
    )];
    for (glyph, style) in cells {
        spans.push(Span::styled(glyph.to_string(), style));
    }
    if !amount_label.is_empty() {
        spans.push(Span::styled(
            format!(" {amount_label}"),
            Style::default().fg(theme.positive),
        ));
    }
    Line::from(spans)
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
