//! Outlook panel — pipeline projects with per-owner rollups.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Row, Table};
use ratatui::Frame;

use dealboard_core::report::OutlookReport;
use dealboard_core::timeline::format_amount;

use crate::app::AppState;
use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let Some(data) = &app.data else {
        let hint = Paragraph::new("データ未取得 — r で取得します")
            .style(Style::default().fg(theme.muted));
        f.render_widget(hint, area);
        return;
    };

    let report = &data.outlook;
    if report.is_empty() {
        let hint = Paragraph::new("受注目標日・納品予定日付きの案件がありません")
            .style(Style::default().fg(theme.text_secondary));
        f.render_widget(hint, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(report.by_owner.len() as u16 + 2),
            Constraint::Length(1),
        ])
        .split(area);

    render_detail(f, chunks[0], report, theme);
    render_owner_summary(f, chunks[1], report, theme);
    render_totals(f, chunks[2], report, theme);
}

fn render_detail(f: &mut Frame, area: Rect, report: &OutlookReport, theme: &Theme) {
    let header = Row::new(["営業担当者", "Deal Type", "案件名", "見込売上額", "予定日"])
        .style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = report
        .rows
        .iter()
        .map(|r| {
            Row::new([
                r.owner.clone(),
                r.deal_type.clone(),
                r.name.clone(),
                format_amount(r.amount),
                r.schedule_note(),
            ])
            .style(Style::default().fg(theme.text_primary))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Min(24),
        ],
    )
    .header(header)
    .column_spacing(1);

    f.render_widget(table, area);
}

fn render_owner_summary(f: &mut Frame, area: Rect, report: &OutlookReport, theme: &Theme) {
    let mut lines = vec![Line::from(Span::styled(
        "営業担当者別集計",
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    ))];
    for line in &report.by_owner {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<16}", line.key),
                Style::default().fg(theme.text_primary),
            ),
            Span::styled(
                format!(
                    "{}件  {}  Deal Type {}種類",
                    line.deal_count,
                    format_amount(line.amount_sum),
                    line.partner_count
                ),
                Style::default().fg(theme.text_secondary),
            ),
        ]));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn render_totals(f: &mut Frame, area: Rect, report: &OutlookReport, theme: &Theme) {
    let totals = &report.totals;
    let line = Line::from(Span::styled(
        format!(
            "総案件数 {}件 / 見込売上額合計 {} / 営業担当者 {}名 / Deal Type {}種類",
            totals.deal_count,
            format_amount(totals.amount_sum),
            totals.owner_count,
            totals.deal_type_count
        ),
        Style::default().fg(theme.warning),
    ));
    f.render_widget(Paragraph::new(vec![line]), area);
}
