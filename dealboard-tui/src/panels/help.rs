//! Help panel — keyboard reference.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::theme::Theme;

pub fn render(f: &mut Frame, area: Rect, theme: &Theme) {
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(
                format!("  {k:<10}"),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(desc, Style::default().fg(theme.text_primary)),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(
            "キー操作",
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        key("r", "データ取得（TTL内はキャッシュから）"),
        key("R", "強制再取得（キャッシュを無効化）"),
        key("Tab", "次のパネルへ"),
        key("1-4", "パネルへ直接ジャンプ"),
        key("j / k", "フィルタ行の移動（Stage Bars）"),
        key("Space", "担当者・ステージの選択切替"),
        key("q", "終了"),
        Line::default(),
        Line::from(Span::styled(
            "取得はレート制限時のみ再試行します。他のエラーは即中断です。",
            Style::default().fg(theme.text_secondary),
        )),
    ];

    f.render_widget(Paragraph::new(lines), area);
}
