//! Color tokens for the dealboard TUI.
//!
//! Dark surface with a small set of semantic accents, plus a rotating
//! series palette for the stacked stage bars.

use ratatui::style::Color;

/// Dashboard theme.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Deep charcoal base surface.
    pub background: Color,
    /// Focus and panel highlights.
    pub accent: Color,
    /// Won deals, success states.
    pub positive: Color,
    /// Lost deals, error states.
    pub negative: Color,
    /// Rate-limit waits, stale-data hints.
    pub warning: Color,
    /// Secondary info.
    pub muted: Color,
    /// Primary text.
    pub text_primary: Color,
    /// Secondary text.
    pub text_secondary: Color,
    /// Series colors for stage segments, cycled by stage index.
    series: [Color; 7],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Rgb(17, 18, 22),
            accent: Color::Rgb(82, 196, 255),
            positive: Color::Rgb(92, 220, 130),
            negative: Color::Rgb(240, 84, 120),
            warning: Color::Rgb(250, 166, 60),
            muted: Color::Rgb(110, 120, 140),
            text_primary: Color::White,
            text_secondary: Color::Rgb(168, 172, 180),
            series: [
                Color::Rgb(82, 196, 255),
                Color::Rgb(92, 220, 130),
                Color::Rgb(250, 166, 60),
                Color::Rgb(200, 120, 255),
                Color::Rgb(240, 84, 120),
                Color::Rgb(96, 210, 200),
                Color::Rgb(235, 220, 100),
            ],
        }
    }
}

impl Theme {
    /// Stable color for the N-th stage column of the bar chart.
    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }

    /// Marker color by timeline role: start, finish, report.
    pub fn marker_color(&self, kind: dealboard_core::timeline::MarkerKind) -> Color {
        use dealboard_core::timeline::MarkerKind;
        match kind {
            MarkerKind::Start => self.accent,
            MarkerKind::Finish => self.negative,
            MarkerKind::Report => self.positive,
        }
    }
}
