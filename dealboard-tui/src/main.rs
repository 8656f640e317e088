//! Dealboard TUI — terminal dashboard over the deals spreadsheet.
//!
//! Panels:
//! 1. Stage Bars — stacked deal counts by owner, with owner/stage toggles
//! 2. Pipeline — won deals from first meeting to close, amount annotated
//! 3. Outlook — forecast revenue by owner and deal type
//! 4. Help — keyboard reference
//!
//! `--demo` runs against the seeded sample spreadsheet instead of Google
//! Sheets, so no credentials are needed.

mod app;
mod input;
mod panels;
mod persistence;
mod theme;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use dealboard_core::config::DashboardConfig;
use dealboard_core::data::{SheetsAuth, SheetsSource, TableSource};
use dealboard_core::demo::sample_source;

use crate::app::AppState;
use crate::theme::Theme;

const DEMO_SEED: u64 = 7;

fn main() -> Result<()> {
    // Restore the terminal before printing any panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let demo = args.iter().any(|a| a == "--demo");
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    let config = match &config_path {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    // Credentials are checked before the terminal is touched: a missing
    // token halts here, it never gets as far as a fetch.
    let source: Box<dyn TableSource> = if demo {
        Box::new(sample_source(DEMO_SEED))
    } else {
        let auth = match SheetsAuth::from_env() {
            Ok(auth) => auth,
            Err(e) => bail!("{e} (or run with --demo)"),
        };
        if config.spreadsheet_key.is_empty() {
            bail!("config has no spreadsheet_key (or run with --demo)");
        }
        Box::new(SheetsSource::new(auth, config.spreadsheet_key.clone()))
    };

    let state_path = persistence::state_path();
    let mut app = AppState::new(source, &config);
    persistence::apply(&mut app, persistence::load(&state_path));

    // First refresh happens before the event loop so the dashboard opens
    // populated; failures just land in the status line.
    app.refresh(false);

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let _ = persistence::save(&state_path, &persistence::extract(&app));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    let theme = Theme::default();
    loop {
        terminal.draw(|f| panels::draw(f, app, &theme))?;

        // 50ms poll for ~20 FPS tick.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
