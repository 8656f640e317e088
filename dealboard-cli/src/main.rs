//! Dealboard CLI — fetch, inspect, and export the deals dashboard data.
//!
//! Commands:
//! - `fetch` — pull the three tables and report row counts
//! - `timeline` — print the pipeline segments for a given "today"
//! - `outlook` — print the forecast rollups by owner and deal type
//! - `export` — write resolved deals or outlook rows as CSV

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

use dealboard_core::config::DashboardConfig;
use dealboard_core::data::{Fetcher, SheetsAuth, SheetsSource, StderrNotices, TableSource};
use dealboard_core::demo::sample_source;
use dealboard_core::domain::ResolvedDeal;
use dealboard_core::filter::{date_bounds, DateField, DealFilter};
use dealboard_core::fiscal::DatePreset;
use dealboard_core::report::outlook;
use dealboard_core::resolve::resolve_tables;
use dealboard_core::timeline::{extract_timeline, format_amount};
use dealboard_core::{export, timeline};

const DEMO_SEED: u64 = 7;

#[derive(Parser)]
#[command(name = "dealboard", about = "Dealboard CLI — deals dashboard data tool")]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the seeded sample spreadsheet instead of Google Sheets.
    #[arg(long, global = true, default_value_t = false)]
    demo: bool,

    /// Restrict to a fiscal window over the close date.
    #[arg(long, global = true, value_enum)]
    period: Option<Period>,

    /// Restrict to an owner display name (repeatable).
    #[arg(long = "owner", global = true)]
    owners: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Period {
    /// 今半期.
    Half,
    /// 今年度.
    Year,
    /// 全期間 (observed close-date bounds).
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull the deals, stage, and user tables and report row counts.
    Fetch,
    /// Print the pipeline timeline segments.
    Timeline {
        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        today: Option<String>,
    },
    /// Print the pipeline outlook rollups.
    Outlook,
    /// Write dashboard data as CSV.
    Export {
        /// What to export.
        #[arg(long, value_enum, default_value_t = ExportKind::Resolved)]
        what: ExportKind,

        /// Output file path.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    /// The resolved deal set.
    Resolved,
    /// The outlook detail table.
    Outlook,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    let resolved = load_resolved(&config, cli.demo)?;
    let resolved = apply_filters(resolved, cli.period, &cli.owners, &config);

    match cli.command {
        Commands::Fetch => run_fetch(&resolved),
        Commands::Timeline { today } => run_timeline(&resolved, today),
        Commands::Outlook => run_outlook(&resolved),
        Commands::Export { what, out } => run_export(&resolved, what, &out),
    }
}

/// Build the source, run one fetch cycle, and resolve it. A missing token
/// fails here, before anything is attempted.
fn load_resolved(config: &DashboardConfig, demo: bool) -> Result<Vec<ResolvedDeal>> {
    let source: Box<dyn TableSource> = if demo {
        Box::new(sample_source(DEMO_SEED))
    } else {
        let auth = SheetsAuth::from_env().context("credentials check failed")?;
        if config.spreadsheet_key.is_empty() {
            bail!("config has no spreadsheet_key (or run with --demo)");
        }
        Box::new(SheetsSource::new(auth, config.spreadsheet_key.clone()))
    };

    let fetcher = Fetcher::new(source, config);
    let tables = fetcher
        .fetch(&StderrNotices)
        .context("fetch failed; nothing to show")?;

    Ok(resolve_tables(&tables))
}

/// Narrow the resolved set by the global --period / --owner flags.
fn apply_filters(
    resolved: Vec<ResolvedDeal>,
    period: Option<Period>,
    owners: &[String],
    config: &DashboardConfig,
) -> Vec<ResolvedDeal> {
    if period.is_none() && owners.is_empty() {
        return resolved;
    }

    let mut filter = DealFilter::unrestricted();
    if !owners.is_empty() {
        filter.owners = Some(owners.iter().cloned().collect());
    }
    if let Some(period) = period {
        let today = Local::now().date_naive();
        let preset = match period {
            Period::Half => DatePreset::CurrentHalf,
            Period::Year => DatePreset::FiscalYear,
            Period::All => DatePreset::AllTime,
        };
        filter.range = Some(preset.resolve(
            today,
            config.fiscal_start_month,
            date_bounds(&resolved, DateField::Close),
        ));
    }

    filter.apply(&resolved).into_iter().cloned().collect()
}

fn run_fetch(resolved: &[ResolvedDeal]) -> Result<()> {
    let with_owner = resolved.iter().filter(|d| d.owner_name.is_some()).count();
    let with_stage = resolved.iter().filter(|d| d.stage_name.is_some()).count();
    println!("deals: {}", resolved.len());
    println!("  owner resolved: {with_owner}");
    println!("  stage resolved: {with_stage}");
    Ok(())
}

fn run_timeline(resolved: &[ResolvedDeal], today: Option<String>) -> Result<()> {
    let today = parse_today(today)?;
    let result = extract_timeline(resolved, today);

    if result.is_empty() {
        // Informational: the data came back fine, nothing qualified.
        println!("条件に一致する受注案件がありませんでした。");
        return Ok(());
    }

    for row in timeline::layout_rows(result.segments()) {
        let segment = &result.segments()[row.row];
        let amount = segment
            .won_amount
            .map(format_amount)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>2}. {}  {} → {}  ({}日)  {}",
            row.row + 1,
            segment.label,
            segment.start,
            segment.finish,
            segment.duration_days,
            amount,
        );
    }
    Ok(())
}

fn run_outlook(resolved: &[ResolvedDeal]) -> Result<()> {
    let report = outlook(resolved);
    if report.is_empty() {
        println!("受注目標日・納品予定日付きの案件がありません。");
        return Ok(());
    }

    println!("営業担当者別集計");
    for line in &report.by_owner {
        println!(
            "  {:<16} {}件  {}  Deal Type {}種類",
            line.key,
            line.deal_count,
            format_amount(line.amount_sum),
            line.partner_count,
        );
    }

    println!("Deal Type別集計");
    for line in &report.by_deal_type {
        println!(
            "  {:<12} {}件  {}  担当 {}名",
            line.key,
            line.deal_count,
            format_amount(line.amount_sum),
            line.partner_count,
        );
    }

    let t = &report.totals;
    println!(
        "合計: {}件 / {} / 担当 {}名 / Deal Type {}種類",
        t.deal_count,
        format_amount(t.amount_sum),
        t.owner_count,
        t.deal_type_count,
    );
    Ok(())
}

fn run_export(resolved: &[ResolvedDeal], what: ExportKind, out: &PathBuf) -> Result<()> {
    let file = File::create(out).with_context(|| format!("create {}", out.display()))?;
    match what {
        ExportKind::Resolved => {
            export::write_resolved_csv(file, resolved)?;
            println!("wrote {} deals to {}", resolved.len(), out.display());
        }
        ExportKind::Outlook => {
            let report = outlook(resolved);
            export::write_outlook_csv(file, &report.rows)?;
            println!("wrote {} rows to {}", report.rows.len(), out.display());
        }
    }
    Ok(())
}

fn parse_today(raw: Option<String>) -> Result<NaiveDate> {
    match raw {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .with_context(|| format!("invalid --today date: {text}")),
        None => Ok(Local::now().date_naive()),
    }
}
