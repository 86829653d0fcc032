//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - builds the rate service (ECB Data Portal or offline)
//! - prints cards, tables, plots and decision listings
//! - writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, DecisionArgs, HistoryArgs, RangeArgs};
use crate::data::{EcbConfig, LiveSource};
use crate::domain::{DashboardConfig, SeriesKind};
use crate::error::{AppError, RateError};

pub mod pipeline;

use pipeline::{RateService, current_rates};

/// Entry point for the `ecb` binary.
pub fn run() -> Result<(), AppError> {
    // We want `ecb` and `ecb --offline` to behave like `ecb tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Log lines would tear the alternate screen, so the TUI stays quiet unless asked.
    let default_level = match cli.command {
        Command::Tui(_) => "off",
        _ => "warn",
    };
    init_tracing(default_level);

    match cli.command {
        Command::Rates(args) => handle_rates(args),
        Command::History(args) => handle_history(args),
        Command::Decisions(args) => handle_decisions(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Validate the year range and carry the offline flag over.
///
/// Both years must be representable as calendar dates.
pub fn dashboard_config(args: &RangeArgs) -> Result<DashboardConfig, AppError> {
    let representable =
        |year: i32| NaiveDate::from_ymd_opt(year, 1, 1).is_some() && NaiveDate::from_ymd_opt(year, 12, 31).is_some();
    if args.start_year > args.end_year || !representable(args.start_year) || !representable(args.end_year) {
        return Err(RateError::InvalidRange {
            start: args.start_year,
            end: args.end_year,
        }
        .into());
    }
    Ok(DashboardConfig {
        start_year: args.start_year,
        end_year: args.end_year,
        offline: args.offline,
    })
}

/// Build the service every front-end shares.
pub fn build_service(args: &RangeArgs) -> Result<RateService<LiveSource>, AppError> {
    let ecb = EcbConfig::from_env()?;
    let mut config = dashboard_config(args)?;
    let source = LiveSource::from_config(&ecb, config.offline)?;
    config.offline = source.is_offline();

    info!(
        base_url = %ecb.base_url,
        offline = config.offline,
        start_year = config.start_year,
        end_year = config.end_year,
        "rate service ready"
    );
    Ok(RateService::new(source, config))
}

fn handle_rates(args: RangeArgs) -> Result<(), AppError> {
    let service = build_service(&args)?;
    let series = service.all_rates();
    let current = current_rates(&series, Local::now().date_naive());

    println!("{}", crate::report::format_rate_cards(&series, &current));
    if let Some(latest) = crate::data::decisions::latest_decision() {
        println!("{}", crate::report::format_latest_decision(&latest));
    }
    Ok(())
}

fn handle_history(args: HistoryArgs) -> Result<(), AppError> {
    let service = build_service(&args.range)?;
    let series = service.series(args.kind);

    if let Some(year) = args.year.filter(|y| series.bucket(*y).is_none()) {
        return Err(AppError::new(4, format!("No {} data for {year}.", args.kind.label())));
    }

    println!("{}", crate::report::format_year_table(&series, args.year));

    if args.plot {
        let plot = crate::plot::render_ascii_plot(&series, args.width, args.height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &args.export_json {
        crate::io::write_series_json(path, &series)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::write_series_csv(path, &series)?;
    }

    Ok(())
}

fn handle_decisions(args: DecisionArgs) -> Result<(), AppError> {
    let decisions = crate::data::decisions::decisions();
    println!("{}", crate::report::format_decisions(&decisions, args.kind));

    if args.check {
        let kinds: Vec<SeriesKind> = match args.kind {
            Some(kind) => vec![kind],
            None => SeriesKind::ALL.to_vec(),
        };
        let issues = crate::data::decisions::check_consistency(&kinds);
        println!("{}", crate::report::format_discrepancies(&issues));
    }

    Ok(())
}

/// Rewrite argv so `ecb` defaults to `ecb tui`.
///
/// Rules:
/// - `ecb`                      -> `ecb tui`
/// - `ecb --offline ...`        -> `ecb tui --offline ...`
/// - `ecb --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "rates" | "history" | "decisions" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
