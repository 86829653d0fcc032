//! Command-line parsing for the ECB rate dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the derivation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_END_YEAR, DEFAULT_START_YEAR, SeriesKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ecb", version, about = "ECB key interest rates: current values, trends and history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the rate cards (latest value and trend per rate).
    Rates(RangeArgs),
    /// Print the monthly history of one rate, newest year first.
    History(HistoryArgs),
    /// Print the policy decision table.
    Decisions(DecisionArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying rate pipeline as `ecb rates`, but renders
    /// cards and history charts in a terminal UI using Ratatui.
    Tui(RangeArgs),
}

/// Options shared by every command that derives series.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// First calendar year of the monthly series.
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Last calendar year of the monthly series.
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    pub end_year: i32,

    /// Skip the ECB Data Portal and use the compiled-in tables.
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Args, Clone)]
pub struct HistoryArgs {
    /// Rate to show (refi, deposit, lending).
    #[arg(short = 'k', long, value_enum, default_value_t = SeriesKind::MainRefinancing)]
    pub kind: SeriesKind,

    /// Only show this year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Render an ASCII step plot after the table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the series to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the series to CSV (one row per month).
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DecisionArgs {
    /// Only show one rate.
    #[arg(short = 'k', long, value_enum)]
    pub kind: Option<SeriesKind>,

    /// Report where the decision table disagrees with the change-point table.
    #[arg(long)]
    pub check: bool,
}
