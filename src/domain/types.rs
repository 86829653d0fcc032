//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while deriving monthly series
//! - exported to JSON/CSV
//! - rendered by the report, plot and TUI front-ends

use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// Month labels used for every year bucket (January first).
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// First year covered by the static change-point tables.
pub const DEFAULT_START_YEAR: i32 = 1999;

/// Last year covered by the static change-point tables.
pub const DEFAULT_END_YEAR: i32 = 2025;

/// One of the three ECB key interest rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
pub enum SeriesKind {
    /// Main refinancing operations rate.
    #[serde(rename = "refi")]
    #[value(name = "refi", alias = "mainRefinancing")]
    MainRefinancing,
    /// Deposit facility rate.
    #[serde(rename = "deposit")]
    #[value(name = "deposit", alias = "depositFacility")]
    DepositFacility,
    /// Marginal lending facility rate.
    #[serde(rename = "lending")]
    #[value(name = "lending", alias = "marginalLending")]
    MarginalLending,
}

/// Identifier aliases accepted at the parse boundary.
///
/// The dashboard historically used two naming schemes for the same rates;
/// both map onto the single canonical enum here.
const SERIES_ALIASES: [(&str, SeriesKind); 6] = [
    ("refi", SeriesKind::MainRefinancing),
    ("mainRefinancing", SeriesKind::MainRefinancing),
    ("deposit", SeriesKind::DepositFacility),
    ("depositFacility", SeriesKind::DepositFacility),
    ("lending", SeriesKind::MarginalLending),
    ("marginalLending", SeriesKind::MarginalLending),
];

impl SeriesKind {
    pub const ALL: [SeriesKind; 3] = [
        SeriesKind::MainRefinancing,
        SeriesKind::DepositFacility,
        SeriesKind::MarginalLending,
    ];

    /// Canonical short id (`refi`, `deposit`, `lending`).
    pub fn id(self) -> &'static str {
        match self {
            SeriesKind::MainRefinancing => "refi",
            SeriesKind::DepositFacility => "deposit",
            SeriesKind::MarginalLending => "lending",
        }
    }

    /// Alternate camel-case id used by the decision snapshot table.
    pub fn alt_id(self) -> &'static str {
        match self {
            SeriesKind::MainRefinancing => "mainRefinancing",
            SeriesKind::DepositFacility => "depositFacility",
            SeriesKind::MarginalLending => "marginalLending",
        }
    }

    /// Human-readable label for cards and chart titles.
    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::MainRefinancing => "Main Refinancing Rate",
            SeriesKind::DepositFacility => "Deposit Facility Rate",
            SeriesKind::MarginalLending => "Marginal Lending Rate",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SeriesKind::MainRefinancing => SeriesKind::DepositFacility,
            SeriesKind::DepositFacility => SeriesKind::MarginalLending,
            SeriesKind::MarginalLending => SeriesKind::MainRefinancing,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SeriesKind::MainRefinancing => SeriesKind::MarginalLending,
            SeriesKind::DepositFacility => SeriesKind::MainRefinancing,
            SeriesKind::MarginalLending => SeriesKind::DepositFacility,
        }
    }
}

impl FromStr for SeriesKind {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SERIES_ALIASES
            .iter()
            .find(|(alias, _)| *alias == trimmed)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| RateError::UnknownSeriesKind(trimmed.to_string()))
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A date on which a rate changed, paired with the new value (percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub effective_date: NaiveDate,
    pub value: f64,
}

/// One month of a dense series. `month_index` is 0-based (January = 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyObservation {
    pub year: i32,
    pub month_index: u32,
    pub value: Option<f64>,
}

/// Twelve monthly values of a single calendar year.
///
/// `values` and `labels` always have length 12; months without data hold `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearBucket {
    pub year: i32,
    pub values: Vec<Option<f64>>,
    pub labels: Vec<String>,
}

impl YearBucket {
    /// Build an empty (all-absent) bucket for `year`.
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            values: vec![None; 12],
            labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Latest month with a value, as `(month_index, value)`.
    pub fn last_known(&self) -> Option<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, v)| v.map(|v| (i, v)))
    }
}

/// Which path produced a series' buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Refreshed from the ECB Data Portal.
    Remote,
    /// Derived from the compiled-in change-point tables.
    Static,
}

impl DataSource {
    pub fn display_name(self) -> &'static str {
        match self {
            DataSource::Remote => "ECB Data Portal",
            DataSource::Static => "static table",
        }
    }
}

/// A labelled, year-grouped monthly series for one rate kind.
///
/// Buckets are ordered ascending by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSeries {
    pub kind: SeriesKind,
    pub label: String,
    pub buckets: Vec<YearBucket>,
    pub source: DataSource,
}

impl RateSeries {
    /// Buckets most-recent-first, as the year tables display them.
    pub fn newest_first(&self) -> Vec<&YearBucket> {
        self.buckets.iter().rev().collect()
    }

    pub fn bucket(&self, year: i32) -> Option<&YearBucket> {
        self.buckets.iter().find(|b| b.year == year)
    }

    pub fn years(&self) -> Vec<i32> {
        self.buckets.iter().map(|b| b.year).collect()
    }
}

/// Direction of the latest rate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    NoChange,
    /// Fewer than two known observations; there is nothing to compare against.
    Indeterminate,
}

impl Trend {
    pub fn symbol(self) -> &'static str {
        match self {
            Trend::Increasing => "↗",
            Trend::Decreasing => "↘",
            Trend::NoChange | Trend::Indeterminate => "↔",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Trend::Increasing => "Increasing",
            Trend::Decreasing => "Decreasing",
            Trend::NoChange => "No change",
            Trend::Indeterminate => "No prior data",
        }
    }

    /// CSS-style class used by card renderers (`up`, `down`, `neutral`).
    pub fn class(self) -> &'static str {
        match self {
            Trend::Increasing => "up",
            Trend::Decreasing => "down",
            Trend::NoChange | Trend::Indeterminate => "neutral",
        }
    }
}

/// Latest value and trend for a series, as shown on a rate card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentRate {
    pub value: Option<f64>,
    pub trend: Trend,
    /// Date the figures were computed (not a data timestamp).
    pub as_of: NaiveDate,
}

/// A row of the flattened policy decision table (newest first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub date: NaiveDate,
    pub deposit_facility: f64,
    pub main_refinancing: f64,
    pub marginal_lending: f64,
}

impl DecisionSnapshot {
    pub fn value(&self, kind: SeriesKind) -> f64 {
        match kind {
            SeriesKind::MainRefinancing => self.main_refinancing,
            SeriesKind::DepositFacility => self.deposit_facility,
            SeriesKind::MarginalLending => self.marginal_lending,
        }
    }
}

/// Settings for a dashboard run, derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Skip the remote refresh and use the static tables only.
    pub offline: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            offline: false,
        }
    }
}
