//! Shared rate pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! remote refresh (per series) -> monthly normalization -> year grouping -> trend,
//! with a per-series fallback to change points -> expansion -> strict grouping.
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, error, warn};

use crate::data::store::change_points;
use crate::data::{ObservationSource, RawObservation};
use crate::domain::{CurrentRate, DashboardConfig, DataSource, MonthlyObservation, RateSeries, SeriesKind};
use crate::error::RateError;
use crate::series::{GroupingMode, compute_trend, expand, group_by_year, latest_value};

/// Derives the three rate series, refreshing from `source` when it can.
pub struct RateService<S> {
    source: S,
    config: DashboardConfig,
}

impl<S: ObservationSource> RateService<S> {
    pub fn new(source: S, config: DashboardConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// All three series, keyed by kind.
    ///
    /// Remote refreshes run concurrently; a failure only affects its own kind.
    pub fn all_rates(&self) -> BTreeMap<SeriesKind, RateSeries> {
        SeriesKind::ALL
            .par_iter()
            .map(|&kind| (kind, self.series(kind)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    /// One series: remote if the refresh succeeds, static otherwise.
    pub fn series(&self, kind: SeriesKind) -> RateSeries {
        if !self.config.offline {
            match self.remote_series(kind) {
                Ok(series) => return series,
                Err(err) if err.is_recoverable() => {
                    warn!(series = %kind, error = %err, "remote refresh failed; using static table")
                }
                Err(err) => error!(series = %kind, error = %err, "remote refresh rejected; using static table"),
            }
        }
        self.static_series(kind).unwrap_or_else(|err| {
            error!(series = %kind, error = %err, "static rate table is unusable");
            RateSeries {
                kind,
                label: kind.label().to_string(),
                buckets: Vec::new(),
                source: DataSource::Static,
            }
        })
    }

    /// The fallback pipeline on its own: change points -> expansion -> strict grouping.
    pub fn static_series(&self, kind: SeriesKind) -> Result<RateSeries, RateError> {
        let monthly = expand(&change_points(kind), self.config.start_year, self.config.end_year)?;
        let buckets = group_by_year(&monthly, GroupingMode::Strict)?;
        Ok(RateSeries {
            kind,
            label: kind.label().to_string(),
            buckets,
            source: DataSource::Static,
        })
    }

    fn remote_series(&self, kind: SeriesKind) -> Result<RateSeries, RateError> {
        let raw = self
            .source
            .fetch_observations(kind, self.config.start_year, self.config.end_year)?;
        let monthly = normalize_monthly(&raw, self.config.start_year, self.config.end_year);
        if !monthly.iter().any(|m| m.value.is_some()) {
            return Err(RateError::MalformedEnvelope(format!(
                "no observations within {}..={}",
                self.config.start_year, self.config.end_year
            )));
        }
        let buckets = group_by_year(&monthly, GroupingMode::TolerantTrailing)?;
        debug!(series = %kind, years = buckets.len(), "remote series ready");
        Ok(RateSeries {
            kind,
            label: kind.label().to_string(),
            buckets,
            source: DataSource::Remote,
        })
    }
}

/// Latest value and trend per kind, dated `as_of`.
pub fn current_rates(
    series: &BTreeMap<SeriesKind, RateSeries>,
    as_of: NaiveDate,
) -> BTreeMap<SeriesKind, CurrentRate> {
    series
        .iter()
        .map(|(kind, s)| (*kind, current_rate(s, as_of)))
        .collect()
}

/// Card figures for an already-derived series.
pub fn current_rate(series: &RateSeries, as_of: NaiveDate) -> CurrentRate {
    CurrentRate {
        value: latest_value(&series.buckets),
        trend: compute_trend(&series.buckets),
        as_of,
    }
}

/// Collapse dated observations into a dense monthly sequence.
///
/// Each month keeps its latest known value. The sequence runs from January
/// of the first observed year to the last observed month; months without a
/// value in between are absent. Observations outside the year range are ignored.
pub fn normalize_monthly(raw: &[RawObservation], start_year: i32, end_year: i32) -> Vec<MonthlyObservation> {
    let mut by_month: HashMap<(i32, u32), Option<f64>> = HashMap::new();
    let mut sorted: Vec<&RawObservation> = raw
        .iter()
        .filter(|o| (start_year..=end_year).contains(&o.date.year()))
        .collect();
    sorted.sort_by_key(|o| o.date);

    for obs in sorted {
        let key = (obs.date.year(), obs.date.month0());
        let slot = by_month.entry(key).or_insert(None);
        if obs.value.is_some() {
            *slot = obs.value;
        }
    }

    let (Some(first_year), Some(last)) = (
        by_month.keys().map(|(y, _)| *y).min(),
        by_month.keys().max().copied(),
    ) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for year in first_year..=last.0 {
        let last_month = if year == last.0 { last.1 } else { 11 };
        for month_index in 0..=last_month {
            out.push(MonthlyObservation {
                year,
                month_index,
                value: by_month.get(&(year, month_index)).copied().flatten(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OfflineSource;
    use crate::domain::{ChangePoint, Trend};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Serves canned observations for some kinds and fails for the rest.
    struct FakeSource {
        responses: HashMap<SeriesKind, Vec<RawObservation>>,
    }

    impl ObservationSource for FakeSource {
        fn fetch_observations(&self, kind: SeriesKind, _: i32, _: i32) -> Result<Vec<RawObservation>, RateError> {
            self.responses
                .get(&kind)
                .cloned()
                .ok_or_else(|| RateError::RemoteFetchFailed(format!("no route for {kind}")))
        }
    }

    fn monthly_feed(values: &[(i32, u32, f64)]) -> Vec<RawObservation> {
        values
            .iter()
            .map(|&(y, m, v)| RawObservation {
                date: date(y, m, 1),
                value: Some(v),
            })
            .collect()
    }

    fn recent_config() -> DashboardConfig {
        DashboardConfig {
            start_year: 2024,
            end_year: 2025,
            offline: false,
        }
    }

    #[test]
    fn offline_source_uses_static_tables() {
        let service = RateService::new(OfflineSource, DashboardConfig::default());
        let rates = service.all_rates();
        assert_eq!(rates.len(), 3);
        for (kind, series) in &rates {
            assert_eq!(series.source, DataSource::Static);
            assert_eq!(series.label, kind.label());
            assert_eq!(series.buckets.len(), 27);
            assert_eq!(series.buckets[0].year, 1999);
        }
    }

    #[test]
    fn offline_config_never_consults_the_source() {
        let mut responses = HashMap::new();
        responses.insert(SeriesKind::MainRefinancing, monthly_feed(&[(2024, 1, 4.50)]));
        let config = DashboardConfig {
            offline: true,
            ..recent_config()
        };
        let service = RateService::new(FakeSource { responses }, config);
        assert_eq!(service.series(SeriesKind::MainRefinancing).source, DataSource::Static);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let service = RateService::new(OfflineSource, DashboardConfig::default());
        assert_eq!(service.all_rates(), service.all_rates());
    }

    #[test]
    fn failure_of_one_kind_does_not_affect_the_others() {
        let mut feed = monthly_feed(&(1..=12).map(|m| (2024, m, 4.50)).collect::<Vec<_>>());
        feed.extend(monthly_feed(&[(2025, 1, 3.15), (2025, 2, 2.90), (2025, 3, 2.65)]));

        let mut responses = HashMap::new();
        responses.insert(SeriesKind::MainRefinancing, feed.clone());
        responses.insert(SeriesKind::DepositFacility, feed);
        let service = RateService::new(FakeSource { responses }, recent_config());

        let rates = service.all_rates();
        assert_eq!(rates[&SeriesKind::MainRefinancing].source, DataSource::Remote);
        assert_eq!(rates[&SeriesKind::DepositFacility].source, DataSource::Remote);
        assert_eq!(rates[&SeriesKind::MarginalLending].source, DataSource::Static);
        assert_eq!(
            rates[&SeriesKind::MarginalLending],
            service.static_series(SeriesKind::MarginalLending).unwrap()
        );

        let refi = &rates[&SeriesKind::MainRefinancing];
        assert_eq!(refi.years(), vec![2024, 2025]);
        assert_eq!(refi.buckets[1].values[2], Some(2.65));
        assert_eq!(refi.buckets[1].values[3], None);
    }

    #[test]
    fn remote_series_with_partial_final_year_reports_current_rate() {
        let mut responses = HashMap::new();
        for kind in SeriesKind::ALL {
            let mut feed = monthly_feed(&(1..=12).map(|m| (2024, m, 4.25)).collect::<Vec<_>>());
            feed.extend(monthly_feed(&[(2025, 1, 2.90), (2025, 2, 2.65), (2025, 3, 2.40)]));
            responses.insert(kind, feed);
        }
        let service = RateService::new(FakeSource { responses }, recent_config());
        let current = current_rates(&service.all_rates(), date(2025, 4, 1));
        for rate in current.values() {
            assert_eq!(rate.value, Some(2.40));
            assert_eq!(rate.trend, Trend::Decreasing);
            assert_eq!(rate.as_of, date(2025, 4, 1));
        }
    }

    #[test]
    fn remote_gaps_become_absent_months() {
        let mut responses = HashMap::new();
        responses.insert(
            SeriesKind::MainRefinancing,
            monthly_feed(&[(2024, 6, 4.25), (2025, 1, 3.15)]),
        );
        let service = RateService::new(FakeSource { responses }, recent_config());
        let refi = service.series(SeriesKind::MainRefinancing);
        assert_eq!(refi.source, DataSource::Remote);
        assert_eq!(refi.buckets[0].values[5], Some(4.25));
        assert_eq!(refi.buckets[0].values[6], None);
    }

    #[test]
    fn out_of_range_feed_falls_back() {
        let mut responses = HashMap::new();
        responses.insert(SeriesKind::DepositFacility, monthly_feed(&[(2010, 1, 1.0)]));
        let service = RateService::new(FakeSource { responses }, recent_config());
        assert_eq!(service.series(SeriesKind::DepositFacility).source, DataSource::Static);
    }

    #[test]
    fn static_scenario_matches_step_expansion() {
        let service = RateService::new(OfflineSource, DashboardConfig::default());
        let current = current_rates(&service.all_rates(), date(2025, 10, 1));
        let refi = current[&SeriesKind::MainRefinancing];
        assert_eq!(refi.value, Some(2.15));
        assert_eq!(refi.trend, Trend::NoChange);
        assert_eq!(current[&SeriesKind::DepositFacility].value, Some(2.00));
        assert_eq!(current[&SeriesKind::MarginalLending].value, Some(2.40));
    }

    #[test]
    fn normalize_keeps_latest_known_value_per_month() {
        let raw = vec![
            RawObservation { date: date(2025, 6, 11), value: Some(2.15) },
            RawObservation { date: date(2025, 6, 2), value: Some(2.40) },
            RawObservation { date: date(2025, 6, 30), value: None },
            RawObservation { date: date(2025, 4, 23), value: Some(2.40) },
        ];
        let monthly = normalize_monthly(&raw, 1999, 2025);
        assert_eq!(monthly.len(), 6);
        assert_eq!(monthly[0].value, None);
        assert_eq!(monthly[3].value, Some(2.40));
        assert_eq!(monthly[4].value, None);
        assert_eq!(monthly[5].value, Some(2.15));
    }

    #[test]
    fn quarter_step_scenario_chains_to_no_change() {
        let points = [
            ChangePoint { effective_date: date(1999, 1, 1), value: 3.00 },
            ChangePoint { effective_date: date(1999, 4, 1), value: 2.50 },
        ];
        let monthly = expand(&points, 1999, 1999).unwrap();
        let buckets = group_by_year(&monthly, GroupingMode::Strict).unwrap();

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].values[..3], [Some(3.00); 3]);
        assert_eq!(buckets[0].values[3..], [Some(2.50); 9]);
        assert_eq!(compute_trend(&buckets), Trend::NoChange);
        assert_eq!(latest_value(&buckets), Some(2.50));
    }

    #[test]
    fn unrepresentable_range_degrades_to_empty_series() {
        let config = DashboardConfig {
            start_year: i32::MIN,
            end_year: i32::MAX,
            offline: false,
        };
        let service = RateService::new(OfflineSource, config);
        let rates = service.all_rates();
        assert_eq!(rates.len(), 3);
        for series in rates.values() {
            assert_eq!(series.source, DataSource::Static);
            assert!(series.buckets.is_empty());
        }
    }

    /// Rejects every request as a caller error rather than a remote failure.
    struct RejectingSource;

    impl ObservationSource for RejectingSource {
        fn fetch_observations(&self, _: SeriesKind, start: i32, end: i32) -> Result<Vec<RawObservation>, RateError> {
            Err(RateError::InvalidRange { start, end })
        }
    }

    #[test]
    fn unrecoverable_remote_error_still_falls_back() {
        let service = RateService::new(RejectingSource, recent_config());
        let deposit = service.series(SeriesKind::DepositFacility);
        assert_eq!(deposit, service.static_series(SeriesKind::DepositFacility).unwrap());
    }

    #[test]
    fn normalize_empty_feed() {
        assert!(normalize_monthly(&[], 1999, 2025).is_empty());
    }
}
