//! Chart instances owned by the dashboard, one per rate.
//!
//! Every open chart is a [`ChartHandle`]. Opening a chart for a rate that
//! already has one disposes the old handle first, so at most one live handle
//! exists per [`SeriesKind`].

use std::collections::HashMap;

use crate::domain::{MONTH_LABELS, RateSeries, SeriesKind};
use crate::plot::step_points;

/// What a chart shows: the full history or one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    AllYears,
    Year(i32),
}

impl ChartView {
    /// Step one year older (`delta < 0`) or newer within `years`.
    ///
    /// From the all-years view any step lands on the newest year.
    pub fn step(self, years: &[i32], delta: i32) -> Self {
        let Some(&newest) = years.last() else {
            return self;
        };
        match self {
            ChartView::AllYears => ChartView::Year(newest),
            ChartView::Year(current) => {
                let pos = years.iter().position(|y| *y == current).unwrap_or(years.len() - 1);
                let next = (pos as i64 + delta as i64).clamp(0, years.len() as i64 - 1) as usize;
                ChartView::Year(years[next])
            }
        }
    }

    pub fn title(self) -> String {
        match self {
            ChartView::AllYears => "all years".to_string(),
            ChartView::Year(year) => year.to_string(),
        }
    }
}

/// Render-ready data for one open chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub kind: SeriesKind,
    pub view: ChartView,
    /// Known monthly values as `(x, rate)`.
    pub points: Vec<(f64, f64)>,
    /// The same values as a step line (horizontal hold, vertical move).
    pub line: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    disposed: bool,
}

impl ChartHandle {
    /// Year views use month numbers (1..=12) on x; the all-years view uses fractional years.
    pub fn build(series: &RateSeries, view: ChartView) -> Self {
        let points: Vec<(f64, f64)> = match view {
            ChartView::AllYears => step_points(series),
            ChartView::Year(year) => series
                .bucket(year)
                .map(|b| {
                    b.values
                        .iter()
                        .enumerate()
                        .filter_map(|(i, v)| v.map(|v| (i as f64 + 1.0, v)))
                        .collect()
                })
                .unwrap_or_default(),
        };

        let x_bounds = match view {
            ChartView::AllYears => match (points.first(), points.last()) {
                (Some(first), Some(last)) if last.0 > first.0 => [first.0, last.0],
                (Some(first), _) => [first.0 - 0.5, first.0 + 0.5],
                _ => [0.0, 1.0],
            },
            ChartView::Year(_) => [1.0, 12.0],
        };

        Self {
            kind: series.kind,
            view,
            line: step_line(&points),
            y_bounds: y_bounds(&points),
            x_bounds,
            points,
            disposed: false,
        }
    }

    /// Release the chart data. A disposed handle renders nothing.
    pub fn dispose(&mut self) {
        self.points = Vec::new();
        self.line = Vec::new();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tick label for an x position in this view.
    pub fn fmt_x(&self) -> fn(f64) -> String {
        match self.view {
            ChartView::AllYears => fmt_year,
            ChartView::Year(_) => fmt_month,
        }
    }
}

/// Open charts keyed by rate.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: HashMap<SeriesKind, ChartHandle>,
    disposed: usize,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chart for `series`, disposing any chart already open for its kind.
    pub fn open(&mut self, series: &RateSeries, view: ChartView) -> &ChartHandle {
        self.close(series.kind);
        self.charts
            .entry(series.kind)
            .or_insert_with(|| ChartHandle::build(series, view))
    }

    /// Dispose and drop the chart for `kind`, if any.
    pub fn close(&mut self, kind: SeriesKind) {
        if let Some(mut handle) = self.charts.remove(&kind) {
            handle.dispose();
            self.disposed += 1;
        }
    }

    pub fn close_all(&mut self) {
        for kind in SeriesKind::ALL {
            self.close(kind);
        }
    }

    pub fn get(&self, kind: SeriesKind) -> Option<&ChartHandle> {
        self.charts.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// How many handles have been disposed over the registry's lifetime.
    pub fn disposed_count(&self) -> usize {
        self.disposed
    }
}

fn step_line(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, &(x, y)) in points.iter().enumerate() {
        if i > 0 {
            let (_, prev_y) = points[i - 1];
            out.push((x, prev_y));
        }
        out.push((x, y));
    }
    out
}

fn y_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in points {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return [0.0, 1.0];
    }
    if y_max <= y_min {
        return [y_min - 0.5, y_max + 0.5];
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

fn fmt_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_month(v: f64) -> String {
    let idx = (v.round() as i64).clamp(1, 12) as usize - 1;
    MONTH_LABELS[idx].to_string()
}
