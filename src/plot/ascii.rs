//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Rates are drawn as a step line: `-` while a rate holds, `|` where it moves.

use crate::domain::RateSeries;

/// Render a step plot of every known month in `series`.
pub fn render_ascii_plot(series: &RateSeries, width: usize, height: usize) -> String {
    let points = step_points(series);
    let width = width.max(10);
    let height = height.max(3);

    let Some((first, last)) = points.first().zip(points.last()) else {
        return format!("Plot: {} | no data\n", series.label);
    };

    let (x_min, x_max) = if last.0 > first.0 {
        (first.0, last.0)
    } else {
        (first.0 - 0.5, first.0 + 0.5)
    };
    let (y_min, y_max) = y_range(&points).unwrap_or((first.1 - 0.5, first.1 + 0.5));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_steps(&mut grid, &points, x_min, x_max, y_min, y_max);

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | {}..{} | y=[{y_min:.2}, {y_max:.2}]%\n",
        series.label,
        fmt_month(first.0),
        fmt_month(last.0),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// `(fractional year, value)` for every known month, in order.
pub fn step_points(series: &RateSeries) -> Vec<(f64, f64)> {
    series
        .buckets
        .iter()
        .flat_map(|b| {
            b.values
                .iter()
                .enumerate()
                .filter_map(move |(i, v)| v.map(|v| (b.year as f64 + i as f64 / 12.0, v)))
        })
        .collect()
}

fn fmt_month(x: f64) -> String {
    let year = x.floor();
    let month = ((x - year) * 12.0).round() as u32 + 1;
    format!("{}-{month:02}", year as i32)
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_steps(grid: &mut [Vec<char>], points: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => {
                draw_line(grid, c0, r0, col, r0, '-');
                draw_line(grid, col, r0, col, row, '|');
            }
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only empty cells are written.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSource, SeriesKind, YearBucket};

    fn one_year(values: [f64; 12]) -> RateSeries {
        let mut bucket = YearBucket::empty(1999);
        bucket.values = values.iter().map(|v| Some(*v)).collect();
        RateSeries {
            kind: SeriesKind::MainRefinancing,
            label: "Main Refinancing Rate".to_string(),
            buckets: vec![bucket],
            source: DataSource::Static,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = one_year([4.0, 4.0, 4.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0]);
        let txt = render_ascii_plot(&series, 12, 3);
        let expected = concat!(
            "Plot: Main Refinancing Rate | 1999-01..1999-12 | y=[1.90, 4.10]%\n",
            "----        \n",
            "   |        \n",
            "   |--------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_series_still_renders() {
        let series = one_year([3.0; 12]);
        let txt = render_ascii_plot(&series, 12, 3);
        assert!(txt.starts_with("Plot: Main Refinancing Rate | 1999-01..1999-12"));
        assert_eq!(txt.lines().count(), 4);
    }

    #[test]
    fn empty_series_reports_no_data() {
        let mut series = one_year([1.0; 12]);
        series.buckets.clear();
        assert_eq!(render_ascii_plot(&series, 20, 5), "Plot: Main Refinancing Rate | no data\n");
    }

    #[test]
    fn step_points_skip_absent_months() {
        let mut series = one_year([1.0; 12]);
        series.buckets[0].values[5] = None;
        let points = step_points(&series);
        assert_eq!(points.len(), 11);
        assert_eq!(points[5].0, 1999.0 + 6.0 / 12.0);
    }
}
