//! Formatted terminal output: rate cards, year tables and decision listings.
//!
//! We keep formatting code in one place so:
//! - the derivation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::collections::BTreeMap;

use crate::data::decisions::Discrepancy;
use crate::domain::{CurrentRate, DecisionSnapshot, MONTH_LABELS, RateSeries, SeriesKind};

/// Format the three rate cards (label, value, trend, provenance).
pub fn format_rate_cards(
    series: &BTreeMap<SeriesKind, RateSeries>,
    current: &BTreeMap<SeriesKind, CurrentRate>,
) -> String {
    let mut out = String::new();
    out.push_str("=== ECB key interest rates ===\n");

    for kind in SeriesKind::ALL {
        let Some(rate) = current.get(&kind) else {
            continue;
        };
        let source = series
            .get(&kind)
            .map(|s| s.source.display_name())
            .unwrap_or("-");
        out.push_str(
            format!(
                "{:<24} {:>8}  {} {:<14} [{}] ({source}, as of {})\n",
                kind.label(),
                fmt_rate(rate.value),
                rate.trend.symbol(),
                rate.trend.display_name(),
                rate.trend.class(),
                rate.as_of,
            )
            .as_str(),
        );
    }

    out
}

/// Format a series as a year-by-month table, newest year first.
///
/// With `year`, only that year's row is printed.
pub fn format_year_table(series: &RateSeries, year: Option<i32>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} ({}, {})\n",
        series.label,
        series.kind,
        series.source.display_name()
    ));

    let mut header = format!("{:<6}", "year");
    for m in MONTH_LABELS {
        header.push_str(&format!(" {m:>6}"));
    }
    out.push_str(&header);
    out.push('\n');
    out.push_str(&format!("{:-<6}{}\n", "", " ------".repeat(12)));

    for bucket in series.newest_first() {
        if year.is_some_and(|y| y != bucket.year) {
            continue;
        }
        let mut row = format!("{:<6}", bucket.year);
        for v in &bucket.values {
            row.push_str(&format!(" {:>6}", fmt_cell(*v)));
        }
        out.push_str(row.trim_end());
        out.push('\n');
    }

    out
}

/// Format the decision table, optionally restricted to one rate.
pub fn format_decisions(decisions: &[DecisionSnapshot], kind: Option<SeriesKind>) -> String {
    let mut out = String::new();
    match kind {
        Some(kind) => {
            out.push_str(&format!("{:<12} {:>8}\n", "date", kind.id()));
            out.push_str(&format!("{:-<12} {:-<8}\n", "", ""));
            for d in decisions {
                out.push_str(&format!("{:<12} {:>8.2}\n", d.date.to_string(), d.value(kind)));
            }
        }
        None => {
            out.push_str(&format!(
                "{:<12} {:>8} {:>8} {:>8}\n",
                "date", "deposit", "refi", "lending"
            ));
            out.push_str(&format!("{:-<12} {:-<8} {:-<8} {:-<8}\n", "", "", "", ""));
            for d in decisions {
                out.push_str(&format!(
                    "{:<12} {:>8.2} {:>8.2} {:>8.2}\n",
                    d.date.to_string(),
                    d.deposit_facility,
                    d.main_refinancing,
                    d.marginal_lending
                ));
            }
        }
    }
    out
}

/// Format decision/change-point disagreements.
pub fn format_discrepancies(issues: &[Discrepancy]) -> String {
    if issues.is_empty() {
        return "Decision table and change-point table agree.\n".to_string();
    }

    let mut out = format!("{} disagreement(s) between decision and change-point tables:\n", issues.len());
    for d in issues {
        out.push_str(&format!(
            "  {} {:<8} decision={:>6.2} change_points={:>6}\n",
            d.date,
            d.kind.id(),
            d.decision_value,
            fmt_cell(d.change_point_value),
        ));
    }
    out
}

/// One-line summary of a policy decision.
pub fn format_latest_decision(d: &DecisionSnapshot) -> String {
    format!(
        "Last decision {}: deposit {:.2}% | refi {:.2}% | lending {:.2}%",
        d.date, d.deposit_facility, d.main_refinancing, d.marginal_lending
    )
}

/// `2.15%`, or `-` when there is no value.
pub fn fmt_rate(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}%")).unwrap_or_else(|| "-".to_string())
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::decisions::decisions;
    use crate::domain::{DataSource, Trend, YearBucket};

    fn series() -> RateSeries {
        let mut b2024 = YearBucket::empty(2024);
        b2024.values = vec![Some(4.5); 12];
        let mut b2025 = YearBucket::empty(2025);
        b2025.values[0] = Some(3.15);
        b2025.values[1] = Some(2.9);
        RateSeries {
            kind: SeriesKind::MarginalLending,
            label: SeriesKind::MarginalLending.label().to_string(),
            buckets: vec![b2024, b2025],
            source: DataSource::Remote,
        }
    }

    #[test]
    fn year_table_is_newest_first_with_absent_cells() {
        let table = format_year_table(&series(), None);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("Marginal Lending Rate (lending, ECB Data Portal)"));
        assert!(lines[1].contains("Jan") && lines[1].ends_with("Dec"));
        assert!(lines[3].starts_with("2025"));
        assert!(lines[3].contains("3.15") && lines[3].ends_with('-'));
        assert!(lines[4].starts_with("2024"));
    }

    #[test]
    fn latest_decision_line_lists_all_three_rates() {
        let latest = crate::data::decisions::latest_decision().unwrap();
        assert_eq!(
            format_latest_decision(&latest),
            "Last decision 2025-06-11: deposit 2.00% | refi 2.15% | lending 2.40%"
        );
    }

    #[test]
    fn year_table_can_show_a_single_year() {
        let table = format_year_table(&series(), Some(2024));
        assert!(table.contains("2024"));
        assert!(!table.lines().any(|l| l.starts_with("2025")));
    }

    #[test]
    fn cards_show_value_trend_and_source() {
        let s = series();
        let mut all = BTreeMap::new();
        all.insert(s.kind, s.clone());
        let mut current = BTreeMap::new();
        current.insert(
            s.kind,
            CurrentRate {
                value: Some(2.9),
                trend: Trend::Decreasing,
                as_of: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            },
        );
        let cards = format_rate_cards(&all, &current);
        assert!(cards.contains("Marginal Lending Rate"));
        assert!(cards.contains("2.90%"));
        assert!(cards.contains("↘ Decreasing"));
        assert!(cards.contains("[down]"));
        assert!(cards.contains("as of 2025-03-01"));
        assert!(!cards.contains("Deposit Facility"));
    }

    #[test]
    fn decisions_table_single_rate() {
        let table = format_decisions(&decisions(), Some(SeriesKind::DepositFacility));
        assert!(table.lines().nth(2).unwrap().starts_with("2025-06-11"));
        assert!(table.contains("-0.50"));
    }

    #[test]
    fn rate_formatting() {
        assert_eq!(fmt_rate(Some(2.0)), "2.00%");
        assert_eq!(fmt_rate(Some(-0.5)), "-0.50%");
        assert_eq!(fmt_rate(None), "-");
    }

    #[test]
    fn empty_discrepancy_list_reports_agreement() {
        assert!(format_discrepancies(&[]).contains("agree"));
    }
}
