//! Flattened table of ECB policy rate decisions (newest first).
//!
//! This table is maintained independently from the change-point tables in
//! [`crate::data::store`] and records the actual announcement dates. The two
//! datasets do not always agree; [`check_consistency`] reports where they
//! diverge instead of reconciling them.

use chrono::NaiveDate;

use crate::data::store::change_points;
use crate::domain::{ChangePoint, DecisionSnapshot, SeriesKind};

/// `(year, month, day, deposit facility, main refinancing, marginal lending)`.
const DECISIONS: &[(i32, u32, u32, f64, f64, f64)] = &[
    (2025, 6, 11, 2.00, 2.15, 2.40),
    (2025, 4, 23, 2.25, 2.40, 2.65),
    (2025, 3, 12, 2.50, 2.65, 2.90),
    (2025, 2, 5, 2.75, 2.90, 3.15),
    (2024, 12, 18, 3.00, 3.15, 3.40),
    (2024, 10, 23, 3.25, 3.40, 3.65),
    (2024, 9, 18, 3.50, 3.65, 3.90),
    (2024, 6, 12, 3.75, 4.25, 4.50),
    (2023, 9, 20, 4.00, 4.50, 4.75),
    (2023, 8, 2, 3.75, 4.25, 4.50),
    (2023, 6, 21, 3.50, 4.00, 4.25),
    (2023, 5, 10, 3.25, 3.75, 4.00),
    (2023, 3, 22, 3.00, 3.50, 3.75),
    (2023, 2, 8, 2.50, 3.00, 3.25),
    (2022, 12, 21, 2.00, 2.50, 2.75),
    (2022, 11, 2, 1.50, 2.00, 2.25),
    (2022, 9, 14, 0.75, 1.25, 1.50),
    (2022, 7, 27, 0.00, 0.50, 0.75),
    (2019, 9, 18, -0.50, 0.00, 0.25),
];

/// All decision snapshots, newest first.
pub fn decisions() -> Vec<DecisionSnapshot> {
    DECISIONS
        .iter()
        .filter_map(|&(y, m, d, deposit, refi, lending)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| DecisionSnapshot {
                date,
                deposit_facility: deposit,
                main_refinancing: refi,
                marginal_lending: lending,
            })
        })
        .collect()
}

/// Most recent decision snapshot.
pub fn latest_decision() -> Option<DecisionSnapshot> {
    decisions().into_iter().next()
}

/// Value in force on `date` according to ascending change points.
pub fn value_at(points: &[ChangePoint], date: NaiveDate) -> Option<f64> {
    points
        .iter()
        .take_while(|p| p.effective_date <= date)
        .last()
        .map(|p| p.value)
}

/// A decision whose rate differs from the change-point table on the same date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discrepancy {
    pub date: NaiveDate,
    pub kind: SeriesKind,
    pub decision_value: f64,
    pub change_point_value: Option<f64>,
}

/// Compare every decision against the change-point table for `kinds`.
pub fn check_consistency(kinds: &[SeriesKind]) -> Vec<Discrepancy> {
    let decisions = decisions();
    let mut out = Vec::new();
    for &kind in kinds {
        let points = change_points(kind);
        for d in &decisions {
            let decision_value = d.value(kind);
            let change_point_value = value_at(&points, d.date);
            if change_point_value != Some(decision_value) {
                out.push(Discrepancy {
                    date: d.date,
                    kind,
                    decision_value,
                    change_point_value,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn table_is_newest_first() {
        let all = decisions();
        assert_eq!(all.len(), DECISIONS.len());
        for pair in all.windows(2) {
            assert!(pair[0].date > pair[1].date);
        }
        let latest = latest_decision().unwrap();
        assert_eq!(latest.date, date(2025, 6, 11));
        assert_eq!(latest.value(SeriesKind::DepositFacility), 2.00);
        assert_eq!(latest.value(SeriesKind::MainRefinancing), 2.15);
        assert_eq!(latest.value(SeriesKind::MarginalLending), 2.40);
    }

    #[test]
    fn value_at_uses_step_lookup() {
        let points = change_points(SeriesKind::MainRefinancing);
        assert_eq!(value_at(&points, date(1998, 12, 31)), None);
        assert_eq!(value_at(&points, date(1999, 3, 31)), Some(3.00));
        assert_eq!(value_at(&points, date(1999, 4, 1)), Some(2.50));
    }

    #[test]
    fn tables_agree_on_latest_decision() {
        let issues = check_consistency(&SeriesKind::ALL);
        assert!(issues.iter().all(|d| d.date != date(2025, 6, 11)));
    }

    #[test]
    fn disagreements_are_reported_not_reconciled() {
        // The change-point table holds refi at 4.25 through 2024 while the
        // decision table records the September 2024 cut to 3.65.
        let issues = check_consistency(&[SeriesKind::MainRefinancing]);
        let sept = issues
            .iter()
            .find(|d| d.date == date(2024, 9, 18))
            .expect("september 2024 discrepancy");
        assert_eq!(sept.decision_value, 3.65);
        assert_eq!(sept.change_point_value, Some(4.25));
        assert!(issues.iter().all(|d| d.kind == SeriesKind::MainRefinancing));
    }
}
