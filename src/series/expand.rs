//! Forward-fill change points into a dense monthly series.
//!
//! The result is a step function: a change taking effect anywhere within a
//! month is attributed to the whole month, and values are never interpolated
//! between two change points.

use chrono::NaiveDate;

use crate::domain::{ChangePoint, MonthlyObservation};
use crate::error::RateError;

/// Expand `change_points` (ascending by date) into one observation per month
/// of `[start_year, end_year]`.
pub fn expand(
    change_points: &[ChangePoint],
    start_year: i32,
    end_year: i32,
) -> Result<Vec<MonthlyObservation>, RateError> {
    let Some(first) = change_points.first() else {
        return Err(RateError::InsufficientData);
    };
    let range = RateError::InvalidRange {
        start: start_year,
        end: end_year,
    };
    let years = end_year
        .checked_sub(start_year)
        .and_then(|d| d.checked_add(1))
        .filter(|n| *n > 0)
        .ok_or(range.clone())?;
    if NaiveDate::from_ymd_opt(start_year, 1, 1).is_none() || NaiveDate::from_ymd_opt(end_year, 12, 1).is_none() {
        return Err(range);
    }

    let months = 12 * years as usize;
    let mut out = Vec::with_capacity(months);
    let mut cursor = 0usize;
    let mut current = first.value;

    for year in start_year..=end_year {
        for month_index in 0..12u32 {
            let month_start = NaiveDate::from_ymd_opt(year, month_index + 1, 1).ok_or(range.clone())?;
            while let Some(next) = change_points.get(cursor + 1) {
                if next.effective_date > month_start {
                    break;
                }
                cursor += 1;
                current = next.value;
            }
            out.push(MonthlyObservation {
                year,
                month_index,
                value: Some(current),
            });
        }
    }

    Ok(out)
}
