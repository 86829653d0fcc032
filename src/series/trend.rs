//! Trend of the latest rate move.

use crate::domain::{Trend, YearBucket};

/// Classify the latest observation against the one before it.
///
/// `buckets` must be ordered ascending by year. The latest value is the last
/// known month of the final bucket; the previous value is the nearest earlier
/// known month in that bucket, else the last known month of the bucket before.
/// Comparison is exact: values that differ only by floating-point
/// representation error are not treated as equal.
pub fn compute_trend(buckets: &[YearBucket]) -> Trend {
    let Some(current) = buckets.last() else {
        return Trend::Indeterminate;
    };
    let Some((latest_idx, latest)) = current.last_known() else {
        return Trend::Indeterminate;
    };

    let previous = current.values[..latest_idx]
        .iter()
        .rev()
        .find_map(|v| *v)
        .or_else(|| {
            buckets
                .len()
                .checked_sub(2)
                .and_then(|i| buckets[i].last_known())
                .map(|(_, v)| v)
        });

    let Some(previous) = previous else {
        return Trend::Indeterminate;
    };

    if latest > previous {
        Trend::Increasing
    } else if latest < previous {
        Trend::Decreasing
    } else {
        Trend::NoChange
    }
}

/// Latest known value across all buckets (most recent year first).
pub fn latest_value(buckets: &[YearBucket]) -> Option<f64> {
    buckets
        .iter()
        .rev()
        .find_map(|b| b.last_known())
        .map(|(_, v)| v)
}
