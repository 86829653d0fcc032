//! Partition monthly observations into calendar-year buckets.

use crate::domain::{MonthlyObservation, YearBucket};
use crate::error::RateError;

/// How incomplete years are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    /// Every year must hold all twelve months.
    Strict,
    /// The final year may stop early; its missing months are absent.
    ///
    /// Used for remote data, which covers the current year only up to the
    /// latest published month.
    TolerantTrailing,
}

/// Group observations by year, preserving the order in which years first appear.
pub fn group_by_year(
    observations: &[MonthlyObservation],
    mode: GroupingMode,
) -> Result<Vec<YearBucket>, RateError> {
    let mut buckets: Vec<YearBucket> = Vec::new();
    let mut filled: Vec<[bool; 12]> = Vec::new();

    for obs in observations {
        let slot = obs.month_index as usize;
        if slot >= 12 {
            return Err(RateError::IncompleteYear {
                year: obs.year,
                months: 0,
            });
        }

        let idx = match buckets.iter().position(|b| b.year == obs.year) {
            Some(idx) => idx,
            None => {
                buckets.push(YearBucket::empty(obs.year));
                filled.push([false; 12]);
                buckets.len() - 1
            }
        };

        if filled[idx][slot] {
            // A repeated month means the year cannot hold 12 distinct months.
            let months = filled[idx].iter().filter(|f| **f).count();
            return Err(RateError::IncompleteYear {
                year: obs.year,
                months,
            });
        }
        filled[idx][slot] = true;
        buckets[idx].values[slot] = obs.value;
    }

    let last = buckets.len().saturating_sub(1);
    for (idx, (bucket, months)) in buckets.iter().zip(&filled).enumerate() {
        let count = months.iter().filter(|f| **f).count();
        if count == 12 {
            continue;
        }
        let tolerated = mode == GroupingMode::TolerantTrailing && idx == last && is_prefix(months);
        if !tolerated {
            return Err(RateError::IncompleteYear {
                year: bucket.year,
                months: count,
            });
        }
    }

    Ok(buckets)
}

/// Re-flatten buckets into monthly observations, January to December per bucket.
pub fn flatten(buckets: &[YearBucket]) -> Vec<MonthlyObservation> {
    buckets
        .iter()
        .flat_map(|b| {
            b.values.iter().enumerate().map(move |(i, v)| MonthlyObservation {
                year: b.year,
                month_index: i as u32,
                value: *v,
            })
        })
        .collect()
}

/// True when the filled months are exactly January..=k for some k.
fn is_prefix(months: &[bool; 12]) -> bool {
    let count = months.iter().filter(|f| **f).count();
    months.iter().take(count).all(|f| *f)
}
