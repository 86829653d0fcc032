//! Compiled-in change-point tables for the three ECB key rates.
//!
//! Each row is `(year, month, day, value)`: the rate in force from that date
//! until the next row. Values are percentages and may be negative.

use chrono::NaiveDate;

use crate::domain::{ChangePoint, SeriesKind};
use crate::error::RateError;

const REFI_CHANGES: &[(i32, u32, u32, f64)] = &[
    (1999, 1, 1, 3.00),
    (1999, 4, 1, 2.50),
    (1999, 11, 1, 2.00),
    (2000, 2, 1, 3.00),
    (2001, 5, 1, 4.75),
    (2001, 9, 1, 4.25),
    (2001, 11, 1, 3.75),
    (2002, 12, 1, 2.75),
    (2003, 6, 1, 2.00),
    (2005, 12, 1, 2.25),
    (2006, 3, 1, 2.50),
    (2006, 6, 1, 2.75),
    (2006, 8, 1, 3.00),
    (2006, 10, 1, 3.25),
    (2006, 12, 1, 3.50),
    (2007, 3, 1, 3.75),
    (2007, 6, 1, 4.00),
    (2008, 7, 1, 4.25),
    (2008, 10, 1, 3.75),
    (2008, 11, 1, 3.25),
    (2008, 12, 1, 2.50),
    (2009, 1, 1, 2.00),
    (2009, 3, 1, 1.50),
    (2009, 4, 1, 1.25),
    (2009, 5, 1, 1.00),
    (2011, 4, 1, 1.25),
    (2011, 7, 1, 1.50),
    (2011, 11, 1, 1.25),
    (2011, 12, 1, 1.00),
    (2012, 7, 1, 0.75),
    (2013, 5, 1, 0.50),
    (2013, 11, 1, 0.25),
    (2014, 9, 1, 0.05),
    (2016, 3, 1, 0.00),
    (2022, 7, 1, 0.50),
    (2022, 9, 1, 1.25),
    (2022, 10, 1, 2.00),
    (2022, 11, 1, 2.50),
    (2023, 2, 1, 3.00),
    (2023, 3, 1, 3.50),
    (2023, 4, 1, 3.75),
    (2023, 5, 1, 4.00),
    (2023, 6, 1, 4.25),
    (2023, 9, 1, 4.50),
    (2024, 1, 1, 4.25),
    (2025, 3, 1, 2.65),
    (2025, 4, 1, 2.40),
    (2025, 6, 1, 2.15),
];

const DEPOSIT_CHANGES: &[(i32, u32, u32, f64)] = &[
    (1999, 1, 1, 2.00),
    (1999, 4, 1, 1.50),
    (1999, 11, 1, 1.00),
    (2000, 2, 1, 2.00),
    (2001, 5, 1, 3.75),
    (2001, 9, 1, 3.25),
    (2001, 11, 1, 2.75),
    (2002, 12, 1, 1.75),
    (2003, 6, 1, 1.00),
    (2005, 12, 1, 1.25),
    (2006, 3, 1, 1.50),
    (2006, 6, 1, 1.75),
    (2006, 8, 1, 2.00),
    (2006, 10, 1, 2.25),
    (2006, 12, 1, 2.50),
    (2007, 3, 1, 2.75),
    (2007, 6, 1, 3.00),
    (2008, 7, 1, 3.25),
    (2008, 10, 1, 2.75),
    (2008, 11, 1, 2.25),
    (2008, 12, 1, 2.00),
    (2009, 1, 1, 1.50),
    (2009, 3, 1, 1.00),
    (2009, 4, 1, 0.75),
    (2009, 5, 1, 0.50),
    (2011, 4, 1, 0.75),
    (2011, 7, 1, 1.00),
    (2011, 11, 1, 0.75),
    (2011, 12, 1, 0.50),
    (2012, 7, 1, 0.25),
    (2013, 5, 1, 0.00),
    (2014, 9, 1, -0.10),
    (2015, 12, 1, -0.30),
    (2016, 3, 1, -0.40),
    (2019, 9, 1, -0.50),
    (2022, 7, 1, 0.00),
    (2022, 9, 1, 0.75),
    (2022, 10, 1, 1.50),
    (2022, 11, 1, 2.00),
    (2023, 2, 1, 2.50),
    (2023, 3, 1, 3.00),
    (2023, 4, 1, 3.25),
    (2023, 5, 1, 3.75),
    (2023, 6, 1, 4.00),
    (2024, 1, 1, 4.00),
    (2025, 3, 1, 2.25),
    (2025, 4, 1, 2.00),
    (2025, 6, 1, 2.00),
];

const LENDING_CHANGES: &[(i32, u32, u32, f64)] = &[
    (1999, 1, 1, 4.50),
    (1999, 4, 1, 4.00),
    (1999, 11, 1, 3.00),
    (2000, 2, 1, 4.50),
    (2001, 5, 1, 5.50),
    (2001, 9, 1, 5.25),
    (2001, 11, 1, 4.75),
    (2002, 12, 1, 3.75),
    (2003, 6, 1, 3.00),
    (2005, 12, 1, 3.25),
    (2006, 3, 1, 3.50),
    (2006, 6, 1, 3.75),
    (2006, 8, 1, 4.00),
    (2006, 10, 1, 4.25),
    (2006, 12, 1, 4.50),
    (2007, 3, 1, 4.75),
    (2007, 6, 1, 5.00),
    (2008, 7, 1, 5.25),
    (2008, 10, 1, 4.75),
    (2008, 11, 1, 4.25),
    (2008, 12, 1, 3.25),
    (2009, 1, 1, 2.75),
    (2009, 3, 1, 2.50),
    (2009, 4, 1, 2.25),
    (2009, 5, 1, 2.00),
    (2011, 4, 1, 2.00),
    (2011, 7, 1, 2.25),
    (2011, 11, 1, 2.00),
    (2011, 12, 1, 1.75),
    (2012, 7, 1, 1.50),
    (2013, 5, 1, 1.00),
    (2014, 9, 1, 0.30),
    (2015, 12, 1, 0.30),
    (2016, 3, 1, 0.25),
    (2019, 9, 1, 0.25),
    (2022, 7, 1, 0.75),
    (2022, 9, 1, 1.50),
    (2022, 10, 1, 2.25),
    (2022, 11, 1, 2.75),
    (2023, 2, 1, 3.25),
    (2023, 3, 1, 3.50),
    (2023, 4, 1, 4.00),
    (2023, 5, 1, 4.25),
    (2023, 6, 1, 4.50),
    (2023, 9, 1, 4.50),
    (2024, 1, 1, 4.50),
    (2025, 3, 1, 2.90),
    (2025, 4, 1, 2.65),
    (2025, 6, 1, 2.40),
];

fn table(kind: SeriesKind) -> &'static [(i32, u32, u32, f64)] {
    match kind {
        SeriesKind::MainRefinancing => REFI_CHANGES,
        SeriesKind::DepositFacility => DEPOSIT_CHANGES,
        SeriesKind::MarginalLending => LENDING_CHANGES,
    }
}

/// Ordered change points for a series.
pub fn change_points(kind: SeriesKind) -> Vec<ChangePoint> {
    table(kind)
        .iter()
        .filter_map(|&(y, m, d, value)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|effective_date| ChangePoint {
                effective_date,
                value,
            })
        })
        .collect()
}

/// Ordered change points for a series identified by string id.
///
/// Accepts both `refi`/`deposit`/`lending` and the camel-case aliases.
pub fn change_points_for(id: &str) -> Result<Vec<ChangePoint>, RateError> {
    let kind = id.parse::<SeriesKind>()?;
    Ok(change_points(kind))
}
