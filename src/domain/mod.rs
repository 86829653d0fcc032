//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical rate identifier (`SeriesKind`)
//! - raw and derived series shapes (`ChangePoint`, `MonthlyObservation`, `YearBucket`, `RateSeries`)
//! - derived card outputs (`Trend`, `CurrentRate`)

pub mod types;

pub use types::*;
