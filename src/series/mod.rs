//! Series derivation.
//!
//! Responsibilities:
//!
//! - forward-fill change points into dense monthly observations
//! - group monthly observations into calendar-year buckets
//! - classify the latest move (trend)

pub mod expand;
pub mod group;
pub mod trend;

pub use expand::*;
pub use group::*;
pub use trend::*;
