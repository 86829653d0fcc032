//! Reporting utilities: rate cards, year tables and decision listings.

pub mod format;

pub use format::*;
