//! Terminal plotting (ASCII step charts).

pub mod ascii;

pub use ascii::*;
