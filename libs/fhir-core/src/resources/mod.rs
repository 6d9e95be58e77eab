//! Top-level records

pub mod observation;

pub use observation::*;
