//! Concrete data types built on the element layer

pub mod extension;
pub mod general;
pub mod meta;

pub use extension::*;
pub use general::*;
pub use meta::*;
