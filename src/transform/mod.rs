//! Column transforms applied to the cleaned table in place.

pub mod normalize;

pub use normalize::*;
