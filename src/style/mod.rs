//! Style resolution.

pub mod cascade;

pub use cascade::{ComputedStyle, ResolvedValue, ValueSource};
