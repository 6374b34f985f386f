//! Utility functions for unit conversion and display formatting.

pub mod formatting;
pub mod units;

pub use formatting::{format_units, without_0x_prefix};
pub use units::{format_gwei, GWEI};
