//! Currency unit helpers.

use super::formatting::format_units;
use alloy_primitives::U256;

/// Number of wei in one gwei.
pub const GWEI: u64 = 1_000_000_000;

/// Decimal places shown when rendering gwei values.
const GWEI_DISPLAY_DECIMALS: u64 = 6;

/// Renders a wei amount in gwei, rounded half-up to six decimal places.
pub fn format_gwei(wei: U256) -> String {
	// 9 gwei decimals minus the 6 we keep
	let step = U256::from(10u64.pow(9 - GWEI_DISPLAY_DECIMALS as u32));
	let half = step / U256::from(2u64);
	let rounded = wei.saturating_add(half) / step;
	format_units(rounded, GWEI_DISPLAY_DECIMALS as u8)
}
