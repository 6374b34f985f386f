//! String formatting utilities.
//!
//! Provides hex prefix stripping and fixed-point rendering of integer
//! amounts for display.

use alloy_primitives::U256;

/// Removes "0x" prefix from a hex string if present.
///
/// This function removes the "0x" or "0X" prefix from a hex string if present,
/// returning the hex string without prefix.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Formats an integer amount as a decimal number with `decimals` places.
///
/// Trailing zeros of the fractional part are dropped, so one gwei expressed
/// in wei with 9 decimals renders as "1" and 1.5 gwei as "1.5".
///
/// # Arguments
///
/// * `amount` - The raw integer amount
/// * `decimals` - Position of the decimal point counted from the right
pub fn format_units(amount: U256, decimals: u8) -> String {
	let amount = amount.to_string();
	if decimals == 0 {
		return amount;
	}

	let decimal_places = decimals as usize;

	let (integer_part, decimal_part) = if amount.len() <= decimal_places {
		// Pad with leading zeros
		let decimal_str = format!("{:0>width$}", amount, width = decimal_places);
		("0".to_string(), decimal_str)
	} else {
		let split_pos = amount.len() - decimal_places;
		(
			amount[..split_pos].to_string(),
			amount[split_pos..].to_string(),
		)
	};

	let decimal_trimmed = decimal_part.trim_end_matches('0');

	if decimal_trimmed.is_empty() {
		integer_part
	} else {
		format!("{}.{}", integer_part, decimal_trimmed)
	}
}
