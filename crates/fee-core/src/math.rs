//! Exact integer helpers shared by tip estimation and base fee projection.
//!
//! Intermediate products are formed in a wider type so that no 256-bit
//! amount can overflow before the division brings it back into range.

use alloy_primitives::{Uint, U256, U512};

/// Computes `value * numerator / denominator`, rounding half-up.
///
/// Results that do not fit in 256 bits saturate at `U256::MAX`.
pub(crate) fn mul_div_round_half_up(value: U256, numerator: U256, denominator: U256) -> U256 {
	debug_assert!(!denominator.is_zero());
	let product = U512::from(value) * U512::from(numerator);
	let denominator = U512::from(denominator);
	let two = U512::from(2u8);
	let rounded = (product * two + denominator) / (denominator * two);
	U256::saturating_from(rounded)
}

/// Unsigned integer wide enough for `U256::MAX * 9^n` at every projection
/// horizon whose result can still fit in 256 bits.
pub(crate) type WideUint = Uint<5120, 80>;

/// Computes `ceil(value * numerator / denominator)` with a wide numerator
/// and denominator.
///
/// Results that do not fit in 256 bits saturate at `U256::MAX`, as does a
/// product that overflows the wide type.
pub(crate) fn mul_div_ceil(value: U256, numerator: WideUint, denominator: WideUint) -> U256 {
	debug_assert!(!denominator.is_zero());
	let Some(product) = WideUint::from(value).checked_mul(numerator) else {
		return U256::MAX;
	};
	let quotient = product / denominator;
	let rounded = if (product % denominator).is_zero() {
		quotient
	} else {
		quotient + WideUint::from(1u8)
	};
	U256::saturating_from(rounded)
}
