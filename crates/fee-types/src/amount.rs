//! Fee amounts and normalization of node-returned numeric values.
//!
//! Nodes and client libraries disagree on how a quantity is encoded: plain
//! JSON integers, `0x`-prefixed hex strings, decimal strings or raw
//! big-endian byte strings. All of those are funnelled through [`normalize`]
//! so the rest of the estimator only ever sees exact [`WeiAmount`] values.

use crate::utils::without_0x_prefix;
use alloy_primitives::{Bytes, U256};

/// An exact, non-negative quantity in the smallest currency unit.
pub type WeiAmount = U256;

/// A numeric value as received from the node, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFeeSample {
	/// An unsigned integer that is already exact.
	Integer(U256),
	/// A signed integer, as produced by JSON numbers or loose client libraries.
	Signed(i128),
	/// A textual value, either `0x`-prefixed hexadecimal or base-10.
	Text(String),
	/// A big-endian unsigned integer in raw byte form.
	Bytes(Bytes),
	/// The value was missing or of an unusable shape.
	Absent,
}

/// Converts a raw node value into an exact wei amount.
///
/// Returns `None` when the value is absent, malformed, fractional or
/// negative. This never fails loudly: a missing value is a normal outcome
/// that callers treat as "signal unavailable".
pub fn normalize(value: &RawFeeSample) -> Option<WeiAmount> {
	match value {
		RawFeeSample::Integer(v) => Some(*v),
		RawFeeSample::Signed(v) => u128::try_from(*v).ok().map(U256::from),
		RawFeeSample::Text(s) => parse_text(s),
		RawFeeSample::Bytes(b) => parse_be_bytes(b),
		RawFeeSample::Absent => None,
	}
}

fn parse_text(raw: &str) -> Option<WeiAmount> {
	let s = raw.trim();
	let has_prefix = s.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("0x"));

	if has_prefix {
		let digits = without_0x_prefix(s);
		if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
			return None;
		}
		U256::from_str_radix(digits, 16).ok()
	} else {
		if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
			return None;
		}
		U256::from_str_radix(s, 10).ok()
	}
}

fn parse_be_bytes(bytes: &[u8]) -> Option<WeiAmount> {
	// Leading zero bytes carry no value, so only the significant tail has to fit.
	let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
	let significant = &bytes[first..];
	if significant.len() > 32 {
		return None;
	}
	if significant.is_empty() {
		return Some(U256::ZERO);
	}
	Some(U256::from_be_slice(significant))
}

impl From<U256> for RawFeeSample {
	fn from(value: U256) -> Self {
		RawFeeSample::Integer(value)
	}
}

impl From<u64> for RawFeeSample {
	fn from(value: u64) -> Self {
		RawFeeSample::Integer(U256::from(value))
	}
}

impl From<i64> for RawFeeSample {
	fn from(value: i64) -> Self {
		RawFeeSample::Signed(value as i128)
	}
}

impl From<&str> for RawFeeSample {
	fn from(value: &str) -> Self {
		RawFeeSample::Text(value.to_string())
	}
}

impl From<String> for RawFeeSample {
	fn from(value: String) -> Self {
		RawFeeSample::Text(value)
	}
}

impl From<Vec<u8>> for RawFeeSample {
	fn from(value: Vec<u8>) -> Self {
		RawFeeSample::Bytes(Bytes::from(value))
	}
}

impl From<Bytes> for RawFeeSample {
	fn from(value: Bytes) -> Self {
		RawFeeSample::Bytes(value)
	}
}

impl<T: Into<RawFeeSample>> From<Option<T>> for RawFeeSample {
	fn from(value: Option<T>) -> Self {
		value.map_or(RawFeeSample::Absent, Into::into)
	}
}

/// Maps a JSON value onto a raw sample.
///
/// Integer literals above `u64::MAX` are parsed by `serde_json` as floats and
/// have already lost precision, so they map to [`RawFeeSample::Absent`] like
/// any other float. Large quantities are expected as hex strings.
impl From<&serde_json::Value> for RawFeeSample {
	fn from(value: &serde_json::Value) -> Self {
		match value {
			serde_json::Value::String(s) => RawFeeSample::Text(s.clone()),
			serde_json::Value::Number(n) => {
				if let Some(v) = n.as_u64() {
					RawFeeSample::Integer(U256::from(v))
				} else if let Some(v) = n.as_i64() {
					RawFeeSample::Signed(v as i128)
				} else {
					// Floating point numbers are never exact amounts.
					RawFeeSample::Absent
				}
			},
			_ => RawFeeSample::Absent,
		}
	}
}

impl From<serde_json::Value> for RawFeeSample {
	fn from(value: serde_json::Value) -> Self {
		RawFeeSample::from(&value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_integer_passthrough() {
		let value = U256::from(1_500_000_000u64);
		assert_eq!(normalize(&value.into()), Some(value));
		assert_eq!(normalize(&RawFeeSample::from(0u64)), Some(U256::ZERO));
	}

	#[test]
	fn test_hex_and_decimal_strings() {
		assert_eq!(
			normalize(&"0x3b9aca00".into()),
			Some(U256::from(1_000_000_000u64))
		);
		assert_eq!(
			normalize(&"0X3B9ACA00".into()),
			Some(U256::from(1_000_000_000u64))
		);
		assert_eq!(
			normalize(&"1000000000".into()),
			Some(U256::from(1_000_000_000u64))
		);
		assert_eq!(normalize(&" 42 ".into()), Some(U256::from(42u64)));
	}

	#[test]
	fn test_malformed_strings_are_absent() {
		assert_eq!(normalize(&"0x".into()), None);
		assert_eq!(normalize(&"".into()), None);
		assert_eq!(normalize(&"0xzz".into()), None);
		assert_eq!(normalize(&"12.5".into()), None);
		assert_eq!(normalize(&"-7".into()), None);
		assert_eq!(normalize(&"1_000".into()), None);
		assert_eq!(normalize(&"gwei".into()), None);
	}

	#[test]
	fn test_overflowing_string_is_absent() {
		let too_big = format!("0x1{}", "0".repeat(64));
		assert_eq!(normalize(&too_big.into()), None);
	}

	#[test]
	fn test_big_endian_bytes() {
		assert_eq!(
			normalize(&vec![0x3b, 0x9a, 0xca, 0x00].into()),
			Some(U256::from(1_000_000_000u64))
		);
		assert_eq!(normalize(&Vec::<u8>::new().into()), Some(U256::ZERO));

		// Leading zero padding beyond 32 bytes is still a valid amount.
		let mut padded = vec![0u8; 40];
		padded[39] = 7;
		assert_eq!(normalize(&padded.into()), Some(U256::from(7u64)));

		assert_eq!(normalize(&vec![1u8; 33].into()), None);
	}

	#[test]
	fn test_negative_and_absent() {
		assert_eq!(normalize(&RawFeeSample::from(-1i64)), None);
		assert_eq!(normalize(&RawFeeSample::from(5i64)), Some(U256::from(5u64)));
		assert_eq!(normalize(&RawFeeSample::Absent), None);
		assert_eq!(normalize(&RawFeeSample::from(None::<u64>)), None);
	}

	#[test]
	fn test_json_values() {
		assert_eq!(
			normalize(&json!("0x2540be400").into()),
			Some(U256::from(10_000_000_000u64))
		);
		assert_eq!(normalize(&json!(12345).into()), Some(U256::from(12345u64)));
		assert_eq!(normalize(&json!(-3).into()), None);
		assert_eq!(normalize(&json!(1.5).into()), None);
		assert_eq!(normalize(&json!(null).into()), None);
		assert_eq!(normalize(&json!(["0x1"]).into()), None);
	}

	#[test]
	fn test_json_integer_beyond_u64_is_absent() {
		let max: serde_json::Value = serde_json::from_str("18446744073709551615").unwrap();
		assert_eq!(normalize(&max.into()), Some(U256::from(u64::MAX)));

		let beyond: serde_json::Value = serde_json::from_str("18446744073709551616").unwrap();
		assert_eq!(normalize(&beyond.into()), None);
		// The same quantity as a hex string stays exact
		assert_eq!(
			normalize(&json!("0x10000000000000000").into()),
			Some(U256::from(u64::MAX) + U256::from(1u64))
		);
	}

	#[test]
	fn test_normalize_is_idempotent() {
		let inputs: Vec<RawFeeSample> = vec![
			"0xde0b6b3a7640000".into(),
			"987654321".into(),
			vec![0x01, 0x00].into(),
			U256::MAX.into(),
		];
		for input in inputs {
			let once = normalize(&input).unwrap();
			let twice = normalize(&once.into()).unwrap();
			assert_eq!(once, twice);
		}
	}
}
