//! The immutable output of a fee estimation.

use crate::WeiAmount;
use serde::{Deserialize, Serialize};

/// Recommended EIP-1559 fee parameters, all in wei.
///
/// Serializes with the transaction field names wallets expect, with every
/// amount rendered as a decimal string so no precision is lost in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRecommendation {
	/// Base fee observed on the node when the estimate was taken.
	#[serde(rename = "baseFeePerGas", with = "decimal_string")]
	pub base_fee: WeiAmount,
	/// Priority fee to offer the block producer.
	#[serde(rename = "maxPriorityFeePerGas", with = "decimal_string")]
	pub tip: WeiAmount,
	/// Worst-case projected base fee plus the tip.
	#[serde(rename = "maxFeePerGas", with = "decimal_string")]
	pub max_fee: WeiAmount,
}

impl FeeRecommendation {
	/// Returns true when `max_fee` covers both the base fee and the tip.
	pub fn is_consistent(&self) -> bool {
		self.max_fee >= self.base_fee && self.max_fee >= self.tip
	}
}

mod decimal_string {
	use crate::WeiAmount;
	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &WeiAmount, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<WeiAmount, D::Error> {
		let s = String::deserialize(deserializer)?;
		WeiAmount::from_str_radix(&s, 10).map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;

	#[test]
	fn test_serializes_wire_names_as_strings() {
		let rec = FeeRecommendation {
			base_fee: U256::from(100_000_000_000u64),
			tip: U256::from(1_100_000_000u64),
			max_fee: U256::from(127_662_500_000u64),
		};
		let json = serde_json::to_value(rec).unwrap();
		assert_eq!(json["baseFeePerGas"], "100000000000");
		assert_eq!(json["maxPriorityFeePerGas"], "1100000000");
		assert_eq!(json["maxFeePerGas"], "127662500000");

		let back: FeeRecommendation = serde_json::from_value(json).unwrap();
		assert_eq!(back, rec);
		assert!(rec.is_consistent());
	}

	#[test]
	fn test_inconsistent_triple_detected() {
		let rec = FeeRecommendation {
			base_fee: U256::from(10u64),
			tip: U256::from(1u64),
			max_fee: U256::from(5u64),
		};
		assert!(!rec.is_consistent());
	}
}
