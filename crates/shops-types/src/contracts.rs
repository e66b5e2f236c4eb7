//! Logical contract codes resolved through the registry.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Logical identifier bound to a deployed contract address in the registry.
///
/// Codes are stable names, not addresses: several codes may resolve to the
/// same address, and rebinding a code silently overwrites the previous
/// binding. The enumeration is closed; collaborators outside it are not
/// resolvable. Serialized as the kebab-case name, so codes work both as
/// values and as table keys in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractCode {
	/// The shops manager contract.
	ShopsManager,
	/// The payment processor contract.
	PaymentProcessor,
	/// The shops pool contract.
	ShopsPool,
	/// The wrapped native token.
	WrappedNative,
	/// The AMM factory used to bootstrap the liquidity pair.
	AmmFactory,
	/// The AMM router.
	AmmRouter,
	/// The native/USD liquidity pair backing the conversion rate.
	AmmPair,
	/// The treasury receiving settled payments.
	Treasury,
}

impl ContractCode {
	/// Every code in the enumeration, in declaration order.
	pub const ALL: [ContractCode; 8] = [
		ContractCode::ShopsManager,
		ContractCode::PaymentProcessor,
		ContractCode::ShopsPool,
		ContractCode::WrappedNative,
		ContractCode::AmmFactory,
		ContractCode::AmmRouter,
		ContractCode::AmmPair,
		ContractCode::Treasury,
	];

	/// The configuration-file name of this code.
	pub fn as_str(self) -> &'static str {
		match self {
			ContractCode::ShopsManager => "shops-manager",
			ContractCode::PaymentProcessor => "payment-processor",
			ContractCode::ShopsPool => "shops-pool",
			ContractCode::WrappedNative => "wrapped-native",
			ContractCode::AmmFactory => "amm-factory",
			ContractCode::AmmRouter => "amm-router",
			ContractCode::AmmPair => "amm-pair",
			ContractCode::Treasury => "treasury",
		}
	}
}

impl std::fmt::Display for ContractCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when parsing an unrecognised contract code name.
#[derive(Debug, Error)]
#[error("unknown contract code: {0}")]
pub struct UnknownContractCode(pub String);

impl std::str::FromStr for ContractCode {
	type Err = UnknownContractCode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ContractCode::ALL
			.into_iter()
			.find(|code| code.as_str() == s)
			.ok_or_else(|| UnknownContractCode(s.to_string()))
	}
}

impl Serialize for ContractCode {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for ContractCode {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn test_str_round_trip() {
		for code in ContractCode::ALL {
			assert_eq!(ContractCode::from_str(code.as_str()).unwrap(), code);
		}
		assert!(ContractCode::from_str("escrow").is_err());
	}

	#[test]
	fn test_serde_kebab_names() {
		let json = serde_json::to_string(&ContractCode::PaymentProcessor).unwrap();
		assert_eq!(json, "\"payment-processor\"");
	}
}
