//! Fixed-rate source for development and testing.
//!
//! Quotes a constant rational rate `numerator / denominator` native units
//! per USD unit, with no external state.

use crate::{RateError, RateSource, RateSourceFactory, RateSourceRegistry};
use alloy_primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shops_types::ImplementationRegistry;

fn default_rate_part() -> String {
	"1".to_string()
}

/// Configuration for the fixed rate source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedRateConfig {
	/// Native units per `denominator` USD units.
	#[serde(default = "default_rate_part")]
	pub numerator: String,
	/// Denominator of the rate fraction.
	#[serde(default = "default_rate_part")]
	pub denominator: String,
}

/// Rate source with a constant rational rate.
pub struct FixedRateSource {
	numerator: U256,
	denominator: U256,
}

impl FixedRateSource {
	/// Creates the source. The denominator must be nonzero.
	pub fn new(numerator: U256, denominator: U256) -> Result<Self, RateError> {
		if denominator.is_zero() {
			return Err(RateError::Configuration(
				"fixed rate denominator must be nonzero".to_string(),
			));
		}
		Ok(Self {
			numerator,
			denominator,
		})
	}
}

#[async_trait]
impl RateSource for FixedRateSource {
	async fn native_for_usd(&self, usd_amount: U256) -> Result<U256, RateError> {
		let scaled = usd_amount
			.checked_mul(self.numerator)
			.ok_or(RateError::Overflow(usd_amount))?;
		Ok(scaled / self.denominator)
	}
}

/// Registry for the fixed rate source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "fixed";
	type Factory = RateSourceFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn RateSource>, RateError> {
			let fixed_config: FixedRateConfig = config
				.clone()
				.try_into()
				.map_err(|e| RateError::Configuration(format!("Invalid fixed config: {}", e)))?;
			let numerator = fixed_config.numerator.parse::<U256>().map_err(|e| {
				RateError::Configuration(format!("invalid numerator: {}", e))
			})?;
			let denominator = fixed_config.denominator.parse::<U256>().map_err(|e| {
				RateError::Configuration(format!("invalid denominator: {}", e))
			})?;
			Ok(Box::new(FixedRateSource::new(numerator, denominator)?))
		}
	}
}

impl RateSourceRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_constant_rate() {
		let source = FixedRateSource::new(U256::from(10), U256::from(1)).unwrap();
		assert_eq!(
			source.native_for_usd(U256::from(121)).await.unwrap(),
			U256::from(1210)
		);
	}

	#[tokio::test]
	async fn test_fractional_rate_rounds_down() {
		let source = FixedRateSource::new(U256::from(1), U256::from(3)).unwrap();
		assert_eq!(
			source.native_for_usd(U256::from(10)).await.unwrap(),
			U256::from(3)
		);
	}

	#[test]
	fn test_zero_denominator_rejected() {
		assert!(matches!(
			FixedRateSource::new(U256::from(1), U256::ZERO),
			Err(RateError::Configuration(_))
		));
	}

	#[tokio::test]
	async fn test_factory_defaults_to_unit_rate() {
		let config: toml::Value = toml::from_str("").unwrap();
		let source = Registry::factory()(&config).unwrap();
		assert_eq!(
			source.native_for_usd(U256::from(7)).await.unwrap(),
			U256::from(7)
		);
	}
}
