//! Spot-rate source backed by AMM pair reserves.
//!
//! Quotes `usd_amount * native_reserve / usd_reserve`, the pair's current
//! spot price. Reserves are cached behind a lock and refreshed out-of-band
//! by whatever component watches the pair; the processor only ever reads.

use crate::{RateError, RateSource, RateSourceFactory, RateSourceRegistry};
use alloy_primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shops_types::ImplementationRegistry;
use tokio::sync::RwLock;

/// Configuration for the pair rate source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairRateConfig {
	/// Native-side reserve, 18-decimal fixed point, decimal or 0x-hex string.
	pub native_reserve: String,
	/// USD-side reserve, 18-decimal fixed point, decimal or 0x-hex string.
	pub usd_reserve: String,
}

/// Current reserves of the native/USD pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReserves {
	pub native: U256,
	pub usd: U256,
}

/// Rate source quoting at the pair's spot price.
pub struct PairRateSource {
	reserves: RwLock<PairReserves>,
}

impl PairRateSource {
	/// Creates the source with the given starting reserves.
	pub fn new(reserves: PairReserves) -> Self {
		Self {
			reserves: RwLock::new(reserves),
		}
	}

	/// Replaces the cached reserves with fresh pair state.
	pub async fn sync_reserves(&self, native: U256, usd: U256) {
		let mut reserves = self.reserves.write().await;
		*reserves = PairReserves { native, usd };
		tracing::debug!(native = %native, usd = %usd, "Synced pair reserves");
	}
}

#[async_trait]
impl RateSource for PairRateSource {
	async fn native_for_usd(&self, usd_amount: U256) -> Result<U256, RateError> {
		let reserves = self.reserves.read().await;
		if reserves.usd.is_zero() || reserves.native.is_zero() {
			return Err(RateError::NoLiquidity);
		}
		let scaled = usd_amount
			.checked_mul(reserves.native)
			.ok_or(RateError::Overflow(usd_amount))?;
		Ok(scaled / reserves.usd)
	}
}

fn parse_reserve(field: &str, value: &str) -> Result<U256, RateError> {
	value.parse::<U256>().map_err(|e| {
		RateError::Configuration(format!("invalid {} value '{}': {}", field, value, e))
	})
}

/// Registry for the pair rate source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "pair";
	type Factory = RateSourceFactory;

	fn factory() -> Self::Factory {
		|config: &toml::Value| -> Result<Box<dyn RateSource>, RateError> {
			let pair_config: PairRateConfig = config
				.clone()
				.try_into()
				.map_err(|e| RateError::Configuration(format!("Invalid pair config: {}", e)))?;
			let reserves = PairReserves {
				native: parse_reserve("native_reserve", &pair_config.native_reserve)?,
				usd: parse_reserve("usd_reserve", &pair_config.usd_reserve)?,
			};
			Ok(Box::new(PairRateSource::new(reserves)))
		}
	}
}

impl RateSourceRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn eth(units: u64) -> U256 {
		U256::from(units) * U256::from(10).pow(U256::from(18))
	}

	#[tokio::test]
	async fn test_spot_quote_from_seed_liquidity() {
		// The bootstrap liquidity: 1,000,000 native against 100,000 USD,
		// i.e. ten native units per USD unit.
		let source = PairRateSource::new(PairReserves {
			native: eth(1_000_000),
			usd: eth(100_000),
		});

		assert_eq!(source.native_for_usd(eth(121)).await.unwrap(), eth(1210));
		assert_eq!(source.native_for_usd(U256::ZERO).await.unwrap(), U256::ZERO);
	}

	#[tokio::test]
	async fn test_empty_reserves_refuse_to_quote() {
		let source = PairRateSource::new(PairReserves {
			native: U256::ZERO,
			usd: U256::ZERO,
		});
		assert!(matches!(
			source.native_for_usd(eth(1)).await,
			Err(RateError::NoLiquidity)
		));
	}

	#[tokio::test]
	async fn test_sync_reserves_moves_the_quote() {
		let source = PairRateSource::new(PairReserves {
			native: eth(1_000_000),
			usd: eth(100_000),
		});
		assert_eq!(source.native_for_usd(eth(1)).await.unwrap(), eth(10));

		source.sync_reserves(eth(500_000), eth(100_000)).await;
		assert_eq!(source.native_for_usd(eth(1)).await.unwrap(), eth(5));
	}

	#[tokio::test]
	async fn test_factory_parses_reserves() {
		let config: toml::Value = toml::from_str(
			r#"
			native_reserve = "1000000000000000000000000"
			usd_reserve = "100000000000000000000000"
			"#,
		)
		.unwrap();

		let source = Registry::factory()(&config).unwrap();
		assert_eq!(source.native_for_usd(eth(121)).await.unwrap(), eth(1210));
	}

	#[test]
	fn test_factory_rejects_garbage() {
		let config: toml::Value = toml::from_str(
			r#"
			native_reserve = "not-a-number"
			usd_reserve = "1"
			"#,
		)
		.unwrap();
		assert!(matches!(
			Registry::factory()(&config),
			Err(RateError::Configuration(_))
		));
	}
}
