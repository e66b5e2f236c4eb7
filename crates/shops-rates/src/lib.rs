//! Conversion rate module for the shops gateway.
//!
//! The payment processor treats USD-to-native conversion as an opaque rate
//! lookup supplied by an external collaborator. This crate provides the
//! lookup trait and its implementations: a spot quote over AMM pair
//! reserves, and a fixed rational rate for development and testing.

use alloy_primitives::U256;
use async_trait::async_trait;
use shops_types::ImplementationRegistry;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod fixed;
	pub mod pair;
}

/// Errors that can occur during rate lookups.
#[derive(Debug, Error)]
pub enum RateError {
	/// The source has no liquidity to quote against.
	#[error("no liquidity available for quoting")]
	NoLiquidity,
	/// The quoted native value does not fit the amount range.
	#[error("conversion overflow for usd amount {0}")]
	Overflow(U256),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for rate source implementations.
///
/// Amounts on both sides are 18-decimal fixed point: USD-pegged units in,
/// native currency units out.
#[async_trait]
pub trait RateSource: Send + Sync {
	/// Quotes the native value corresponding to `usd_amount`.
	async fn native_for_usd(&self, usd_amount: U256) -> Result<U256, RateError>;
}

/// Type alias for rate source factory functions.
///
/// This is the function signature that all rate source implementations must
/// provide to create instances of their interface.
pub type RateSourceFactory = fn(&toml::Value) -> Result<Box<dyn RateSource>, RateError>;

/// Registry trait for rate source implementations.
pub trait RateSourceRegistry: ImplementationRegistry<Factory = RateSourceFactory> {}

/// Get all registered rate source implementations.
///
/// Returns a vector of (name, factory) tuples for all available rate
/// sources. This is used by the gateway builder to resolve the configured
/// primary implementation by name.
pub fn get_all_implementations() -> Vec<(&'static str, RateSourceFactory)> {
	use implementations::{fixed, pair};

	vec![
		(pair::Registry::NAME, pair::Registry::factory()),
		(fixed::Registry::NAME, fixed::Registry::factory()),
	]
}
