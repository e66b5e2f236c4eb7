//! Configuration loading for the shops gateway.
//!
//! Models the deployment configuration as TOML: the admin account, the
//! initial registry bindings, the initial permission grants, the manager
//! policy, and the rate source selection. The gateway builder replays this
//! configuration through the checked management API at startup.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use shops_types::{ContractCode, Permission, RegisterMode};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The configuration file could not be read.
	#[error("failed to read {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},
	/// The configuration is not valid TOML for the expected shape.
	#[error("failed to parse config: {0}")]
	Parse(#[from] Box<toml::de::Error>),
	/// The configuration parsed but fails a semantic check.
	#[error("invalid configuration: {0}")]
	Invalid(String),
}

/// Root configuration for a gateway instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	/// Chain and admin identity.
	pub gateway: GatewayConfig,
	/// EIP-712 domain binding for the payment processor.
	pub domain: DomainConfig,
	/// Initial registry bindings, applied in an unspecified order.
	#[serde(default)]
	pub contracts: HashMap<ContractCode, Address>,
	/// Initial global permission grants.
	#[serde(default)]
	pub grants: Vec<GrantConfig>,
	/// Initial resource-scoped grants, addressed by contract code.
	#[serde(default)]
	pub limit_grants: Vec<LimitGrantConfig>,
	/// Manager policy.
	#[serde(default)]
	pub manager: ManagerConfig,
	/// Rate source selection.
	pub rates: RatesConfig,
}

/// Chain and admin identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
	/// The chain the gateway models.
	pub chain_id: u64,
	/// The account seeded with the admin permission.
	pub admin: Address,
}

/// EIP-712 domain binding for the payment processor. Name and version are
/// fixed by the processor; only the contract address varies per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
	/// The deployed processor address signatures are bound to.
	pub verifying_contract: Address,
}

/// One initial global grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrantConfig {
	/// The account receiving the grant.
	pub account: Address,
	/// The permissions granted.
	pub permissions: Vec<Permission>,
}

/// One initial resource-scoped grant. The resource is named by contract
/// code and resolved to its configured address at bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitGrantConfig {
	/// The contract receiving the scoped grant.
	pub resource: ContractCode,
	/// The permissions delegated to it.
	pub permissions: Vec<Permission>,
}

/// Manager policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerConfig {
	/// Shop-registration policy applied at bootstrap.
	#[serde(default)]
	pub register_mode: RegisterMode,
}

/// Rate source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
	/// Name of the implementation to use.
	pub primary: String,
	/// Per-implementation configuration tables.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Registry bindings the gateway cannot start without.
const REQUIRED_CONTRACTS: [ContractCode; 4] = [
	ContractCode::ShopsManager,
	ContractCode::PaymentProcessor,
	ContractCode::ShopsPool,
	ContractCode::Treasury,
];

impl Config {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(raw).map_err(Box::new)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses, and validates a configuration file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.display().to_string(),
			source,
		})?;
		Self::from_toml_str(&raw)
	}

	/// Semantic checks beyond TOML shape.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.gateway.chain_id == 0 {
			return Err(ConfigError::Invalid("chain_id must be nonzero".to_string()));
		}
		if self.gateway.admin.is_zero() {
			return Err(ConfigError::Invalid(
				"admin must not be the zero address".to_string(),
			));
		}
		if self.domain.verifying_contract.is_zero() {
			return Err(ConfigError::Invalid(
				"domain.verifying_contract must not be the zero address".to_string(),
			));
		}
		for code in REQUIRED_CONTRACTS {
			if !self.contracts.contains_key(&code) {
				return Err(ConfigError::Invalid(format!(
					"missing required contract binding '{}'",
					code
				)));
			}
		}
		for grant in &self.grants {
			if grant.permissions.is_empty() {
				return Err(ConfigError::Invalid(format!(
					"grant for {} lists no permissions",
					grant.account
				)));
			}
		}
		for grant in &self.limit_grants {
			if !self.contracts.contains_key(&grant.resource) {
				return Err(ConfigError::Invalid(format!(
					"limit grant references unbound contract '{}'",
					grant.resource
				)));
			}
		}
		if !self.rates.implementations.contains_key(&self.rates.primary) {
			return Err(ConfigError::Invalid(format!(
				"primary rate implementation '{}' is not configured",
				self.rates.primary
			)));
		}
		Ok(())
	}
}
