//! Gateway wiring for the shops authorization core.
//!
//! Builds the management facade, rate source, pool, processor, and manager
//! from one configuration document, and replays the configured bindings and
//! grants through the checked management API in the same order the
//! deployment sequence applies them on-chain: contracts first, then global
//! grants, then scoped grants, then the register mode.

use shops_config::{Config, ConfigError, RatesConfig};
use shops_management::{Management, ManagementError};
use shops_manager::{ManagerError, ShopsManager};
use shops_pool::{Ledger, ShopsPool};
use shops_processor::{PaymentDomain, PaymentProcessor};
use shops_rates::{RateError, RateSource};
use shops_types::{ContractCode, FundsForwarder, GatewayEvent};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

pub mod event_bus;

use event_bus::EventBus;

/// Errors that can occur while assembling a gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
	/// The configuration failed to load or validate.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A bootstrap call through the management API was rejected.
	#[error(transparent)]
	Management(#[from] ManagementError),
	/// A bootstrap call through the manager was rejected.
	#[error(transparent)]
	Manager(#[from] ManagerError),
	/// The rate source could not be constructed.
	#[error(transparent)]
	Rate(#[from] RateError),
	/// The configured primary rate implementation does not exist.
	#[error("unknown rate implementation '{0}'")]
	UnknownRateImplementation(String),
}

/// The assembled authorization core.
///
/// All components share one management facade, one ledger, and one event
/// bus. The gateway itself holds no behavior beyond construction; callers
/// talk to the components directly.
pub struct Gateway {
	config: Config,
	management: Arc<Management>,
	ledger: Arc<Ledger>,
	pool: Arc<ShopsPool>,
	processor: Arc<PaymentProcessor>,
	manager: Arc<ShopsManager>,
	event_bus: EventBus,
}

impl Gateway {
	/// Builds and bootstraps a gateway from configuration.
	pub async fn from_config(config: Config) -> Result<Self, GatewayError> {
		config.validate()?;
		let event_bus = EventBus::new(1024);
		let admin = config.gateway.admin;
		let management =
			Arc::new(Management::new(admin).with_event_sender(event_bus.sender()));

		for (code, address) in &config.contracts {
			management.register_contract(admin, *code, *address).await?;
		}
		for grant in &config.grants {
			management
				.set_permissions(admin, grant.account, &grant.permissions, true)
				.await?;
		}
		for grant in &config.limit_grants {
			let resource = management.resolve(grant.resource).await?;
			for permission in &grant.permissions {
				management
					.set_limit_set_permission(admin, resource, *permission, true)
					.await?;
			}
		}

		let rates = build_rate_source(&config.rates)?;
		let ledger = Arc::new(Ledger::new());

		let pool_address = management.resolve(ContractCode::ShopsPool).await?;
		let pool = Arc::new(
			ShopsPool::new(Arc::clone(&management), Arc::clone(&ledger), pool_address)
				.with_event_sender(event_bus.sender()),
		);

		let domain =
			PaymentDomain::new(config.gateway.chain_id, config.domain.verifying_contract);
		let processor = Arc::new(
			PaymentProcessor::new(
				Arc::clone(&management),
				rates,
				Arc::clone(&ledger) as Arc<dyn FundsForwarder>,
				domain,
			)
			.with_event_sender(event_bus.sender()),
		);

		let manager_address = management.resolve(ContractCode::ShopsManager).await?;
		let manager = Arc::new(
			ShopsManager::new(Arc::clone(&management), manager_address)
				.with_event_sender(event_bus.sender()),
		);
		manager
			.set_register_mode(admin, config.manager.register_mode)
			.await?;

		tracing::info!(
			chain_id = config.gateway.chain_id,
			admin = %admin,
			"Bootstrapped gateway"
		);

		Ok(Self {
			config,
			management,
			ledger,
			pool,
			processor,
			manager,
			event_bus,
		})
	}

	/// Loads configuration from a file and builds the gateway.
	pub async fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self, GatewayError> {
		let config = Config::from_file(path)?;
		Self::from_config(config).await
	}

	/// The configuration the gateway was built from.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// The shared registry and permission authority.
	pub fn management(&self) -> Arc<Management> {
		Arc::clone(&self.management)
	}

	/// The shared native balance book.
	pub fn ledger(&self) -> Arc<Ledger> {
		Arc::clone(&self.ledger)
	}

	/// The withdrawal gate.
	pub fn pool(&self) -> Arc<ShopsPool> {
		Arc::clone(&self.pool)
	}

	/// The payment processor.
	pub fn processor(&self) -> Arc<PaymentProcessor> {
		Arc::clone(&self.processor)
	}

	/// The shops manager.
	pub fn manager(&self) -> Arc<ShopsManager> {
		Arc::clone(&self.manager)
	}

	/// Subscribes to audit events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
		self.event_bus.subscribe()
	}
}

/// Resolves the configured primary rate implementation by name and builds
/// it from its configuration table.
fn build_rate_source(rates: &RatesConfig) -> Result<Arc<dyn RateSource>, GatewayError> {
	let factory = shops_rates::get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == rates.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| GatewayError::UnknownRateImplementation(rates.primary.clone()))?;
	let table = rates
		.implementations
		.get(&rates.primary)
		.cloned()
		.unwrap_or_else(|| toml::Value::Table(Default::default()));
	Ok(Arc::from(factory(&table)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Address, U256};
	use alloy_signer::SignerSync;
	use alloy_signer_local::PrivateKeySigner;
	use shops_types::{
		current_timestamp, PaymentEvent, Permission, PaymentVoucher, RegisterMode, SignatureParts,
	};

	const CONFIG: &str = r#"
		[gateway]
		chain_id = 1717
		admin = "0x58Ce9c36a8aF6097F34eAa9c99e19cB53e0610BC"

		[domain]
		verifying_contract = "0x103A902e7847Ac3b24DaDeC82796A8173aaa45F5"

		[contracts]
		shops-manager = "0x0000000000000000000000000000000000000a01"
		payment-processor = "0x103A902e7847Ac3b24DaDeC82796A8173aaa45F5"
		shops-pool = "0x0000000000000000000000000000000000000a03"
		wrapped-native = "0xeC844Bd12e042c080b57Dc1D2b5b5D921dEE3E95"
		treasury = "0x58Ce9c36a8aF6097F34eAa9c99e19cB53e0610BC"

		[[grants]]
		account = "0x58Ce9c36a8aF6097F34eAa9c99e19cB53e0610BC"
		permissions = [
			"admin",
			"manager_register_remove_shop",
			"manager_set_commission",
			"manager_set_shop_access",
		]

		[[grants]]
		account = "0xB80933c642030020f26dEA39A1DB67A10f5359dA"
		permissions = ["payment_pay_signer", "pool_withdraw_for"]

		[[limit_grants]]
		resource = "shops-manager"
		permissions = ["manager_black_list", "manager_freeze_list"]

		[manager]
		register_mode = "automatic"

		[rates]
		primary = "pair"

		[rates.implementations.pair]
		native_reserve = "1000000000000000000000000"
		usd_reserve = "100000000000000000000000"
	"#;

	fn eth(units: u64) -> U256 {
		U256::from(units) * U256::from(10).pow(U256::from(18))
	}

	fn admin() -> Address {
		"0x58Ce9c36a8aF6097F34eAa9c99e19cB53e0610BC".parse().unwrap()
	}

	async fn gateway() -> Gateway {
		let config = Config::from_toml_str(CONFIG).unwrap();
		Gateway::from_config(config).await.unwrap()
	}

	#[tokio::test]
	async fn test_bootstrap_applies_configuration() {
		let gateway = gateway().await;
		let management = gateway.management();

		// Registry bindings
		assert_eq!(
			management.resolve(ContractCode::Treasury).await.unwrap(),
			admin()
		);
		// Global grants
		let operator: Address = "0xB80933c642030020f26dEA39A1DB67A10f5359dA".parse().unwrap();
		assert!(
			management
				.has_permission(operator, Permission::PaymentPaySigner)
				.await
		);
		assert!(
			management
				.has_permission(operator, Permission::PoolWithdrawFor)
				.await
		);
		// Scoped grants land on the manager's address, nobody else's
		let manager_address = gateway.manager().address();
		assert!(
			management
				.has_permission(manager_address, Permission::ManagerBlackList)
				.await
		);
		assert!(
			!management
				.has_permission(operator, Permission::ManagerBlackList)
				.await
		);
		// Register mode
		assert_eq!(
			gateway.manager().register_mode().await,
			RegisterMode::Automatic
		);
	}

	#[tokio::test]
	async fn test_alternate_rate_implementation_builds() {
		let swapped = CONFIG
			.replace("primary = \"pair\"", "primary = \"fixed\"")
			.replace("[rates.implementations.pair]", "[rates.implementations.fixed]")
			.replace("native_reserve = \"1000000000000000000000000\"", "numerator = \"10\"")
			.replace("usd_reserve = \"100000000000000000000000\"", "denominator = \"1\"");
		let config = Config::from_toml_str(&swapped).unwrap();
		Gateway::from_config(config).await.unwrap();
	}

	#[tokio::test]
	async fn test_unregistered_rate_implementation_fails_fast() {
		let broken = CONFIG
			.replace("primary = \"pair\"", "primary = \"oracle\"")
			.replace("[rates.implementations.pair]", "[rates.implementations.oracle]");
		let config = Config::from_toml_str(&broken).unwrap();
		let err = Gateway::from_config(config).await.unwrap_err();
		assert!(matches!(
			err,
			GatewayError::UnknownRateImplementation(name) if name == "oracle"
		));
	}

	#[tokio::test]
	async fn test_end_to_end_voucher_settlement() {
		let gateway = gateway().await;
		let management = gateway.management();
		let processor = gateway.processor();
		let signer = PrivateKeySigner::random();
		management
			.set_permissions(
				admin(),
				signer.address(),
				&[Permission::PaymentPaySigner],
				true,
			)
			.await
			.unwrap();

		let payer = Address::repeat_byte(0x74);
		let voucher = PaymentVoucher {
			order_id: "45c82009-a1bb-4938-a6c7-1ef46c4d6c4f".to_string(),
			shop: "0xc4E14d8de52A69Af34b26E218092638093F05923".parse().unwrap(),
			sender: payer,
			usd_amount: eth(121),
			deadline: current_timestamp() + 600,
		};
		let digest = processor.domain().voucher_digest(&voucher);
		let signature = signer.sign_hash_sync(&digest).unwrap();
		let parts = SignatureParts::from_bytes(&signature.as_bytes());

		let mut events = gateway.subscribe();
		let receipt = processor
			.pay(
				payer,
				&voucher.order_id,
				voucher.shop,
				voucher.usd_amount,
				voucher.deadline,
				parts,
				eth(1210),
			)
			.await
			.unwrap();

		// Funds landed on the treasury's ledger account
		assert_eq!(receipt.treasury, admin());
		assert_eq!(gateway.ledger().balance_of(admin()).await, eth(1210));

		// The settlement was announced on the bus
		let event = events.recv().await.unwrap();
		assert!(matches!(
			event,
			GatewayEvent::Payment(PaymentEvent::VoucherSettled { order_id, .. })
				if order_id == voucher.order_id
		));

		// And the voucher is spent
		assert!(processor.is_consumed(&voucher.order_id).await);
	}

	#[tokio::test]
	async fn test_withdrawal_through_wired_pool() {
		let gateway = gateway().await;
		let pool = gateway.pool();
		let operator: Address = "0xB80933c642030020f26dEA39A1DB67A10f5359dA".parse().unwrap();
		let beneficiary = Address::repeat_byte(0x33);

		pool.deposit(Address::repeat_byte(0x74), eth(50)).await;
		pool.withdraw_for(operator, beneficiary, eth(20))
			.await
			.unwrap();

		assert_eq!(pool.balance().await, eth(30));
		assert_eq!(gateway.ledger().balance_of(beneficiary).await, eth(20));

		// An account the config never granted cannot release funds
		let err = pool
			.withdraw_for(Address::repeat_byte(0x66), beneficiary, eth(1))
			.await
			.unwrap_err();
		assert!(matches!(err, shops_pool::PoolError::Unauthorized(_)));
	}

	#[tokio::test]
	async fn test_manager_self_registration_through_gateway() {
		let gateway = gateway().await;
		let manager = gateway.manager();
		let shop = Address::repeat_byte(0x30);

		// The configured mode is automatic, so a shop admits itself
		manager.register_shop(shop, shop).await.unwrap();
		assert!(manager.shop(shop).await.is_some());

		// The scoped grants from the config let the manager run its lists
		manager.set_black_list(shop, true).await.unwrap();
		assert!(manager.shop(shop).await.unwrap().black_listed);
	}
}
