//! Shop-side collaborator for the shops gateway.
//!
//! Tracks the shop registry with per-shop commission and access flags, the
//! registration policy, and the black and freeze lists. List maintenance is
//! the manager's own privileged self-call: the authority delegates the list
//! permissions to the manager's *address* as resource-scoped grants, so no
//! operator account can touch the lists directly.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use shops_management::Management;
use shops_types::{GatewayEvent, ManagerEvent, Permission, RegisterMode};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Errors that can occur during manager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
	/// The caller does not hold the permission required for the operation.
	#[error("account {account} lacks permission {permission}")]
	Unauthorized {
		account: Address,
		permission: Permission,
	},
	/// The shop is already present in the registry.
	#[error("shop {0} is already registered")]
	AlreadyRegistered(Address),
	/// The shop is not present in the registry.
	#[error("shop {0} is not registered")]
	UnknownShop(Address),
	/// The commission fraction exceeds the whole.
	#[error("commission {0} exceeds the whole")]
	InvalidCommission(U256),
}

/// Per-shop state held by the manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopRecord {
	/// Commission fraction, 18-decimal fixed point, at most 1.0.
	pub commission: U256,
	/// Whether the shop may currently take payments.
	pub access: bool,
	/// Black-listed shops are barred permanently pending review.
	pub black_listed: bool,
	/// Frozen shops are suspended temporarily.
	pub frozen: bool,
}

/// One whole, as an 18-decimal fraction.
fn whole() -> U256 {
	U256::from(10).pow(U256::from(18))
}

/// The shops manager: registration policy, shop records, and the two
/// scoped-permission lists.
pub struct ShopsManager {
	management: Arc<Management>,
	address: Address,
	mode: RwLock<RegisterMode>,
	shops: RwLock<HashMap<Address, ShopRecord>>,
	events: Option<broadcast::Sender<GatewayEvent>>,
}

impl ShopsManager {
	/// Creates the manager. `address` is the manager's own registered
	/// address, the resource the scoped list grants are issued to.
	pub fn new(management: Arc<Management>, address: Address) -> Self {
		Self {
			management,
			address,
			mode: RwLock::new(RegisterMode::default()),
			shops: RwLock::new(HashMap::new()),
			events: None,
		}
	}

	/// Attaches an audit event sender.
	pub fn with_event_sender(mut self, sender: broadcast::Sender<GatewayEvent>) -> Self {
		self.events = Some(sender);
		self
	}

	/// The manager's own registered address.
	pub fn address(&self) -> Address {
		self.address
	}

	/// The current registration policy.
	pub async fn register_mode(&self) -> RegisterMode {
		*self.mode.read().await
	}

	/// Switches the registration policy. Admin-gated.
	pub async fn set_register_mode(
		&self,
		caller: Address,
		mode: RegisterMode,
	) -> Result<(), ManagerError> {
		self.require(caller, Permission::Admin).await?;
		*self.mode.write().await = mode;
		tracing::info!(mode = %mode, "Changed register mode");
		self.emit(GatewayEvent::Manager(ManagerEvent::RegisterModeChanged {
			mode,
		}));
		Ok(())
	}

	/// Admits a shop into the registry.
	///
	/// Under [`RegisterMode::Automatic`] a shop may register itself;
	/// otherwise the caller needs the register/remove permission.
	pub async fn register_shop(&self, caller: Address, shop: Address) -> Result<(), ManagerError> {
		let self_registration =
			*self.mode.read().await == RegisterMode::Automatic && caller == shop;
		if !self_registration {
			self.require(caller, Permission::ManagerRegisterRemoveShop)
				.await?;
		}

		let mut shops = self.shops.write().await;
		if shops.contains_key(&shop) {
			return Err(ManagerError::AlreadyRegistered(shop));
		}
		shops.insert(
			shop,
			ShopRecord {
				access: true,
				..ShopRecord::default()
			},
		);
		tracing::info!(shop = %shop, self_registration, "Registered shop");
		self.emit(GatewayEvent::Manager(ManagerEvent::ShopRegistered { shop }));
		Ok(())
	}

	/// Removes a shop from the registry.
	pub async fn remove_shop(&self, caller: Address, shop: Address) -> Result<(), ManagerError> {
		self.require(caller, Permission::ManagerRegisterRemoveShop)
			.await?;
		let mut shops = self.shops.write().await;
		if shops.remove(&shop).is_none() {
			return Err(ManagerError::UnknownShop(shop));
		}
		tracing::info!(shop = %shop, "Removed shop");
		self.emit(GatewayEvent::Manager(ManagerEvent::ShopRemoved { shop }));
		Ok(())
	}

	/// Sets a shop's commission fraction.
	pub async fn set_commission(
		&self,
		caller: Address,
		shop: Address,
		commission: U256,
	) -> Result<(), ManagerError> {
		self.require(caller, Permission::ManagerSetCommission).await?;
		if commission > whole() {
			return Err(ManagerError::InvalidCommission(commission));
		}
		let mut shops = self.shops.write().await;
		let record = shops
			.get_mut(&shop)
			.ok_or(ManagerError::UnknownShop(shop))?;
		record.commission = commission;
		Ok(())
	}

	/// Toggles a shop's access flag.
	pub async fn set_shop_access(
		&self,
		caller: Address,
		shop: Address,
		enabled: bool,
	) -> Result<(), ManagerError> {
		self.require(caller, Permission::ManagerSetShopAccess).await?;
		let mut shops = self.shops.write().await;
		let record = shops
			.get_mut(&shop)
			.ok_or(ManagerError::UnknownShop(shop))?;
		record.access = enabled;
		Ok(())
	}

	/// Black-lists (or clears) a shop.
	///
	/// This is the manager's privileged self-call: authorization is checked
	/// against the manager's own address through its scoped grant.
	pub async fn set_black_list(&self, shop: Address, listed: bool) -> Result<(), ManagerError> {
		self.require(self.address, Permission::ManagerBlackList)
			.await?;
		let mut shops = self.shops.write().await;
		let record = shops
			.get_mut(&shop)
			.ok_or(ManagerError::UnknownShop(shop))?;
		record.black_listed = listed;
		tracing::info!(shop = %shop, listed, "Updated black list");
		Ok(())
	}

	/// Freezes (or thaws) a shop, through the same scoped self-call
	/// mechanism as [`ShopsManager::set_black_list`].
	pub async fn set_freeze_list(&self, shop: Address, frozen: bool) -> Result<(), ManagerError> {
		self.require(self.address, Permission::ManagerFreezeList)
			.await?;
		let mut shops = self.shops.write().await;
		let record = shops
			.get_mut(&shop)
			.ok_or(ManagerError::UnknownShop(shop))?;
		record.frozen = frozen;
		tracing::info!(shop = %shop, frozen, "Updated freeze list");
		Ok(())
	}

	/// The record held for `shop`, if registered.
	pub async fn shop(&self, shop: Address) -> Option<ShopRecord> {
		self.shops.read().await.get(&shop).cloned()
	}

	async fn require(&self, caller: Address, permission: Permission) -> Result<(), ManagerError> {
		if self.management.has_permission(caller, permission).await {
			Ok(())
		} else {
			Err(ManagerError::Unauthorized {
				account: caller,
				permission,
			})
		}
	}

	fn emit(&self, event: GatewayEvent) {
		if let Some(sender) = &self.events {
			let _ = sender.send(event);
		}
	}
}
