//! Management facade for the KRU shops gateway.
//!
//! This crate combines the contract registry and the permission authority
//! behind one access-controlled surface. Every mutation is gated on the
//! caller holding the admin permission, which the authority itself answers:
//! the facade is self-governing, seeded with a single admin account at
//! construction. Checks always happen before any state is touched, so a
//! failed call leaves both stores exactly as they were.

use alloy_primitives::Address;
use shops_types::{
	ContractCode, GatewayEvent, ManagementEvent, Permission,
};
use thiserror::Error;
use tokio::sync::broadcast;

mod authority;
mod registry;

use authority::PermissionAuthority;
use registry::ContractRegistry;

/// Errors that can occur during registry and authority operations.
#[derive(Debug, Error)]
pub enum ManagementError {
	/// The caller does not hold the permission required for the operation.
	#[error("account {account} lacks permission {permission}")]
	Unauthorized {
		account: Address,
		permission: Permission,
	},
	/// No binding exists for the requested contract code.
	#[error("contract code {0} is not registered")]
	NotRegistered(ContractCode),
}

/// The registry and permission authority behind one checked surface.
///
/// Singleton per gateway. Collaborators resolve each other through
/// [`Management::resolve`] and gate privileged operations through
/// [`Management::has_permission`].
pub struct Management {
	registry: ContractRegistry,
	authority: PermissionAuthority,
	events: Option<broadcast::Sender<GatewayEvent>>,
}

impl Management {
	/// Creates the facade with `initial_admin` holding the admin permission.
	pub fn new(initial_admin: Address) -> Self {
		Self {
			registry: ContractRegistry::new(),
			authority: PermissionAuthority::seeded(initial_admin),
			events: None,
		}
	}

	/// Attaches an audit event sender. Events are best-effort; a bus with
	/// no subscribers drops them.
	pub fn with_event_sender(mut self, sender: broadcast::Sender<GatewayEvent>) -> Self {
		self.events = Some(sender);
		self
	}

	/// Binds `code` to `address`. Admin-gated upsert: rebinding an existing
	/// code silently overwrites it, and several codes may share one address.
	pub async fn register_contract(
		&self,
		caller: Address,
		code: ContractCode,
		address: Address,
	) -> Result<(), ManagementError> {
		self.require(caller, Permission::Admin).await?;
		let previous = self.registry.bind(code, address).await;
		tracing::info!(
			code = %code,
			address = %address,
			previous = ?previous,
			"Registered contract"
		);
		self.emit(GatewayEvent::Management(
			ManagementEvent::ContractRegistered {
				code,
				address,
				previous,
			},
		));
		Ok(())
	}

	/// Resolves `code` to its bound address.
	///
	/// A code that was never registered is a hard failure. The zero address
	/// is the decommission sentinel: it is returned as-is and callers must
	/// treat it as "unavailable".
	pub async fn resolve(&self, code: ContractCode) -> Result<Address, ManagementError> {
		self.registry
			.resolve(code)
			.await
			.ok_or(ManagementError::NotRegistered(code))
	}

	/// Grants (or revokes) each permission in `permissions` on `account`'s
	/// global set. Admin-gated; each permission is applied independently.
	pub async fn set_permissions(
		&self,
		caller: Address,
		account: Address,
		permissions: &[Permission],
		grant: bool,
	) -> Result<(), ManagementError> {
		self.require(caller, Permission::Admin).await?;
		self.authority
			.apply_global(account, permissions, grant)
			.await;
		tracing::info!(
			account = %account,
			granted = grant,
			count = permissions.len(),
			"Updated global permissions"
		);
		self.emit(GatewayEvent::Management(
			ManagementEvent::PermissionsUpdated {
				account,
				permissions: permissions.to_vec(),
				granted: grant,
			},
		));
		Ok(())
	}

	/// Grants (or revokes) a resource-scoped permission on `resource`.
	/// Admin-gated. The grant authorizes only the resource's own calls.
	pub async fn set_limit_set_permission(
		&self,
		caller: Address,
		resource: Address,
		permission: Permission,
		grant: bool,
	) -> Result<(), ManagementError> {
		self.require(caller, Permission::Admin).await?;
		self.authority.apply_scoped(resource, permission, grant).await;
		tracing::info!(
			resource = %resource,
			permission = %permission,
			granted = grant,
			"Updated scoped permission"
		);
		self.emit(GatewayEvent::Management(
			ManagementEvent::LimitPermissionUpdated {
				resource,
				permission,
				granted: grant,
			},
		));
		Ok(())
	}

	/// True if `account` holds `permission` globally, or was delegated it
	/// as a resource through a scoped grant.
	pub async fn has_permission(&self, account: Address, permission: Permission) -> bool {
		self.authority.has_permission(account, permission).await
	}

	async fn require(
		&self,
		caller: Address,
		permission: Permission,
	) -> Result<(), ManagementError> {
		if self.has_permission(caller, permission).await {
			Ok(())
		} else {
			tracing::warn!(
				account = %caller,
				permission = %permission,
				"Rejected unauthorized call"
			);
			Err(ManagementError::Unauthorized {
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
