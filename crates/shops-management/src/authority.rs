//! Global and resource-scoped permission grants.
//!
//! Grants live in two distinct tables. The global table answers "does this
//! account hold the permission anywhere"; the scoped table answers "is this
//! account a resource that was delegated the permission for its own calls".
//! A scoped grant never widens the answer for any other account.

use alloy_primitives::Address;
use shops_types::{Permission, PermissionSet};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The two grant tables backing the permission authority.
pub(crate) struct PermissionAuthority {
	global: RwLock<HashMap<Address, PermissionSet>>,
	scoped: RwLock<HashMap<Address, PermissionSet>>,
}

impl PermissionAuthority {
	/// Creates the authority with `initial_admin` holding the admin
	/// permission, making it self-governing from the first call.
	pub(crate) fn seeded(initial_admin: Address) -> Self {
		let mut grants = PermissionSet::EMPTY;
		grants.insert(Permission::Admin);
		Self {
			global: RwLock::new(HashMap::from([(initial_admin, grants)])),
			scoped: RwLock::new(HashMap::new()),
		}
	}

	/// Applies each permission in `permissions` to `account`'s global set.
	pub(crate) async fn apply_global(
		&self,
		account: Address,
		permissions: &[Permission],
		grant: bool,
	) {
		let mut global = self.global.write().await;
		let set = global.entry(account).or_default();
		for permission in permissions {
			if grant {
				set.insert(*permission);
			} else {
				set.remove(*permission);
			}
		}
		if set.is_empty() {
			global.remove(&account);
		}
	}

	/// Applies a single scoped permission to `resource`.
	pub(crate) async fn apply_scoped(&self, resource: Address, permission: Permission, grant: bool) {
		let mut scoped = self.scoped.write().await;
		let set = scoped.entry(resource).or_default();
		if grant {
			set.insert(permission);
		} else {
			set.remove(permission);
		}
		if set.is_empty() {
			scoped.remove(&resource);
		}
	}

	/// True if `account` holds `permission` globally, or holds it as a
	/// resource through a scoped grant.
	pub(crate) async fn has_permission(&self, account: Address, permission: Permission) -> bool {
		{
			let global = self.global.read().await;
			if global
				.get(&account)
				.is_some_and(|set| set.contains(permission))
			{
				return true;
			}
		}
		let scoped = self.scoped.read().await;
		scoped
			.get(&account)
			.is_some_and(|set| set.contains(permission))
	}
}
