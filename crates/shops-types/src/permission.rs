//! Permission vocabulary for the shops gateway.
//!
//! The vocabulary is a closed enumeration: every privileged operation in the
//! gateway is gated by one of the variants below and the set is not
//! extensible at runtime. Per-account grants are tracked as a small bitset
//! rather than a collection of strings, so membership checks are a single
//! mask test.

use serde::{Deserialize, Serialize};

/// A single privileged capability recognised by the permission authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Permission {
	/// May mutate the registry and the authority itself.
	Admin = 0,
	/// May register and remove shops through the manager.
	ManagerRegisterRemoveShop = 1,
	/// May change a shop's commission fraction.
	ManagerSetCommission = 2,
	/// May toggle a shop's access flag.
	ManagerSetShopAccess = 3,
	/// Lets the manager contract maintain its black list. Granted scoped,
	/// to the manager's own address, never globally.
	ManagerBlackList = 4,
	/// Lets the manager contract maintain its freeze list. Scoped-only,
	/// like [`Permission::ManagerBlackList`].
	ManagerFreezeList = 5,
	/// May sign payment vouchers off-chain.
	PaymentPaySigner = 6,
	/// May release pooled funds on behalf of a beneficiary.
	PoolWithdrawFor = 7,
}

impl Permission {
	/// Every permission in the vocabulary, in declaration order.
	pub const ALL: [Permission; 8] = [
		Permission::Admin,
		Permission::ManagerRegisterRemoveShop,
		Permission::ManagerSetCommission,
		Permission::ManagerSetShopAccess,
		Permission::ManagerBlackList,
		Permission::ManagerFreezeList,
		Permission::PaymentPaySigner,
		Permission::PoolWithdrawFor,
	];

	/// The configuration-file name of this permission.
	pub fn as_str(self) -> &'static str {
		match self {
			Permission::Admin => "admin",
			Permission::ManagerRegisterRemoveShop => "manager_register_remove_shop",
			Permission::ManagerSetCommission => "manager_set_commission",
			Permission::ManagerSetShopAccess => "manager_set_shop_access",
			Permission::ManagerBlackList => "manager_black_list",
			Permission::ManagerFreezeList => "manager_freeze_list",
			Permission::PaymentPaySigner => "payment_pay_signer",
			Permission::PoolWithdrawFor => "pool_withdraw_for",
		}
	}

	const fn bit(self) -> u32 {
		1 << (self as u8)
	}
}

impl std::fmt::Display for Permission {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The set of permissions held by one account, stored as a bitset.
///
/// Serializes as its raw word; the human-readable form only appears in
/// configuration files, where grants are written as lists of
/// [`Permission`] names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(u32);

impl PermissionSet {
	/// The empty set.
	pub const EMPTY: PermissionSet = PermissionSet(0);

	/// Adds a permission to the set.
	pub fn insert(&mut self, permission: Permission) {
		self.0 |= permission.bit();
	}

	/// Removes a permission from the set.
	pub fn remove(&mut self, permission: Permission) {
		self.0 &= !permission.bit();
	}

	/// Returns true if the set holds the given permission.
	pub fn contains(&self, permission: Permission) -> bool {
		self.0 & permission.bit() != 0
	}

	/// Returns true if no permission is held.
	pub fn is_empty(&self) -> bool {
		self.0 == 0
	}

	/// Iterates over the permissions held, in declaration order.
	pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
		Permission::ALL.into_iter().filter(|p| self.contains(*p))
	}
}

impl FromIterator<Permission> for PermissionSet {
	fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
		let mut set = PermissionSet::EMPTY;
		for permission in iter {
			set.insert(permission);
		}
		set
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_insert_remove_contains() {
		let mut set = PermissionSet::EMPTY;
		assert!(set.is_empty());

		set.insert(Permission::Admin);
		set.insert(Permission::PaymentPaySigner);
		assert!(set.contains(Permission::Admin));
		assert!(set.contains(Permission::PaymentPaySigner));
		assert!(!set.contains(Permission::PoolWithdrawFor));

		set.remove(Permission::Admin);
		assert!(!set.contains(Permission::Admin));
		assert!(set.contains(Permission::PaymentPaySigner));

		// Removing an absent permission is a no-op
		set.remove(Permission::Admin);
		assert!(!set.contains(Permission::Admin));
	}

	#[test]
	fn test_iter_matches_membership() {
		let set: PermissionSet = [
			Permission::ManagerBlackList,
			Permission::ManagerFreezeList,
		]
		.into_iter()
		.collect();

		let collected: Vec<Permission> = set.iter().collect();
		assert_eq!(
			collected,
			vec![Permission::ManagerBlackList, Permission::ManagerFreezeList]
		);
	}

	#[test]
	fn test_serde_names() {
		let json = serde_json::to_string(&Permission::PaymentPaySigner).unwrap();
		assert_eq!(json, "\"payment_pay_signer\"");

		let parsed: Permission = serde_json::from_str("\"pool_withdraw_for\"").unwrap();
		assert_eq!(parsed, Permission::PoolWithdrawFor);
	}
}
