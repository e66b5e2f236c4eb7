//! Logical-code-to-address bindings.
//!
//! The registry is a plain map with last-write-wins semantics. Access
//! control lives in the [`Management`](crate::Management) facade; nothing in
//! here checks permissions.

use alloy_primitives::Address;
use shops_types::ContractCode;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// The code-to-address binding table.
pub(crate) struct ContractRegistry {
	bindings: RwLock<HashMap<ContractCode, Address>>,
}

impl ContractRegistry {
	pub(crate) fn new() -> Self {
		Self {
			bindings: RwLock::new(HashMap::new()),
		}
	}

	/// Binds `code` to `address`, returning the previous binding if any.
	///
	/// There is no deletion: a contract is decommissioned by rebinding its
	/// code to the zero address.
	pub(crate) async fn bind(&self, code: ContractCode, address: Address) -> Option<Address> {
		let mut bindings = self.bindings.write().await;
		bindings.insert(code, address)
	}

	/// Looks up the binding for `code`.
	pub(crate) async fn resolve(&self, code: ContractCode) -> Option<Address> {
		let bindings = self.bindings.read().await;
		bindings.get(&code).copied()
	}
}
