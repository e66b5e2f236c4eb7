//! Audit event types published by the gateway components.
//!
//! Every state-changing operation emits one of these events so that
//! consumers can follow registrations, grants, settlements, and withdrawals
//! without polling component state. Events flow through the gateway's
//! broadcast bus.

use crate::{ContractCode, Permission, RegisterMode};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Main event type encompassing all gateway events.
///
/// Events are categorized by the component that produces them, allowing
/// consumers to filter and handle specific event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GatewayEvent {
	/// Events from the registry and permission authority.
	Management(ManagementEvent),
	/// Events from the payment processor.
	Payment(PaymentEvent),
	/// Events from the shops pool.
	Pool(PoolEvent),
	/// Events from the shops manager.
	Manager(ManagerEvent),
}

/// Events related to registry bindings and permission grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ManagementEvent {
	/// A logical code has been bound to an address.
	ContractRegistered {
		code: ContractCode,
		address: Address,
		/// The binding that was overwritten, if any.
		previous: Option<Address>,
	},
	/// Global permissions were granted to or revoked from an account.
	PermissionsUpdated {
		account: Address,
		permissions: Vec<Permission>,
		granted: bool,
	},
	/// A resource-scoped permission was granted or revoked.
	LimitPermissionUpdated {
		resource: Address,
		permission: Permission,
		granted: bool,
	},
}

/// Events related to voucher settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PaymentEvent {
	/// A voucher has been consumed and its funds forwarded.
	VoucherSettled {
		order_id: String,
		shop: Address,
		sender: Address,
		usd_amount: U256,
		native_value: U256,
		signer: Address,
		treasury: Address,
	},
}

/// Events related to pooled funds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PoolEvent {
	/// Native value entered the pool.
	Deposited { from: Address, value: U256 },
	/// Pooled funds were released to a beneficiary.
	WithdrawalExecuted {
		caller: Address,
		beneficiary: Address,
		amount: U256,
	},
}

/// Events related to shop lifecycle and manager policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ManagerEvent {
	/// The shop-registration policy changed.
	RegisterModeChanged { mode: RegisterMode },
	/// A shop entered the manager's registry.
	ShopRegistered { shop: Address },
	/// A shop left the manager's registry.
	ShopRemoved { shop: Address },
}
