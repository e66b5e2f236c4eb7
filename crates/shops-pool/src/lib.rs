//! Pooled funds and the withdrawal gate for the shops gateway.
//!
//! The ledger is a native-unit balance book shared by the gateway: the
//! payment processor credits settled value into it and the pool releases
//! value out of it. Withdrawal on behalf of a third party is purely
//! permission-gated; there is no voucher or replay tracking here, only the
//! caller-permission check and balance sufficiency.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use shops_management::Management;
use shops_types::{FundsError, FundsForwarder, GatewayEvent, Permission, PoolEvent};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
	/// The caller does not hold the withdraw-for permission.
	#[error("account {0} may not release pooled funds")]
	Unauthorized(Address),
	/// The pool cannot cover the requested amount.
	#[error("insufficient balance: requested {requested}, available {available}")]
	InsufficientBalance { requested: U256, available: U256 },
}

/// Native-unit balance book.
///
/// Transfers hold the write lock for the whole debit-credit pair, so
/// concurrent releases serialize and can never overdraw an account.
pub struct Ledger {
	balances: RwLock<HashMap<Address, U256>>,
}

impl Ledger {
	/// Creates an empty ledger.
	pub fn new() -> Self {
		Self {
			balances: RwLock::new(HashMap::new()),
		}
	}

	/// Credits `value` to `account`.
	pub async fn credit(&self, account: Address, value: U256) {
		let mut balances = self.balances.write().await;
		let balance = balances.entry(account).or_default();
		*balance = balance.saturating_add(value);
	}

	/// Moves `value` from `from` to `to`, failing without any state change
	/// if `from` cannot cover it.
	pub async fn transfer(
		&self,
		from: Address,
		to: Address,
		value: U256,
	) -> Result<(), PoolError> {
		let mut balances = self.balances.write().await;
		let available = balances.get(&from).copied().unwrap_or_default();
		if available < value {
			return Err(PoolError::InsufficientBalance {
				requested: value,
				available,
			});
		}
		balances.insert(from, available - value);
		let destination = balances.entry(to).or_default();
		*destination = destination.saturating_add(value);
		Ok(())
	}

	/// Returns the balance held by `account`.
	pub async fn balance_of(&self, account: Address) -> U256 {
		let balances = self.balances.read().await;
		balances.get(&account).copied().unwrap_or_default()
	}
}

impl Default for Ledger {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl FundsForwarder for Ledger {
	async fn forward(&self, to: Address, value: U256) -> Result<(), FundsError> {
		self.credit(to, value).await;
		Ok(())
	}
}

/// Permission-gated release of pooled funds.
pub struct ShopsPool {
	management: Arc<Management>,
	ledger: Arc<Ledger>,
	address: Address,
	events: Option<broadcast::Sender<GatewayEvent>>,
}

impl ShopsPool {
	/// Creates the pool over an existing ledger. `address` is the pool's
	/// own account in the ledger, the one deposits accumulate under.
	pub fn new(management: Arc<Management>, ledger: Arc<Ledger>, address: Address) -> Self {
		Self {
			management,
			ledger,
			address,
			events: None,
		}
	}

	/// Attaches an audit event sender.
	pub fn with_event_sender(mut self, sender: broadcast::Sender<GatewayEvent>) -> Self {
		self.events = Some(sender);
		self
	}

	/// The pool's own ledger account.
	pub fn address(&self) -> Address {
		self.address
	}

	/// Accepts native value into the pool.
	pub async fn deposit(&self, from: Address, value: U256) {
		self.ledger.credit(self.address, value).await;
		tracing::info!(from = %from, value = %value, "Accepted deposit");
		self.emit(GatewayEvent::Pool(PoolEvent::Deposited { from, value }));
	}

	/// Releases `amount` from the pool to `beneficiary` on behalf of a
	/// third party. Restricted to holders of the withdraw-for permission.
	pub async fn withdraw_for(
		&self,
		caller: Address,
		beneficiary: Address,
		amount: U256,
	) -> Result<(), PoolError> {
		if !self
			.management
			.has_permission(caller, Permission::PoolWithdrawFor)
			.await
		{
			tracing::warn!(account = %caller, "Rejected unauthorized withdrawal");
			return Err(PoolError::Unauthorized(caller));
		}
		self.ledger.transfer(self.address, beneficiary, amount).await?;
		tracing::info!(
			caller = %caller,
			beneficiary = %beneficiary,
			amount = %amount,
			"Released pooled funds"
		);
		self.emit(GatewayEvent::Pool(PoolEvent::WithdrawalExecuted {
			caller,
			beneficiary,
			amount,
		}));
		Ok(())
	}

	/// The pool's current balance.
	pub async fn balance(&self) -> U256 {
		self.ledger.balance_of(self.address).await
	}

	fn emit(&self, event: GatewayEvent) {
		if let Some(sender) = &self.events {
			let _ = sender.send(event);
		}
	}
}
