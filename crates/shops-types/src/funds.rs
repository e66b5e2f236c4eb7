//! Seam for forwarding settled native value to a destination.
//!
//! The payment processor validates vouchers but does not hold balances
//! itself; once a voucher is admitted the attached value is handed to a
//! forwarder. The pool's ledger implements this trait in production and
//! tests substitute an in-memory recorder.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while forwarding settled funds.
#[derive(Debug, Error)]
pub enum FundsError {
	/// The destination cannot accept the value.
	#[error("destination unavailable: {0}")]
	Unavailable(String),
}

/// Destination for settled native value.
#[async_trait]
pub trait FundsForwarder: Send + Sync {
	/// Credits `value` to `to`.
	async fn forward(&self, to: Address, value: U256) -> Result<(), FundsError>;
}
