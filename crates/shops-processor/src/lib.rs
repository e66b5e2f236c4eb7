//! Payment authorization validator for the shops gateway.
//!
//! Validates off-chain signed payment vouchers and admits each one exactly
//! once before releasing funds to the treasury. Authorization to *issue* a
//! payment rests with the voucher signer (who must hold the pay-signer
//! permission when the voucher is redeemed, not when it was signed); the
//! account submitting it merely carries the funds. That split makes a
//! voucher a bearer capability rather than a direct debit.

use alloy_primitives::{Address, PrimitiveSignature, B256, U256};
use shops_management::{Management, ManagementError};
use shops_rates::{RateError, RateSource};
use shops_types::{
	current_timestamp, truncate_id, ContractCode, FundsError, FundsForwarder, GatewayEvent,
	PaymentEvent, PaymentReceipt, PaymentVoucher, Permission, SignatureParts,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

pub mod eip712;

pub use eip712::PaymentDomain;

/// Errors that can occur while settling a voucher.
#[derive(Debug, Error)]
pub enum ProcessorError {
	/// The voucher deadline has passed.
	#[error("voucher expired at {deadline}, now {now}")]
	Expired { deadline: u64, now: u64 },
	/// The order id has already been consumed.
	#[error("order {0} already consumed")]
	DuplicateOrder(String),
	/// The signature is malformed or does not recover to an address.
	#[error("invalid signature: {0}")]
	InvalidSignature(String),
	/// The recovered signer does not hold the pay-signer permission.
	#[error("signer {0} lacks the pay-signer permission")]
	Unauthorized(Address),
	/// The attached value does not cover the voucher amount.
	#[error("attached value {attached} below required {required}")]
	InsufficientValue { attached: U256, required: U256 },
	/// Registry lookup failure while resolving the treasury.
	#[error(transparent)]
	Management(#[from] ManagementError),
	/// The conversion rate could not be quoted.
	#[error("rate lookup failed: {0}")]
	Rate(#[from] RateError),
	/// Settled value could not be forwarded.
	#[error("funds forwarding failed: {0}")]
	Funds(#[from] FundsError),
}

/// Clock used for deadline checks. Injectable so tests can pin time.
type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

/// Validates and settles payment vouchers.
///
/// The consumed-order set is append-only: an order id that was settled once
/// stays consumed forever, which is the whole replay defense. Consumption
/// happens under one lock acquisition, so two concurrent redemptions of the
/// same voucher resolve as exactly one success and one
/// [`ProcessorError::DuplicateOrder`].
pub struct PaymentProcessor {
	management: Arc<Management>,
	rates: Arc<dyn RateSource>,
	forwarder: Arc<dyn FundsForwarder>,
	domain: PaymentDomain,
	consumed: Mutex<HashSet<String>>,
	clock: Clock,
	events: Option<broadcast::Sender<GatewayEvent>>,
}

impl PaymentProcessor {
	/// Creates the processor. The domain separator inside `domain` is
	/// fixed for the processor's lifetime.
	pub fn new(
		management: Arc<Management>,
		rates: Arc<dyn RateSource>,
		forwarder: Arc<dyn FundsForwarder>,
		domain: PaymentDomain,
	) -> Self {
		Self {
			management,
			rates,
			forwarder,
			domain,
			consumed: Mutex::new(HashSet::new()),
			clock: Box::new(current_timestamp),
			events: None,
		}
	}

	/// Attaches an audit event sender.
	pub fn with_event_sender(mut self, sender: broadcast::Sender<GatewayEvent>) -> Self {
		self.events = Some(sender);
		self
	}

	/// Replaces the wall clock used for deadline checks.
	pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
		self.clock = Box::new(clock);
		self
	}

	/// The EIP-712 domain vouchers must be signed under.
	pub fn domain(&self) -> &PaymentDomain {
		&self.domain
	}

	/// True if `order_id` has been settled.
	pub async fn is_consumed(&self, order_id: &str) -> bool {
		self.consumed.lock().await.contains(order_id)
	}

	/// Settles a voucher.
	///
	/// `caller` is the account submitting the voucher and carrying
	/// `attached_value`; it is bound into the signed payload as the sender,
	/// so a voucher is only redeemable by the payer it was issued to.
	pub async fn pay(
		&self,
		caller: Address,
		order_id: &str,
		shop: Address,
		usd_amount: U256,
		deadline: u64,
		signature: SignatureParts,
		attached_value: U256,
	) -> Result<PaymentReceipt, ProcessorError> {
		let now = (self.clock)();
		if now > deadline {
			return Err(ProcessorError::Expired { deadline, now });
		}

		if self.is_consumed(order_id).await {
			return Err(ProcessorError::DuplicateOrder(order_id.to_string()));
		}

		let voucher = PaymentVoucher {
			order_id: order_id.to_string(),
			shop,
			sender: caller,
			usd_amount,
			deadline,
		};
		let digest = self.domain.voucher_digest(&voucher);
		let signer = recover_signer(&digest, &signature)?;

		// Permission is read live: a signer revoked after issuing a
		// voucher can no longer redeem anything signed earlier.
		if !self
			.management
			.has_permission(signer, Permission::PaymentPaySigner)
			.await
		{
			tracing::warn!(
				order_id = %truncate_id(order_id),
				signer = %signer,
				"Rejected voucher from unauthorized signer"
			);
			return Err(ProcessorError::Unauthorized(signer));
		}

		let required = self.rates.native_for_usd(usd_amount).await?;
		if attached_value < required {
			return Err(ProcessorError::InsufficientValue {
				attached: attached_value,
				required,
			});
		}

		let treasury = self.management.resolve(ContractCode::Treasury).await?;
		if treasury.is_zero() {
			// The zero sentinel means the treasury was decommissioned.
			return Err(ManagementError::NotRegistered(ContractCode::Treasury).into());
		}

		{
			let mut consumed = self.consumed.lock().await;
			if !consumed.insert(order_id.to_string()) {
				return Err(ProcessorError::DuplicateOrder(order_id.to_string()));
			}
		}

		if let Err(e) = self.forwarder.forward(treasury, attached_value).await {
			// A voucher that failed to settle must stay redeemable.
			self.consumed.lock().await.remove(order_id);
			return Err(e.into());
		}

		tracing::info!(
			order_id = %truncate_id(order_id),
			shop = %shop,
			sender = %caller,
			usd_amount = %usd_amount,
			native_value = %attached_value,
			signer = %signer,
			"Settled voucher"
		);
		self.emit(GatewayEvent::Payment(PaymentEvent::VoucherSettled {
			order_id: order_id.to_string(),
			shop,
			sender: caller,
			usd_amount,
			native_value: attached_value,
			signer,
			treasury,
		}));

		Ok(PaymentReceipt {
			order_id: order_id.to_string(),
			shop,
			sender: caller,
			usd_amount,
			native_value: attached_value,
			signer,
			treasury,
		})
	}

	fn emit(&self, event: GatewayEvent) {
		if let Some(sender) = &self.events {
			let _ = sender.send(event);
		}
	}
}

/// Recovers the signing address from a 65-byte signature over `digest`.
fn recover_signer(digest: &B256, parts: &SignatureParts) -> Result<Address, ProcessorError> {
	if parts.v != 27 && parts.v != 28 {
		return Err(ProcessorError::InvalidSignature(format!(
			"recovery id {} out of range",
			parts.v
		)));
	}
	let signature = PrimitiveSignature::new(
		U256::from_be_bytes(parts.r.0),
		U256::from_be_bytes(parts.s.0),
		parts.v == 28,
	);
	signature
		.recover_address_from_prehash(digest)
		.map_err(|e| ProcessorError::InvalidSignature(e.to_string()))
}
