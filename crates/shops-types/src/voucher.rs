//! Payment voucher types and the 65-byte signature layout.
//!
//! A voucher is an off-chain signed payment order: whoever holds a validly
//! signed voucher may redeem it, carrying the funds, while the authority to
//! *issue* it rests with the signer. The processor admits each voucher at
//! most once.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// The signed tuple redeemable exactly once through the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVoucher {
	/// One-time-use order identifier. UUID-shaped in practice, not enforced.
	pub order_id: String,
	/// Destination shop address.
	pub shop: Address,
	/// The payer. Must match the account submitting the voucher.
	pub sender: Address,
	/// USD-pegged amount, fixed point with 18 decimals.
	pub usd_amount: U256,
	/// Absolute expiry instant, seconds since the epoch.
	pub deadline: u64,
}

/// A 65-byte ECDSA signature split into its `(r, s, v)` components.
///
/// `v` is carried as received; the processor rejects anything outside
/// `{27, 28}` during recovery rather than at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParts {
	/// Recovery id, expected to be 27 or 28.
	pub v: u8,
	/// First 32 bytes of the signature.
	pub r: B256,
	/// Second 32 bytes of the signature.
	pub s: B256,
}

impl SignatureParts {
	/// Splits the standard 65-byte `r || s || v` wire layout.
	pub fn from_bytes(bytes: &[u8; 65]) -> Self {
		let mut r = [0u8; 32];
		let mut s = [0u8; 32];
		r.copy_from_slice(&bytes[..32]);
		s.copy_from_slice(&bytes[32..64]);
		Self {
			v: bytes[64],
			r: B256::from(r),
			s: B256::from(s),
		}
	}

	/// Re-assembles the 65-byte `r || s || v` wire layout.
	pub fn to_bytes(&self) -> [u8; 65] {
		let mut out = [0u8; 65];
		out[..32].copy_from_slice(self.r.as_slice());
		out[32..64].copy_from_slice(self.s.as_slice());
		out[64] = self.v;
		out
	}
}

/// Audit record returned once a voucher has been consumed and settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
	/// The consumed order identifier.
	pub order_id: String,
	/// Destination shop address.
	pub shop: Address,
	/// The payer that submitted the voucher.
	pub sender: Address,
	/// USD amount carried by the voucher.
	pub usd_amount: U256,
	/// Native value actually forwarded to the treasury.
	pub native_value: U256,
	/// The account recovered from the voucher signature.
	pub signer: Address,
	/// Treasury address the funds were routed to.
	pub treasury: Address,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_signature_bytes_round_trip() {
		let mut bytes = [0u8; 65];
		for (i, b) in bytes.iter_mut().enumerate() {
			*b = i as u8;
		}
		bytes[64] = 28;

		let parts = SignatureParts::from_bytes(&bytes);
		assert_eq!(parts.v, 28);
		assert_eq!(parts.r.as_slice(), &bytes[..32]);
		assert_eq!(parts.s.as_slice(), &bytes[32..64]);
		assert_eq!(parts.to_bytes(), bytes);
	}
}
