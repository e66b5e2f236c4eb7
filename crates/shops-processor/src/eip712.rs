//! Typed-data hashing for payment vouchers.
//!
//! Builds the `Container` struct hash and the domain-bound final digest a
//! voucher signature is verified against. Uses the generic EIP-712
//! utilities from `shops-types`.

use alloy_primitives::{keccak256, Address, B256, U256};
use shops_types::utils::{compute_domain_hash, compute_final_digest, Eip712AbiEncoder};
use shops_types::PaymentVoucher;

/// The struct type string vouchers are hashed under.
pub const CONTAINER_TYPE: &str =
	"Container(string orderId,address shop,address sender,uint256 usdAmount,uint256 deadline)";

/// Name bound into the domain separator. Kept byte-for-byte as deployed,
/// misspelling included, so previously issued signatures stay valid.
pub const DOMAIN_NAME: &str = "KRUShopsPaymentProccesor";

/// Version bound into the domain separator.
pub const DOMAIN_VERSION: &str = "v1";

/// Immutable EIP-712 domain configuration for the processor.
///
/// The separator is computed once at construction; a processor never
/// changes chain or address after deployment.
#[derive(Debug, Clone)]
pub struct PaymentDomain {
	chain_id: u64,
	verifying_contract: Address,
	separator: B256,
}

impl PaymentDomain {
	/// Computes the domain separator for the given chain and processor
	/// address.
	pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
		let separator =
			compute_domain_hash(DOMAIN_NAME, DOMAIN_VERSION, chain_id, &verifying_contract);
		Self {
			chain_id,
			verifying_contract,
			separator,
		}
	}

	/// The chain this domain is bound to.
	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	/// The processor address this domain is bound to.
	pub fn verifying_contract(&self) -> Address {
		self.verifying_contract
	}

	/// The precomputed domain separator.
	pub fn separator(&self) -> B256 {
		self.separator
	}

	/// The final digest a voucher signature is checked against.
	pub fn voucher_digest(&self, voucher: &PaymentVoucher) -> B256 {
		compute_final_digest(&self.separator, &hash_container(voucher))
	}
}

/// Hashes a voucher per the typed-data struct-hash composition rule:
/// dynamic strings enter as their keccak hash, static fields as words.
fn hash_container(voucher: &PaymentVoucher) -> B256 {
	let type_hash = keccak256(CONTAINER_TYPE.as_bytes());
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&type_hash);
	enc.push_string_hash(&voucher.order_id);
	enc.push_address(&voucher.shop);
	enc.push_address(&voucher.sender);
	enc.push_u256(voucher.usd_amount);
	enc.push_u256(U256::from(voucher.deadline));
	keccak256(enc.finish())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn voucher() -> PaymentVoucher {
		PaymentVoucher {
			order_id: "45c82009-a1bb-4938-a6c7-1ef46c4d6c4f".to_string(),
			shop: Address::repeat_byte(0x23),
			sender: Address::repeat_byte(0x74),
			usd_amount: U256::from(121u64) * U256::from(10).pow(U256::from(18)),
			deadline: 1649425727,
		}
	}

	#[test]
	fn test_digest_is_deterministic() {
		let domain = PaymentDomain::new(1717, Address::repeat_byte(0x10));
		assert_eq!(domain.voucher_digest(&voucher()), domain.voucher_digest(&voucher()));
	}

	#[test]
	fn test_digest_binds_every_voucher_field() {
		let domain = PaymentDomain::new(1717, Address::repeat_byte(0x10));
		let base = domain.voucher_digest(&voucher());

		let mut changed = voucher();
		changed.order_id.push('x');
		assert_ne!(base, domain.voucher_digest(&changed));

		let mut changed = voucher();
		changed.shop = Address::repeat_byte(0x24);
		assert_ne!(base, domain.voucher_digest(&changed));

		let mut changed = voucher();
		changed.sender = Address::repeat_byte(0x75);
		assert_ne!(base, domain.voucher_digest(&changed));

		let mut changed = voucher();
		changed.usd_amount += U256::from(1);
		assert_ne!(base, domain.voucher_digest(&changed));

		let mut changed = voucher();
		changed.deadline += 1;
		assert_ne!(base, domain.voucher_digest(&changed));
	}

	#[test]
	fn test_digest_binds_the_domain() {
		let voucher = voucher();
		let base = PaymentDomain::new(1717, Address::repeat_byte(0x10));

		let other_chain = PaymentDomain::new(1, Address::repeat_byte(0x10));
		assert_ne!(
			base.voucher_digest(&voucher),
			other_chain.voucher_digest(&voucher)
		);

		let other_contract = PaymentDomain::new(1717, Address::repeat_byte(0x11));
		assert_ne!(
			base.voucher_digest(&voucher),
			other_contract.voucher_digest(&voucher)
		);
	}
}
