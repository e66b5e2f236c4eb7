//! Generic EIP-712 utilities shared across the gateway.
//!
//! These helpers provide:
//! - Domain hash computation over `(name, version, chainId, verifyingContract)`
//! - Final digest computation (0x1901 || domainHash || structHash)
//! - A minimal ABI encoder for the static field types used in struct hashing

use alloy_primitives::{keccak256, Address, B256, U256};

/// The domain type string. The voucher domain carries a version field in
/// addition to name, chain id, and verifying contract.
pub const DOMAIN_TYPE: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Compute the EIP-712 domain hash:
/// `keccak256(abi.encode(typeHash, nameHash, versionHash, chainId, verifyingContract))`.
pub fn compute_domain_hash(
	name: &str,
	version: &str,
	chain_id: u64,
	verifying_contract: &Address,
) -> B256 {
	let domain_type_hash = keccak256(DOMAIN_TYPE.as_bytes());
	let name_hash = keccak256(name.as_bytes());
	let version_hash = keccak256(version.as_bytes());
	let mut enc = Eip712AbiEncoder::new();
	enc.push_b256(&domain_type_hash);
	enc.push_b256(&name_hash);
	enc.push_b256(&version_hash);
	enc.push_u256(U256::from(chain_id));
	enc.push_address(verifying_contract);
	keccak256(enc.finish())
}

/// Compute the final EIP-712 digest: `keccak256(0x1901 || domainHash || structHash)`.
pub fn compute_final_digest(domain_hash: &B256, struct_hash: &B256) -> B256 {
	let mut out = Vec::with_capacity(2 + 32 + 32);
	out.push(0x19);
	out.push(0x01);
	out.extend_from_slice(domain_hash.as_slice());
	out.extend_from_slice(struct_hash.as_slice());
	keccak256(out)
}

/// Minimal ABI encoder for static types used in EIP-712 struct hashing.
pub struct Eip712AbiEncoder {
	buf: Vec<u8>,
}

impl Default for Eip712AbiEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl Eip712AbiEncoder {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	/// Pushes the keccak hash of a dynamic string field, per the typed-data
	/// encoding rule for `string` members.
	pub fn push_string_hash(&mut self, s: &str) {
		self.push_b256(&keccak256(s.as_bytes()));
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encoder_word_alignment() {
		let addr = Address::repeat_byte(0xAB);
		let mut enc = Eip712AbiEncoder::new();
		enc.push_address(&addr);
		enc.push_u256(U256::from(1u64));
		let buf = enc.finish();

		assert_eq!(buf.len(), 64);
		// Address is left-padded to a full word
		assert_eq!(&buf[..12], &[0u8; 12]);
		assert_eq!(&buf[12..32], addr.as_slice());
		// Integers are big-endian words
		assert_eq!(buf[63], 1);
		assert_eq!(&buf[32..63], &[0u8; 31]);
	}

	#[test]
	fn test_domain_hash_binds_every_field() {
		let contract = Address::repeat_byte(0x11);
		let base = compute_domain_hash("KRUShopsPaymentProccesor", "v1", 1717, &contract);

		assert_ne!(
			base,
			compute_domain_hash("KRUShopsPaymentProccesor", "v1", 1, &contract)
		);
		assert_ne!(
			base,
			compute_domain_hash("KRUShopsPaymentProccesor", "v2", 1717, &contract)
		);
		assert_ne!(
			base,
			compute_domain_hash("Other", "v1", 1717, &contract)
		);
		assert_ne!(
			base,
			compute_domain_hash(
				"KRUShopsPaymentProccesor",
				"v1",
				1717,
				&Address::repeat_byte(0x22)
			)
		);
		// Deterministic for identical inputs
		assert_eq!(
			base,
			compute_domain_hash("KRUShopsPaymentProccesor", "v1", 1717, &contract)
		);
	}

	#[test]
	fn test_final_digest_sensitivity() {
		let domain = B256::repeat_byte(0x01);
		let struct_hash = B256::repeat_byte(0x02);
		let digest = compute_final_digest(&domain, &struct_hash);

		assert_ne!(digest, compute_final_digest(&domain, &B256::repeat_byte(0x03)));
		assert_ne!(digest, compute_final_digest(&B256::repeat_byte(0x04), &struct_hash));
	}
}
