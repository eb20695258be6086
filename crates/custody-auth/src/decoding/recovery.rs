use alloy_primitives::{Address, B256, keccak256};
use anyhow::{Result, anyhow};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use super::decoder::NormalizedSignature;

impl NormalizedSignature {
    /// Recover the Ethereum address that produced this signature over
    /// `prehash` (e.g. an EIP-712 signing hash or a transaction sighash).
    ///
    /// High-`s` signatures are normalized first, flipping the recovery id.
    pub fn recover_address(&self, prehash: B256) -> Result<Address> {
        let signature = Signature::from_scalars(self.r.to_be_bytes::<32>(), self.s.to_be_bytes::<32>())
            .map_err(|e| anyhow!("invalid secp256k1 signature scalars: {e}"))?;

        let (signature, recovery_byte) = match signature.normalize_s() {
            Some(low_s) => (low_s, self.recovery_id ^ 1),
            None => (signature, self.recovery_id),
        };
        let recovery_id = RecoveryId::from_byte(recovery_byte)
            .ok_or_else(|| anyhow!("invalid recovery id {recovery_byte}"))?;

        let verifying_key = VerifyingKey::recover_from_prehash(prehash.as_slice(), &signature, recovery_id)
            .map_err(|e| anyhow!("public key recovery failed: {e}"))?;
        Ok(address_of(&verifying_key))
    }
}

/// Ethereum address of a secp256k1 public key: the last 20 bytes of
/// `keccak256` over the uncompressed point without its `0x04` prefix.
pub fn address_of(verifying_key: &VerifyingKey) -> Address {
    let point = verifying_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
