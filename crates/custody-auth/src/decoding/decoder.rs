use std::fmt;

use alloy_primitives::{U256, uint};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::AuthError;

/// Length of an `r ‖ s ‖ recovery` signature.
pub const SIGNATURE_LEN: usize = 65;

/// Order `n` of the secp256k1 group.
pub const SECP256K1_ORDER: U256 =
    uint!(0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141_U256);

const LEGACY_V_OFFSET: u8 = 27;
const EIP155_V_OFFSET: u128 = 35;

/// An ECDSA signature split into transaction-ready components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedSignature {
    pub r: U256,
    pub s: U256,
    pub v: u128,
    pub(crate) recovery_id: u8,
}

impl NormalizedSignature {
    /// Base recovery id, always 0 or 1.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    pub fn r_hex(&self) -> String {
        format!("0x{:x}", self.r)
    }

    pub fn s_hex(&self) -> String {
        format!("0x{:x}", self.s)
    }

    /// Re-encode as 65 bytes `r ‖ s ‖ (recovery_id + 27)`.
    pub fn to_rsv_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        bytes[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        bytes[64] = self.recovery_id + LEGACY_V_OFFSET;
        bytes
    }
}

impl fmt::Display for NormalizedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "r: {}", self.r_hex())?;
        writeln!(f, "s: {}", self.s_hex())?;
        write!(f, "v: {}", self.v)
    }
}

/// Decode a base64 `r ‖ s ‖ recovery` signature returned by the custody
/// service.
///
/// With `apply_eip155` the chain id is folded into `v` as
/// `recovery_id + 35 + 2 * chain_id`; otherwise `v = recovery_id + 27`.
/// Decoding is structural only; nothing is verified against a message.
pub fn decode(
    signature_b64: &str,
    chain_id: u64,
    apply_eip155: bool,
) -> Result<NormalizedSignature, AuthError> {
    let bytes = STANDARD
        .decode(signature_b64.trim())
        .map_err(|e| AuthError::MalformedSignature(format!("invalid base64: {e}")))?;
    decode_bytes(&bytes, chain_id, apply_eip155)
}

/// Like [`decode`], for an already base64-decoded buffer.
pub fn decode_bytes(
    bytes: &[u8],
    chain_id: u64,
    apply_eip155: bool,
) -> Result<NormalizedSignature, AuthError> {
    if bytes.len() != SIGNATURE_LEN {
        return Err(AuthError::MalformedSignature(format!(
            "decoded {} bytes, expected {SIGNATURE_LEN}",
            bytes.len()
        )));
    }

    let recovery_id = normalize_recovery_id(bytes[64])?;
    let r = scalar("r", &bytes[..32])?;
    let s = scalar("s", &bytes[32..64])?;
    let v = v_for(recovery_id, chain_id, apply_eip155);

    debug!(chain_id, apply_eip155, recovery_id, v = %v, "decoded custody signature");
    Ok(NormalizedSignature { r, s, v, recovery_id })
}

/// Map a `{0, 1}` or `{27, 28}` recovery byte to its base recovery id.
pub fn normalize_recovery_id(raw: u8) -> Result<u8, AuthError> {
    match raw {
        0 | 1 => Ok(raw),
        27 | 28 => Ok(raw - LEGACY_V_OFFSET),
        other => Err(AuthError::InvalidRecoveryId(other)),
    }
}

/// `v` for a raw recovery byte, which must be one of `{0, 1, 27, 28}`.
pub fn compute_v(
    recovery_byte: u8,
    chain_id: u64,
    apply_eip155: bool,
) -> Result<u128, AuthError> {
    let recovery_id = normalize_recovery_id(recovery_byte)?;
    Ok(v_for(recovery_id, chain_id, apply_eip155))
}

fn v_for(recovery_id: u8, chain_id: u64, apply_eip155: bool) -> u128 {
    let recovery_id = u128::from(recovery_id);
    if apply_eip155 {
        recovery_id + EIP155_V_OFFSET + 2 * u128::from(chain_id)
    } else {
        recovery_id + u128::from(LEGACY_V_OFFSET)
    }
}

fn scalar(component: &'static str, bytes: &[u8]) -> Result<U256, AuthError> {
    let value = U256::from_be_slice(bytes);
    if value.is_zero() || value >= SECP256K1_ORDER {
        return Err(AuthError::InvalidSignatureRange { component });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(fill: u8, recovery: u8) -> Vec<u8> {
        let mut bytes = vec![fill; SIGNATURE_LEN];
        bytes[64] = recovery;
        bytes
    }

    fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn legacy_v_from_27() {
        let sig = decode(&encode(&buffer(0x01, 27)), 1, false).unwrap();
        assert_eq!(sig.r, U256::from_be_slice(&[0x01; 32]));
        assert_eq!(sig.s, sig.r);
        assert_eq!(sig.v, 27);
        assert_eq!(sig.recovery_id(), 0);
    }

    #[test]
    fn eip155_mainnet() {
        let sig = decode(&encode(&buffer(0x01, 27)), 1, true).unwrap();
        assert_eq!(sig.v, 37);
    }

    #[test]
    fn eip155_base_with_recovery_28() {
        let sig = decode(&encode(&buffer(0x01, 28)), 8453, true).unwrap();
        assert_eq!(sig.recovery_id(), 1);
        assert_eq!(sig.v, 16942);
    }

    #[test]
    fn zero_one_recovery_bytes_are_accepted() {
        assert_eq!(decode_bytes(&buffer(0x02, 0), 5, false).unwrap().v, 27);
        assert_eq!(decode_bytes(&buffer(0x02, 1), 5, false).unwrap().v, 28);
        assert_eq!(decode_bytes(&buffer(0x02, 1), 5, true).unwrap().v, 1 + 35 + 10);
    }

    #[test]
    fn v_does_not_overflow_for_max_chain_id() {
        let v = compute_v(1, u64::MAX, true).unwrap();
        assert_eq!(v, 1 + 35 + 2 * u64::MAX as u128);
        assert_eq!(compute_v(28, u64::MAX, true).unwrap(), v);
    }

    #[test]
    fn compute_v_rejects_unknown_recovery_bytes() {
        for raw in [2u8, 26, 29, 250, 255] {
            for apply_eip155 in [false, true] {
                assert!(matches!(
                    compute_v(raw, 1, apply_eip155),
                    Err(AuthError::InvalidRecoveryId(b)) if b == raw
                ));
            }
        }
        assert_eq!(compute_v(0, 1, false).unwrap(), 27);
        assert_eq!(compute_v(28, 1, false).unwrap(), 28);
    }

    #[test]
    fn short_buffer_is_malformed() {
        let error = decode(&encode(&[0x01; 64]), 1, false).unwrap_err();
        assert!(matches!(error, AuthError::MalformedSignature(ref msg) if msg.contains("64")));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let error = decode("not base64!", 1, false).unwrap_err();
        assert!(matches!(error, AuthError::MalformedSignature(_)));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let encoded = format!(" {}\n", encode(&buffer(0x01, 27)));
        assert!(decode(&encoded, 1, false).is_ok());
    }

    #[test]
    fn unknown_recovery_byte_is_rejected() {
        for raw in [2u8, 26, 29, 35, 255] {
            let error = decode_bytes(&buffer(0x01, raw), 1, false).unwrap_err();
            assert!(matches!(error, AuthError::InvalidRecoveryId(b) if b == raw));
        }
    }

    #[test]
    fn zero_r_or_s_is_out_of_range() {
        let mut zero_r = buffer(0x01, 27);
        zero_r[..32].fill(0);
        assert!(matches!(
            decode_bytes(&zero_r, 1, false).unwrap_err(),
            AuthError::InvalidSignatureRange { component: "r" }
        ));

        let mut zero_s = buffer(0x01, 27);
        zero_s[32..64].fill(0);
        assert!(matches!(
            decode_bytes(&zero_s, 1, false).unwrap_err(),
            AuthError::InvalidSignatureRange { component: "s" }
        ));
    }

    #[test]
    fn scalar_at_group_order_is_out_of_range() {
        let mut bytes = buffer(0x01, 27);
        bytes[32..64].copy_from_slice(&SECP256K1_ORDER.to_be_bytes::<32>());
        assert!(matches!(
            decode_bytes(&bytes, 1, false).unwrap_err(),
            AuthError::InvalidSignatureRange { component: "s" }
        ));

        let max = SECP256K1_ORDER - U256::from(1);
        bytes[32..64].copy_from_slice(&max.to_be_bytes::<32>());
        assert_eq!(decode_bytes(&bytes, 1, false).unwrap().s, max);
    }

    #[test]
    fn hex_and_display() {
        let sig = decode(&encode(&buffer(0x01, 27)), 1, true).unwrap();
        let expected = format!("0x{}", "01".repeat(32).trim_start_matches('0'));
        assert_eq!(sig.r_hex(), expected);
        assert_eq!(sig.to_string(), format!("r: {expected}\ns: {expected}\nv: 37"));
    }

    #[test]
    fn rsv_bytes_use_legacy_recovery_byte() {
        let original = buffer(0x03, 1);
        let sig = decode_bytes(&original, 10, true).unwrap();
        let bytes = sig.to_rsv_bytes();
        assert_eq!(&bytes[..64], &original[..64]);
        assert_eq!(bytes[64], 28);

        for raw in [0u8, 1, 27, 28] {
            let sig = decode_bytes(&buffer(0x03, raw), 1, true).unwrap();
            assert!(sig.recovery_id() <= 1);
            assert_eq!(sig.to_rsv_bytes()[64], 27 + raw % 27);
        }
    }
}
