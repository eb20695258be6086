use anyhow::{Result, anyhow};
use p256::SecretKey;
use p256::ecdsa::{Signature, SigningKey, signature::Signer};
use p256::pkcs8::DecodePrivateKey;
use sha2::{Digest, Sha256};

use super::signer::{RequestSigningKey, signing_failure};
use crate::error::AuthError;

const ALGORITHM: &str = "ecdsa-p256-sha256";

/// ECDSA signer over NIST P-256 with a SHA-256 message digest.
///
/// Signatures are DER-encoded and deterministic (RFC 6979). This is the key
/// type the custody API registers for API signers.
pub struct EcdsaP256Key {
    signing_key: SigningKey,
}

impl EcdsaP256Key {
    /// Load from a PEM file body, either SEC1 (`EC PRIVATE KEY`) or PKCS#8.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let signing_key = if pem.contains("BEGIN EC PRIVATE KEY") {
            SecretKey::from_sec1_pem(pem)
                .map(SigningKey::from)
                .map_err(|e| anyhow!("parsing SEC1 P-256 private key: {e}"))?
        } else {
            SigningKey::from_pkcs8_pem(pem)
                .map_err(|e| anyhow!("parsing PKCS#8 P-256 private key: {e}"))?
        };
        Ok(Self { signing_key })
    }

    /// The SHA-256 hash of the seed becomes the 32-byte private scalar.
    pub fn from_seed(seed: &str) -> Result<Self> {
        let hash = Sha256::digest(seed.as_bytes());
        let signing_key = SigningKey::from_bytes(&hash)
            .map_err(|e| anyhow!("invalid seed: {e}"))?;
        Ok(Self { signing_key })
    }
}

impl RequestSigningKey for EcdsaP256Key {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, AuthError> {
        let signature: Signature = self
            .signing_key
            .try_sign(data)
            .map_err(|e| signing_failure(ALGORITHM, e))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    fn algorithm(&self) -> &str {
        ALGORITHM
    }
}
