use anyhow::{Result, anyhow};
use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};

use super::signer::{RequestSigningKey, signing_failure};
use crate::error::AuthError;

const ALGORITHM: &str = "ed25519";

/// Ed25519 signer. Signatures are 64 bytes and deterministic.
pub struct Ed25519Key {
    signing_key: SigningKey,
}

impl Ed25519Key {
    /// Load from a PKCS#8 PEM file body.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let signing_key = SigningKey::from_pkcs8_pem(pem)
            .map_err(|e| anyhow!("parsing PKCS#8 Ed25519 private key: {e}"))?;
        Ok(Self { signing_key })
    }

    /// The SHA-256 hash of the seed becomes the 32-byte secret key.
    pub fn from_seed(seed: &str) -> Self {
        let secret: [u8; 32] = Sha256::digest(seed.as_bytes()).into();
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }
}

impl RequestSigningKey for Ed25519Key {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, AuthError> {
        let signature = self
            .signing_key
            .try_sign(data)
            .map_err(|e| signing_failure(ALGORITHM, e))?;
        Ok(signature.to_bytes().to_vec())
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        self.signing_key.verifying_key().to_bytes().to_vec()
    }

    fn algorithm(&self) -> &str {
        ALGORITHM
    }
}
