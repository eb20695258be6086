use anyhow::{Context, Result};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey};
use rsa::pss::BlindedSigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use sha2::Sha256;

use super::signer::{RequestSigningKey, signing_failure};
use crate::error::AuthError;

const ALGORITHM: &str = "rsa-pss-sha256";

/// RSA-PSS signer with SHA-256 digest.
///
/// The salt is drawn fresh for every signature, so two signatures over the
/// same payload differ. Both verify.
pub struct RsaPssKey {
    signing_key: BlindedSigningKey<Sha256>,
    public_key_der: Vec<u8>,
}

impl RsaPssKey {
    /// Load from a PEM file body, either PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let private_key = if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem).context("parsing PKCS#1 RSA private key")?
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem).context("parsing PKCS#8 RSA private key")?
        };
        Self::from_private_key(private_key)
    }

    pub fn from_private_key(private_key: RsaPrivateKey) -> Result<Self> {
        let public_key_der = private_key
            .to_public_key()
            .to_public_key_der()
            .context("encoding RSA public key to DER")?
            .into_vec();
        Ok(Self {
            signing_key: BlindedSigningKey::<Sha256>::new(private_key),
            public_key_der,
        })
    }
}

impl RequestSigningKey for RsaPssKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, AuthError> {
        let signature = self
            .signing_key
            .try_sign_with_rng(&mut rand::thread_rng(), data)
            .map_err(|e| signing_failure(ALGORITHM, e))?;
        Ok(signature.to_vec())
    }

    /// SubjectPublicKeyInfo DER.
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public_key_der.clone()
    }

    fn algorithm(&self) -> &str {
        ALGORITHM
    }
}
