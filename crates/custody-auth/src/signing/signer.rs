use crate::error::AuthError;

/// An asymmetric private key that authenticates API requests.
///
/// Implementations are sync since signing is CPU-bound. Keys are loaded once
/// and shared read-only, so `sign` takes `&self`.
pub trait RequestSigningKey: Send + Sync {
    /// Sign the canonical payload bytes. Returns raw signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, AuthError>;

    /// Encoded public key bytes, for registering the API signer.
    fn public_key_bytes(&self) -> Vec<u8>;

    /// Algorithm identifier string (e.g. "ecdsa-p256-sha256").
    fn algorithm(&self) -> &str;
}

pub(crate) fn signing_failure(algorithm: &str, reason: impl std::fmt::Display) -> AuthError {
    AuthError::SigningFailure {
        algorithm: algorithm.to_string(),
        reason: reason.to_string(),
    }
}
