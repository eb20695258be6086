/// Stage of the request lifecycle an [`AuthError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RequestSigning,
    SignatureDecoding,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("request signing: no API signing key is configured")]
    KeyUnavailable,
    #[error("request signing: {algorithm} signer rejected the payload: {reason}")]
    SigningFailure {
        algorithm: String,
        reason: String,
    },
    #[error("signature decoding: malformed signature: {0}")]
    MalformedSignature(String),
    #[error("signature decoding: invalid recovery id byte {0} (expected 0, 1, 27 or 28)")]
    InvalidRecoveryId(u8),
    #[error("signature decoding: `{component}` is outside [1, n-1] of secp256k1")]
    InvalidSignatureRange { component: &'static str },
}

impl AuthError {
    pub fn stage(&self) -> Stage {
        match self {
            AuthError::KeyUnavailable | AuthError::SigningFailure { .. } => Stage::RequestSigning,
            AuthError::MalformedSignature(_)
            | AuthError::InvalidRecoveryId(_)
            | AuthError::InvalidSignatureRange { .. } => Stage::SignatureDecoding,
        }
    }

    /// True when the error points at local key setup rather than at a
    /// response from the custody service.
    pub fn is_configuration_error(&self) -> bool {
        self.stage() == Stage::RequestSigning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_unavailable_is_configuration_error() {
        let error = AuthError::KeyUnavailable;
        assert_eq!(error.stage(), Stage::RequestSigning);
        assert!(error.is_configuration_error());
    }

    #[test]
    fn decoding_errors_are_response_errors() {
        let errors = [
            AuthError::MalformedSignature("decoded 64 bytes, expected 65".into()),
            AuthError::InvalidRecoveryId(2),
            AuthError::InvalidSignatureRange { component: "r" },
        ];
        for error in errors {
            assert_eq!(error.stage(), Stage::SignatureDecoding);
            assert!(!error.is_configuration_error());
        }
    }

    #[test]
    fn messages_name_their_stage() {
        let signing = AuthError::SigningFailure {
            algorithm: "ed25519".into(),
            reason: "bad key".into(),
        };
        assert!(signing.to_string().starts_with("request signing:"));
        assert!(signing.to_string().contains("ed25519"));

        let range = AuthError::InvalidSignatureRange { component: "s" };
        assert!(range.to_string().starts_with("signature decoding:"));
        assert!(range.to_string().contains("`s`"));
    }

    #[test]
    fn invalid_recovery_id_reports_byte() {
        let error = AuthError::InvalidRecoveryId(29);
        assert!(error.to_string().contains("29"));
    }
}
