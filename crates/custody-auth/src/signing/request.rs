use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use super::signer::{RequestSigningKey, signing_failure};
use crate::error::AuthError;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// The exact bytes a request signature covers: `{path}|{timestamp}|{body}`.
///
/// `body` is copied byte-for-byte; it must be the buffer that goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload(Vec<u8>);

impl CanonicalPayload {
    pub fn new(path: &str, timestamp: u64, body: &[u8]) -> Self {
        let timestamp = timestamp.to_string();
        let mut bytes = Vec::with_capacity(path.len() + timestamp.len() + body.len() + 2);
        bytes.extend_from_slice(path.as_bytes());
        bytes.push(b'|');
        bytes.extend_from_slice(timestamp.as_bytes());
        bytes.push(b'|');
        bytes.extend_from_slice(body);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Sign an API call with `key`, returning the base64 signature for the
/// `x-signature` header.
pub fn sign(
    method_path: &str,
    timestamp: u64,
    body: &[u8],
    key: Option<&dyn RequestSigningKey>,
) -> Result<String, AuthError> {
    let key = key.ok_or(AuthError::KeyUnavailable)?;
    let payload = CanonicalPayload::new(method_path, timestamp, body);

    let signature = key.sign(payload.as_bytes())?;
    if signature.is_empty() {
        return Err(signing_failure(key.algorithm(), "empty signature"));
    }

    debug!(
        path = method_path,
        timestamp,
        body_len = body.len(),
        algorithm = key.algorithm(),
        "signed API request"
    );
    Ok(STANDARD.encode(signature))
}

/// Signs outbound API calls with the process's API signer key.
///
/// The key is built once by the entry point and shared; a signer without a
/// key fails every call with [`AuthError::KeyUnavailable`].
#[derive(Clone, Default)]
pub struct RequestSigner {
    key: Option<Arc<dyn RequestSigningKey>>,
}

impl RequestSigner {
    pub fn new(key: Arc<dyn RequestSigningKey>) -> Self {
        Self { key: Some(key) }
    }

    pub fn from_optional(key: Option<Arc<dyn RequestSigningKey>>) -> Self {
        Self { key }
    }

    pub fn key(&self) -> Option<&dyn RequestSigningKey> {
        self.key.as_deref()
    }

    pub fn sign(&self, method_path: &str, timestamp: u64, body: &[u8]) -> Result<String, AuthError> {
        sign(method_path, timestamp, body, self.key())
    }

    /// Sign `body` and keep it together with the signature, so the bytes that
    /// were signed are the bytes that get sent.
    pub fn sign_request(
        &self,
        method_path: &str,
        timestamp: u64,
        body: Vec<u8>,
    ) -> Result<SignedRequest, AuthError> {
        let signature = self.sign(method_path, timestamp, &body)?;
        Ok(SignedRequest {
            path: method_path.to_string(),
            timestamp,
            body,
            signature,
        })
    }
}

/// A request body together with its authentication signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub path: String,
    pub timestamp: u64,
    pub body: Vec<u8>,
    /// Base64 signature over `path|timestamp|body`.
    pub signature: String,
}

impl SignedRequest {
    /// Headers the transport must attach, in send order.
    pub fn headers(&self, user_token: &str) -> Vec<(&'static str, String)> {
        vec![
            (AUTHORIZATION_HEADER, format!("Bearer {user_token}")),
            (TIMESTAMP_HEADER, self.timestamp.to_string()),
            (SIGNATURE_HEADER, self.signature.clone()),
            (CONTENT_TYPE_HEADER, "application/json".to_string()),
        ]
    }

    pub fn canonical_payload(&self) -> CanonicalPayload {
        CanonicalPayload::new(&self.path, self.timestamp, &self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::Ed25519Key;

    struct RejectingKey;

    impl RequestSigningKey for RejectingKey {
        fn sign(&self, _data: &[u8]) -> Result<Vec<u8>, AuthError> {
            Err(signing_failure("test", "key material rejected"))
        }

        fn public_key_bytes(&self) -> Vec<u8> {
            Vec::new()
        }

        fn algorithm(&self) -> &str {
            "test"
        }
    }

    struct EmptyKey;

    impl RequestSigningKey for EmptyKey {
        fn sign(&self, _data: &[u8]) -> Result<Vec<u8>, AuthError> {
            Ok(Vec::new())
        }

        fn public_key_bytes(&self) -> Vec<u8> {
            Vec::new()
        }

        fn algorithm(&self) -> &str {
            "empty"
        }
    }

    #[test]
    fn canonical_payload_is_plain_concatenation() {
        let payload = CanonicalPayload::new("/api/v1/transactions", 1700000000, br#"{"a":1}"#);
        assert_eq!(payload.as_bytes(), br#"/api/v1/transactions|1700000000|{"a":1}"#);
    }

    #[test]
    fn canonical_payload_keeps_body_bytes_verbatim() {
        let body = b"{ \"b\" : 2,\n \"a\":1 }\xff";
        let payload = CanonicalPayload::new("/p", 0, body);
        assert!(payload.as_bytes().ends_with(body));
        assert_eq!(payload.as_bytes().len(), "/p|0|".len() + body.len());
    }

    #[test]
    fn missing_key_is_key_unavailable() {
        let signer = RequestSigner::default();
        let error = signer.sign("/api/v1/transactions", 1, b"{}").unwrap_err();
        assert!(matches!(error, AuthError::KeyUnavailable));
    }

    #[test]
    fn primitive_failure_is_propagated() {
        let signer = RequestSigner::new(Arc::new(RejectingKey));
        let error = signer.sign("/api/v1/transactions", 1, b"{}").unwrap_err();
        assert!(matches!(error, AuthError::SigningFailure { .. }));
    }

    #[test]
    fn empty_signature_is_never_returned() {
        let signer = RequestSigner::new(Arc::new(EmptyKey));
        let error = signer.sign("/api/v1/transactions", 1, b"{}").unwrap_err();
        assert!(matches!(error, AuthError::SigningFailure { ref algorithm, .. } if algorithm == "empty"));
    }

    #[test]
    fn signature_is_base64_of_key_output() {
        let key = Ed25519Key::from_seed("request-test");
        let expected = key
            .sign(CanonicalPayload::new("/p", 5, b"body").as_bytes())
            .unwrap();

        let signer = RequestSigner::new(Arc::new(key));
        let encoded = signer.sign("/p", 5, b"body").unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), expected);
    }

    #[test]
    fn signed_request_headers() {
        let signer = RequestSigner::new(Arc::new(Ed25519Key::from_seed("headers")));
        let request = signer
            .sign_request("/api/v1/transactions", 1700000000, br#"{"a":1}"#.to_vec())
            .unwrap();

        let headers = request.headers("token-123");
        assert_eq!(headers[0], (AUTHORIZATION_HEADER, "Bearer token-123".to_string()));
        assert_eq!(headers[1], (TIMESTAMP_HEADER, "1700000000".to_string()));
        assert_eq!(headers[2], (SIGNATURE_HEADER, request.signature.clone()));
        assert_eq!(headers[3], (CONTENT_TYPE_HEADER, "application/json".to_string()));
        assert_eq!(request.body, br#"{"a":1}"#);
        assert_eq!(
            request.canonical_payload(),
            CanonicalPayload::new("/api/v1/transactions", 1700000000, br#"{"a":1}"#)
        );
    }
}
