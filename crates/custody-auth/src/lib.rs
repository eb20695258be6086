//! Request authentication and signature decoding for a custodial
//! transaction-signing API.
//!
//! [`RequestSigner`] signs `path|timestamp|body` with the API signer's private
//! key. [`decode`] turns a base64 `r ‖ s ‖ v` blob returned by the service into
//! `(r, s, v)` with legacy or EIP-155 `v`.

pub mod error;
pub mod signing;
pub mod decoding;
pub mod payload;

pub use error::{AuthError, Stage};
pub use signing::{
    EcdsaP256Key, Ed25519Key, KeyAlgorithm, RequestSigner, RequestSigningKey, RsaPssKey,
    SignedRequest, load_signing_key, load_signing_key_file,
};
pub use decoding::{NormalizedSignature, SigningResponse, decode};
pub use payload::{
    AllowanceAmount, AllowanceTransactionRequest, EvmChain, RequestBody, TypedMessageRequest,
};
