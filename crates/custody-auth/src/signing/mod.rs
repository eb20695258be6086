mod signer;
mod ecdsa_p256;
mod ed25519;
mod rsa_pss;
mod keys;
mod request;

pub use signer::RequestSigningKey;
pub use ecdsa_p256::EcdsaP256Key;
pub use ed25519::Ed25519Key;
pub use rsa_pss::RsaPssKey;
pub use keys::{KeyAlgorithm, load_signing_key, load_signing_key_file};
pub use request::{
    AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER, CanonicalPayload, RequestSigner, SIGNATURE_HEADER,
    SignedRequest, TIMESTAMP_HEADER, sign,
};
