mod decoder;
mod recovery;
mod response;

pub use decoder::{
    NormalizedSignature, SECP256K1_ORDER, SIGNATURE_LEN, compute_v, decode, decode_bytes,
    normalize_recovery_id,
};
pub use recovery::address_of;
pub use response::SigningResponse;
