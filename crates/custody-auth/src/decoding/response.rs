use anyhow::{Context, Result};
use serde::Deserialize;

use super::decoder::{NormalizedSignature, decode};

/// The parts of a custody transaction response this crate reads.
///
/// Unknown fields are ignored; `signatures` holds base64 `r ‖ s ‖ v` blobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigningResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub signatures: Vec<String>,
}

impl SigningResponse {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("deserializing custody signing response")
    }

    /// Decode every returned signature in order, stopping at the first bad one.
    pub fn decode_signatures(&self, chain_id: u64, apply_eip155: bool) -> Result<Vec<NormalizedSignature>> {
        self.signatures
            .iter()
            .enumerate()
            .map(|(index, signature)| {
                decode(signature, chain_id, apply_eip155)
                    .with_context(|| format!("decoding signatures[{index}]"))
            })
            .collect()
    }
}
