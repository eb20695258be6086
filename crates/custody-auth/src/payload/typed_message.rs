use anyhow::{Context, Result, anyhow, bail};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::{EvmChain, RequestBody, SignMode, SignerType};

const CREATE_AND_WAIT_PATH: &str = "/api/v1/transactions/create-and-wait";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    EvmMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageDetails {
    TypedMessageType {
        raw_data: String,
        #[serde(serialize_with = "serialize_network_name")]
        chain: EvmChain,
    },
}

fn serialize_network_name<S: Serializer>(
    chain: &EvmChain,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(chain.network_name())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitForState {
    #[default]
    Signed,
}

/// An EIP-712 typed-data signing request, created and awaited in one call.
///
/// `raw_data` carries the typed data JSON verbatim; the service answers with
/// the signature in `signatures[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedMessageRequest {
    pub signer_type: SignerType,
    pub sign_mode: SignMode,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub details: MessageDetails,
    pub vault_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timeout: u64,
    pub wait_for_state: WaitForState,
    #[serde(skip)]
    chain: EvmChain,
}

impl TypedMessageRequest {
    /// Build a request for `typed_data`, taking the chain from its
    /// `domain.chainId`.
    pub fn new(vault_id: impl Into<String>, typed_data: impl Into<String>) -> Result<Self> {
        let typed_data = typed_data.into();
        let value: Value = serde_json::from_str(&typed_data).context("parsing EIP-712 typed data")?;
        let chain_id = typed_data_chain_id(&value)?;
        let chain = EvmChain::from_chain_id(chain_id)
            .ok_or_else(|| anyhow!("typed data targets unsupported chain id {chain_id}"))?;

        Ok(Self {
            signer_type: SignerType::ApiSigner,
            sign_mode: SignMode::Auto,
            message_type: MessageType::EvmMessage,
            details: MessageDetails::TypedMessageType {
                raw_data: typed_data,
                chain,
            },
            vault_id: vault_id.into(),
            note: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            wait_for_state: WaitForState::Signed,
            chain,
        })
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = timeout_secs;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain.chain_id()
    }
}

impl RequestBody for TypedMessageRequest {
    fn path(&self) -> &'static str {
        CREATE_AND_WAIT_PATH
    }

    fn chain(&self) -> EvmChain {
        self.chain
    }
}

/// Read `domain.chainId` from EIP-712 typed data. Accepts a JSON number or a
/// decimal or `0x` hex string.
pub fn typed_data_chain_id(typed_data: &Value) -> Result<u64> {
    let chain_id = typed_data
        .pointer("/domain/chainId")
        .ok_or_else(|| anyhow!("typed data has no domain.chainId"))?;

    match chain_id {
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| anyhow!("domain.chainId {number} is not an unsigned integer")),
        Value::String(text) => match text.strip_prefix("0x") {
            Some(hex_digits) => u64::from_str_radix(hex_digits, 16)
                .with_context(|| format!("invalid hex domain.chainId `{text}`")),
            None => text
                .parse::<u64>()
                .with_context(|| format!("invalid domain.chainId `{text}`")),
        },
        other => bail!("domain.chainId has unexpected type: {other}"),
    }
}
