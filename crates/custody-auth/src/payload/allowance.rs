use std::str::FromStr;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, sol};
use anyhow::{Context, Result};
use serde::Serialize;

use super::{EvmChain, RequestBody, SignMode, SignerType};

sol! {
    function approve(address spender, uint256 amount) external returns (bool);
}

const TRANSACTIONS_PATH: &str = "/api/v1/transactions";

/// ERC-20 allowance granted to the spender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceAmount {
    /// `2^256 - 1`, which ERC-20 tokens treat as a non-decreasing allowance.
    Unlimited,
    Exact(U256),
}

impl AllowanceAmount {
    pub fn value(&self) -> U256 {
        match self {
            Self::Unlimited => U256::MAX,
            Self::Exact(amount) => *amount,
        }
    }
}

impl FromStr for AllowanceAmount {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("unlimited") || s.eq_ignore_ascii_case("max") {
            return Ok(Self::Unlimited);
        }
        let amount = s
            .parse::<U256>()
            .with_context(|| format!("invalid allowance amount `{s}`"))?;
        Ok(Self::Exact(amount))
    }
}

/// ABI-encoded calldata for `approve(spender, amount)`.
pub fn approve_calldata(spender: Address, amount: U256) -> Vec<u8> {
    approveCall { spender, amount }.abi_encode()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[default]
    EvmTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionDetails {
    EvmRawTransaction {
        use_secure_node: bool,
        chain: EvmChain,
        gas: GasConfig,
        to: String,
        value: String,
        data: CallData,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GasConfig {
    Priority { priority_level: PriorityLevel },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallData {
    Hex { hex_data: String },
}

/// An ERC-20 `approve` sent from a custody vault as a raw EVM transaction.
///
/// The transaction targets the token contract (the proxy, for upgradeable
/// tokens) and carries no native value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowanceTransactionRequest {
    pub vault_id: String,
    pub signer_type: SignerType,
    pub sign_mode: SignMode,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub details: TransactionDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip)]
    chain: EvmChain,
}

impl AllowanceTransactionRequest {
    pub fn new(
        vault_id: impl Into<String>,
        chain: EvmChain,
        token: Address,
        spender: Address,
        amount: AllowanceAmount,
    ) -> Self {
        let calldata = approve_calldata(spender, amount.value());
        Self {
            vault_id: vault_id.into(),
            signer_type: SignerType::ApiSigner,
            sign_mode: SignMode::Auto,
            transaction_type: TransactionType::EvmTransaction,
            details: TransactionDetails::EvmRawTransaction {
                use_secure_node: false,
                chain,
                gas: GasConfig::Priority {
                    priority_level: PriorityLevel::Medium,
                },
                to: token.to_checksum(None),
                value: "0".to_string(),
                data: CallData::Hex {
                    hex_data: format!("0x{}", hex::encode(calldata)),
                },
            },
            note: None,
            chain,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl RequestBody for AllowanceTransactionRequest {
    fn path(&self) -> &'static str {
        TRANSACTIONS_PATH
    }

    fn chain(&self) -> EvmChain {
        self.chain
    }
}
