mod allowance;
mod typed_message;

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::Serialize;

pub use allowance::{AllowanceAmount, AllowanceTransactionRequest, approve_calldata};
pub use typed_message::{TypedMessageRequest, typed_data_chain_id};

/// Trait for request records posted to the custody API.
///
/// The body is serialized exactly once; those bytes are what gets signed and
/// what gets sent.
pub trait RequestBody: Serialize {
    /// API path the body is posted to.
    fn path(&self) -> &'static str;

    /// Chain the request targets.
    fn chain(&self) -> EvmChain;

    fn to_body(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("serializing request body")
    }
}

/// Who signs on the custody side. API requests always use the API signer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerType {
    #[default]
    ApiSigner,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignMode {
    #[default]
    Auto,
}

/// EVM chains the custody API accepts, serialized as its chain identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvmChain {
    #[serde(rename = "evm_ethereum_mainnet")]
    Ethereum,
    #[serde(rename = "evm_base_mainnet")]
    Base,
    #[serde(rename = "evm_arbitrum_mainnet")]
    Arbitrum,
    #[serde(rename = "evm_optimism_mainnet")]
    Optimism,
    #[serde(rename = "evm_polygon_mainnet")]
    Polygon,
    #[serde(rename = "evm_bsc_mainnet")]
    Bsc,
}

impl EvmChain {
    pub const ALL: [EvmChain; 6] = [
        Self::Ethereum,
        Self::Base,
        Self::Arbitrum,
        Self::Optimism,
        Self::Polygon,
        Self::Bsc,
    ];

    pub fn chain_id(&self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Base => 8453,
            Self::Arbitrum => 42161,
            Self::Optimism => 10,
            Self::Polygon => 137,
            Self::Bsc => 56,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|chain| chain.chain_id() == chain_id)
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Base => "base",
            Self::Arbitrum => "arbitrum",
            Self::Optimism => "optimism",
            Self::Polygon => "polygon",
            Self::Bsc => "bsc",
        }
    }

    /// Network name without the `evm_` family prefix, as message requests
    /// carry it.
    pub fn network_name(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum_mainnet",
            Self::Base => "base_mainnet",
            Self::Arbitrum => "arbitrum_mainnet",
            Self::Optimism => "optimism_mainnet",
            Self::Polygon => "polygon_mainnet",
            Self::Bsc => "bsc_mainnet",
        }
    }
}

impl fmt::Display for EvmChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EvmChain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.to_ascii_lowercase();
        let name = name
            .strip_prefix("evm_")
            .unwrap_or(&name)
            .trim_end_matches("_mainnet");
        match Self::ALL.into_iter().find(|chain| chain.as_str() == name) {
            Some(chain) => Ok(chain),
            None => bail!("unsupported EVM chain `{s}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids() {
        assert_eq!(EvmChain::Ethereum.chain_id(), 1);
        assert_eq!(EvmChain::Base.chain_id(), 8453);
        assert_eq!(EvmChain::from_chain_id(42161), Some(EvmChain::Arbitrum));
        assert_eq!(EvmChain::from_chain_id(5), None);
    }

    #[test]
    fn parses_short_and_api_names() {
        assert_eq!("base".parse::<EvmChain>().unwrap(), EvmChain::Base);
        assert_eq!("Ethereum".parse::<EvmChain>().unwrap(), EvmChain::Ethereum);
        assert_eq!("evm_base_mainnet".parse::<EvmChain>().unwrap(), EvmChain::Base);
        assert_eq!("ethereum_mainnet".parse::<EvmChain>().unwrap(), EvmChain::Ethereum);
        assert!("solana".parse::<EvmChain>().is_err());
    }

    #[test]
    fn network_names_parse_back() {
        for chain in EvmChain::ALL {
            assert_eq!(chain.network_name().parse::<EvmChain>().unwrap(), chain);
            let id = serde_json::to_value(chain).unwrap();
            assert_eq!(id, format!("evm_{}", chain.network_name()));
        }
    }

    #[test]
    fn serializes_as_api_identifier() {
        assert_eq!(
            serde_json::to_string(&EvmChain::Base).unwrap(),
            r#""evm_base_mainnet""#
        );
        assert_eq!(serde_json::to_string(&SignerType::ApiSigner).unwrap(), r#""api_signer""#);
        assert_eq!(serde_json::to_string(&SignMode::Auto).unwrap(), r#""auto""#);
    }
}
