use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use anyhow::{Context, Result, bail};
use custody_auth::{
    AllowanceAmount, AllowanceTransactionRequest, EvmChain, KeyAlgorithm, RequestBody,
    RequestSigner, SignedRequest, SigningResponse, TypedMessageRequest, load_signing_key_file,
};
use custody_auth::payload::typed_data_chain_id;
use serde_json::{Map, Value, json};
use tracing::info;

/// Settings shared by the request-building commands.
pub struct Config {
    pub signing_key: Option<PathBuf>,
    pub key_algorithm: KeyAlgorithm,
    pub api_user_token: Option<String>,
    pub vault_id: Option<String>,
}

impl Config {
    /// Without a key file the signer is unconfigured and signing reports it.
    fn request_signer(&self) -> Result<RequestSigner> {
        let key = match &self.signing_key {
            Some(path) => Some(load_signing_key_file(self.key_algorithm, path)?),
            None => None,
        };
        if let Some(key) = &key {
            info!(algorithm = key.algorithm(), "loaded API signing key");
        }
        Ok(RequestSigner::from_optional(key))
    }

    fn vault_id(&self) -> Result<&str> {
        self.vault_id
            .as_deref()
            .context("a vault id is required (--vault-id or CUSTODY_EVM_VAULT_ID)")
    }

    fn api_user_token(&self) -> Result<&str> {
        self.api_user_token
            .as_deref()
            .context("an API user token is required (--api-user-token or CUSTODY_API_USER_TOKEN)")
    }
}

pub fn allowance(
    config: &Config,
    chain: EvmChain,
    token: Address,
    spender: Address,
    amount: AllowanceAmount,
    note: Option<String>,
) -> Result<()> {
    let mut request = AllowanceTransactionRequest::new(config.vault_id()?, chain, token, spender, amount);
    if let Some(note) = note {
        request = request.with_note(note);
    }
    info!(%chain, %token, %spender, "preparing allowance transaction");
    sign_and_print(config, &request)
}

pub fn typed_message(config: &Config, typed_data: &Path, note: Option<String>) -> Result<()> {
    let typed_data = fs::read_to_string(typed_data)
        .with_context(|| format!("reading typed data from {}", typed_data.display()))?;
    let mut request = TypedMessageRequest::new(config.vault_id()?, typed_data)?;
    if let Some(note) = note {
        request = request.with_note(note);
    }
    info!(chain_id = request.chain_id(), "preparing typed message request");
    sign_and_print(config, &request)
}

pub fn decode(
    signature: Option<String>,
    response: Option<PathBuf>,
    chain_id: u64,
    apply_eip155: bool,
) -> Result<()> {
    let signatures = match (signature, response) {
        (Some(signature), _) => vec![
            custody_auth::decode(&signature, chain_id, apply_eip155).context("decoding --signature")?,
        ],
        (None, Some(path)) => {
            let bytes = fs::read(&path)
                .with_context(|| format!("reading response from {}", path.display()))?;
            SigningResponse::from_slice(&bytes)?.decode_signatures(chain_id, apply_eip155)?
        }
        (None, None) => bail!("either --signature or --response is required"),
    };

    for (index, signature) in signatures.iter().enumerate() {
        println!("signature[{index}]\n{signature}");
    }
    Ok(())
}

/// Chain id for `v`: explicit, else the typed data's `domain.chainId`, else mainnet.
pub fn resolve_chain_id(chain_id: Option<u64>, typed_data: Option<&Path>) -> Result<u64> {
    match (chain_id, typed_data) {
        (Some(chain_id), _) => Ok(chain_id),
        (None, Some(path)) => {
            let typed_data = fs::read_to_string(path)
                .with_context(|| format!("reading typed data from {}", path.display()))?;
            typed_data_chain_id_from_str(&typed_data)
        }
        (None, None) => Ok(1),
    }
}

fn typed_data_chain_id_from_str(typed_data: &str) -> Result<u64> {
    let value: Value = serde_json::from_str(typed_data).context("parsing EIP-712 typed data")?;
    typed_data_chain_id(&value)
}

fn sign_and_print<B: RequestBody>(config: &Config, request: &B) -> Result<()> {
    let token = config.api_user_token()?;
    let body = request.to_body()?;
    let signed = config
        .request_signer()?
        .sign_request(request.path(), unix_timestamp()?, body)
        .context("signing API request")?;

    info!(path = %signed.path, timestamp = signed.timestamp, "signed API request");
    println!("{}", serde_json::to_string_pretty(&envelope(&signed, token)?)?);
    Ok(())
}

/// JSON description of the HTTP request a transport should send.
fn envelope(signed: &SignedRequest, token: &str) -> Result<Value> {
    let headers: Map<String, Value> = signed
        .headers(token)
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::String(value)))
        .collect();
    let body = std::str::from_utf8(&signed.body).context("request body is not UTF-8")?;

    Ok(json!({
        "method": "POST",
        "path": signed.path,
        "headers": headers,
        "body": body,
    }))
}

fn unix_timestamp() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the Unix epoch")?;
    Ok(now.as_secs())
}
