mod commands;

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Parser, Subcommand, ValueEnum};
use custody_auth::{AllowanceAmount, EvmChain, KeyAlgorithm};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[clap(about = "Sign custody API requests and decode the signatures it returns")]
struct Args {
    /// PEM private key of the API signer.
    #[clap(long, env = "CUSTODY_API_SIGNING_KEY")]
    signing_key: Option<PathBuf>,
    /// `ecdsa-p256`, `ed25519` or `rsa-pss`.
    #[clap(long, env = "CUSTODY_API_KEY_ALGORITHM", default_value = "ecdsa-p256")]
    key_algorithm: KeyAlgorithm,
    #[clap(long, env = "CUSTODY_API_USER_TOKEN", hide_env_values = true)]
    api_user_token: Option<String>,
    #[clap(long, env = "CUSTODY_EVM_VAULT_ID")]
    vault_id: Option<String>,
    #[clap(long, default_value = "text")]
    log_format: LogFormat,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and sign an ERC-20 approve transaction request.
    Allowance {
        #[clap(long, default_value = "base")]
        chain: EvmChain,
        /// Token contract to call (the proxy for upgradeable tokens).
        #[clap(long)]
        token: Address,
        #[clap(long)]
        spender: Address,
        /// Decimal base units, or `unlimited`.
        #[clap(long, default_value = "unlimited")]
        amount: AllowanceAmount,
        #[clap(long)]
        note: Option<String>,
    },
    /// Build and sign an EIP-712 typed message signing request.
    TypedMessage {
        /// File holding the EIP-712 typed data JSON.
        #[clap(long)]
        typed_data: PathBuf,
        #[clap(long)]
        note: Option<String>,
    },
    /// Decode base64 signatures returned by the custody API into r, s, v.
    Decode {
        #[clap(long, required_unless_present = "response", conflicts_with = "response")]
        signature: Option<String>,
        /// File holding a custody API JSON response with a `signatures` array.
        #[clap(long)]
        response: Option<PathBuf>,
        /// Defaults to 1 when no typed data is given.
        #[clap(long, conflicts_with = "typed_data")]
        chain_id: Option<u64>,
        /// EIP-712 typed data file whose `domain.chainId` selects the chain.
        #[clap(long)]
        typed_data: Option<PathBuf>,
        /// Use pre-EIP-155 `v` (27/28).
        #[clap(long)]
        legacy: bool,
    },
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(stderr.json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);

    let config = commands::Config {
        signing_key: args.signing_key,
        key_algorithm: args.key_algorithm,
        api_user_token: args.api_user_token,
        vault_id: args.vault_id,
    };

    match args.command {
        Command::Allowance {
            chain,
            token,
            spender,
            amount,
            note,
        } => commands::allowance(&config, chain, token, spender, amount, note),
        Command::TypedMessage { typed_data, note } => {
            commands::typed_message(&config, &typed_data, note)
        }
        Command::Decode {
            signature,
            response,
            chain_id,
            typed_data,
            legacy,
        } => {
            let chain_id = commands::resolve_chain_id(chain_id, typed_data.as_deref())?;
            commands::decode(signature, response, chain_id, !legacy)
        }
    }
}
