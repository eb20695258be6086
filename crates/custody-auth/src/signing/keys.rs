use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use super::ecdsa_p256::EcdsaP256Key;
use super::ed25519::Ed25519Key;
use super::rsa_pss::RsaPssKey;
use super::signer::RequestSigningKey;

/// Signature scheme of the API signer's private key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyAlgorithm {
    #[default]
    EcdsaP256,
    Ed25519,
    RsaPss,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EcdsaP256 => "ecdsa-p256",
            Self::Ed25519 => "ed25519",
            Self::RsaPss => "rsa-pss",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ecdsa-p256" => Ok(Self::EcdsaP256),
            "ed25519" => Ok(Self::Ed25519),
            "rsa-pss" => Ok(Self::RsaPss),
            other => bail!("unknown key algorithm `{other}`"),
        }
    }
}

/// Parse a PEM private key for the given algorithm.
///
/// Errors never include the PEM text.
pub fn load_signing_key(algorithm: KeyAlgorithm, pem: &str) -> Result<Arc<dyn RequestSigningKey>> {
    let key: Arc<dyn RequestSigningKey> = match algorithm {
        KeyAlgorithm::EcdsaP256 => Arc::new(EcdsaP256Key::from_pem(pem)?),
        KeyAlgorithm::Ed25519 => Arc::new(Ed25519Key::from_pem(pem)?),
        KeyAlgorithm::RsaPss => Arc::new(RsaPssKey::from_pem(pem)?),
    };
    Ok(key)
}

pub fn load_signing_key_file(
    algorithm: KeyAlgorithm,
    path: impl AsRef<Path>,
) -> Result<Arc<dyn RequestSigningKey>> {
    let path = path.as_ref();
    let pem = std::fs::read_to_string(path)
        .with_context(|| format!("reading signing key from {}", path.display()))?;
    load_signing_key(algorithm, &pem)
        .with_context(|| format!("loading {algorithm} signing key from {}", path.display()))
}
