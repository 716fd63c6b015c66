//! Credential sources and in-memory signer material
//!
//! Secrets are read through a [`SecretLoader`] handed to the resolver, never
//! from ambient process state, so tests can substitute their own source.
//! Loaded values live in [`Zeroizing`] buffers and are redacted from `Debug`.

use crate::error::SignerError;
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Default project-relative secret file
pub const DEFAULT_SECRET_FILE: &str = ".secret";

/// Word counts accepted for BIP-39 phrases
const MNEMONIC_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Where a profile's credential lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecretSource {
    /// Plain-text file, relative paths resolved against the project root
    File(PathBuf),
    /// Environment variable
    Env(String),
}

impl Default for SecretSource {
    fn default() -> Self {
        SecretSource::File(PathBuf::from(DEFAULT_SECRET_FILE))
    }
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::File(path) => write!(f, "file '{}'", path.display()),
            SecretSource::Env(var) => write!(f, "environment variable '{var}'"),
        }
    }
}

/// Capability to read raw credential text.
pub trait SecretLoader {
    /// Read the raw, untrimmed contents of `source`.
    ///
    /// Returns `Ok(None)` when the source does not exist.
    fn load(&self, source: &SecretSource) -> io::Result<Option<Zeroizing<String>>>;
}

impl<T: SecretLoader + ?Sized> SecretLoader for &T {
    fn load(&self, source: &SecretSource) -> io::Result<Option<Zeroizing<String>>> {
        (**self).load(source)
    }
}

/// Loader backed by the local filesystem and process environment
#[derive(Debug, Clone)]
pub struct FsSecretLoader {
    root: PathBuf,
}

impl FsSecretLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl SecretLoader for FsSecretLoader {
    fn load(&self, source: &SecretSource) -> io::Result<Option<Zeroizing<String>>> {
        match source {
            SecretSource::File(path) => read_secret_file(&self.resolve_path(path)),
            SecretSource::Env(var) => match std::env::var(var) {
                Ok(value) => Ok(Some(Zeroizing::new(value))),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(std::env::VarError::NotUnicode(_)) => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{var} is not valid unicode"),
                )),
            },
        }
    }
}

/// Read a whole secret file; the handle is closed before returning on every path.
fn read_secret_file(path: &Path) -> io::Result<Option<Zeroizing<String>>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mut contents = Zeroizing::new(String::new());
    file.read_to_string(&mut contents)?;
    Ok(Some(contents))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// 32-byte secp256k1 key, hex encoded
    PrivateKey,
    /// BIP-39 phrase
    Mnemonic,
}

/// Validated credential held in memory for one deploy session
#[derive(Clone)]
pub struct SignerMaterial {
    kind: CredentialKind,
    secret: Zeroizing<String>,
}

impl SignerMaterial {
    /// Validate an already trimmed credential.
    ///
    /// Beyond the shape check the signer is built once, so keys outside the
    /// curve order and phrases failing the BIP-39 checksum are rejected here.
    /// The error is a human-readable reason that never quotes the secret.
    pub fn parse(secret: Zeroizing<String>) -> Result<Self, String> {
        let kind = classify(&secret)?;
        let material = Self { kind, secret };
        material.local_signer(0).map_err(|err| err.to_string())?;
        Ok(material)
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// The credential exactly as loaded, minus surrounding whitespace
    pub fn expose_secret(&self) -> &str {
        &self.secret
    }

    /// Build the alloy signer for this credential.
    ///
    /// Mnemonics derive along `m/44'/60'/0'/0/{address_index}`; the index is
    /// ignored for raw private keys.
    pub fn local_signer(&self, address_index: u32) -> Result<PrivateKeySigner, SignerError> {
        match self.kind {
            CredentialKind::PrivateKey => self
                .secret
                .parse::<PrivateKeySigner>()
                .map_err(|_| SignerError::InvalidPrivateKey),
            CredentialKind::Mnemonic => {
                let phrase =
                    Zeroizing::new(self.secret.split_whitespace().collect::<Vec<_>>().join(" "));
                MnemonicBuilder::<English>::default()
                    .phrase(phrase.as_str())
                    .index(address_index)
                    .map_err(|_| SignerError::InvalidAddressIndex {
                        index: address_index,
                    })?
                    .build()
                    .map_err(|_| SignerError::InvalidMnemonic)
            }
        }
    }
}

impl PartialEq for SignerMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && *self.secret == *other.secret
    }
}

impl Eq for SignerMaterial {}

impl fmt::Debug for SignerMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerMaterial")
            .field("kind", &self.kind)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn classify(secret: &str) -> Result<CredentialKind, String> {
    if secret.is_empty() {
        return Err("credential is empty".to_string());
    }

    if secret.split_whitespace().nth(1).is_some() {
        return classify_mnemonic(secret);
    }

    let body = secret
        .strip_prefix("0x")
        .or_else(|| secret.strip_prefix("0X"))
        .unwrap_or(secret);
    let has_prefix = body.len() != secret.len();

    if let Some(pos) = body.find(|c: char| !c.is_ascii_hexdigit()) {
        return Err(if has_prefix {
            format!("private key has a non-hex character at position {}", pos + 2)
        } else {
            "expected a 64 hex digit private key or a 12-24 word mnemonic".to_string()
        });
    }

    if body.len() != PRIVATE_KEY_HEX_LEN {
        return Err(format!(
            "private key must be {PRIVATE_KEY_HEX_LEN} hex digits, found {}",
            body.len()
        ));
    }

    Ok(CredentialKind::PrivateKey)
}

fn classify_mnemonic(secret: &str) -> Result<CredentialKind, String> {
    let words: Vec<&str> = secret.split_whitespace().collect();

    if !MNEMONIC_WORD_COUNTS.contains(&words.len()) {
        return Err(format!(
            "mnemonic must have 12, 15, 18, 21 or 24 words, found {}",
            words.len()
        ));
    }

    if let Some(index) = words
        .iter()
        .position(|word| !word.chars().all(|c| c.is_ascii_lowercase()))
    {
        return Err(format!(
            "mnemonic word {} must contain only lowercase letters a-z",
            index + 1
        ));
    }

    Ok(CredentialKind::Mnemonic)
}
