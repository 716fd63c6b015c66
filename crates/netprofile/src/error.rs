//! Error types for profile loading, resolution and signer construction

use std::path::PathBuf;
use thiserror::Error;

/// Failures of [`crate::resolver::resolve`].
///
/// None of these are transient; the caller fixes the input and resolves again.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The requested name is not a key of the profile set
    #[error("Network profile '{name}' not found (available: {})", .available.join(", "))]
    ProfileNotFound { name: String, available: Vec<String> },

    /// The secret source is absent or holds only whitespace
    #[error("No credential for profile '{profile}': {source_desc} is missing or empty")]
    CredentialNotFound { profile: String, source_desc: String },

    /// The secret is neither a private key nor a mnemonic phrase
    #[error("Malformed credential for profile '{profile}': {reason}")]
    CredentialMalformed { profile: String, reason: String },

    /// The secret source exists but could not be read
    #[error("Failed to read credential for profile '{profile}' from {source_desc}")]
    CredentialUnreadable {
        profile: String,
        source_desc: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while loading and validating the project configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid network profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("Invalid {field} value '{value}': expected a non-negative integer")]
    InvalidGasValue { field: &'static str, value: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(Box::new(err))
    }
}

/// Failures turning signer material into an alloy signer.
///
/// The underlying alloy error is dropped, its message can quote the phrase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("private key is not a valid secp256k1 scalar")]
    InvalidPrivateKey,

    #[error("mnemonic checksum or wordlist check failed")]
    InvalidMnemonic,

    #[error("address index {index} does not form a valid derivation path")]
    InvalidAddressIndex { index: u32 },
}

/// Failures of the optional endpoint probe
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Profile has no endpoint to probe")]
    Unconfigured,

    #[error("Invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("Endpoint {endpoint} is unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;
