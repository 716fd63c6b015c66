//! Profile resolution
//!
//! [`resolve`] maps a profile name to a [`ConnectionHandle`]. It reads at most
//! one secret, performs no network I/O and never mutates the profile set.

use crate::error::{ResolveError, Result, SignerError};
use crate::network::{Connection, GasPrice, NetworkId, ProfileSet};
use crate::secret::{CredentialKind, SecretLoader, SecretSource, SignerMaterial};
use alloy::signers::local::PrivateKeySigner;
use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;
use zeroize::Zeroizing;

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionHandle {
    Direct(DirectEndpoint),
    Provider(ProviderDescriptor),
    /// Nothing configured; the external tool applies its own defaults
    Unconfigured,
}

/// A node reachable at `host:port` that signs with its own accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectEndpoint {
    pub host: String,
    pub port: u16,
    pub network_id: NetworkId,
    pub gas: Option<u64>,
    pub gas_price: GasPrice,
    pub from: Option<Address>,
}

impl DirectEndpoint {
    /// JSON-RPC URL of the node
    pub fn url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

/// Remote RPC endpoint bound to locally held signer material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub rpc_url: Url,
    pub signer: SignerMaterial,
    pub address_index: u32,
    pub network_id: NetworkId,
    pub gas: Option<u64>,
    pub gas_price: GasPrice,
}

impl ProviderDescriptor {
    pub fn local_signer(&self) -> std::result::Result<PrivateKeySigner, SignerError> {
        self.signer.local_signer(self.address_index)
    }

    pub fn signer_address(&self) -> std::result::Result<Address, SignerError> {
        Ok(self.local_signer()?.address())
    }

    pub fn wallet(&self) -> std::result::Result<EthereumWallet, SignerError> {
        Ok(EthereumWallet::from(self.local_signer()?))
    }

    /// Build an HTTP provider that signs with this descriptor's wallet.
    ///
    /// Building sends no request; the first call on the provider does.
    pub fn connect(&self) -> std::result::Result<impl Provider, SignerError> {
        let wallet = self.wallet()?;
        Ok(ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone()))
    }
}

/// Secret-free view of a handle, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleSummary {
    pub profile: String,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<NetworkId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<GasPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<CredentialKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Address>,
}

impl ConnectionHandle {
    pub fn mode(&self) -> &'static str {
        match self {
            ConnectionHandle::Direct(_) => "direct",
            ConnectionHandle::Provider(_) => "provider",
            ConnectionHandle::Unconfigured => "unconfigured",
        }
    }

    pub fn network_id(&self) -> Option<&NetworkId> {
        match self {
            ConnectionHandle::Direct(direct) => Some(&direct.network_id),
            ConnectionHandle::Provider(provider) => Some(&provider.network_id),
            ConnectionHandle::Unconfigured => None,
        }
    }

    /// Summarise the handle; provider accounts are derived locally.
    pub fn summary(&self, profile: &str) -> std::result::Result<HandleSummary, SignerError> {
        let mut summary = HandleSummary {
            profile: profile.to_string(),
            mode: self.mode(),
            endpoint: None,
            network_id: None,
            gas: None,
            gas_price: None,
            credential: None,
            account: None,
        };

        match self {
            ConnectionHandle::Direct(direct) => {
                summary.endpoint = Some(direct.url());
                summary.network_id = Some(direct.network_id.clone());
                summary.gas = direct.gas;
                summary.gas_price = Some(direct.gas_price);
                summary.account = direct.from;
            }
            ConnectionHandle::Provider(provider) => {
                summary.endpoint = Some(provider.rpc_url.to_string());
                summary.network_id = Some(provider.network_id.clone());
                summary.gas = provider.gas;
                summary.gas_price = Some(provider.gas_price);
                summary.credential = Some(provider.signer.kind());
                summary.account = Some(provider.signer_address()?);
            }
            ConnectionHandle::Unconfigured => {}
        }

        Ok(summary)
    }
}

/// Resolve `profile_name` against `profiles`.
///
/// Direct and unconfigured profiles never call `loader`. Provider profiles
/// call it exactly once and fail closed on a missing, empty or malformed
/// credential.
pub fn resolve<L>(profile_name: &str, profiles: &ProfileSet, loader: &L) -> Result<ConnectionHandle>
where
    L: SecretLoader + ?Sized,
{
    let profile = profiles
        .get(profile_name)
        .ok_or_else(|| ResolveError::ProfileNotFound {
            name: profile_name.to_string(),
            available: profiles.names(),
        })?;

    match &profile.connection {
        Connection::Direct { host, port } => {
            debug!(profile = %profile.name, %host, port, "Resolved direct profile");
            Ok(ConnectionHandle::Direct(DirectEndpoint {
                host: host.clone(),
                port: *port,
                network_id: profile.network_id.clone(),
                gas: profile.gas,
                gas_price: profile.gas_price,
                from: profile.from,
            }))
        }
        Connection::Provider(provider) => {
            let secret = acquire_secret(&profile.name, loader, &provider.secret)?;
            let signer =
                SignerMaterial::parse(secret).map_err(|reason| ResolveError::CredentialMalformed {
                    profile: profile.name.clone(),
                    reason,
                })?;

            info!(
                profile = %profile.name,
                rpc_host = provider.rpc_url.host_str().unwrap_or_default(),
                credential = ?signer.kind(),
                "Resolved provider-wrapped profile"
            );

            Ok(ConnectionHandle::Provider(ProviderDescriptor {
                rpc_url: provider.rpc_url.clone(),
                signer,
                address_index: provider.address_index,
                network_id: profile.network_id.clone(),
                gas: profile.gas,
                gas_price: profile.gas_price,
            }))
        }
        Connection::Unconfigured => {
            debug!(profile = %profile.name, "Profile is unconfigured, leaving defaults to the caller");
            Ok(ConnectionHandle::Unconfigured)
        }
    }
}

/// Load one credential and trim surrounding whitespace.
///
/// Absent sources and whitespace-only contents are both `CredentialNotFound`.
pub fn acquire_secret<L>(profile: &str, loader: &L, source: &SecretSource) -> Result<Zeroizing<String>>
where
    L: SecretLoader + ?Sized,
{
    let raw = loader
        .load(source)
        .map_err(|source_err| ResolveError::CredentialUnreadable {
            profile: profile.to_string(),
            source_desc: source.to_string(),
            source: source_err,
        })?
        .ok_or_else(|| ResolveError::CredentialNotFound {
            profile: profile.to_string(),
            source_desc: source.to_string(),
        })?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::CredentialNotFound {
            profile: profile.to_string(),
            source_desc: source.to_string(),
        });
    }

    Ok(Zeroizing::new(trimmed.to_string()))
}
