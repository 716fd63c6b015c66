//! Endpoint check for resolved handles
//!
//! Resolution never touches the network; this is the explicit, opt-in step
//! that asks an endpoint for its chain id and compares it with the profile.

use crate::error::ProbeError;
use crate::network::NetworkId;
use crate::resolver::ConnectionHandle;
use alloy_provider::{Provider, ProviderBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// Origin of the endpoint; paths are left out as they may carry API keys
    pub endpoint: String,
    pub chain_id: u64,
    pub expected: NetworkId,
    pub network_matches: bool,
}

/// Ask the handle's endpoint for `eth_chainId`.
pub async fn probe(handle: &ConnectionHandle, timeout: Duration) -> Result<ProbeReport, ProbeError> {
    let (url, expected) = match handle {
        ConnectionHandle::Direct(direct) => {
            let url = direct.url();
            let parsed = Url::parse(&url).map_err(|_| ProbeError::InvalidEndpoint(url))?;
            (parsed, &direct.network_id)
        }
        ConnectionHandle::Provider(provider) => (provider.rpc_url.clone(), &provider.network_id),
        ConnectionHandle::Unconfigured => return Err(ProbeError::Unconfigured),
    };

    let endpoint = url.origin().ascii_serialization();
    debug!(%endpoint, "Probing endpoint for chain id");

    let provider = ProviderBuilder::new().connect_http(url);
    let chain_id = match tokio::time::timeout(timeout, provider.get_chain_id()).await {
        Ok(Ok(chain_id)) => chain_id,
        Ok(Err(e)) => {
            // Transport errors echo the full request URL
            let reason = if let Some(payload) = e.as_error_resp() {
                format!("node answered with JSON-RPC error {}", payload.code)
            } else if e.is_deser_error() {
                "response is not a JSON-RPC chain id".to_string()
            } else {
                "transport failure".to_string()
            };
            return Err(ProbeError::Unreachable { endpoint, reason });
        }
        Err(_) => {
            return Err(ProbeError::Unreachable {
                endpoint,
                reason: format!("no answer within {}s", timeout.as_secs()),
            })
        }
    };

    let network_matches = expected.accepts(&chain_id.to_string());
    if !network_matches {
        warn!(%endpoint, chain_id, expected = %expected, "Endpoint reports a different network");
    }

    Ok(ProbeReport {
        endpoint,
        chain_id,
        expected: expected.clone(),
        network_matches,
    })
}
