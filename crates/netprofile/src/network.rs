//! Network profile model
//!
//! Profiles arrive from configuration in a loose shape ([`RawNetwork`]) and are
//! validated once into [`NetworkProfile`], whose [`Connection`] variant decides
//! which fields exist at all. A provider profile cannot lack its RPC URL and a
//! direct profile cannot carry a secret.

use crate::error::ConfigError;
use crate::secret::SecretSource;
use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Literal that makes a profile accept any network
pub const ANY_NETWORK: &str = "*";

/// Opaque network identifier, kept as text and only ever compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NetworkId {
    /// `"*"`: any network
    #[default]
    Any,
    Exact(String),
}

impl NetworkId {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" => None,
            ANY_NETWORK => Some(NetworkId::Any),
            id => Some(NetworkId::Exact(id.to_string())),
        }
    }

    /// Whether a network reporting `id` satisfies this profile
    pub fn accepts(&self, id: &str) -> bool {
        match self {
            NetworkId::Any => true,
            NetworkId::Exact(expected) => expected == id,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NetworkId::Any => ANY_NETWORK,
            NetworkId::Exact(id) => id,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NetworkId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Gas price policy.
///
/// `Default` and `Estimate` are different things: the first leaves the choice
/// to the deploying tool, the second asks the network. `Fixed(0)` is a real
/// zero price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "wei")]
pub enum GasPrice {
    #[default]
    Default,
    Estimate,
    Fixed(u64),
}

/// How a profile reaches its network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    /// Plain JSON-RPC node at `host:port`, accounts managed by the node
    Direct { host: String, port: u16 },
    /// Remote RPC endpoint with locally signed transactions
    Provider(ProviderConfig),
    /// Intentionally empty; the external tool supplies its own defaults
    Unconfigured,
}

impl Connection {
    pub fn mode(&self) -> &'static str {
        match self {
            Connection::Direct { .. } => "direct",
            Connection::Provider(_) => "provider",
            Connection::Unconfigured => "unconfigured",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub rpc_url: Url,
    pub secret: SecretSource,
    /// BIP-44 address index used when the secret is a mnemonic
    pub address_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: String,
    pub connection: Connection,
    pub network_id: NetworkId,
    /// Transaction gas limit
    pub gas: Option<u64>,
    pub gas_price: GasPrice,
    /// Sender account for direct profiles
    pub from: Option<Address>,
}

impl NetworkProfile {
    pub fn unconfigured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection: Connection::Unconfigured,
            network_id: NetworkId::Any,
            gas: None,
            gas_price: GasPrice::Default,
            from: None,
        }
    }

    pub fn direct(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            connection: Connection::Direct {
                host: host.into(),
                port,
            },
            ..Self::unconfigured(name)
        }
    }

    pub fn provider(name: impl Into<String>, rpc_url: Url, secret: SecretSource) -> Self {
        Self {
            connection: Connection::Provider(ProviderConfig {
                rpc_url,
                secret,
                address_index: 0,
            }),
            ..Self::unconfigured(name)
        }
    }

    pub fn with_network_id(mut self, network_id: NetworkId) -> Self {
        self.network_id = network_id;
        self
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_gas_price(mut self, gas_price: GasPrice) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Validate a raw configuration entry
    pub fn from_raw(name: &str, raw: RawNetwork) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidProfile {
            name: name.to_string(),
            reason,
        };

        let connection = match (raw.host, raw.port, raw.provider) {
            (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => {
                return Err(invalid(
                    "declares both host/port and provider; pick one".to_string(),
                ));
            }
            (None, None, Some(provider)) => {
                let rpc_url = parse_rpc_url(&provider.url).map_err(invalid)?;
                let secret = match provider.secret {
                    None => SecretSource::default(),
                    Some(secret) => secret.into_source().map_err(invalid)?,
                };
                Connection::Provider(ProviderConfig {
                    rpc_url,
                    secret,
                    address_index: provider.address_index,
                })
            }
            (Some(host), Some(port), None) => {
                if host.trim().is_empty() {
                    return Err(invalid("host is empty".to_string()));
                }
                Connection::Direct {
                    host: host.trim().to_string(),
                    port,
                }
            }
            (Some(_), None, None) => return Err(invalid("host given without port".to_string())),
            (None, Some(_), None) => return Err(invalid("port given without host".to_string())),
            (None, None, None) => Connection::Unconfigured,
        };

        if raw.from.is_some() && !matches!(connection, Connection::Direct { .. }) {
            return Err(invalid(
                "'from' only applies to host/port profiles".to_string(),
            ));
        }

        let network_id = match raw.network_id {
            None => NetworkId::Any,
            Some(value) => NetworkId::parse(&value.to_string())
                .ok_or_else(|| invalid("network_id is empty".to_string()))?,
        };

        let gas = raw.gas.map(|gas| gas.as_u64("gas")).transpose()?;

        let gas_price = match raw.gas_price {
            None => GasPrice::Default,
            Some(None) => GasPrice::Estimate,
            Some(Some(value)) => value.as_gas_price()?,
        };

        Ok(Self {
            name: name.to_string(),
            connection,
            network_id,
            gas,
            gas_price,
            from: raw.from,
        })
    }
}

fn parse_rpc_url(raw: &str) -> Result<Url, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("provider url is empty".to_string());
    }
    let url = Url::parse(raw).map_err(|e| format!("provider url '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!(
            "provider url scheme '{other}' is not supported, use http or https"
        )),
    }
}

/// Named profiles, keys unique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSet {
    profiles: BTreeMap<String, NetworkProfile>,
}

impl ProfileSet {
    /// Build a set from validated profiles, rejecting duplicate names
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = NetworkProfile>,
    ) -> Result<Self, ConfigError> {
        let mut set = BTreeMap::new();
        for profile in profiles {
            if set.contains_key(&profile.name) {
                return Err(ConfigError::InvalidProfile {
                    name: profile.name,
                    reason: "defined more than once".to_string(),
                });
            }
            set.insert(profile.name.clone(), profile);
        }
        Ok(Self { profiles: set })
    }

    pub fn from_raw(raw: BTreeMap<String, RawNetwork>) -> Result<Self, ConfigError> {
        let profiles = raw
            .into_iter()
            .map(|(name, network)| NetworkProfile::from_raw(&name, network))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_profiles(profiles)
    }

    pub fn get(&self, name: &str) -> Option<&NetworkProfile> {
        self.profiles.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// A network entry as written in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, alias = "networkId", skip_serializing_if = "Option::is_none")]
    pub network_id: Option<RawScalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<RawScalar>,
    /// Outer `None`: key absent. `Some(None)`: explicit null.
    #[serde(
        default,
        alias = "gasPrice",
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub gas_price: Option<Option<RawScalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<RawProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProvider {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<RawSecret>,
    #[serde(default)]
    pub address_index: u32,
}

/// `{ file = "..." }` or `{ env = "..." }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSecret {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

impl RawSecret {
    fn into_source(self) -> Result<SecretSource, String> {
        match (self.file, self.env) {
            (Some(file), None) if !file.as_os_str().is_empty() => Ok(SecretSource::File(file)),
            (None, Some(env)) if !env.trim().is_empty() => Ok(SecretSource::Env(env)),
            (Some(_), Some(_)) => Err("secret declares both file and env".to_string()),
            _ => Err("secret needs a non-empty file or env".to_string()),
        }
    }
}

/// Integer or string, as both spellings occur in deploy configs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Int(u64),
    Text(String),
}

impl RawScalar {
    fn as_u64(&self, field: &'static str) -> Result<u64, ConfigError> {
        match self {
            RawScalar::Int(value) => Ok(*value),
            RawScalar::Text(text) => {
                text.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidGasValue {
                        field,
                        value: text.clone(),
                    })
            }
        }
    }

    fn as_gas_price(&self) -> Result<GasPrice, ConfigError> {
        match self {
            RawScalar::Text(text)
                if matches!(text.trim().to_ascii_lowercase().as_str(), "estimate" | "null") =>
            {
                Ok(GasPrice::Estimate)
            }
            other => other.as_u64("gas_price").map(GasPrice::Fixed),
        }
    }
}

impl fmt::Display for RawScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScalar::Int(value) => write!(f, "{value}"),
            RawScalar::Text(text) => f.write_str(text),
        }
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Option<RawScalar>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawScalar>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawNetwork {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_direct_profile() {
        let profile = NetworkProfile::from_raw(
            "development",
            raw(json!({ "host": "127.0.0.1", "port": 8545, "network_id": "*" })),
        )
        .unwrap();

        assert_eq!(
            profile.connection,
            Connection::Direct {
                host: "127.0.0.1".to_string(),
                port: 8545
            }
        );
        assert_eq!(profile.network_id, NetworkId::Any);
        assert_eq!(profile.gas_price, GasPrice::Default);
    }

    #[test]
    fn test_empty_entry_is_unconfigured() {
        let profile = NetworkProfile::from_raw("dashboard", raw(json!({}))).unwrap();
        assert_eq!(profile, NetworkProfile::unconfigured("dashboard"));
    }

    #[test]
    fn test_provider_profile() {
        let profile = NetworkProfile::from_raw(
            "baobab",
            raw(json!({
                "provider": { "url": "https://api.baobab.klaytn.net:8651" },
                "network_id": "1001",
                "gas": "8500000",
                "gasPrice": null
            })),
        )
        .unwrap();

        match &profile.connection {
            Connection::Provider(provider) => {
                assert_eq!(provider.rpc_url.as_str(), "https://api.baobab.klaytn.net:8651/");
                assert_eq!(provider.secret, SecretSource::default());
                assert_eq!(provider.address_index, 0);
            }
            other => panic!("expected provider connection, got {other:?}"),
        }
        assert_eq!(profile.network_id, NetworkId::Exact("1001".to_string()));
        assert_eq!(profile.gas, Some(8_500_000));
        assert_eq!(profile.gas_price, GasPrice::Estimate);
    }

    #[test]
    fn test_gas_price_states_stay_distinct() {
        let absent = NetworkProfile::from_raw("a", raw(json!({}))).unwrap();
        let null = NetworkProfile::from_raw("b", raw(json!({ "gas_price": null }))).unwrap();
        let zero = NetworkProfile::from_raw("c", raw(json!({ "gas_price": 0 }))).unwrap();
        let text = NetworkProfile::from_raw("d", raw(json!({ "gas_price": "estimate" }))).unwrap();
        let fixed =
            NetworkProfile::from_raw("e", raw(json!({ "gas_price": "250000000000" }))).unwrap();

        assert_eq!(absent.gas_price, GasPrice::Default);
        assert_eq!(null.gas_price, GasPrice::Estimate);
        assert_eq!(zero.gas_price, GasPrice::Fixed(0));
        assert_eq!(text.gas_price, GasPrice::Estimate);
        assert_eq!(fixed.gas_price, GasPrice::Fixed(250_000_000_000));
    }

    #[test]
    fn test_numeric_network_id_kept_as_text() {
        let profile = NetworkProfile::from_raw(
            "local",
            raw(json!({ "host": "localhost", "port": 8551, "network_id": 1001 })),
        )
        .unwrap();
        assert_eq!(profile.network_id.as_str(), "1001");
        assert!(profile.network_id.accepts("1001"));
        assert!(!profile.network_id.accepts("01001"));
    }

    #[test]
    fn test_wildcard_accepts_anything() {
        assert!(NetworkId::Any.accepts("8217"));
        assert!(NetworkId::Any.accepts("1001"));
    }

    #[test]
    fn test_rejects_mixed_connection() {
        let err = NetworkProfile::from_raw(
            "mixed",
            raw(json!({
                "host": "127.0.0.1",
                "port": 8545,
                "provider": { "url": "https://example.org" }
            })),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProfile { .. }));
    }

    #[test]
    fn test_rejects_half_direct() {
        assert!(NetworkProfile::from_raw("h", raw(json!({ "host": "127.0.0.1" }))).is_err());
        assert!(NetworkProfile::from_raw("p", raw(json!({ "port": 8545 }))).is_err());
    }

    #[test]
    fn test_rejects_bad_provider_url() {
        for url in ["", "   ", "not a url", "ftp://example.org"] {
            let result =
                NetworkProfile::from_raw("bad", raw(json!({ "provider": { "url": url } })));
            assert!(result.is_err(), "url {url:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_bad_gas() {
        let err = NetworkProfile::from_raw("g", raw(json!({ "gas": "lots" }))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGasValue { field: "gas", .. }));
    }

    #[test]
    fn test_from_only_on_direct() {
        let from = "0x0bc9ea9eaf712de8518d863ba3746be6a34cbd03";
        let direct = NetworkProfile::from_raw(
            "baobab-node",
            raw(json!({ "host": "127.0.0.1", "port": 8551, "from": from })),
        )
        .unwrap();
        assert_eq!(direct.from, Some(from.parse().unwrap()));

        let provider = NetworkProfile::from_raw(
            "baobab",
            raw(json!({ "provider": { "url": "https://example.org" }, "from": from })),
        );
        assert!(provider.is_err());
    }

    #[test]
    fn test_env_secret_source() {
        let profile = NetworkProfile::from_raw(
            "cypress",
            raw(json!({
                "provider": {
                    "url": "https://public-en-cypress.klaytn.net",
                    "secret": { "env": "CYPRESS_DEPLOYER_KEY" },
                    "address_index": 2
                },
                "network_id": "8217"
            })),
        )
        .unwrap();

        let Connection::Provider(provider) = profile.connection else {
            panic!("expected provider connection");
        };
        assert_eq!(provider.secret, SecretSource::Env("CYPRESS_DEPLOYER_KEY".to_string()));
        assert_eq!(provider.address_index, 2);
    }

    #[test]
    fn test_ambiguous_secret_rejected() {
        let result = NetworkProfile::from_raw(
            "both",
            raw(json!({
                "provider": {
                    "url": "https://example.org",
                    "secret": { "env": "KEY", "file": ".secret" }
                }
            })),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ProfileSet::from_profiles([
            NetworkProfile::unconfigured("dashboard"),
            NetworkProfile::direct("dashboard", "127.0.0.1", 8545),
        ]);
        assert!(result.is_err());
    }
}
