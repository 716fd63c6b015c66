//! Project configuration loading
//!
//! Layers, lowest priority first:
//! 1. built-in defaults
//! 2. the project file (`netprofile.toml`, or `.json` by extension)
//! 3. `NETPROFILE_` environment variables, `__` separating nested keys
//!    (`NETPROFILE_NETWORKS__BAOBAB__GAS=9000000`)

use crate::compiler::CompilerSettings;
use crate::error::ConfigError;
use crate::network::{ProfileSet, RawNetwork};
use crate::secret::FsSecretLoader;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "netprofile.toml";
pub const ENV_PREFIX: &str = "NETPROFILE_";

/// Configuration as written, before profile validation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub networks: BTreeMap<String, RawNetwork>,
    #[serde(default)]
    pub compilers: CompilerSettings,
    #[serde(default)]
    pub db: DbSettings,
}

/// Build-tool database section, carried but not interpreted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_db_host")]
    pub host: String,
}

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_db_host(),
        }
    }
}

/// Validated project configuration
#[derive(Clone, Debug)]
pub struct ProjectConfig {
    /// Directory relative secret paths are resolved against
    pub root: PathBuf,
    /// File the configuration was read from, if any
    pub source: Option<PathBuf>,
    pub profiles: ProfileSet,
    pub compilers: CompilerSettings,
    pub db: DbSettings,
}

impl ProjectConfig {
    /// Load from `path_override`, or from `netprofile.toml` in the current
    /// directory when it exists.
    pub fn load(path_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = match path_override {
            Some(path) if path.exists() => Some(path),
            Some(path) => return Err(ConfigError::FileNotFound(path)),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        let root = path
            .as_deref()
            .and_then(Path::parent)
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!(source = ?path, root = %root.display(), "Loading project configuration");

        let mut config = Self::from_figment(Self::figment(path.as_deref()), root)?;
        config.source = path;
        Ok(config)
    }

    /// Layered figment for `path`
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(RawConfig::default()));

        if let Some(path) = path {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment, root: PathBuf) -> Result<Self, ConfigError> {
        let raw: RawConfig = figment.extract()?;
        Self::from_raw(raw, root)
    }

    pub fn from_raw(raw: RawConfig, root: PathBuf) -> Result<Self, ConfigError> {
        let profiles = ProfileSet::from_raw(raw.networks)?;
        debug!(profiles = profiles.len(), "Validated network profiles");

        Ok(Self {
            root,
            source: None,
            profiles,
            compilers: raw.compilers,
            db: raw.db,
        })
    }

    /// Secret loader rooted at the project directory
    pub fn secret_loader(&self) -> FsSecretLoader {
        FsSecretLoader::new(&self.root)
    }
}
