//! Compiler directive
//!
//! Passed through to the external build tool untouched. Field names on the
//! wire follow solc's standard JSON (`evmVersion`), snake_case is accepted on
//! input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solc: Option<SolcSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolcSettings {
    /// Pinned compiler version; `None` lets the build tool pick its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub settings: SolcOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolcOptions {
    #[serde(default)]
    pub optimizer: OptimizerSettings,
    #[serde(
        default,
        rename = "evmVersion",
        alias = "evm_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub evm_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Expected number of contract runs; lower favours deploy cost, higher favours call cost
    #[serde(default = "default_optimizer_runs")]
    pub runs: u32,
}

fn default_optimizer_runs() -> u32 {
    200
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: default_optimizer_runs(),
        }
    }
}

impl CompilerSettings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
