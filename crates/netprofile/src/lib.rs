//! Deploy network profiles
//!
//! Resolves a named profile from the project configuration into a connection
//! handle: a direct `host:port` node, a remote RPC endpoint bound to a locally
//! loaded signer, or nothing at all for intentionally empty profiles.
//!
//! ```rust,no_run
//! use netprofile::{resolve, ConnectionHandle, ProjectConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ProjectConfig::load(None)?;
//! let loader = config.secret_loader();
//! match resolve("baobab", &config.profiles, &loader)? {
//!     ConnectionHandle::Provider(provider) => println!("signing as {}", provider.signer_address()?),
//!     ConnectionHandle::Direct(direct) => println!("node at {}", direct.url()),
//!     ConnectionHandle::Unconfigured => println!("tool defaults"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod network;
pub mod probe;
pub mod resolver;
pub mod secret;

pub use compiler::{CompilerSettings, OptimizerSettings, SolcSettings};
pub use config::{DbSettings, ProjectConfig};
pub use error::{ConfigError, ProbeError, ResolveError, SignerError};
pub use network::{Connection, GasPrice, NetworkId, NetworkProfile, ProfileSet};
pub use probe::{probe, ProbeReport};
pub use resolver::{resolve, ConnectionHandle, DirectEndpoint, HandleSummary, ProviderDescriptor};
pub use secret::{CredentialKind, FsSecretLoader, SecretLoader, SecretSource, SignerMaterial};
