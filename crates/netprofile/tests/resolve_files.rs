//! End-to-end resolution against real project directories

use alloy_primitives::address;
use netprofile::{
    resolve, ConnectionHandle, CredentialKind, GasPrice, ProjectConfig, ResolveError,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const PHRASE: &str = "test test test test test test test test test test test junk";

const PROJECT: &str = r#"
[networks.development]
host = "127.0.0.1"
port = 8545
network_id = "*"

[networks.dashboard]

[networks.baobab]
network_id = "1001"
gas = "8500000"
gasPrice = "null"
provider = { url = "https://api.baobab.klaytn.net:8651" }

[networks.keys]
network_id = "1001"
provider = { url = "https://api.baobab.klaytn.net:8651", secret = { file = "keys/deployer.txt" }, address_index = 1 }
"#;

fn project(secret: Option<&str>) -> (TempDir, ProjectConfig) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("netprofile.toml"), PROJECT).unwrap();
    if let Some(secret) = secret {
        fs::write(dir.path().join(".secret"), secret).unwrap();
    }
    let config = ProjectConfig::load(Some(dir.path().join("netprofile.toml"))).unwrap();
    (dir, config)
}

fn resolve_in(config: &ProjectConfig, name: &str) -> Result<ConnectionHandle, ResolveError> {
    resolve(name, &config.profiles, &config.secret_loader())
}

#[test]
fn test_provider_secret_is_trimmed_file_contents() {
    let (_dir, config) = project(Some(&format!("  {KEY}\n")));

    let handle = resolve_in(&config, "baobab").unwrap();
    let ConnectionHandle::Provider(provider) = &handle else {
        panic!("expected provider handle, got {handle:?}");
    };

    assert_eq!(provider.signer.expose_secret(), KEY);
    assert_eq!(provider.signer.kind(), CredentialKind::PrivateKey);
    assert_eq!(provider.gas, Some(8_500_000));
    assert_eq!(provider.gas_price, GasPrice::Estimate);
    assert_eq!(
        provider.signer_address().unwrap(),
        address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let (_dir, config) = project(Some(KEY));
    let first = resolve_in(&config, "baobab").unwrap();
    let second = resolve_in(&config, "baobab").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_secret_file() {
    let (_dir, config) = project(Some(""));
    let err = resolve_in(&config, "baobab").unwrap_err();
    assert!(matches!(err, ResolveError::CredentialNotFound { .. }), "{err:?}");
}

#[test]
fn test_missing_secret_file() {
    let (_dir, config) = project(None);
    let err = resolve_in(&config, "baobab").unwrap_err();
    assert!(matches!(err, ResolveError::CredentialNotFound { .. }), "{err:?}");
    assert!(err.to_string().contains("file '.secret'"));
}

#[test]
fn test_unreadable_secret_path() {
    let (dir, config) = project(None);
    fs::create_dir(dir.path().join(".secret")).unwrap();

    let err = resolve_in(&config, "baobab").unwrap_err();
    assert!(matches!(err, ResolveError::CredentialUnreadable { .. }), "{err:?}");
}

#[test]
fn test_direct_profile_ignores_secret_file() {
    let (dir, config) = project(None);
    // A directory where the secret should be would make any read fail
    fs::create_dir(dir.path().join(".secret")).unwrap();

    let handle = resolve_in(&config, "development").unwrap();
    let ConnectionHandle::Direct(direct) = handle else {
        panic!("expected direct handle");
    };
    assert_eq!(direct.url(), "http://127.0.0.1:8545");
}

#[test]
fn test_unconfigured_profile() {
    let (_dir, config) = project(None);
    assert_eq!(resolve_in(&config, "dashboard").unwrap(), ConnectionHandle::Unconfigured);
}

#[test]
fn test_unknown_profile() {
    let (_dir, config) = project(Some(KEY));
    let err = resolve_in(&config, "unknown-profile").unwrap_err();
    assert!(matches!(err, ResolveError::ProfileNotFound { .. }), "{err:?}");
}

#[test]
fn test_malformed_secret_file() {
    let (_dir, config) = project(Some("  abc123\n"));
    let err = resolve_in(&config, "baobab").unwrap_err();
    assert!(matches!(err, ResolveError::CredentialMalformed { .. }), "{err:?}");
    assert!(!err.to_string().contains("abc123"));
}

#[test]
fn test_bad_checksum_mnemonic_is_malformed() {
    let phrase = ["test"; 12].join(" ");
    let (_dir, config) = project(Some(&phrase));

    let err = resolve_in(&config, "baobab").unwrap_err();
    let ResolveError::CredentialMalformed { reason, .. } = &err else {
        panic!("expected CredentialMalformed, got {err:?}");
    };
    assert_eq!(reason, "mnemonic checksum or wordlist check failed");
    assert!(!err.to_string().contains("test test"));
}

#[test]
fn test_zero_private_key_is_malformed() {
    let (_dir, config) = project(Some(&format!("0x{}", "0".repeat(64))));

    let err = resolve_in(&config, "baobab").unwrap_err();
    let ResolveError::CredentialMalformed { reason, .. } = &err else {
        panic!("expected CredentialMalformed, got {err:?}");
    };
    assert_eq!(reason, "private key is not a valid secp256k1 scalar");
}

#[test]
fn test_mnemonic_in_nested_secret_file() {
    let (dir, config) = project(None);
    let keys = dir.path().join("keys");
    fs::create_dir(&keys).unwrap();
    fs::write(Path::new(&keys).join("deployer.txt"), format!("{PHRASE}\n")).unwrap();

    let handle = resolve_in(&config, "keys").unwrap();
    let ConnectionHandle::Provider(provider) = handle else {
        panic!("expected provider handle");
    };
    assert_eq!(provider.signer.kind(), CredentialKind::Mnemonic);
    assert_eq!(provider.address_index, 1);
    assert_eq!(
        provider.signer_address().unwrap(),
        address!("70997970C51812dc3A010C7d01b50e0d17dc79C8")
    );
}
