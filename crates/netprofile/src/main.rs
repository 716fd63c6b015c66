use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use netprofile::{
    probe, resolve, Connection, ConnectionHandle, HandleSummary, ProbeReport, ProjectConfig,
};
use netprofile_common::logging::{init_cli_logging, LogFormat};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human readable (default)
    #[default]
    Pretty,
    /// JSON document
    Json,
}

#[derive(Parser)]
#[command(name = "netprofile")]
#[command(about = "Resolve deploy network profiles into connection and signer descriptors")]
#[command(version)]
struct Cli {
    /// Project configuration file (defaults to ./netprofile.toml)
    #[arg(long, short, env = "NETPROFILE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit log events as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured network profiles
    List,
    /// Resolve a profile and show its connection descriptor
    Resolve {
        /// Profile name
        profile: String,
        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },
    /// Print the compiler directive as JSON
    Compilers,
    /// Resolve a profile and ask its endpoint which chain it serves
    Probe {
        /// Profile name
        profile: String,
        /// Seconds to wait for the endpoint
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_cli_logging(&cli.verbosity, "netprofile=info", log_format)?;

    let config = ProjectConfig::load(cli.config)?;
    debug!(root = %config.root.display(), "Configuration loaded");

    match cli.command {
        Commands::List => handle_list(&config),
        Commands::Resolve { profile, format } => handle_resolve(&config, &profile, format),
        Commands::Compilers => handle_compilers(&config),
        Commands::Probe {
            profile,
            timeout_secs,
            format,
        } => handle_probe(&config, &profile, Duration::from_secs(timeout_secs), format).await,
    }
}

fn handle_list(config: &ProjectConfig) -> Result<()> {
    if config.profiles.is_empty() {
        match &config.source {
            Some(path) => println!("No network profiles in {}", path.display()),
            None => println!("No configuration file found"),
        }
        return Ok(());
    }

    println!("{:<20} {:<14} {:<10} ENDPOINT", "PROFILE", "MODE", "NETWORK");
    for profile in config.profiles.iter() {
        let endpoint = match &profile.connection {
            Connection::Direct { host, port } => format!("{host}:{port}"),
            Connection::Provider(provider) => provider.rpc_url.origin().ascii_serialization(),
            Connection::Unconfigured => "-".to_string(),
        };
        println!(
            "{:<20} {:<14} {:<10} {}",
            profile.name,
            profile.connection.mode(),
            profile.network_id,
            endpoint
        );
    }
    Ok(())
}

fn handle_resolve(config: &ProjectConfig, profile: &str, format: OutputFormat) -> Result<()> {
    let loader = config.secret_loader();
    let handle = resolve(profile, &config.profiles, &loader)?;
    let summary = handle.summary(profile)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Pretty => print_summary(&summary),
    }
    Ok(())
}

fn handle_compilers(config: &ProjectConfig) -> Result<()> {
    println!("{}", config.compilers.to_json()?);
    Ok(())
}

async fn handle_probe(
    config: &ProjectConfig,
    profile: &str,
    timeout: Duration,
    format: OutputFormat,
) -> Result<()> {
    let loader = config.secret_loader();
    let handle = resolve(profile, &config.profiles, &loader)?;
    if matches!(handle, ConnectionHandle::Unconfigured) {
        bail!("Profile '{profile}' is unconfigured; there is no endpoint to probe");
    }

    let report = probe(&handle, timeout).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Pretty => print_probe(profile, &report),
    }

    if !report.network_matches {
        bail!(
            "Endpoint serves chain {} but profile '{profile}' expects network {}",
            report.chain_id,
            report.expected
        );
    }
    Ok(())
}

fn print_summary(summary: &HandleSummary) {
    println!("Profile:     {}", summary.profile);
    println!("Mode:        {}", summary.mode);
    if let Some(endpoint) = &summary.endpoint {
        println!("Endpoint:    {endpoint}");
    }
    if let Some(network_id) = &summary.network_id {
        println!("Network ID:  {network_id}");
    }
    match summary.gas {
        Some(gas) => println!("Gas limit:   {gas}"),
        None if summary.endpoint.is_some() => println!("Gas limit:   (tool default)"),
        None => {}
    }
    if let Some(gas_price) = &summary.gas_price {
        let rendered = match gas_price {
            netprofile::GasPrice::Default => "(tool default)".to_string(),
            netprofile::GasPrice::Estimate => "(network estimate)".to_string(),
            netprofile::GasPrice::Fixed(wei) => format!("{wei} wei"),
        };
        println!("Gas price:   {rendered}");
    }
    if let Some(kind) = &summary.credential {
        println!("Credential:  {kind:?}");
    }
    if let Some(account) = &summary.account {
        println!("Account:     {account}");
    }
}

fn print_probe(profile: &str, report: &ProbeReport) {
    println!("Profile:     {profile}");
    println!("Endpoint:    {}", report.endpoint);
    println!("Chain ID:    {}", report.chain_id);
    println!("Expected:    {}", report.expected);
    println!(
        "Match:       {}",
        if report.network_matches { "yes" } else { "NO" }
    );
}
