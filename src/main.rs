mod cli;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use ghostkey::config::GhostKeyConfig;
use ghostkey::keys::{KeyGenerator, SshKeygen};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("ghostkey=debug")
    } else {
        EnvFilter::new("ghostkey=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Command::Create { path, ttl_ms } => cmd_create(path.clone(), *ttl_ms).await?,
        Command::Inspect { path } => cmd_inspect(path).await?,
        Command::Config { show } => cmd_config(*show)?,
    }

    Ok(())
}

async fn cmd_create(path: Option<PathBuf>, ttl_ms: Option<u64>) -> anyhow::Result<()> {
    let config = GhostKeyConfig::load()?;

    let ttl = match ttl_ms {
        Some(0) => anyhow::bail!("--ttl-ms must be greater than zero"),
        Some(ms) => Duration::from_millis(ms),
        None => config.lifecycle.default_ttl(),
    };
    let base_path = path.unwrap_or_else(|| {
        config
            .lifecycle
            .key_dir()
            .join(format!("ghostkey-{}", uuid::Uuid::new_v4()))
    });

    let generator = KeyGenerator::new(SshKeygen::from_settings(&config.keygen));
    let (handle, timer) = generator.get_or_create(&base_path, ttl).await?.into_parts();

    let public_key = handle.public_key().await?;
    println!("Private key: {}", handle.private_key_path().display());
    println!("Public key:  {}", handle.public_key_path().display());
    println!("Algorithm:   {}", handle.algorithm());
    println!("Expires in:  {} ms", ttl.as_millis());
    println!();
    print!("{}", String::from_utf8_lossy(&public_key));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, deleting key pair early");
            handle.delete().await?;
        }
        _ = timer.wait() => {}
    }

    if !handle.is_deleted().await {
        anyhow::bail!(
            "key pair at {} still present after expiry",
            handle.private_key_path().display()
        );
    }
    println!("Key pair deleted.");
    Ok(())
}

async fn cmd_inspect(path: &Path) -> anyhow::Result<()> {
    let config = GhostKeyConfig::load()?;
    let tool = SshKeygen::from_settings(&config.keygen);
    let algorithm = tool.inspect(path).await?;
    println!("{}: {algorithm}", path.display());
    Ok(())
}

fn cmd_config(show: bool) -> anyhow::Result<()> {
    if show {
        let config = GhostKeyConfig::load()?;
        println!("{}", toml::to_string_pretty(&config)?);
    } else {
        println!("Config file: {}", GhostKeyConfig::config_path().display());
    }
    Ok(())
}
