mod cli;
mod config;
mod files;
mod keys;
mod storage;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use keysmith_core::storage::KeyValueStore;
use keysmith_manager::KeyManager;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Command, ConfigCommand};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command {
        Command::Version => print_version(),
        Command::Config(ConfigCommand::Init) => init_config(&config)?,
        command => {
            let manager = KeyManager::new(storage::store_from_config(&config)?);
            run(command, &manager).await?
        }
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info. Logs go to stderr so that
    // keys and IVs printed on stdout stay pipeable.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("keysmith {}", env!("CARGO_PKG_VERSION"));
}

async fn run<S: KeyValueStore>(command: Command, manager: &KeyManager<S>) -> Result<()> {
    match command {
        Command::Keygen { save } => {
            let key = keys::keygen(manager, save.as_deref()).await?;
            println!("{key}");
        }
        Command::Encrypt(args) => {
            let iv = files::encrypt(&args, manager).await?;
            println!("{iv}");
        }
        Command::Decrypt(args) => files::decrypt(&args, manager).await?,
        Command::Key(cmd) => println!("{}", keys::handle(cmd, manager).await?),
        Command::Health => {
            run_store_health(manager.store()).await?;
            println!("Storage: ok");
        }
        Command::Version | Command::Config(_) => {
            color_eyre::eyre::bail!("{command:?} does not use the key store")
        }
    }
    Ok(())
}

/// Quick probe of the configured store: set, read back, remove.
async fn run_store_health<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    let probe_key = "keysmith/health-probe";
    let payload = "ok";
    store
        .set(probe_key, payload)
        .await
        .map_err(|e| eyre!(e.to_string()))?;
    let round_trip = store
        .get(probe_key)
        .await
        .map_err(|e| eyre!(e.to_string()))?;
    store
        .remove(probe_key)
        .await
        .map_err(|e| eyre!(e.to_string()))?;

    if round_trip.as_deref() != Some(payload) {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}
