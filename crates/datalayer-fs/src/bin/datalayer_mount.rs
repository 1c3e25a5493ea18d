//! datalayer-mount: Mount DataLayer stores as a read-only filesystem.
//!
//! Connects to the local DataLayer node and mounts every subscribed store as
//! a directory. Runs until interrupted, then unmounts.
//!
//! # Usage
//!
//! ```bash
//! # Mount at the default location (/chia)
//! datalayer-mount
//!
//! # Mount elsewhere, with settings from a file
//! datalayer-mount /mnt/datalayer --config datalayer-fs.toml
//!
//! ls /chia
//! cat /chia/<store id>/<key>
//! ```

use anyhow::Context;
use clap::Parser;
use datalayer_fs::fuse;
use datalayer_fs::{DataLayerFs, MountConfig};
use datalayer_rpc::RpcClient;
use env_logger::Env;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};

/// Mount DataLayer stores as a read-only filesystem.
#[derive(Parser, Debug)]
#[command(name = "datalayer-mount")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory to mount at (overrides the config file; default: /chia)
    #[arg(value_name = "MOUNT_PATH")]
    mount_path: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> anyhow::Result<MountConfig> {
    let mut config = match &args.config {
        Some(path) => MountConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MountConfig::default(),
    };
    if let Some(mount_path) = &args.mount_path {
        config.mount_path = mount_path.clone();
    }
    Ok(config)
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    };

    info!("Connecting to DataLayer node at {}", config.rpc.url);
    let client = match RpcClient::new(&config.rpc) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create RPC client: {}", e);
            process::exit(1);
        }
    };

    if !config.mount_path.exists() {
        info!("Creating mount point {}", config.mount_path.display());
        if let Err(e) = std::fs::create_dir_all(&config.mount_path) {
            warn!("Could not create {}: {}", config.mount_path.display(), e);
        }
    }

    let fs = Arc::new(DataLayerFs::new(Arc::new(client), &config));
    let mut handle = match fuse::mount(fs, &config, tokio::runtime::Handle::current()) {
        Ok(h) => h,
        Err(e) => {
            error!("Mount at {} failed: {}", config.mount_path.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = shutdown_signal().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Unmounting {}", handle.mount_point().display());
    let result = tokio::task::spawn_blocking(move || handle.unmount()).await;
    match result {
        Ok(Ok(())) => info!("Filesystem unmounted"),
        Ok(Err(e)) => {
            error!("Unmount failed: {}", e);
            process::exit(1);
        }
        Err(e) => {
            error!("Unmount task failed: {}", e);
            process::exit(1);
        }
    }
}
