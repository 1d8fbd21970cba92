//! devlog-sync - markdown note to blog post synchronization
//!
//! Entry point for the sync CLI.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use devlog_sync::observability::init_tracing;
use devlog_sync::sync::SyncSession;
use devlog_sync::{Config, Result};

/// devlog-sync - markdown note to blog post synchronization
#[derive(Parser, Debug)]
#[command(name = "devlog-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source directory of markdown notes
    #[arg(short, long, env = "DEVLOG_SOURCE_DIR")]
    source: Option<String>,

    /// Destination content directory
    #[arg(short, long, env = "DEVLOG_CONTENT_DIR")]
    content: Option<String>,

    /// Marker token a note must contain to be synced
    #[arg(short, long, env = "DEVLOG_MARKER", default_value = "#devlog")]
    marker: String,

    /// Keep watching for changes instead of exiting after the initial sync
    #[arg(short, long, env = "DEVLOG_WATCH")]
    watch: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DEVLOG_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "DEVLOG_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_json);

    tracing::info!("devlog-sync v{} starting...", env!("CARGO_PKG_VERSION"));

    let source_dir = cli.source.ok_or_else(|| {
        devlog_sync::Error::config("source directory not set (--source or DEVLOG_SOURCE_DIR)")
    })?;
    let content_dir = cli.content.ok_or_else(|| {
        devlog_sync::Error::config("content directory not set (--content or DEVLOG_CONTENT_DIR)")
    })?;

    let config = Config {
        source_dir,
        content_dir,
        marker: cli.marker,
        log_level: cli.log_level,
        watch: cli.watch,
    };

    tracing::debug!(?config, "Configuration loaded");

    config.validate()?;

    let session = SyncSession::new(&config)?;
    session.run().await
}
