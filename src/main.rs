// SV1 Pool - Free and Open Source Software Statement
//
// File: src/main.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// Stratum V1 pool session service: accepts miners, runs the handshake and
// issues work on chain-head and difficulty changes.

use anyhow::{Context, anyhow};
use clap::Parser;
use log::{error, info};
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;
use sv1_pool::{Args, InMemoryPool, LogSink, ServerHandle, StratumServer, logging};

const LOG_TARGET: &str = "tari::sv1_pool::main";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Error: {}", err);
        std::process::exit(1);
    }

    let log_dir = args
        .log_config
        .parent()
        .map(|dir| dir.to_path_buf())
        .ok_or_else(|| anyhow!("Log config path {:?} has no parent directory", args.log_config))?;
    logging::initialize_logging(&args.log_config, &log_dir, logging::SAMPLE_CONFIG)
        .context("Could not set up logging")?;

    let config = args.pool_config();
    info!(target: LOG_TARGET,
        "🚀 sv1-pool {} starting (extranonce2 size {}, initial difficulty {})",
        env!("CARGO_PKG_VERSION"), config.extranonce2_size, config.initial_difficulty
    );

    let pool = Arc::new(InMemoryPool::new(config));
    let server = StratumServer::bind(args.listen, pool)
        .await
        .with_context(|| format!("Could not bind {}", args.listen))?
        .with_sink(Arc::new(LogSink));

    if args.block_interval > 0 {
        tokio::spawn(chain_head_ticker(server.handle(), Duration::from_secs(args.block_interval)));
    }

    tokio::select! {
        result = server.run() => {
            if let Err(e) = &result {
                error!(target: LOG_TARGET, "Server stopped: {}", e);
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!(target: LOG_TARGET, "Received shutdown signal (Ctrl+C), shutting down");
        }
    }

    Ok(())
}

/// Publish a random chain head every `interval`
async fn chain_head_ticker(handle: ServerHandle, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let mut hash = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut hash);
        let reached = handle.new_chain_head(hex::encode(hash));
        info!(target: LOG_TARGET, "⛓️ Chain head published to {} connection(s)", reached);
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Pool service entry point.
//   - Replaced the feature-gated miner entry points with a single tokio main.
//   - Optional --block-interval ticker publishes random chain heads.
