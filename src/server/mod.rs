// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/server/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the Stratum V1 TCP listener. Each accepted miner gets
// its own task and protocol processor; chain-head and difficulty events are
// published to those tasks through a ServerHandle.
//
// Tree Location:
// - src/server/mod.rs (TCP server)
// - Submodules: connection

pub mod connection;

use crate::core::difficulty::is_valid_difficulty;
use crate::core::types::ConnectionId;
use crate::error::{PoolError, Result};
use crate::events::{EventSink, NoopSink};
use crate::pool::InMemoryPool;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

pub use connection::{ChannelConnection, apply_event, handle_connection};

const LOG_TARGET: &str = "tari::sv1_pool::server";

/// Capacity of the chain-head channel per subscriber
const CHAIN_HEAD_CHANNEL_CAPACITY: usize = 16;

/// Events delivered to connection tasks
#[derive(Debug, Clone, PartialEq)]
pub enum PoolEvent {
    /// The chain head moved; every running session gets clean work
    NewChainHead,
    /// Re-target the receiving connection
    DifficultyChange { difficulty: f64 },
}

/// Per-connection re-target senders, registered at accept and removed when
/// the connection task ends
type RetargetSenders = Arc<Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<PoolEvent>>>>;

/// Publishes pool events to connected miners
#[derive(Debug, Clone)]
pub struct ServerHandle {
    pool: Arc<InMemoryPool>,
    chain_heads: broadcast::Sender<PoolEvent>,
    retargets: RetargetSenders,
}

impl ServerHandle {
    /// Record a new chain head and notify every connection. Returns the
    /// number of connections the event reached.
    pub fn new_chain_head(&self, hash: impl Into<String>) -> usize {
        self.pool.set_chain_head(hash);
        self.chain_heads.send(PoolEvent::NewChainHead).unwrap_or(0)
    }

    /// Change the difficulty of one connection. Returns whether the
    /// connection was found.
    pub fn set_difficulty(&self, connection_id: ConnectionId, difficulty: f64) -> Result<bool> {
        if !is_valid_difficulty(difficulty) {
            warn!(target: LOG_TARGET, "Refusing difficulty {} for connection {}", difficulty, connection_id);
            return Err(PoolError::InvalidDifficulty(difficulty));
        }

        let retargets = self.retargets.lock().unwrap_or_else(PoisonError::into_inner);
        match retargets.get(&connection_id) {
            Some(tx) => {
                info!(target: LOG_TARGET, "Connection {} difficulty -> {}", connection_id, difficulty);
                Ok(tx.send(PoolEvent::DifficultyChange { difficulty }).is_ok())
            }
            None => {
                debug!(target: LOG_TARGET, "No connection {} to re-target", connection_id);
                Ok(false)
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.retargets.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Stratum V1 listener
pub struct StratumServer {
    listener: TcpListener,
    pool: Arc<InMemoryPool>,
    chain_heads: broadcast::Sender<PoolEvent>,
    retargets: RetargetSenders,
    sink: Arc<dyn EventSink>,
    next_connection_id: AtomicU64,
}

impl StratumServer {
    pub async fn bind(addr: SocketAddr, pool: Arc<InMemoryPool>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let (chain_heads, _) = broadcast::channel(CHAIN_HEAD_CHANNEL_CAPACITY);
        info!(target: LOG_TARGET, "Stratum V1 server listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            pool,
            chain_heads,
            retargets: Arc::new(Mutex::new(HashMap::new())),
            sink: Arc::new(NoopSink),
            next_connection_id: AtomicU64::new(1),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            pool: self.pool.clone(),
            chain_heads: self.chain_heads.clone(),
            retargets: self.retargets.clone(),
        }
    }

    /// Accept miners until the task is cancelled
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
                    info!(target: LOG_TARGET, "Connection {} from {}", connection_id, peer);

                    let (retarget_tx, retarget_rx) = mpsc::unbounded_channel();
                    self.retargets
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(connection_id, retarget_tx);

                    let pool = self.pool.clone();
                    let chain_heads = self.chain_heads.subscribe();
                    let sink = self.sink.clone();
                    let retargets = self.retargets.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, connection_id, pool, chain_heads, retarget_rx, sink).await
                        {
                            error!(target: LOG_TARGET, "Connection {} ended with error: {}", connection_id, e);
                        }
                        retargets
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .remove(&connection_id);
                    });
                }
                Err(e) => {
                    error!(target: LOG_TARGET, "Error accepting connection: {}", e);
                }
            }
        }
    }
}


// Changelog:
// - v1.0.0 (2025-07-02): Tokio Stratum V1 listener.
//   - Purpose: Replaces the miner's outbound PoolClient with an inbound
//     listener; TCP_NODELAY is still set on every stream.
//   - Chain heads go out on a broadcast channel; re-targets go through a
//     per-connection channel so other connections' traffic cannot evict them.
