// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/server/connection.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file drives one miner TCP connection: a reader loop feeding the
// protocol processor, a writer task draining its outbound channel, and the
// chain-head and re-target subscriptions.
//
// Tree Location:
// - src/server/connection.rs (per-connection task)
// - Depends on: tokio, crate::protocol

use super::PoolEvent;
use crate::core::types::ConnectionId;
use crate::error::Result;
use crate::events::EventSink;
use crate::pool::Pool;
use crate::protocol::codec;
use crate::protocol::{Connection, ProtocolProcessor, ServerMessage};
use crate::session::SessionState;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;

const LOG_TARGET: &str = "tari::sv1_pool::server::connection";

/// Connection whose outbound messages are queued for a writer task
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    uid: ConnectionId,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ChannelConnection {
    pub fn new(uid: ConnectionId, tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { uid, tx }
    }
}

impl Connection for ChannelConnection {
    fn uid(&self) -> ConnectionId {
        self.uid
    }

    fn send(&mut self, message: ServerMessage) {
        if self.tx.send(message).is_err() {
            debug!(target: LOG_TARGET, "Connection {}: writer gone, dropping message", self.uid);
        }
    }
}

/// Apply a pool event to one processor. Events are ignored until the
/// handshake has completed.
pub fn apply_event<P, C>(processor: &mut ProtocolProcessor<P, C>, event: &PoolEvent) -> Result<()>
where
    P: Pool + ?Sized,
    C: Connection,
{
    if processor.state()? != SessionState::Running {
        return Ok(());
    }
    match event {
        PoolEvent::NewChainHead => processor.on_new_chain_head(),
        PoolEvent::DifficultyChange { difficulty } => processor.on_difficulty_change(*difficulty),
    }
}

/// Serve one miner until it disconnects.
///
/// `chain_heads` is shared by every connection; `retargets` carries the
/// difficulty changes addressed to this connection only.
pub async fn handle_connection<P: Pool + ?Sized>(
    stream: TcpStream,
    connection_id: ConnectionId,
    pool: Arc<P>,
    mut chain_heads: broadcast::Receiver<PoolEvent>,
    mut retargets: mpsc::UnboundedReceiver<PoolEvent>,
    sink: Arc<dyn EventSink>,
) -> Result<()> {
    stream.set_nodelay(true)?;
    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_loop(connection_id, write_half, rx));

    let mut processor = ProtocolProcessor::new(pool, ChannelConnection::new(connection_id, tx)).with_sink(sink);
    let mut lines = BufReader::new(read_half).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let message = codec::decode(&line);
                        debug!(target: LOG_TARGET, "Connection {}: <- {}", connection_id, message.message_type());
                        if let Err(e) = processor.dispatch(message) {
                            error!(target: LOG_TARGET, "Connection {}: {}", connection_id, e);
                            break;
                        }
                    }
                    Ok(None) => {
                        info!(target: LOG_TARGET, "Connection {} closed by miner", connection_id);
                        break;
                    }
                    Err(e) => {
                        warn!(target: LOG_TARGET, "Connection {} read error: {}", connection_id, e);
                        break;
                    }
                }
            }
            event = chain_heads.recv() => {
                let event = match event {
                    Ok(event) => event,
                    // Missed chain heads collapse into one clean notify
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: LOG_TARGET, "Connection {} missed {} chain head(s)", connection_id, skipped);
                        PoolEvent::NewChainHead
                    }
                    Err(RecvError::Closed) => {
                        info!(target: LOG_TARGET, "Connection {}: chain head source closed", connection_id);
                        break;
                    }
                };
                if let Err(e) = apply_event(&mut processor, &event) {
                    error!(target: LOG_TARGET, "Connection {}: {}", connection_id, e);
                    break;
                }
            }
            Some(event) = retargets.recv() => {
                if let Err(e) = apply_event(&mut processor, &event) {
                    error!(target: LOG_TARGET, "Connection {}: {}", connection_id, e);
                    break;
                }
            }
        }
    }

    let result = processor.terminate();
    // Dropping the processor closes the channel and lets the writer finish
    drop(processor);
    if let Err(e) = writer.await {
        warn!(target: LOG_TARGET, "Connection {} writer task failed: {}", connection_id, e);
    }
    result
}

async fn write_loop(
    connection_id: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(message) = rx.recv().await {
        let line = codec::encode_line(&message);
        debug!(target: LOG_TARGET, "Connection {}: -> {}", connection_id, message.message_type());
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!(target: LOG_TARGET, "Connection {} write error: {}", connection_id, e);
            break;
        }
    }
    let _ = writer.shutdown().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PoolConfig, RequestId};
    use crate::pool::InMemoryPool;
    use crate::protocol::ClientMessage;

    fn processor(
        uid: ConnectionId,
    ) -> (
        ProtocolProcessor<InMemoryPool, ChannelConnection>,
        mpsc::UnboundedReceiver<ServerMessage>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pool = Arc::new(InMemoryPool::new(PoolConfig::default()));
        (ProtocolProcessor::new(pool, ChannelConnection::new(uid, tx)), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn test_events_ignored_before_handshake() {
        let (mut processor, mut rx) = processor(1);
        apply_event(&mut processor, &PoolEvent::NewChainHead).unwrap();
        apply_event(&mut processor, &PoolEvent::DifficultyChange { difficulty: 4.0 }).unwrap();

        assert!(drain(&mut rx).is_empty());
        assert_eq!(processor.session().unwrap().job_registry().active_jobs(), 0);
    }

    #[test]
    fn test_difficulty_change_sends_target_then_work() {
        let (mut processor, mut rx) = processor(7);
        processor
            .dispatch(ClientMessage::Subscribe {
                request_id: RequestId::Number(1),
            })
            .unwrap();
        drain(&mut rx);

        apply_event(&mut processor, &PoolEvent::DifficultyChange { difficulty: 4.0 }).unwrap();
        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], ServerMessage::SetDifficulty { value: 4.0 });
        match &sent[1] {
            ServerMessage::Notify(work) => assert!(!work.clean_jobs),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(processor.session().unwrap().difficulty(), 4.0);
    }

    #[test]
    fn test_send_after_writer_gone_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut connection = ChannelConnection::new(3, tx);
        connection.send(ServerMessage::OkResult {
            request_id: RequestId::Number(1),
        });
        assert_eq!(connection.uid(), 3);
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Per-connection task for the pool server.
//   - Purpose: Keeps the reader, writer and pool events of one miner together
//     so that the processor is terminated exactly once on disconnect.
//   - Re-targets arrive on their own channel; a lagged chain-head receiver
//     still issues one clean notify.
