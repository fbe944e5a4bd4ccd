// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/events.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the observability sink the protocol processor reports
// received messages to. Recording is fire-and-forget and never fails the
// caller.
//
// Tree Location:
// - src/events.rs (observability sink)
// - Depends on: log

use crate::core::types::ConnectionId;
use log::trace;
use std::sync::{Mutex, PoisonError};

const LOG_TARGET: &str = "tari::sv1_pool::events";

/// Receives trace records from the protocol layer
pub trait EventSink: Send + Sync {
    fn record(&self, component: &str, timestamp: u64, connection_id: ConnectionId, label: &str, payload: &str);
}

/// Discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _component: &str, _timestamp: u64, _connection_id: ConnectionId, _label: &str, _payload: &str) {}
}

/// Writes records to the `log` facade at trace level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, component: &str, timestamp: u64, connection_id: ConnectionId, label: &str, payload: &str) {
        trace!(target: LOG_TARGET,
            "[{}] {} conn={} {} {}",
            timestamp, component, connection_id, label, payload
        );
    }
}

/// A record kept by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub component: String,
    pub timestamp: u64,
    pub connection_id: ConnectionId,
    pub label: String,
    pub payload: String,
}

/// Keeps records in memory, for inspection in tests and diagnostics
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<EventRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl EventSink for MemorySink {
    fn record(&self, component: &str, timestamp: u64, connection_id: ConnectionId, label: &str, payload: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(EventRecord {
                component: component.to_string(),
                timestamp,
                connection_id,
                label: label.to_string(),
                payload: payload.to_string(),
            });
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Initial observability sink.
//   - Features: NoopSink default, LogSink backed by log, MemorySink for tests.
