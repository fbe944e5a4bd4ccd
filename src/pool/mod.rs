// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for the pool collaborators consumed by
// the protocol layer. It defines the Pool and JobRegistry contracts and the
// share validation outcome, and re-exports the in-memory implementations.
//
// Tree Location:
// - src/pool/mod.rs (pool module entry point)
// - Submodules: memory, registry

pub mod memory;
pub mod registry;

use crate::core::types::{ConnectionId, JobId, ShareFields};
use crate::session::Session;
use std::fmt;

// Re-export key types for convenience
pub use memory::InMemoryPool;
pub use registry::{InMemoryJobRegistry, Job};

/// Pool-wide services a connection's protocol processor relies on.
///
/// Implementations own the shared state (chain head, configuration) and are
/// responsible for serializing access to it across connections.
pub trait Pool: Send + Sync {
    /// Create the session for a new connection
    fn create_session(&self, connection_id: ConnectionId) -> Session;

    /// Extranonce2 size announced to subscribing clients
    fn extranonce2_size(&self) -> usize;

    /// Hash of the current chain head as sent in mining.notify
    fn chain_head(&self) -> String;

    /// Judge a submitted share against the session's issued work
    fn validate_submit(&self, job_id: &JobId, share: &ShareFields, session: &Session) -> ShareOutcome;

    /// Timestamp placed into work notifications (Unix epoch seconds)
    fn timestamp(&self) -> u32 {
        crate::utils::time::unix_timestamp()
    }
}

/// Jobs issued to one session
pub trait JobRegistry: fmt::Debug {
    /// Mark every job of the session retired, returning how many were active
    fn retire_all(&mut self) -> usize;

    /// Create a job at `difficulty` and return its id
    fn create_job(&mut self, difficulty: f64) -> JobId;

    fn get(&self, job_id: &JobId) -> Option<&Job>;

    /// Number of jobs not yet retired
    fn active_jobs(&self) -> usize;
}

/// Result of validating a share
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Accepted,
    Rejected(RejectReason),
}

/// Why a share was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The share does not meet the session's difficulty
    LowDifficulty,

    /// Any other verdict, passed through to the client as-is
    Other { code: i32, message: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::LowDifficulty => write!(f, "low difficulty"),
            RejectReason::Other { code, message } => write!(f, "{} ({})", message, code),
        }
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Pool collaborator contracts.
//   - Purpose: Replaces the miner-side PoolClient with the pool-side traits the
//     protocol processor depends on.
//   - Note: Share validation returns a ShareOutcome value instead of taking
//     accept/reject callbacks.
