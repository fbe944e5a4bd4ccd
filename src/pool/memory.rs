// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/memory.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements an in-memory Pool: it hands out sessions with their
// own job registries, keeps the current chain head and judges submitted
// shares against the issued jobs.
//
// Tree Location:
// - src/pool/memory.rs (in-memory pool)
// - Depends on: crate::pool::registry, crate::session

use crate::core::types::{ConnectionId, JobId, PoolConfig, ShareFields};
use crate::pool::registry::{InMemoryJobRegistry, Job};
use crate::pool::{Pool, RejectReason, ShareOutcome};
use crate::session::Session;
use log::{debug, info};
use std::fmt;
use std::sync::{PoisonError, RwLock};

const LOG_TARGET: &str = "tari::sv1_pool::memory_pool";

/// Stratum error code for shares referencing an unknown or stale job
pub const JOB_NOT_FOUND_CODE: i32 = 21;

/// Chain head announced before the first block is published
pub const GENESIS_CHAIN_HEAD: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Decides whether a share for `job` meets the job's difficulty
pub type ShareCheck = dyn Fn(&Job, &ShareFields) -> bool + Send + Sync;

pub struct InMemoryPool {
    config: PoolConfig,
    chain_head: RwLock<String>,
    share_check: Box<ShareCheck>,
}

impl InMemoryPool {
    /// Create a pool that accepts every share for an active job
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            chain_head: RwLock::new(GENESIS_CHAIN_HEAD.to_string()),
            share_check: Box::new(|_, _| true),
        }
    }

    /// Replace the share check used for shares on active jobs
    pub fn with_share_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Job, &ShareFields) -> bool + Send + Sync + 'static,
    {
        self.share_check = Box::new(check);
        self
    }

    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Publish a new chain head; connections pick it up on their next notify
    pub fn set_chain_head(&self, hash: impl Into<String>) {
        let hash = hash.into();
        info!(target: LOG_TARGET, "New chain head: {}", hash);
        *self.chain_head.write().unwrap_or_else(PoisonError::into_inner) = hash;
    }
}

impl fmt::Debug for InMemoryPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryPool")
            .field("config", &self.config)
            .field("chain_head", &self.chain_head())
            .finish_non_exhaustive()
    }
}

impl Pool for InMemoryPool {
    fn create_session(&self, connection_id: ConnectionId) -> Session {
        debug!(target: LOG_TARGET,
            "Creating session for connection {} at difficulty {}",
            connection_id, self.config.initial_difficulty
        );
        Session::new(
            connection_id,
            self.config.initial_difficulty,
            self.extranonce2_size(),
            Box::new(InMemoryJobRegistry::new()),
        )
    }

    fn extranonce2_size(&self) -> usize {
        self.config.extranonce2_size
    }

    fn chain_head(&self) -> String {
        self.chain_head.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn validate_submit(&self, job_id: &JobId, share: &ShareFields, session: &Session) -> ShareOutcome {
        let job = match session.job_registry().get(job_id) {
            Some(job) if !job.retired => job,
            _ => {
                debug!(target: LOG_TARGET,
                    "Connection {} submitted share for unknown or stale job {}",
                    session.connection_id(), job_id
                );
                return ShareOutcome::Rejected(RejectReason::Other {
                    code: JOB_NOT_FOUND_CODE,
                    message: "Job not found".to_string(),
                });
            }
        };

        if (self.share_check)(job, share) {
            ShareOutcome::Accepted
        } else {
            ShareOutcome::Rejected(RejectReason::LowDifficulty)
        }
    }
}


// Changelog:
// - v1.0.0 (2025-07-02): Initial in-memory pool.
//   - Purpose: Concrete Pool used by the TCP server and the tests.
//   - Features: Pluggable share check, settable chain head, stale job detection.
