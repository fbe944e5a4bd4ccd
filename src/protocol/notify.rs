// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/protocol/notify.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file builds mining.notify work for a session, applying clean-jobs
// semantics to the session's job registry.
//
// Tree Location:
// - src/protocol/notify.rs (work notification builder)
// - Depends on: crate::pool, crate::session

use crate::pool::Pool;
use crate::protocol::messages::WorkNotification;
use crate::session::Session;
use log::debug;

const LOG_TARGET: &str = "tari::sv1_pool::protocol::notify";

/// Builds work notifications from the session's job registry
pub struct JobNotificationBuilder;

impl JobNotificationBuilder {
    /// Issue a new job for `session` and describe it as a work notification.
    ///
    /// With `clean_jobs` every job previously issued to the session is
    /// retired before the new one is created, so the new job is the only
    /// active one afterwards.
    pub fn build<P: Pool + ?Sized>(pool: &P, session: &mut Session, clean_jobs: bool) -> WorkNotification {
        if clean_jobs {
            let retired = session.job_registry_mut().retire_all();
            debug!(target: LOG_TARGET,
                "Connection {}: retired {} job(s) before clean notify",
                session.connection_id(), retired
            );
        }

        let difficulty = session.difficulty();
        let job_id = session.job_registry_mut().create_job(difficulty);
        debug!(target: LOG_TARGET,
            "Connection {}: job {} at difficulty {} (clean_jobs={})",
            session.connection_id(), job_id, difficulty, clean_jobs
        );

        WorkNotification {
            job_id,
            chain_head: pool.chain_head(),
            coinbase_1: None,
            coinbase_2: None,
            merkle_branch: None,
            version: None,
            bits: None,
            timestamp: pool.timestamp(),
            clean_jobs,
        }
    }
}


// Changelog:
// - v1.0.0 (2025-07-02): Initial work notification builder.
