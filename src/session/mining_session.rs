// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/session/mining_session.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the per-connection mining session: handshake state,
// current difficulty, announced extranonce2 size and the job registry that
// tracks the work issued to this connection.
//
// Tree Location:
// - src/session/mining_session.rs (mining session)
// - Depends on: crate::session::state, crate::pool

use crate::core::types::ConnectionId;
use crate::pool::JobRegistry;
use crate::session::state::{AuthorizeRequest, IllegalTransition, SessionState, SessionStateMachine};
use log::debug;

const LOG_TARGET: &str = "tari::sv1_pool::session";

/// Mining session of a single connection, created by the pool before the
/// first message is processed and dropped when the connection terminates.
#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    machine: SessionStateMachine,
    difficulty: f64,
    extranonce2_size: usize,
    job_registry: Box<dyn JobRegistry + Send>,
}

impl Session {
    pub fn new(
        connection_id: ConnectionId,
        difficulty: f64,
        extranonce2_size: usize,
        job_registry: Box<dyn JobRegistry + Send>,
    ) -> Self {
        Self {
            connection_id,
            machine: SessionStateMachine::new(),
            difficulty,
            extranonce2_size,
            job_registry,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_state(mut self, state: SessionState) -> Self {
        self.machine = SessionStateMachine::starting_at(state);
        self
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn state_machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    pub fn subscribe(&mut self) -> Result<SessionState, IllegalTransition> {
        self.machine.subscribe()
    }

    pub fn authorize(&mut self, request: AuthorizeRequest) {
        self.machine.authorize(request);
    }

    pub fn authorize_log(&self) -> &[AuthorizeRequest] {
        self.machine.authorize_log()
    }

    /// Current share difficulty; new jobs are created at this difficulty
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: f64) {
        debug!(target: LOG_TARGET,
            "Session {} difficulty {} -> {}",
            self.connection_id, self.difficulty, difficulty
        );
        self.difficulty = difficulty;
    }

    pub fn extranonce2_size(&self) -> usize {
        self.extranonce2_size
    }

    pub fn job_registry(&self) -> &dyn JobRegistry {
        self.job_registry.as_ref()
    }

    pub fn job_registry_mut(&mut self) -> &mut dyn JobRegistry {
        self.job_registry.as_mut()
    }

    /// Tear the session down, retiring its outstanding jobs and releasing the registry
    pub fn terminate(mut self) {
        let retired = self.job_registry.retire_all();
        debug!(target: LOG_TARGET,
            "Session {} terminated in state {}, {} job(s) retired",
            self.connection_id,
            self.state(),
            retired
        );
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Initial mining session.
//   - Purpose: Owns everything one connection needs across messages.
//   - Note: Sessions are never persisted; a reconnect starts from INIT.
