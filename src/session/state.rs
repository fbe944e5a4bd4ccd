// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/session/state.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file holds the Stratum V1 handshake state machine: the session states,
// the events that drive them and the pure transition function deciding which
// events are legal in which state.
//
// Tree Location:
// - src/session/state.rs (handshake state machine)
// - Depends on: thiserror, crate::core::types

use crate::core::types::RequestId;
use std::fmt;
use thiserror::Error;

/// Handshake state of a mining session.
///
/// States are ordered: a session only ever moves towards `Running`.
/// `Configured` belongs to the mining.configure step, which this pool does
/// not negotiate, so no transition enters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionState {
    Init,
    Configured,
    Authorized,
    Subscribed,
    Running,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "INIT",
            SessionState::Configured => "CONFIGURED",
            SessionState::Authorized => "AUTHORIZED",
            SessionState::Subscribed => "SUBSCRIBED",
            SessionState::Running => "RUNNING",
        };
        f.write_str(name)
    }
}

/// Events that may move a session between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Subscribe,
    Authorize,
    Run,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::Subscribe => "subscribe",
            SessionEvent::Authorize => "authorize",
            SessionEvent::Run => "run",
        };
        f.write_str(name)
    }
}

/// An event that is not legal in the session's current state
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{event} not expected when in: {state}")]
pub struct IllegalTransition {
    pub state: SessionState,
    pub event: SessionEvent,
}

/// Apply `event` to `state`.
///
/// Subscribe is legal only from `Init` or `Authorized`. Authorize is legal
/// everywhere and leaves the state alone. Run always lands in `Running`.
pub fn transition(state: SessionState, event: SessionEvent) -> Result<SessionState, IllegalTransition> {
    match (state, event) {
        (SessionState::Init | SessionState::Authorized, SessionEvent::Subscribe) => Ok(SessionState::Subscribed),
        (_, SessionEvent::Subscribe) => Err(IllegalTransition { state, event }),
        (_, SessionEvent::Authorize) => Ok(state),
        (_, SessionEvent::Run) => Ok(SessionState::Running),
    }
}

/// A mining.authorize request as received, kept for the session's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub request_id: RequestId,
    pub username: String,
    pub password: String,
}

/// Owns a connection's handshake state and its authorize log
#[derive(Debug)]
pub struct SessionStateMachine {
    state: SessionState,
    authorize_log: Vec<AuthorizeRequest>,
    runs: u32,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionState::Init,
            authorize_log: Vec::new(),
            runs: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn starting_at(state: SessionState) -> Self {
        Self {
            state,
            authorize_log: Vec::new(),
            runs: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Complete the subscribe step; a successful subscribe always runs the session
    pub fn subscribe(&mut self) -> Result<SessionState, IllegalTransition> {
        self.state = transition(self.state, SessionEvent::Subscribe)?;
        self.run()?;
        Ok(self.state)
    }

    /// Record an authorize request. Legal in every state and leaves the state alone
    pub fn authorize(&mut self, request: AuthorizeRequest) {
        self.authorize_log.push(request);
    }

    /// Switch the session to `Running`. Calling it again is a no-op
    pub fn run(&mut self) -> Result<(), IllegalTransition> {
        if self.state == SessionState::Running {
            return Ok(());
        }
        self.state = transition(self.state, SessionEvent::Run)?;
        self.runs += 1;
        Ok(())
    }

    pub fn authorize_log(&self) -> &[AuthorizeRequest] {
        &self.authorize_log
    }

    /// How many times the session was switched into `Running`
    pub fn activations(&self) -> u32 {
        self.runs
    }
}


// Changelog:
// - v1.0.0 (2025-07-02): Initial handshake state machine.
//   - Purpose: Decides which handshake messages are legal in which state.
//   - Features: SessionState, SessionEvent, the pure transition function and
//     SessionStateMachine with its append-only authorize log.
