// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/session/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the module declaration for per-connection session state.
//
// Tree Location:
// - src/session/mod.rs (session module entry point)
// - Submodules: mining_session, state

pub mod mining_session;
pub mod state;

pub use mining_session::Session;
pub use state::{AuthorizeRequest, IllegalTransition, SessionEvent, SessionState, SessionStateMachine};
