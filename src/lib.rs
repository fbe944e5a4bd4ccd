// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/lib.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file serves as the main library entry point for the sv1-pool session
// service, located at the root of the source tree. It exports all public
// modules and types that the binary and integration tests use.
//
// Tree Location:
// - src/lib.rs (root library file)
// - Exports modules: core, error, events, logging, pool, protocol, server,
//   session, utils

pub mod core;
pub mod error;
pub mod events;
pub mod logging;
pub mod pool;
pub mod protocol;
pub mod server;
pub mod session;
pub mod utils;

// Re-export commonly used types at the crate root for convenience
pub use crate::core::types::{Args, ConnectionId, JobId, PoolConfig, RequestId};
pub use crate::error::{PoolError, Result};
pub use crate::events::{EventSink, LogSink, MemorySink, NoopSink};
pub use crate::pool::{InMemoryPool, Pool, RejectReason, ShareOutcome};
pub use crate::protocol::{ClientMessage, Connection, ProtocolProcessor, ServerMessage};
pub use crate::server::{PoolEvent, ServerHandle, StratumServer};
pub use crate::session::{Session, SessionState};

// Changelog:
// - v1.0.0 (2025-07-02): Library root for the pool session service.
//   - Purpose: Organizes the project into session, protocol, pool and server
//     modules with a shared core.
//   - Features: Typed PoolError in place of the boxed error alias.
