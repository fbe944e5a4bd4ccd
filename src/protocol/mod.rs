// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/protocol/mod.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file is the entry point for the protocol module: Stratum V1 messages,
// their wire codec, and the per-connection processor with its helpers.
//
// Tree Location:
// - src/protocol/mod.rs (protocol module entry point)
// - Submodules: codec, messages, notify, processor, submit

pub mod codec;
pub mod messages;
pub mod notify;
pub mod processor;
pub mod submit;

pub use messages::{ClientMessage, ErrorCode, ServerMessage, SubmitRequest, WorkNotification};
pub use notify::JobNotificationBuilder;
pub use processor::{Connection, ProtocolProcessor};
pub use submit::SubmitCoordinator;

// Changelog:
// - v1.0.0 (2025-07-02): Initial protocol module.
