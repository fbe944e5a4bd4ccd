// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/protocol/messages.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the closed set of Stratum V1 messages the pool receives
// from and sends to a miner, located in the protocol subdirectory.
//
// Tree Location:
// - src/protocol/messages.rs (protocol message types)
// - Depends on: crate::core::types, crate::session

use crate::core::types::{JobId, RequestId, ShareFields};
use crate::session::AuthorizeRequest;

/// Length in bytes of the pool-assigned extranonce1
pub const EXTRANONCE1_SIZE: usize = 8;

/// Messages a miner sends to the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// mining.subscribe
    Subscribe { request_id: RequestId },

    /// mining.authorize
    Authorize(AuthorizeRequest),

    /// mining.submit
    Submit(SubmitRequest),

    /// Anything else, including malformed lines
    Unrecognized {
        request_id: Option<RequestId>,
        description: String,
    },
}

impl ClientMessage {
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Subscribe { .. } => "subscribe",
            Self::Authorize(_) => "authorize",
            Self::Submit(_) => "submit",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }

    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Subscribe { request_id } => Some(request_id.clone()),
            Self::Authorize(request) => Some(request.request_id.clone()),
            Self::Submit(request) => Some(request.request_id.clone()),
            Self::Unrecognized { request_id, .. } => request_id.clone(),
        }
    }
}

/// A mining.submit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub request_id: RequestId,
    pub worker: String,
    pub job_id: JobId,
    pub share: ShareFields,
}

/// Work sent to the miner in mining.notify.
///
/// Coinbase, merkle, version and bits are built by the template collaborator
/// and stay `None` until one is wired in.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkNotification {
    pub job_id: JobId,
    pub chain_head: String,
    pub coinbase_1: Option<String>,
    pub coinbase_2: Option<String>,
    pub merkle_branch: Option<Vec<String>>,
    pub version: Option<String>,
    pub bits: Option<String>,
    pub timestamp: u32,
    pub clean_jobs: bool,
}

/// Error codes the pool answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SubscribeNotExpected,
    UnrecognizedMessage,
    LowDifficultyShare,
}

impl ErrorCode {
    pub const fn code(self) -> i32 {
        match self {
            ErrorCode::SubscribeNotExpected => -1,
            ErrorCode::UnrecognizedMessage => -2,
            ErrorCode::LowDifficultyShare => -3,
        }
    }
}

/// Messages the pool sends to a miner
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    SubscribeResponse {
        request_id: RequestId,
        /// Subscription ids are never offered
        subscription_ids: Option<Vec<String>>,
        extranonce1: Vec<u8>,
        extranonce2_size: usize,
    },
    OkResult {
        request_id: RequestId,
    },
    ErrorResult {
        request_id: Option<RequestId>,
        code: i32,
        message: String,
    },
    Notify(WorkNotification),
    SetDifficulty {
        value: f64,
    },
}

impl ServerMessage {
    pub fn error(request_id: Option<RequestId>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::ErrorResult {
            request_id,
            code: code.code(),
            message: message.into(),
        }
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            Self::SubscribeResponse { .. } => "subscribe_response",
            Self::OkResult { .. } => "ok",
            Self::ErrorResult { .. } => "error",
            Self::Notify(_) => "notify",
            Self::SetDifficulty { .. } => "set_difficulty",
        }
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Initial pool-side message set.
//   - Purpose: Closed enums so every inbound kind has exactly one handler.
