// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/protocol/submit.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file forwards share submissions to the pool's validation entry point
// and maps the verdict to a protocol response.
//
// Tree Location:
// - src/protocol/submit.rs (share submission coordinator)
// - Depends on: crate::pool, crate::protocol::messages

use crate::core::types::RequestId;
use crate::pool::{Pool, RejectReason, ShareOutcome};
use crate::protocol::messages::{ErrorCode, ServerMessage, SubmitRequest};
use crate::session::Session;

pub struct SubmitCoordinator;

impl SubmitCoordinator {
    /// Ask the pool to judge the share; this layer never judges validity itself
    pub fn submit<P: Pool + ?Sized>(pool: &P, request: &SubmitRequest, session: &Session) -> ShareOutcome {
        pool.validate_submit(&request.job_id, &request.share, session)
    }

    /// Response for a submission with the given outcome
    pub fn response(request_id: RequestId, outcome: &ShareOutcome) -> ServerMessage {
        match outcome {
            ShareOutcome::Accepted => ServerMessage::OkResult { request_id },
            ShareOutcome::Rejected(RejectReason::LowDifficulty) => {
                ServerMessage::error(Some(request_id), ErrorCode::LowDifficultyShare, "Too low difficulty")
            }
            ShareOutcome::Rejected(RejectReason::Other { code, message }) => ServerMessage::ErrorResult {
                request_id: Some(request_id),
                code: *code,
                message: message.clone(),
            },
        }
    }
}
