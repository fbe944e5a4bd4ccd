// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/protocol/codec.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file converts between newline-delimited Stratum V1 JSON-RPC lines and
// the protocol message types, located in the protocol subdirectory.
//
// Tree Location:
// - src/protocol/codec.rs (JSON-RPC line codec)
// - Depends on: serde, serde_json, hex

use crate::core::types::{JobId, RequestId, ShareFields};
use crate::protocol::messages::{ClientMessage, ServerMessage, SubmitRequest};
use crate::session::AuthorizeRequest;
use log::debug;
use serde::Deserialize;
use serde_json::{Value, json};

const LOG_TARGET: &str = "tari::sv1_pool::protocol::codec";

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    id: Value,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Decode one line from a miner.
///
/// Never fails: malformed JSON, unknown methods and missing parameters all
/// become [`ClientMessage::Unrecognized`] carrying the raw line.
pub fn decode(line: &str) -> ClientMessage {
    let line = line.trim();
    let raw: RawRequest = match serde_json::from_str(line) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(target: LOG_TARGET, "Undecodable request {:?}: {}", line, e);
            let request_id = serde_json::from_str::<Value>(line)
                .ok()
                .and_then(|value| value.get("id").and_then(RequestId::from_json));
            return unrecognized(request_id, line);
        }
    };

    let request_id = RequestId::from_json(&raw.id);
    let decoded = match raw.method.as_str() {
        "mining.subscribe" => request_id.clone().map(|request_id| ClientMessage::Subscribe { request_id }),
        "mining.authorize" => request_id
            .clone()
            .and_then(|request_id| decode_authorize(request_id, &raw.params)),
        "mining.submit" => request_id
            .clone()
            .and_then(|request_id| decode_submit(request_id, &raw.params)),
        _ => None,
    };

    decoded.unwrap_or_else(|| unrecognized(request_id, line))
}

fn unrecognized(request_id: Option<RequestId>, line: &str) -> ClientMessage {
    ClientMessage::Unrecognized {
        request_id,
        description: line.to_string(),
    }
}

fn string_param(params: &Value, index: usize) -> Option<String> {
    params.get(index)?.as_str().map(str::to_owned)
}

fn decode_authorize(request_id: RequestId, params: &Value) -> Option<ClientMessage> {
    let username = string_param(params, 0)?;
    // Miners commonly omit the password or send null
    let password = string_param(params, 1).unwrap_or_default();
    Some(ClientMessage::Authorize(AuthorizeRequest {
        request_id,
        username,
        password,
    }))
}

fn decode_submit(request_id: RequestId, params: &Value) -> Option<ClientMessage> {
    Some(ClientMessage::Submit(SubmitRequest {
        request_id,
        worker: string_param(params, 0)?,
        job_id: JobId::new(string_param(params, 1)?),
        share: ShareFields {
            extranonce2: string_param(params, 2)?,
            ntime: string_param(params, 3)?,
            nonce: string_param(params, 4)?,
        },
    }))
}

/// Encode a pool message as a JSON-RPC value
pub fn encode(message: &ServerMessage) -> Value {
    match message {
        ServerMessage::SubscribeResponse {
            request_id,
            subscription_ids,
            extranonce1,
            extranonce2_size,
        } => json!({
            "id": request_id,
            "result": [subscription_ids, hex::encode(extranonce1), extranonce2_size],
            "error": null
        }),
        ServerMessage::OkResult { request_id } => json!({
            "id": request_id,
            "result": true,
            "error": null
        }),
        ServerMessage::ErrorResult {
            request_id,
            code,
            message,
        } => json!({
            "id": request_id,
            "result": null,
            "error": [code, message, null]
        }),
        ServerMessage::Notify(work) => json!({
            "id": null,
            "method": "mining.notify",
            "params": [
                work.job_id,
                work.chain_head,
                work.coinbase_1,
                work.coinbase_2,
                work.merkle_branch,
                work.version,
                work.bits,
                format!("{:08x}", work.timestamp),
                work.clean_jobs
            ]
        }),
        ServerMessage::SetDifficulty { value } => json!({
            "id": null,
            "method": "mining.set_difficulty",
            "params": [value]
        }),
    }
}

/// Encode a pool message as a newline-terminated wire line
pub fn encode_line(message: &ServerMessage) -> String {
    format!("{}\n", encode(message))
}


// Changelog:
// - v1.0.0 (2025-07-02): Pool-side Stratum V1 codec.
//   - Purpose: Replaces the miner's request builders with a decoder for miner
//     requests and an encoder for pool responses and notifications.
//   - Note: encode_line keeps the newline framing of the miner's to_message.
