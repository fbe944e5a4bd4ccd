// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/types.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines core data structures for the pool service, located in the
// core subdirectory. It includes command-line arguments, identifiers shared by
// every layer, and the opaque share payload carried by mining.submit.
//
// Tree Location:
// - src/core/types.rs (core data structures)
// - Depends on: clap, serde, serde_json

use crate::core::difficulty::is_valid_difficulty;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Identifier assigned by the transport to each client connection
pub type ConnectionId = u64;

/// JSON-RPC request id echoed back in responses. Miners send either a
/// number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    Text(String),
}

impl RequestId {
    /// Read an id from a JSON-RPC `id` field; null and other kinds yield `None`
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_u64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Default number of extranonce2 bytes the client may roll
pub const DEFAULT_EXTRANONCE2_SIZE: usize = 4;

/// Default difficulty assigned to a freshly created session
pub const DEFAULT_DIFFICULTY: f64 = 1.0;

/// Command-line arguments for the pool service
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sv1-pool",
    version,
    about = "Pool-side Stratum V1 session service",
    long_about = "sv1-pool accepts Stratum V1 miners, runs the subscribe/authorize handshake,\n\
                  issues mining.notify work and answers share submissions.\n\n\
                  Examples:\n\
                    Default port: sv1-pool\n\
                    Custom setup: sv1-pool --listen 0.0.0.0:3334 --difficulty 512 --extranonce2-size 8\n\
                    Simulated blocks: sv1-pool --block-interval 30"
)]
pub struct Args {
    /// Address the Stratum listener binds to
    #[arg(
        short = 'l',
        long = "listen",
        value_name = "HOST:PORT",
        default_value = "0.0.0.0:3333",
        help = "Listen address for miner connections"
    )]
    pub listen: SocketAddr,

    /// Size in bytes of the client-rolled extranonce2 segment
    #[arg(
        long,
        default_value_t = DEFAULT_EXTRANONCE2_SIZE,
        value_name = "BYTES",
        help = "Extranonce2 size announced in mining.subscribe responses (1-8)"
    )]
    pub extranonce2_size: usize,

    /// Difficulty assigned to new sessions
    #[arg(
        short = 'd',
        long = "difficulty",
        default_value_t = DEFAULT_DIFFICULTY,
        value_name = "DIFFICULTY",
        help = "Initial share difficulty for every session"
    )]
    pub difficulty: f64,

    /// Seconds between simulated chain heads, 0 disables the ticker
    #[arg(
        long,
        default_value = "0",
        value_name = "SECONDS",
        help = "Publish a simulated chain head every N seconds (0 = off)"
    )]
    pub block_interval: u64,

    /// log4rs YAML configuration, created from the bundled sample when missing
    #[arg(
        long,
        default_value = "logs/sv1-pool/log4rs_config.yml",
        value_name = "PATH",
        help = "Path to the log4rs configuration file"
    )]
    pub log_config: PathBuf,
}

impl Args {
    /// Validate command-line arguments
    pub fn validate(&self) -> Result<(), String> {
        if self.extranonce2_size == 0 || self.extranonce2_size > 8 {
            return Err("Extranonce2 size must be between 1 and 8 bytes".to_string());
        }

        if !is_valid_difficulty(self.difficulty) {
            return Err("Difficulty must be a positive number".to_string());
        }

        if self.block_interval > 86_400 {
            return Err("Block interval cannot exceed one day (86400 seconds)".to_string());
        }

        Ok(())
    }

    /// Pool settings derived from the arguments
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            extranonce2_size: self.extranonce2_size,
            initial_difficulty: self.difficulty,
        }
    }
}

/// Settings shared by every session the pool creates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolConfig {
    pub extranonce2_size: usize,
    pub initial_difficulty: f64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            extranonce2_size: DEFAULT_EXTRANONCE2_SIZE,
            initial_difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

/// Job identifier as sent in mining.notify and echoed in mining.submit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for JobId {
    fn from(sequence: u64) -> Self {
        Self(format!("{:x}", sequence))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Share fields of a mining.submit request, opaque to the session core
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShareFields {
    /// Client-rolled extranonce2 (hex)
    pub extranonce2: String,

    /// Block timestamp used by the client (hex)
    pub ntime: String,

    /// Winning nonce (hex)
    pub nonce: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args::parse_from(["sv1-pool"])
    }

    #[test]
    fn test_default_args_are_valid() {
        let args = args();
        assert!(args.validate().is_ok());
        assert_eq!(args.pool_config(), PoolConfig::default());
    }

    #[test]
    fn test_extranonce2_size_bounds() {
        let mut args = args();
        args.extranonce2_size = 0;
        assert!(args.validate().is_err());
        args.extranonce2_size = 9;
        assert!(args.validate().is_err());
        args.extranonce2_size = 8;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_difficulty_must_be_positive() {
        let mut args = args();
        args.difficulty = 0.0;
        assert!(args.validate().is_err());
        args.difficulty = f64::NAN;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_request_id_from_json() {
        assert_eq!(RequestId::from_json(&serde_json::json!(7)), Some(RequestId::Number(7)));
        assert_eq!(
            RequestId::from_json(&serde_json::json!("a1")),
            Some(RequestId::Text("a1".to_string()))
        );
        assert_eq!(RequestId::from_json(&serde_json::Value::Null), None);
        assert_eq!(RequestId::from_json(&serde_json::json!(-1)), None);
        assert_eq!(serde_json::to_value(RequestId::Text("a1".to_string())).unwrap(), "a1");
        assert_eq!(serde_json::to_value(RequestId::Number(7)).unwrap(), 7);
    }

    #[test]
    fn test_job_id_from_sequence_is_hex() {
        assert_eq!(JobId::from(255).as_str(), "ff");
        assert_eq!(JobId::new("ab").to_string(), "ab");
    }
}

// Changelog:
// - v1.0.0 (2025-07-02): Pool service types.
//   - Purpose: Replaces the miner's Args/PoolJob/Share types with the pool-side
//     equivalents: listener Args, PoolConfig, JobId and ShareFields.
//   - Note: Args::validate keeps the String error style used by main.rs.
