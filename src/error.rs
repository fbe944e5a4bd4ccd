// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/error.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the error type shared by the library. Protocol-level
// rejections (illegal subscribe, unrecognized message, rejected share) are
// answered on the wire and never surface here.
//
// Tree Location:
// - src/error.rs (library error type)
// - Depends on: thiserror

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    /// The processor was used after its session was torn down
    #[error("Message processor has no mining session")]
    MissingSession,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Difficulty that is not a finite positive number
    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(f64),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, PoolError>;

// Changelog:
// - v1.0.0 (2025-07-02): Typed library errors.
//   - Replaces the boxed dyn Error Result alias with a thiserror enum.
