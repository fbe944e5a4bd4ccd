// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/core/difficulty.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file converts share difficulty into the 256-bit targets the job
// registry attaches to each job, located in the core subdirectory.

use log::{debug, warn};
use uint::construct_uint;

const LOG_TARGET: &str = "tari::sv1_pool::difficulty";

construct_uint! {
    pub struct U256(4);
}

/// Bitcoin's maximum target (difficulty 1)
const MAX_TARGET: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Fixed-point scale so fractional difficulties below 1 keep their precision
const DIFFICULTY_SCALE: f64 = 1_000_000.0;

pub fn max_target() -> U256 {
    U256::from_big_endian(&MAX_TARGET)
}

/// Convert a share difficulty to the target a hash must not exceed
/// Whether `difficulty` can be announced to a miner
pub fn is_valid_difficulty(difficulty: f64) -> bool {
    difficulty.is_finite() && difficulty > 0.0
}

pub fn difficulty_to_target(difficulty: f64) -> U256 {
    if !is_valid_difficulty(difficulty) {
        warn!(target: LOG_TARGET, "Invalid share difficulty: {}, using difficulty 1", difficulty);
        return max_target();
    }
    let scaled = U256::from((difficulty * DIFFICULTY_SCALE) as u64);
    if scaled.is_zero() {
        warn!(target: LOG_TARGET, "Difficulty {} rounds to zero, using difficulty 1", difficulty);
        return max_target();
    }
    let target = max_target() * U256::from(DIFFICULTY_SCALE as u64) / scaled;
    debug!(target: LOG_TARGET, "Difficulty {} -> target: {:064x}", difficulty, target);
    target
}

/// Big-endian hex rendering of a target, as used in logs and job dumps
pub fn target_to_hex(target: U256) -> String {
    hex::encode(target.to_big_endian())
}


// Changelog:
// - v1.0.0 (2025-07-02): Pool-side difficulty helpers.
//   - Kept the U256 type and difficulty-1 MAX_TARGET from the miner.
//   - difficulty_to_target now scales fractional difficulties instead of
//     truncating them; target_to_hex renders targets for job logging.
//   - Dropped hash-side helpers (calculate_difficulty, bits_to_target), the
//     pool does not hash shares in this layer.
