// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/utils/time.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file provides wall-clock helpers for work notifications and trace
// records, located in the utils subdirectory.
//
// Tree Location:
// - src/utils/time.rs (time utilities)
// - Depends on: std

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, as carried in mining.notify ntime
pub fn unix_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or_default()
}

/// Milliseconds since the Unix epoch, used to stamp trace records
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_past_2020() {
        assert!(unix_timestamp() > 1_577_836_800);
        assert!(unix_millis() / 1000 >= unix_timestamp() as u64 - 1);
    }
}
