// SV1 Pool - Free and Open Source Software Statement
//
// This project, sv1-pool, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/registry.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the in-memory job registry owned by each mining
// session, located in the pool subdirectory.
//
// Tree Location:
// - src/pool/registry.rs (per-session job registry)
// - Depends on: crate::core::difficulty

use crate::core::difficulty::{U256, difficulty_to_target, target_to_hex};
use crate::core::types::JobId;
use crate::pool::JobRegistry;
use log::trace;
use std::collections::HashMap;

const LOG_TARGET: &str = "tari::sv1_pool::registry";

/// A unit of work issued to a session
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub difficulty: f64,
    pub target: U256,
    pub retired: bool,
}

/// Job registry keeping every job it issued; retired jobs stay known so
/// stale submissions can be told apart from unknown ones.
#[derive(Debug, Default)]
pub struct InMemoryJobRegistry {
    jobs: HashMap<JobId, Job>,
    next_sequence: u64,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total jobs issued, retired ones included
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobRegistry for InMemoryJobRegistry {
    fn retire_all(&mut self) -> usize {
        let mut retired = 0;
        for job in self.jobs.values_mut().filter(|job| !job.retired) {
            job.retired = true;
            retired += 1;
        }
        retired
    }

    fn create_job(&mut self, difficulty: f64) -> JobId {
        let id = JobId::from(self.next_sequence);
        self.next_sequence += 1;

        let target = difficulty_to_target(difficulty);
        trace!(target: LOG_TARGET, "Job {} at difficulty {} (target {})", id, difficulty, target_to_hex(target));

        self.jobs.insert(
            id.clone(),
            Job {
                id: id.clone(),
                difficulty,
                target,
                retired: false,
            },
        );
        id
    }

    fn get(&self, job_id: &JobId) -> Option<&Job> {
        self.jobs.get(job_id)
    }

    fn active_jobs(&self) -> usize {
        self.jobs.values().filter(|job| !job.retired).count()
    }
}


// Changelog:
// - v1.0.0 (2025-07-02): Initial in-memory job registry.
//   - Purpose: Issues job ids per session and tracks which are retired.
