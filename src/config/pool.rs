//! Worker pool configuration
//!
//! Defines the size of the worker pool and its pending queue.

use serde::{Deserialize, Serialize};

/// Default number of workers
fn default_workers() -> usize {
    1
}

/// Default pending queue capacity
fn default_queue_capacity() -> usize {
    1
}

/// Worker pool configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of concurrent connection handlers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Accepted connections that may wait for a free worker before the
    /// acceptor blocks
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl PoolConfig {
    /// Validate the pool configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be greater than 0".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("queue_capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}
