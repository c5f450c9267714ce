//! Worker pool module for socks4d
//!
//! This module provides the fixed-size pool that serves accepted
//! connections, the completion queue that closes them, and the
//! statistics shared between the two.

mod channel;
mod dispatcher;
mod guard;
mod manager;

pub use channel::{Completed, Inbound, SessionOutcome};
pub use dispatcher::WorkerPool;
pub use guard::CompletionGuard;
pub use manager::{PoolStats, PoolStatsSnapshot};
