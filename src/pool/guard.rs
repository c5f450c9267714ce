//! RAII guard for in-flight connections
//!
//! Makes sure a connection taken off the pending queue reaches the
//! completion sink exactly once.

use super::channel::{Completed, Inbound, SessionOutcome};
use tokio::sync::mpsc;

/// RAII guard that forwards the connection to the completion sink
///
/// [`complete`](CompletionGuard::complete) sends it with the session's
/// outcome. If the guard is dropped first, because the worker task was
/// aborted or panicked, it is sent as [`SessionOutcome::Aborted`].
pub struct CompletionGuard<S: Send + 'static> {
    /// The connection (Option to allow taking on drop)
    inbound: Option<Inbound<S>>,
    /// Completion queue
    complete_tx: mpsc::UnboundedSender<Completed<S>>,
}

impl<S: Send + 'static> CompletionGuard<S> {
    /// Create a new guard
    pub fn new(inbound: Inbound<S>, complete_tx: mpsc::UnboundedSender<Completed<S>>) -> Self {
        CompletionGuard {
            inbound: Some(inbound),
            complete_tx,
        }
    }

    /// Get a mutable reference to the client stream
    ///
    /// Only `None` once the connection has been handed on.
    pub fn stream_mut(&mut self) -> Option<&mut S> {
        self.inbound.as_mut().map(Inbound::stream_mut)
    }

    /// Hand the connection to the completion sink
    pub fn complete(mut self, outcome: SessionOutcome) {
        self.send(outcome);
    }

    fn send(&mut self, outcome: SessionOutcome) {
        if let Some(inbound) = self.inbound.take() {
            // Only fails once the sink is gone, which drops the stream anyway
            let _ = self.complete_tx.send(Completed { inbound, outcome });
        }
    }
}

impl<S: Send + 'static> Drop for CompletionGuard<S> {
    fn drop(&mut self) {
        self.send(SessionOutcome::Aborted);
    }
}
