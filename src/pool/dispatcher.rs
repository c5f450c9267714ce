//! Worker pool and dispatcher
//!
//! A fixed number of workers take accepted connections off a bounded
//! pending queue and run the connection handler on each. Finished
//! connections go through an unbounded completion queue to a single sink
//! that closes them.

use super::channel::{Completed, Inbound, SessionOutcome};
use super::guard::CompletionGuard;
use super::manager::PoolStats;
use crate::config::ServerConfig;
use crate::error::ProxyError;
use crate::socks::handle_connection;
use crate::transport::Dialer;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Shared receiving end of the pending queue
type PendingRx<S> = Arc<Mutex<mpsc::Receiver<Inbound<S>>>>;

/// Fixed-size pool of connection handlers
///
/// Every connection passed to [`dispatch`](WorkerPool::dispatch) is taken
/// by exactly one worker and reaches the completion sink exactly once,
/// whatever the session's outcome.
pub struct WorkerPool<S: Send + 'static> {
    /// Sending end of the pending queue
    pending_tx: mpsc::Sender<Inbound<S>>,
    /// Receiving end of the pending queue, drained on shutdown
    pending_rx: PendingRx<S>,
    /// Completion queue, for connections no worker will take
    complete_tx: mpsc::UnboundedSender<Completed<S>>,
    /// Worker tasks
    workers: Vec<JoinHandle<()>>,
    /// Completion sink task
    sink: JoinHandle<()>,
    /// Shared statistics
    stats: Arc<PoolStats>,
    /// Next connection id
    next_id: AtomicU64,
}

/// A reserved place in the pending queue
///
/// Dropping it releases the place without dispatching anything.
pub struct DispatchSlot<'a, S: Send + 'static> {
    permit: mpsc::Permit<'a, Inbound<S>>,
    pool: &'a WorkerPool<S>,
}

impl<S: Send + 'static> DispatchSlot<'_, S> {
    /// Queue the connection for a worker
    pub fn dispatch(self, stream: S, peer: SocketAddr) {
        let inbound = self.pool.inbound(stream, peer);
        self.permit.send(inbound);
    }
}

impl<S> WorkerPool<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Spawn the workers and the completion sink
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<D: Dialer>(config: &ServerConfig, dialer: Arc<D>) -> Result<Self, ProxyError> {
        config.validate().map_err(ProxyError::Config)?;

        let stats = Arc::new(PoolStats::new());
        let settings = Arc::new(config.clone());

        let (pending_tx, pending_rx) = mpsc::channel(config.pool.queue_capacity);
        let pending_rx: PendingRx<S> = Arc::new(Mutex::new(pending_rx));
        let (complete_tx, complete_rx) = mpsc::unbounded_channel();

        let workers = (0..config.pool.workers)
            .map(|index| {
                tokio::spawn(run_worker(
                    index,
                    pending_rx.clone(),
                    complete_tx.clone(),
                    dialer.clone(),
                    settings.clone(),
                    stats.clone(),
                ))
            })
            .collect();

        let sink = tokio::spawn(run_completion_sink(complete_rx, stats.clone()));

        info!("Worker pool started with {} workers", config.pool.workers);

        Ok(WorkerPool {
            pending_tx,
            pending_rx,
            complete_tx,
            workers,
            sink,
            stats,
            next_id: AtomicU64::new(0),
        })
    }

    /// Hand an accepted connection to the pool
    ///
    /// Waits only while the pending queue is full, which happens once every
    /// worker is busy. Cancelling this future drops the stream; use
    /// [`reserve`](WorkerPool::reserve) where that matters.
    pub async fn dispatch(&self, stream: S, peer: SocketAddr) {
        match self.reserve().await {
            Some(slot) => slot.dispatch(stream, peer),
            None => self.reject(stream, peer),
        }
    }

    /// Wait for room in the pending queue
    ///
    /// Cancel safe. Returns `None` once the queue is closed.
    pub async fn reserve(&self) -> Option<DispatchSlot<'_, S>> {
        let permit = self.pending_tx.reserve().await.ok()?;
        Some(DispatchSlot { permit, pool: self })
    }

    /// Close a connection that will not be served
    ///
    /// It still goes through the completion sink, as aborted.
    pub fn reject(&self, stream: S, peer: SocketAddr) {
        warn!("{}: not served, closing", peer);
        let inbound = self.inbound(stream, peer);
        abandon(&self.stats, &self.complete_tx, inbound);
    }

    /// Number of workers
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Get pool statistics
    pub fn stats(&self) -> &Arc<PoolStats> {
        &self.stats
    }

    /// Stop accepting work and wait for the pool to drain
    ///
    /// Queued connections are still served. Workers that have not finished
    /// within `grace` are aborted and whatever is still queued is closed;
    /// all of these go through the completion sink as aborted.
    pub async fn shutdown(self, grace: Duration) {
        let WorkerPool {
            pending_tx,
            pending_rx,
            complete_tx,
            mut workers,
            sink,
            stats,
            ..
        } = self;

        drop(pending_tx);

        let drained = tokio::time::timeout(
            grace,
            futures::future::join_all(workers.iter_mut()),
        )
        .await
        .is_ok();

        if !drained {
            warn!("Workers still busy after {:?}, aborting", grace);
            for worker in &workers {
                worker.abort();
            }
            // Aborted workers release the queue lock and their guards here
            futures::future::join_all(workers).await;

            let mut pending_rx = pending_rx.lock().await;
            while let Ok(inbound) = pending_rx.try_recv() {
                warn!("{}: still queued at shutdown, closing", inbound.peer());
                abandon(&stats, &complete_tx, inbound);
            }
        }

        // The sink ends once the last sender is gone
        drop(complete_tx);
        if let Err(e) = sink.await {
            warn!("Completion sink failed: {}", e);
        }

        stats.log_health();
    }
}

impl<S: Send + 'static> WorkerPool<S> {
    /// Number a freshly accepted connection
    fn inbound(&self, stream: S, peer: SocketAddr) -> Inbound<S> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.stats.record_accepted();
        Inbound::new(id, stream, peer)
    }
}

/// Send a connection no worker will run straight to the completion sink
fn abandon<S>(
    stats: &PoolStats,
    complete_tx: &mpsc::UnboundedSender<Completed<S>>,
    inbound: Inbound<S>,
) {
    stats.record_started();
    // Only fails once the sink is gone, which drops the stream anyway
    let _ = complete_tx.send(Completed {
        inbound,
        outcome: SessionOutcome::Aborted,
    });
}

/// Worker loop: take a connection, run the handler, hand it on
async fn run_worker<S, D>(
    index: usize,
    pending_rx: PendingRx<S>,
    complete_tx: mpsc::UnboundedSender<Completed<S>>,
    dialer: Arc<D>,
    config: Arc<ServerConfig>,
    stats: Arc<PoolStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    D: Dialer,
{
    debug!("Worker {} started", index);

    loop {
        let next = pending_rx.lock().await.recv().await;
        let Some(inbound) = next else {
            break;
        };

        let peer = inbound.peer();
        info!("{}: connected (#{}, worker {})", peer, inbound.id(), index);
        stats.record_started();

        let mut guard = CompletionGuard::new(inbound, complete_tx.clone());
        let outcome = match guard.stream_mut() {
            Some(stream) => match handle_connection(stream, peer, dialer.as_ref(), &config).await {
                Ok(relay_stats) => SessionOutcome::Relayed(relay_stats),
                Err(ProxyError::Handshake(_)) => SessionOutcome::HandshakeFailed,
                Err(ProxyError::Dial { .. }) => SessionOutcome::DialFailed,
                Err(_) => SessionOutcome::RelayFailed,
            },
            None => SessionOutcome::Aborted,
        };
        guard.complete(outcome);
    }

    debug!("Worker {} stopped", index);
}

/// Close every connection that comes off the completion queue
async fn run_completion_sink<S>(
    mut complete_rx: mpsc::UnboundedReceiver<Completed<S>>,
    stats: Arc<PoolStats>,
) where
    S: AsyncWrite + Unpin + Send + 'static,
{
    while let Some(Completed { inbound, outcome }) = complete_rx.recv().await {
        stats.record_completed(&outcome);

        let peer = inbound.peer();
        let age = inbound.age();
        let mut stream = inbound.into_stream();
        if let Err(e) = stream.shutdown().await {
            debug!("{}: shutdown on close: {}", peer, e);
        }
        drop(stream);

        debug!("{}: closed after {:?} ({})", peer, age, outcome);
    }
}
