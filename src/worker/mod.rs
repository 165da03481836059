//! Worker pool that records observed chat turns.
//!
//! Jobs flow through a bounded queue to a fixed set of worker tasks. Each
//! worker turns a job into its node chain, persists every node through the
//! storage driver, derives the conversation root, and publishes one event
//! per newly inserted node. Storage failures abort the rest of the turn;
//! publish failures are logged and tolerated. Recording never blocks the
//! proxy: a full queue rejects the job instead of waiting.
//!
//! Lifecycle: `Running` (workers active, enqueue accepts) → `Draining`
//! (close invoked, queue closed for writes, workers finish the backlog) →
//! `Closed` (workers joined, publisher closed).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::PoolError;
use crate::llm::{ChatRequest, ChatResponse};
use crate::merkle::turn;
use crate::publisher::{Event, NopPublisher, Publisher};
use crate::storage::Driver;

/// One observed request/response exchange, ready for recording.
#[derive(Debug, Clone)]
pub struct Job {
    pub provider: String,
    pub req: ChatRequest,
    pub resp: ChatResponse,
}

/// Pool configuration.
pub struct PoolConfig {
    pub driver: Arc<dyn Driver>,
    /// Event sink. `None` substitutes a no-op publisher.
    pub publisher: Option<Arc<dyn Publisher>>,
    /// Worker task count. Must be at least 1.
    pub num_workers: usize,
    /// Bounded queue capacity. `0` selects `num_workers * 8`.
    pub queue_size: usize,
}

/// Bounded-queue recording pool.
pub struct Pool {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    publisher: Arc<dyn Publisher>,
    publisher_closed: AtomicBool,
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("publisher_closed", &self.publisher_closed)
            .finish()
    }
}

impl Pool {
    /// Validate the configuration and spawn the worker tasks.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.num_workers == 0 {
            return Err(PoolError::InvalidWorkerCount(0));
        }

        let queue_size = if config.queue_size == 0 {
            config.num_workers * 8
        } else {
            config.queue_size
        };
        let publisher = config
            .publisher
            .unwrap_or_else(|| Arc::new(NopPublisher::new()));

        let (sender, receiver) = mpsc::channel(queue_size);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let mut workers = Vec::with_capacity(config.num_workers);
        for worker_id in 0..config.num_workers {
            let receiver = Arc::clone(&receiver);
            let driver = Arc::clone(&config.driver);
            let publisher = Arc::clone(&publisher);
            workers.push(tokio::spawn(async move {
                worker_loop(worker_id, receiver, driver, publisher).await;
            }));
        }

        debug!(
            num_workers = config.num_workers,
            queue_size, "started recording pool"
        );

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: tokio::sync::Mutex::new(workers),
            publisher,
            publisher_closed: AtomicBool::new(false),
        })
    }

    /// Hand a job to the pool without blocking.
    ///
    /// Returns `false` when the queue is full or the pool is closed; the
    /// caller decides what to do with the rejected job (typically: skip
    /// recording rather than stall the proxy).
    pub fn enqueue(&self, job: Job) -> bool {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return false;
        };

        match sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("recording queue is full, dropping job");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Stop accepting jobs, drain the queue, join the workers, then close
    /// the publisher. Idempotent; the publisher is closed exactly once.
    pub async fn close(&self) {
        // Dropping the sender closes the queue for writes; workers exit
        // once the backlog is drained.
        drop(self.sender.lock().take());

        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            if let Err(err) = handle.await {
                warn!(error = %err, "recording worker panicked");
            }
        }

        if !self.publisher_closed.swap(true, Ordering::SeqCst) {
            if let Err(err) = self.publisher.close().await {
                warn!(error = %err, "failed to close publisher");
            }
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<Job>>>,
    driver: Arc<dyn Driver>,
    publisher: Arc<dyn Publisher>,
) {
    loop {
        let job = { receiver.lock().await.recv().await };
        match job {
            Some(job) => process_job(worker_id, job, driver.as_ref(), publisher.as_ref()).await,
            None => break,
        }
    }
    debug!(worker_id, "recording worker stopped");
}

/// Record one turn: store every node in chain order, then publish an event
/// per newly inserted node, keyed by the conversation root.
///
/// Deduplicated nodes are never republished, so any given hash is published
/// at most once per pool instance.
async fn process_job(worker_id: usize, job: Job, driver: &dyn Driver, publisher: &dyn Publisher) {
    let nodes = match turn::build(&job.provider, &job.req, &job.resp) {
        Ok(nodes) => nodes,
        Err(err) => {
            warn!(
                worker_id,
                provider = %job.provider,
                error = %err,
                "failed to build node chain, dropping job"
            );
            return;
        }
    };

    let mut publishing_suppressed = false;
    for node in nodes {
        let inserted = match driver.put(&node).await {
            Ok(inserted) => inserted,
            Err(err) => {
                warn!(
                    worker_id,
                    hash = %node.hash,
                    error = %err,
                    "failed to store node, aborting remainder of turn"
                );
                return;
            }
        };

        if !inserted || publishing_suppressed {
            continue;
        }

        let root_hash = match driver.ancestry(&node.hash).await {
            Ok(chain) => chain.last().map(|root| root.hash.clone()),
            Err(err) => {
                warn!(
                    worker_id,
                    hash = %node.hash,
                    error = %err,
                    "failed to derive conversation root, suppressing publishes for this turn"
                );
                publishing_suppressed = true;
                continue;
            }
        };
        let Some(root_hash) = root_hash else {
            continue;
        };

        let event = match Event::new(root_hash, node) {
            Ok(event) => event,
            Err(err) => {
                warn!(worker_id, error = %err, "failed to build node event");
                continue;
            }
        };

        if let Err(err) = publisher.publish(&event).await {
            warn!(
                worker_id,
                hash = %event.node.hash,
                root_hash = %event.root_hash,
                error = %err,
                "failed to publish node event"
            );
        }
    }
}
