//! Unbounded in-process FIFO of job ids.
//!
//! A queue entry is only the job id; the authoritative job record lives in
//! the store and is re-read at dispatch time. Senders are cheap clones; the
//! single receiver is shared behind a mutex so several worker loops can
//! compete for entries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use vedit_models::JobId;

use crate::error::{QueueError, QueueResult};

#[derive(Clone)]
pub struct JobQueue {
    name: &'static str,
    tx: UnboundedSender<JobId>,
    rx: Arc<Mutex<UnboundedReceiver<JobId>>>,
    depth: Arc<AtomicUsize>,
}

impl JobQueue {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            name,
            tx,
            rx: Arc::new(Mutex::new(rx)),
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Push a job id onto the tail of the queue.
    pub fn enqueue(&self, job_id: JobId) -> QueueResult<()> {
        self.tx.send(job_id.clone()).map_err(|_| QueueError::Closed)?;
        self.depth.fetch_add(1, Ordering::Relaxed);
        debug!("Enqueued job {} on {}", job_id, self.name);
        Ok(())
    }

    /// Push a job id after a delay, without blocking the caller.
    ///
    /// Used to space out poll cycles for remote jobs that are still pending.
    pub fn enqueue_after(&self, job_id: JobId, delay: Duration) {
        let queue = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if queue.enqueue(job_id.clone()).is_err() {
                warn!("Dropped delayed enqueue of {}: queue closed", job_id);
            }
        });
    }

    /// Receive the next job id, waiting until one is available.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<JobId> {
        let job_id = self.rx.lock().await.recv().await?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        Some(job_id)
    }

    /// Number of entries currently waiting.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
