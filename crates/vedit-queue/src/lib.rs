//! In-process job queues.
//!
//! Two instances back the worker: the work queue for fresh dispatches and a
//! separate poll queue for jobs waiting on a remote render, so long-running
//! local work never starves remote status checks.

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::JobQueue;
