//! Job orchestration worker.
//!
//! This crate provides:
//! - The worker and poll pools consuming the in-process queues
//! - Per-job-type handlers (proxy, render, transition, generate)
//! - Transition frame preparation
//! - The startup recovery sweep

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod frames;
pub mod handlers;
pub mod recovery;

pub use config::WorkerConfig;
pub use context::ProcessingContext;
pub use error::{WorkerError, WorkerResult};
pub use executor::{process_job, WorkerPool};
pub use recovery::recover_jobs;
