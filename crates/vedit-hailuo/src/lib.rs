//! Client for the Hailuo/Higgsfield generative-video APIs.
//!
//! The transition protocol is three steps: submit a start/end image pair,
//! poll the resulting job-set, extract the downloadable result URL. Status
//! derivation and result traversal live in [`job_set`]; the HTTP plumbing
//! and polling bounds live in [`client`]. A simpler one-shot generation
//! call lives in [`higgsfield`].

pub mod client;
pub mod error;
pub mod higgsfield;
pub mod job_set;

pub use client::{
    HailuoClient, HailuoConfig, PollOptions, TransitionOutcome, TransitionRequest,
    DEFAULT_POLL_INTERVAL,
};
pub use error::{HailuoError, HailuoResult};
pub use higgsfield::{HiggsfieldClient, HiggsfieldConfig};
pub use job_set::{JobSet, JobSetStatus};
