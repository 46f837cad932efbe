//! Structured protocol errors.
//!
//! The dispatcher routes on error kind: only `Timeout` and `PollExhausted`
//! are transient (the job goes back to waiting and re-enters the poll
//! queue); everything else fails the job.

use thiserror::Error;

pub type HailuoResult<T> = Result<T, HailuoError>;

#[derive(Debug, Error)]
pub enum HailuoError {
    #[error("Missing HIGGSFIELD_API_KEY or HIGGSFIELD_API_SECRET")]
    MissingCredentials,

    #[error("motion_id is required for Minimax Hailuo")]
    MissingMotionId,

    #[error("Hailuo request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from Hailuo: {0}")]
    UnexpectedResponse(String),

    #[error("Hailuo job failed: {0}")]
    RemoteFailure(String),

    #[error("Timed out after {0}s waiting for Hailuo job to complete")]
    Timeout(u64),

    #[error("Reached maximum poll attempts ({0}) waiting for Hailuo job")]
    PollExhausted(u32),

    #[error("Hailuo job completed but did not return a downloadable result")]
    MissingResult,
}

impl HailuoError {
    /// Transient errors park the job in `waiting` for another poll cycle
    /// instead of failing it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::PollExhausted(_))
    }
}
