//! Shared data models for the vedit backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their lifecycle states
//! - Typed job payloads (one schema per job type)
//! - Media assets
//! - Timeline descriptions driving renders

pub mod asset;
pub mod job;
pub mod payload;
pub mod timeline;

// Re-export common types
pub use asset::{Asset, AssetId, AssetKind};
pub use job::{Job, JobId, JobStatus, JobType};
pub use payload::{
    FailureLog, GeneratePayload, JobPayload, ProxyPayload, RenderPayload, SequenceItem,
    TransitionPayload,
};
pub use timeline::{Clip, OutputSettings, Timeline, Track, TrackKind};
