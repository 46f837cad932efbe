//! FFmpeg CLI wrapper for the vedit backend.
//!
//! This crate provides:
//! - A command builder/runner with captured logs and checked exit status
//! - Proxy generation, re-encode concatenation and frame extraction
//! - A lenient probe (absent metadata degrades to "unknown")
//! - The pure render-command builder that turns a timeline into a filter
//!   graph

pub mod command;
pub mod error;
pub mod ops;
pub mod probe;
pub mod render;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use error::{MediaError, MediaResult};
pub use ops::{
    concat_reencode, create_proxy, extract_first_frame, extract_frame, extract_last_frame,
    DEFAULT_PROXY_HEIGHT, FIRST_FRAME_OFFSET, LAST_FRAME_OFFSET,
};
pub use probe::{probe_media, MediaProbe};
pub use render::{build_render_command, ClipSource, RenderPlan};
