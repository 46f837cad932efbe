//! Persistence and publishing seams for the vedit backend.
//!
//! This crate provides:
//! - `JobStore` / `AssetStore` traits over Job and Asset records
//! - `JobPatch` partial updates with monotonic-progress enforcement
//! - An in-memory backend for tests and default wiring
//! - The `ArtifactPublisher` seam ("publish local file, get a fetchable URL")

pub mod error;
pub mod memory;
pub mod publish;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use publish::{ArtifactPublisher, LocalPublisher};
pub use store::{AssetStore, JobPatch, JobStore};
