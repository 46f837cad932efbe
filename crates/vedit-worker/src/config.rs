//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use vedit_hailuo::PollOptions;

/// Worker configuration, env-var driven.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of work-queue consumer tasks
    pub worker_threads: usize,
    /// Number of poll-queue consumer tasks
    pub poll_worker_threads: usize,
    /// Root of the local storage tree (assets/, renders/, frames/)
    pub storage_dir: PathBuf,
    /// Base URL under which published frames are reachable
    pub public_base_url: String,
    /// Maximum concurrent proxy transcodes within one proxy job
    pub max_proxy_parallel: usize,
    /// Proxy target height in pixels
    pub proxy_height: u32,
    /// Delay between remote status fetches
    pub poll_interval: Duration,
    /// Fetches per poll cycle before the job is parked back in waiting
    pub poll_max_attempts: u32,
    /// Delay before a parked job re-enters the poll queue
    pub poll_requeue_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_threads: 1,
            poll_worker_threads: 1,
            storage_dir: PathBuf::from("./storage"),
            public_base_url: "http://localhost:8000".to_string(),
            max_proxy_parallel: 4,
            proxy_height: 480,
            poll_interval: Duration::from_secs(3),
            poll_max_attempts: 100,
            poll_requeue_delay: Duration::from_secs(5),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            worker_threads: std::env::var("WORKER_THREADS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            poll_worker_threads: std::env::var("POLL_WORKER_THREADS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            storage_dir: std::env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./storage")),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            max_proxy_parallel: std::env::var("WORKER_MAX_PROXY_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            proxy_height: std::env::var("PROXY_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(480),
            poll_interval: Duration::from_secs(
                std::env::var("HAILUO_POLL_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
            ),
            poll_max_attempts: std::env::var("HAILUO_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            poll_requeue_delay: Duration::from_secs(
                std::env::var("HAILUO_POLL_REQUEUE_DELAY_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.storage_dir.join("assets")
    }

    pub fn renders_dir(&self) -> PathBuf {
        self.storage_dir.join("renders")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.storage_dir.join("frames")
    }

    /// Bounds for one poll cycle. A cycle that exhausts its attempts parks
    /// the job in waiting instead of failing it.
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: self.poll_interval,
            max_polls: self.poll_max_attempts,
            timeout: Duration::ZERO,
        }
    }
}
