use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MAX_DEPTH: usize = 1;
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    seed_url: String,
    max_depth: usize,
    download_root: PathBuf,
    concurrency: usize,
    request_timeout: Duration,
    user_agent: String,
}

impl MirrorConfig {
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            download_root: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_download_root(mut self, download_root: impl Into<PathBuf>) -> Self {
        self.download_root = download_root.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn seed_url(&self) -> &str {
        &self.seed_url
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn download_root(&self) -> &Path {
        &self.download_root
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
