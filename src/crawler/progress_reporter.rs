use std::path::Path;
use url::Url;

/// Receives crawl progress. Implementations must not block the caller; they
/// are invoked from inside fetch workers.
pub trait ProgressReporter: Send + Sync + 'static {
    fn task_admitted(&self, url: &Url, depth: usize);
    fn file_saved(&self, url: &Url, path: &Path);
    fn task_finished(&self, url: &Url);
}
