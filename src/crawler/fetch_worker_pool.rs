use crate::crawler::crawl_error::CrawlError;
use crate::crawler::crawl_scope::CrawlScope;
use crate::crawler::crawl_task::CrawlTask;
use crate::crawler::in_flight::{InFlight, InFlightGuard};
use crate::crawler::link_rewriter::{LinkRewriter, RewrittenPage};
use crate::crawler::mirror_config::MirrorConfig;
use crate::crawler::path_mapper::map_to_local_path;
use crate::crawler::progress_reporter::ProgressReporter;
use crate::crawler::visited_set::VisitedSet;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

type QueuedTask = (CrawlTask, InFlightGuard);

/// Fetches and saves admitted crawl tasks with a fixed number of slots.
///
/// `submit` only performs the admission checks and enqueues. A dispatcher task
/// drains the queue, waiting for a free slot before it spawns each worker, so
/// a page with thousands of links never has more than `concurrency` fetches
/// running. Cloning yields another handle to the same pool.
pub struct FetchWorkerPool<TP>
where
    TP: ProgressReporter,
{
    inner: Arc<PoolInner<TP>>,
}

struct PoolInner<TP> {
    client: reqwest::Client,
    scope: CrawlScope,
    max_depth: usize,
    download_root: PathBuf,
    visited: VisitedSet,
    rewriter: LinkRewriter,
    slots: Arc<Semaphore>,
    queue_tx: UnboundedSender<QueuedTask>,
    in_flight: InFlight,
    progress_reporter: TP,
}

impl<TP> Clone for FetchWorkerPool<TP>
where
    TP: ProgressReporter,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<TP> FetchWorkerPool<TP>
where
    TP: ProgressReporter,
{
    /// Builds the pool and spawns its dispatcher. Must be called inside a
    /// tokio runtime.
    pub fn start(
        config: &MirrorConfig,
        seed: &Url,
        progress_reporter: TP,
    ) -> Result<(Self, JoinHandle<()>), CrawlError> {
        if config.concurrency() == 0 {
            return Err(CrawlError::ZeroConcurrency);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .build()?;
        let scope = CrawlScope::from_seed(seed);
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();

        let pool = Self {
            inner: Arc::new(PoolInner {
                client,
                rewriter: LinkRewriter::new(config.download_root(), scope.clone()),
                scope,
                max_depth: config.max_depth(),
                download_root: config.download_root().to_path_buf(),
                visited: VisitedSet::new(),
                slots: Arc::new(Semaphore::new(config.concurrency())),
                queue_tx,
                in_flight: InFlight::new(),
                progress_reporter,
            }),
        };
        let dispatcher = tokio::task::spawn(pool.clone().dispatch(queue_rx));
        Ok((pool, dispatcher))
    }

    /// Admits `url` at `depth` unless it is too deep, out of scope or already
    /// seen. Returns whether the task was queued; never waits.
    pub fn submit(&self, url: Url, depth: usize) -> bool {
        let inner = &self.inner;
        if depth > inner.max_depth {
            debug!(url = %url, depth, "beyond max depth, dropping");
            return false;
        }
        if !inner.scope.contains(&url) {
            debug!(url = %url, "outside crawl scope, dropping");
            return false;
        }
        if !inner.visited.admit(url.as_str()) {
            return false;
        }

        inner.progress_reporter.task_admitted(&url, depth);
        let guard = inner.in_flight.register();
        debug!(url = %url, depth, in_flight = inner.in_flight.current(), "admitted");
        // The dispatcher holds a pool handle and so keeps the queue open.
        let _ = inner.queue_tx.send((CrawlTask::new(url, depth), guard));
        true
    }

    /// Resolves once every admitted task, including those admitted while
    /// waiting, has finished.
    pub async fn wait_idle(&self) {
        self.inner.in_flight.wait_idle().await;
    }

    pub fn visited_count(&self) -> usize {
        self.inner.visited.len()
    }

    async fn dispatch(self, mut queue_rx: UnboundedReceiver<QueuedTask>) {
        while let Some((task, guard)) = queue_rx.recv().await {
            let Ok(permit) = Arc::clone(&self.inner.slots).acquire_owned().await else {
                break;
            };
            let pool = self.clone();
            tokio::task::spawn(async move {
                let url = task.url.clone();
                pool.execute(task).await;
                pool.inner.progress_reporter.task_finished(&url);
                drop(permit);
                drop(guard);
            });
        }
    }

    async fn execute(&self, task: CrawlTask) {
        info!(url = %task.url, depth = task.depth, "Downloading");
        match self.fetch_and_save(&task).await {
            Ok(discovered) => {
                for url in discovered {
                    self.submit(url, task.depth + 1);
                }
            }
            Err(e) => {
                warn!(url = %task.url, depth = task.depth, error = %e, "abandoning task");
            }
        }
    }

    /// Returns the in-scope links found in the page, empty for non-HTML.
    async fn fetch_and_save(&self, task: &CrawlTask) -> Result<Vec<Url>, CrawlError> {
        let inner = &self.inner;
        let response = inner.client.get(task.url.clone()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(CrawlError::HttpError(response.status().as_u16()));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<mime::Mime>().ok())
            .is_some_and(|content_type| {
                content_type.type_() == mime::TEXT && content_type.subtype() == mime::HTML
            });
        let body = response.bytes().await?;

        let (content, discovered) = if is_html {
            rewritten_or_raw(inner.rewriter.rewrite(&body, &task.url), &body, &task.url)
        } else {
            (body.to_vec(), Vec::new())
        };

        let save_path = map_to_local_path(&inner.download_root, &task.url);
        if let Some(parent) = save_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| CrawlError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&save_path, &content)
            .await
            .map_err(|source| CrawlError::Write {
                path: save_path.clone(),
                source,
            })?;

        debug!(url = %task.url, path = %save_path.display(), "saved");
        inner.progress_reporter.file_saved(&task.url, &save_path);
        Ok(discovered)
    }
}

/// Falls back to the page as fetched, with nothing to follow, when rewriting fails.
fn rewritten_or_raw(
    rewritten: Result<RewrittenPage, CrawlError>,
    body: &[u8],
    url: &Url,
) -> (Vec<u8>, Vec<Url>) {
    match rewritten {
        Ok(page) => (page.html, page.discovered),
        Err(e) => {
            warn!(url = %url, error = %e, "failed to rewrite links, saving page as fetched");
            (body.to_vec(), Vec::new())
        }
    }
}
