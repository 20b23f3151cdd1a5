use crate::crawler::crawl_error::CrawlError;
use crate::crawler::crawl_task::strip_url;
use crate::crawler::fetch_worker_pool::FetchWorkerPool;
use crate::crawler::mirror_config::MirrorConfig;
use crate::crawler::progress_reporter::ProgressReporter;
use std::borrow::Cow;
use tokio::task::JoinHandle;
use tracing::info;
use url::Url;

/// Drives one mirror run: seeds the pool and waits for the crawl to drain.
pub struct MirrorCrawler<TP>
where
    TP: ProgressReporter,
{
    seed: Url,
    pool: FetchWorkerPool<TP>,
    dispatcher: JoinHandle<()>,
}

impl<TP> MirrorCrawler<TP>
where
    TP: ProgressReporter,
{
    /// Validates the configuration, prepares the download root and submits
    /// the seed at depth 0. Returns as soon as the seed is queued; call
    /// [`MirrorCrawler::join`] to wait for the crawl itself.
    pub async fn run(config: MirrorConfig, progress_reporter: TP) -> Result<Self, CrawlError> {
        let seed = parse_seed_url(config.seed_url())?;
        let (pool, dispatcher) = FetchWorkerPool::start(&config, &seed, progress_reporter)?;

        if let Err(source) = tokio::fs::create_dir_all(config.download_root()).await {
            dispatcher.abort();
            return Err(CrawlError::DownloadRoot {
                path: config.download_root().to_path_buf(),
                source,
            });
        }

        info!(
            seed = %seed,
            max_depth = config.max_depth(),
            root = %config.download_root().display(),
            concurrency = config.concurrency(),
            "Starting mirror"
        );
        pool.submit(seed.clone(), 0);

        Ok(Self {
            seed,
            pool,
            dispatcher,
        })
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    /// Waits for every task, including ones discovered while waiting.
    /// Returns the number of URLs admitted over the run.
    pub async fn join(self) -> usize {
        self.pool.wait_idle().await;
        self.dispatcher.abort();
        let admitted = self.pool.visited_count();
        info!(seed = %self.seed, admitted, "Download completed");
        admitted
    }
}

/// Parses a seed as typed on the command line. A missing scheme means
/// `http`; fragment and query are dropped like on every discovered link.
pub fn parse_seed_url(raw: &str) -> Result<Url, CrawlError> {
    let candidate = if raw.contains("://") {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("http://{}", raw))
    };
    let url = Url::parse(&candidate).map_err(|source| CrawlError::InvalidSeedUrl {
        url: raw.to_owned(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(CrawlError::UnsupportedScheme(other.to_owned())),
    }
    if !url.has_host() {
        return Err(CrawlError::MissingHost(raw.to_owned()));
    }
    Ok(strip_url(&url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::path_mapper::map_to_local_path;
    use scraper::{Html, Selector};
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct SilentReporter;

    impl ProgressReporter for SilentReporter {
        fn task_admitted(&self, _url: &Url, _depth: usize) {}
        fn file_saved(&self, _url: &Url, _path: &Path) {}
        fn task_finished(&self, _url: &Url) {}
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
    }

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, expected: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .expect(expected)
            .mount(server)
            .await;
    }

    async fn mirror(server: &MockServer, root: &Path, max_depth: usize) -> usize {
        let config = MirrorConfig::new(format!("{}/", server.uri()))
            .with_max_depth(max_depth)
            .with_download_root(root)
            .with_concurrency(10);
        let crawler = MirrorCrawler::run(config, SilentReporter).await.unwrap();
        tokio::time::timeout(Duration::from_secs(10), crawler.join())
            .await
            .unwrap()
    }

    fn local(server: &MockServer, root: &Path, route: &str) -> PathBuf {
        let url = Url::parse(&server.uri()).unwrap().join(route).unwrap();
        map_to_local_path(root, &url)
    }

    fn first_attribute(file: &Path, selector: &str, attribute: &str) -> Option<String> {
        let document = Html::parse_document(&std::fs::read_to_string(file).unwrap());
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(attribute))
            .map(str::to_owned)
    }

    #[test]
    fn test_seed_defaults_to_http() {
        let seed = parse_seed_url("example.com/docs").unwrap();
        assert_eq!(seed.as_str(), "http://example.com/docs");
    }

    #[test]
    fn test_seed_is_stripped() {
        let seed = parse_seed_url("https://example.com/a?b=c#d").unwrap();
        assert_eq!(seed.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_seed_rejections() {
        assert!(matches!(
            parse_seed_url("http://exa mple.com/"),
            Err(CrawlError::InvalidSeedUrl { .. })
        ));
        assert!(matches!(
            parse_seed_url("ftp://example.com/"),
            Err(CrawlError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
    }

    #[tokio::test]
    async fn test_invalid_seed_fails_before_creating_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("mirror");
        let config = MirrorConfig::new("http://[::1").with_download_root(&root);
        let result = MirrorCrawler::run(config, SilentReporter).await;
        assert!(matches!(result, Err(CrawlError::InvalidSeedUrl { .. })));
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = MirrorConfig::new("http://example.com/")
            .with_download_root(dir.path())
            .with_concurrency(0);
        let result = MirrorCrawler::run(config, SilentReporter).await;
        assert!(matches!(result, Err(CrawlError::ZeroConcurrency)));
    }

    #[tokio::test]
    async fn test_unwritable_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("occupied");
        std::fs::write(&root, "not a directory").unwrap();
        let config = MirrorConfig::new("http://example.com/").with_download_root(&root);
        let result = MirrorCrawler::run(config, SilentReporter).await;
        assert!(matches!(result, Err(CrawlError::DownloadRoot { .. })));
    }

    #[tokio::test]
    async fn test_mirrors_seed_and_linked_page() {
        let server = MockServer::start().await;
        mount(&server, "/", html(r#"<html><body><a href="/about">About</a></body></html>"#), 1).await;
        mount(&server, "/about", html(r#"<a href="/team">Team</a><a href="/">Home</a>"#), 1).await;
        mount(&server, "/team", html("<p>too deep</p>"), 0).await;
        let dir = tempfile::tempdir().unwrap();

        let admitted = mirror(&server, dir.path(), 1).await;

        let index = local(&server, dir.path(), "/");
        let about = local(&server, dir.path(), "/about");
        assert!(index.ends_with("index.html"));
        assert!(about.ends_with("about.html"));
        assert_eq!(first_attribute(&index, "a", "href").as_deref(), Some("about.html"));
        // Rewritten even though depth 2 is never fetched.
        assert_eq!(first_attribute(&about, "a", "href").as_deref(), Some("team.html"));
        assert!(!local(&server, dir.path(), "/team").exists());
        assert_eq!(admitted, 2);
    }

    #[tokio::test]
    async fn test_zero_depth_fetches_only_seed() {
        let server = MockServer::start().await;
        mount(&server, "/", html(r#"<a href="/about">About</a>"#), 1).await;
        mount(&server, "/about", html("<p>about</p>"), 0).await;
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(mirror(&server, dir.path(), 0).await, 1);
        assert_eq!(
            first_attribute(&local(&server, dir.path(), "/"), "a", "href").as_deref(),
            Some("about.html")
        );
    }

    #[tokio::test]
    async fn test_foreign_and_fragment_links_are_not_followed() {
        let server = MockServer::start().await;
        let seed_page = r##"<a href="https://other.org/x">Other</a><a href="#section">Jump</a>"##;
        mount(&server, "/", html(seed_page), 1).await;
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(mirror(&server, dir.path(), 2).await, 1);

        let saved = std::fs::read_to_string(local(&server, dir.path(), "/")).unwrap();
        assert_eq!(saved, seed_page);
        assert!(!dir.path().join("other.org").exists());
    }

    #[tokio::test]
    async fn test_shared_resource_is_fetched_once() {
        let server = MockServer::start().await;
        mount(&server, "/", html(r#"<a href="/one">1</a><a href="/two">2</a>"#), 1).await;
        mount(&server, "/one", html(r#"<link rel="stylesheet" href="/shared.css">"#), 1).await;
        mount(&server, "/two", html(r#"<link rel="stylesheet" href="shared.css?v=2">"#), 1).await;
        mount(
            &server,
            "/shared.css",
            ResponseTemplate::new(200)
                .set_body_raw("body {}", "text/css")
                .set_delay(Duration::from_millis(50)),
            1,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(mirror(&server, dir.path(), 2).await, 4);

        let css = local(&server, dir.path(), "/shared.css");
        assert_eq!(std::fs::read_to_string(css).unwrap(), "body {}");
        assert_eq!(
            first_attribute(&local(&server, dir.path(), "/two"), "link", "href").as_deref(),
            Some("shared.css")
        );
    }

    #[tokio::test]
    async fn test_failed_page_does_not_stop_siblings() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/",
            html(r#"<a href="/broken">x</a><a href="/docs/">y</a>"#),
            1,
        )
        .await;
        mount(&server, "/broken", ResponseTemplate::new(500), 1).await;
        mount(&server, "/docs/", html(r#"<img src="../logo.png">"#), 1).await;
        mount(
            &server,
            "/logo.png",
            ResponseTemplate::new(200).set_body_raw(vec![0x89, b'P', b'N', b'G'], "image/png"),
            1,
        )
        .await;
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(mirror(&server, dir.path(), 2).await, 4);

        assert!(!local(&server, dir.path(), "/broken").exists());
        let docs = local(&server, dir.path(), "/docs/");
        assert!(docs.ends_with("docs/index.html"));
        assert_eq!(first_attribute(&docs, "img", "src").as_deref(), Some("../logo.png"));
        assert_eq!(
            std::fs::read(local(&server, dir.path(), "/logo.png")).unwrap(),
            vec![0x89, b'P', b'N', b'G']
        );
    }
}
