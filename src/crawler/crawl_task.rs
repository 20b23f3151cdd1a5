use url::Url;

/// One unit of crawl work: a URL and its link distance from the seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize,
}

impl CrawlTask {
    pub fn new(url: Url, depth: usize) -> Self {
        Self { url, depth }
    }
}

/// Strips the URL of its fragment and query components.
pub fn strip_url(url: &Url) -> Url {
    let mut stripped_url = url.clone();
    stripped_url.set_fragment(None);
    stripped_url.set_query(None);
    stripped_url
}
