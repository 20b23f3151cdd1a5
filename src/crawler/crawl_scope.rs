use url::Url;

/// The origin a crawl is confined to: the seed's host plus any explicit port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlScope {
    host: String,
    port: Option<u16>,
}

impl CrawlScope {
    pub fn from_seed(seed: &Url) -> Self {
        Self {
            host: seed.host_str().unwrap_or_default().to_owned(),
            port: seed.port(),
        }
    }

    pub fn contains(&self, url: &Url) -> bool {
        url.host_str() == Some(self.host.as_str()) && url.port() == self.port
    }
}
