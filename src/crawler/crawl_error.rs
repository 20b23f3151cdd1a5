use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    #[error("invalid seed URL {url:?}: {source}")]
    InvalidSeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {0:?}, only http and https can be mirrored")]
    UnsupportedScheme(String),

    #[error("seed URL {0} has no host")]
    MissingHost(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("failed to create download directory {path:?}: {source}")]
    DownloadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP Error Status Code = {0}")]
    HttpError(u16),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error("failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    RewriteError(#[from] lol_html::errors::RewritingError),
}
