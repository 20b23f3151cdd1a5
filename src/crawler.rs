mod crawl_error;
mod crawl_scope;
mod crawl_task;
mod crawler_progress_event;
mod crawler_progress_reporter;
mod fetch_worker_pool;
mod in_flight;
mod link_rewriter;
mod mirror_config;
mod mirror_crawler;
mod path_mapper;
mod progress_reporter;
mod visited_set;

pub use crawler_progress_event::MirrorEvent;
pub use crawler_progress_reporter::CrawlerProgressReporter;
pub use mirror_config::{DEFAULT_CONCURRENCY, DEFAULT_DOWNLOAD_DIR, DEFAULT_MAX_DEPTH, MirrorConfig};
pub use mirror_crawler::MirrorCrawler;
