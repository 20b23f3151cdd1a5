use crate::console::ConsoleProgressReporter;
use crate::crawler::{
    CrawlerProgressReporter, DEFAULT_CONCURRENCY, DEFAULT_DOWNLOAD_DIR, DEFAULT_MAX_DEPTH,
    MirrorConfig, MirrorCrawler,
};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod console;
mod crawler;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mirror a website into a browsable local copy", long_about = None)]
struct CommandLineArgs {
    /// URL to start mirroring from; `http://` is assumed when no scheme is given
    #[arg(value_name = "URL")]
    seed: String,

    /// Maximum link distance from the seed to follow
    #[arg(value_name = "MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Directory the mirror is written into
    #[arg(value_name = "DOWNLOAD_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    download_dir: PathBuf,

    /// Maximum number of concurrent downloads
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,
}

async fn main_impl(args: CommandLineArgs) -> anyhow::Result<()> {
    let config = MirrorConfig::new(args.seed)
        .with_max_depth(args.max_depth)
        .with_download_root(args.download_dir)
        .with_concurrency(args.concurrency)
        .with_request_timeout(Duration::from_secs(args.timeout));

    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();
    let console_task = tokio::task::spawn(ConsoleProgressReporter::new(event_rx).run());

    let crawler = MirrorCrawler::run(config, CrawlerProgressReporter::new(event_tx)).await?;
    let seed = crawler.seed().clone();
    // Dropping the crawler inside join closes the last event sender.
    crawler.join().await;

    let totals = console_task.await??;
    println!("Download completed! Saved {} file(s) from {}", totals.saved, seed);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("web_mirror=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLineArgs::parse();

    if let Err(e) = main_impl(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
