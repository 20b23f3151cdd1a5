use crate::crawler::crawler_progress_event::MirrorEvent;
use crate::crawler::progress_reporter::ProgressReporter;
use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

/// Forwards progress to a console task over a channel.
///
/// The channel is unbounded so a slow terminal never stalls a fetch worker.
/// Send errors mean the console has gone away and are ignored.
#[derive(Clone)]
pub struct CrawlerProgressReporter {
    event_tx: UnboundedSender<MirrorEvent>,
}

impl CrawlerProgressReporter {
    pub fn new(event_tx: UnboundedSender<MirrorEvent>) -> Self {
        Self { event_tx }
    }
}

impl ProgressReporter for CrawlerProgressReporter {
    fn task_admitted(&self, _url: &Url, depth: usize) {
        let _ = self.event_tx.send(MirrorEvent::TaskAdmitted { depth });
    }

    fn file_saved(&self, _url: &Url, path: &Path) {
        let _ = self.event_tx.send(MirrorEvent::FileSaved {
            path: path.to_path_buf(),
        });
    }

    fn task_finished(&self, _url: &Url) {
        let _ = self.event_tx.send(MirrorEvent::TaskFinished);
    }
}
