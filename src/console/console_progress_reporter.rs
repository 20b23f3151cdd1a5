use crate::crawler::MirrorEvent;
use crossterm::tty::IsTty;
use crossterm::{QueueableCommand, queue};
use std::io::{Stdout, Write, stdout};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTotals {
    pub admitted: usize,
    pub finished: usize,
    pub saved: usize,
}

impl ProgressTotals {
    pub fn pending(&self) -> usize {
        self.admitted.saturating_sub(self.finished)
    }

    fn apply(&mut self, event: &MirrorEvent) {
        match event {
            MirrorEvent::TaskAdmitted { .. } => self.admitted += 1,
            MirrorEvent::FileSaved { .. } => self.saved += 1,
            MirrorEvent::TaskFinished => self.finished += 1,
        }
    }
}

struct ConsoleState {
    stdout: Stdout,
    interactive: bool,
    totals: ProgressTotals,
    deepest: usize,
    last_saved: Option<String>,
}

/// Renders crawl progress as a single, continuously redrawn status line.
///
/// Nothing is drawn when stdout is not a terminal; the totals are still kept
/// and returned once every event sender has been dropped.
pub struct ConsoleProgressReporter {
    event_rx: UnboundedReceiver<MirrorEvent>,
}

impl ConsoleProgressReporter {
    pub fn new(event_rx: UnboundedReceiver<MirrorEvent>) -> Self {
        Self { event_rx }
    }

    pub async fn run(mut self) -> anyhow::Result<ProgressTotals> {
        let stdout = stdout();
        let mut console_state = ConsoleState {
            interactive: stdout.is_tty(),
            stdout,
            totals: ProgressTotals::default(),
            deepest: 0,
            last_saved: None,
        };

        while let Some(event) = self.event_rx.recv().await {
            ConsoleProgressReporter::handle_event(event, &mut console_state);
            if console_state.interactive {
                ConsoleProgressReporter::console_redraw(&mut console_state)?;
            }
        }

        if console_state.interactive {
            ConsoleProgressReporter::console_teardown(&mut console_state)?;
        }
        Ok(console_state.totals)
    }

    fn handle_event(event: MirrorEvent, state: &mut ConsoleState) {
        state.totals.apply(&event);
        match event {
            MirrorEvent::TaskAdmitted { depth } => state.deepest = state.deepest.max(depth),
            MirrorEvent::FileSaved { path } => state.last_saved = Some(path.display().to_string()),
            MirrorEvent::TaskFinished => {}
        }
    }

    fn console_redraw(state: &mut ConsoleState) -> anyhow::Result<()> {
        let totals = state.totals;
        let mut line = format!(
            "Pending: {}, Saved: {}, Depth: {}",
            totals.pending(),
            totals.saved,
            state.deepest
        );
        if let Some(path) = &state.last_saved {
            line.push_str(&format!(", Last: {}", path));
        }

        queue!(
            state.stdout,
            crossterm::cursor::MoveToColumn(0),
            crossterm::terminal::Clear(crossterm::terminal::ClearType::CurrentLine),
            crossterm::style::Print(line),
        )?;
        state.stdout.flush()?;
        Ok(())
    }

    fn console_teardown(state: &mut ConsoleState) -> anyhow::Result<()> {
        state.stdout.queue(crossterm::cursor::MoveToNextLine(1))?;
        state.stdout.flush()?;
        Ok(())
    }
}
