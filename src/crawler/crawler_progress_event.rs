use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    TaskAdmitted { depth: usize },
    FileSaved { path: PathBuf },
    TaskFinished,
}
