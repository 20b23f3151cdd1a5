use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// URLs that have been admitted for fetching during one crawl run.
///
/// Keys are the raw serialized URL strings. No canonicalization happens here,
/// so `/a?x=1` and `/a?x=2`, or different percent-encodings of the same path,
/// are distinct entries.
#[derive(Default)]
pub struct VisitedSet {
    visited: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per distinct URL string.
    pub fn admit(&self, url: &str) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_owned())
    }

    pub fn len(&self) -> usize {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
