use crate::error::RefreshError;
use crate::models::{HistoryEntry, HistoryList, RequestToken};
use tracing::{debug, warn};

/// Recently opened archives as last reported by the backend.
///
/// The list is replaced wholesale by each newer successful refresh. Failed
/// or out-of-date refreshes leave it untouched.
#[derive(Debug, Default)]
pub struct HistoryView {
    entries: HistoryList,
    applied: Option<RequestToken>,
}

impl HistoryView {
    pub fn apply(&mut self, token: RequestToken, result: Result<HistoryList, RefreshError>) {
        if self.applied.is_some_and(|applied| token < applied) {
            debug!("Ignoring refresh {} older than {:?}", token, self.applied);
            return;
        }
        match result {
            Ok(entries) => {
                debug!("History refreshed: {} entries", entries.len());
                self.entries = entries;
                self.applied = Some(token);
            }
            Err(e) => warn!("{}", e),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
