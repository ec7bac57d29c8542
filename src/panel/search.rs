//! Debounced remote search with latest-wins result handling.
//!
//! The raw query is stored on every keystroke so the input echoes instantly
//! and the local filter can run immediately. The remote search is dispatched
//! only after the query has been stable for the debounce delay. Each dispatch
//! carries a monotonically increasing sequence number; responses for anything
//! but the most recent dispatch are discarded.

use std::time::{Duration, Instant};

/// A remote search to be issued by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResolution {
    /// Response for the latest dispatch; the caller applies it
    Applied,
    /// Response superseded by a later dispatch; the caller drops it
    Stale,
}

#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    query: String,
    debounce: Duration,
    /// Deadline of the pending debounced dispatch
    pending: Option<Instant>,
    is_searching: bool,
    next_seq: u64,
    latest_seq: Option<u64>,
    remote_enabled: bool,
}

impl SearchCoordinator {
    pub fn new(debounce: Duration, remote_enabled: bool) -> Self {
        Self {
            query: String::new(),
            debounce,
            pending: None,
            is_searching: false,
            next_seq: 1,
            latest_seq: None,
            remote_enabled,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Store the raw text and (re)schedule the remote search.
    ///
    /// An empty trimmed query bypasses the debounce and is returned for
    /// immediate dispatch so the unfiltered result set comes back.
    pub fn on_query_changed(&mut self, text: &str, now: Instant) -> Option<SearchRequest> {
        self.query = text.to_string();
        self.pending = None;
        if !self.remote_enabled {
            return None;
        }

        if self.query.trim().is_empty() {
            self.is_searching = false;
            return Some(self.issue(String::new()));
        }

        self.is_searching = true;
        self.pending = Some(now + self.debounce);
        None
    }

    pub fn clear(&mut self) -> Option<SearchRequest> {
        let had_query = !self.query.is_empty();
        self.query.clear();
        self.pending = None;
        self.is_searching = false;
        if self.remote_enabled && had_query {
            Some(self.issue(String::new()))
        } else {
            None
        }
    }

    /// Dispatch the debounced search once its delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        match self.pending {
            Some(at) if now >= at => {
                self.pending = None;
                let query = self.query.trim().to_string();
                let request = self.issue(query);
                tracing::debug!("Dispatching search #{} for '{}'", request.seq, request.query);
                Some(request)
            }
            _ => None,
        }
    }

    /// Record completion of the dispatch numbered `seq`.
    pub fn on_completed(&mut self, seq: u64) -> SearchResolution {
        if self.latest_seq != Some(seq) {
            tracing::debug!(
                "Discarding stale search #{} (latest {:?})",
                seq,
                self.latest_seq
            );
            return SearchResolution::Stale;
        }
        // A newer keystroke may still be waiting on its debounce
        if self.pending.is_none() {
            self.is_searching = false;
        }
        SearchResolution::Applied
    }

    fn issue(&mut self, query: String) -> SearchRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);
        SearchRequest { seq, query }
    }
}
