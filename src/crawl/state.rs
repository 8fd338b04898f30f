// src/crawl/state.rs
// =============================================================================
// Per-crawl bookkeeping.
//
// A fresh CrawlState is built at the start of every crawl and dropped at its
// end, so nothing leaks between two crawls. Only the orchestrator mutates it;
// workers get URLs that were already claimed here.
// =============================================================================

use std::collections::HashSet;
use url::Url;

#[derive(Debug, Default)]
pub struct CrawlState {
    /// Pages whose links were (or are being) extracted
    visited: HashSet<Url>,
    /// Links whose liveness was (or is being) probed
    checked_links: HashSet<Url>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a page for rendering. Returns false if it was already claimed.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.clone())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Claims a link for probing. Returns false if it was already claimed.
    pub fn claim_probe(&mut self, url: &Url) -> bool {
        self.checked_links.insert(url.clone())
    }

    pub fn is_checked(&self, url: &Url) -> bool {
        self.checked_links.contains(url)
    }

    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }

    pub fn links_checked(&self) -> usize {
        self.checked_links.len()
    }
}
