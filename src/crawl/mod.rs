// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from a root URL
// - Respects same-host restriction (other hosts are probed, never rendered)
// - Configurable depth limit, page/probe ceilings and crawl deadline
// - Cancellable; a cancelled crawl still returns what it found
//
// Rust concepts:
// - Async programming: renders and probes run concurrently
// - Collections: HashSet for tracking visited URLs and probed links
// =============================================================================

mod queue;
mod state;

pub use queue::{CrawlRequest, Crawler};
pub use state::CrawlState;
