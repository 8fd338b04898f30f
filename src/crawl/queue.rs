// src/crawl/queue.rs
// =============================================================================
// This module drives a crawl breadth-first, one depth level at a time.
//
// How it works:
// 1. Start with the root URL as the only page at depth 0
// 2. Claim the level's unvisited pages and render them (a few at a time)
// 3. Normalize every link found; claim the ones never probed before
// 4. Probe the claimed links concurrently and record the failures
// 5. Same-host links become the pages of the next level
// 6. Stop after max_depth, when no pages are left, or when cancelled
//
// Claims (visited pages, probed links) are made here, on one task, before
// any work is handed out. That is what makes "render at most once" and
// "probe at most once" hold without locks.
//
// Failure policy:
// - A broken link is recorded, never raised
// - A page that fails to render is logged and its subtree skipped
// - Only an unusable root URL or an unavailable rendering engine fails the
//   crawl as a whole
// =============================================================================

use super::state::CrawlState;
use crate::checker::{normalize_link, same_host, Normalized, Prober};
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::render::Renderer;
use crate::report::{CrawlReport, LinkFailure};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Input to one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// Absolute http(s) URL to start from
    pub root_url: String,
    /// 0 = check only the root page's own links, no recursion
    pub max_depth: usize,
}

impl CrawlRequest {
    pub fn new(root_url: impl Into<String>, max_depth: usize) -> Self {
        CrawlRequest {
            root_url: root_url.into(),
            max_depth,
        }
    }
}

// Fires on caller cancellation or when the crawl-wide deadline passes
struct StopSignal {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl StopSignal {
    async fn wait(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }
}

/// Crawls one site at a time; reusable across crawls since it keeps no
/// per-crawl state
pub struct Crawler {
    renderer: Arc<dyn Renderer>,
    prober: Arc<dyn Prober>,
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(renderer: Arc<dyn Renderer>, prober: Arc<dyn Prober>, config: CrawlConfig) -> Self {
        Crawler {
            renderer,
            prober,
            config,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls without outside cancellation (the configured deadline, if any,
    /// still applies)
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlReport, CrawlError> {
        self.crawl_with_cancel(request, CancellationToken::new()).await
    }

    /// Crawls until done or until `cancel` fires. On cancellation in-flight
    /// renders and probes are dropped and the partial report is returned with
    /// `cancelled` set.
    pub async fn crawl_with_cancel(
        &self,
        request: &CrawlRequest,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let root = parse_root(&request.root_url)?;
        let stop = StopSignal {
            cancel,
            deadline: self.config.crawl_timeout().map(|d| Instant::now() + d),
        };

        let mut report = CrawlReport {
            root_url: root.to_string(),
            max_depth: request.max_depth,
            ..CrawlReport::default()
        };
        let mut state = CrawlState::new();

        info!(root = %root, max_depth = request.max_depth, "crawl started");

        let mut frontier = vec![root.clone()];
        for depth in 0..=request.max_depth {
            if frontier.is_empty() {
                break;
            }

            let pages = self.claim_pages(&mut state, frontier, &mut report);
            let level = self
                .render_level(&root, depth, request.max_depth, pages, &mut state, &stop, &mut report)
                .await?;

            let Some((jobs, next)) = level else {
                report.cancelled = true;
                break;
            };

            if !self.probe_links(jobs, &stop, &mut report).await {
                report.cancelled = true;
                break;
            }

            frontier = next;
        }

        if report.cancelled {
            warn!(root = %root, "crawl stopped early, returning partial results");
        }
        info!(
            root = %root,
            pages = report.pages_rendered,
            probed = report.links_probed,
            broken = report.broken_count(),
            "crawl finished"
        );

        Ok(report)
    }

    // Claims unvisited pages up to the page ceiling
    fn claim_pages(
        &self,
        state: &mut CrawlState,
        frontier: Vec<Url>,
        report: &mut CrawlReport,
    ) -> Vec<Url> {
        let mut pages = Vec::new();
        for url in frontier {
            if state.is_visited(&url) {
                continue;
            }
            if state.pages_visited() >= self.config.max_pages {
                report.truncated = true;
                break;
            }
            state.mark_visited(&url);
            pages.push(url);
        }
        pages
    }

    // Renders one level's pages. Returns the (page, link) probe jobs and the
    // next level's pages, or None if the crawl was stopped.
    #[allow(clippy::too_many_arguments)]
    async fn render_level(
        &self,
        root: &Url,
        depth: usize,
        max_depth: usize,
        pages: Vec<Url>,
        state: &mut CrawlState,
        stop: &StopSignal,
        report: &mut CrawlReport,
    ) -> Result<Option<(Vec<(Url, Url)>, Vec<Url>)>, CrawlError> {
        let mut renders = stream::iter(pages)
            .map(|page| {
                let renderer = Arc::clone(&self.renderer);
                async move {
                    debug!(url = %page, depth, "rendering");
                    let result = renderer.render_and_extract_links(&page).await;
                    (page, result)
                }
            })
            .buffer_unordered(self.config.render_concurrency);

        let mut jobs = Vec::new();
        let mut next = Vec::new();
        let mut queued: HashSet<Url> = HashSet::new();

        loop {
            let rendered = tokio::select! {
                biased;
                _ = stop.wait() => return Ok(None),
                rendered = renders.next() => rendered,
            };
            let Some((page, result)) = rendered else {
                break;
            };

            let raw_links = match result {
                Ok(links) => links,
                Err(e) if e.is_fatal() => {
                    return Err(CrawlError::RendererUnavailable(e.to_string()));
                }
                Err(e) => {
                    warn!(url = %page, depth, error = %e, "skipping page that failed to render");
                    continue;
                }
            };
            report.pages_rendered += 1;

            for raw in raw_links {
                let link = match normalize_link(&raw, &self.config.exclusions) {
                    Normalized::Link(link) => link,
                    Normalized::Excluded => {
                        debug!(link = %raw, "excluded");
                        continue;
                    }
                    Normalized::Unsupported => {
                        debug!(link = %raw, "not an http(s) URL, dropped");
                        continue;
                    }
                };

                if !state.is_checked(&link) {
                    if state.links_checked() >= self.config.max_probes {
                        report.truncated = true;
                    } else if state.claim_probe(&link) {
                        jobs.push((page.clone(), link.clone()));
                    }
                }

                if depth < max_depth
                    && same_host(&link, root)
                    && !state.is_visited(&link)
                    && queued.insert(link.clone())
                {
                    next.push(link);
                }
            }
        }

        Ok(Some((jobs, next)))
    }

    // Probes the claimed links with bounded concurrency and records every
    // failure. Returns false if the crawl was stopped midway.
    async fn probe_links(
        &self,
        jobs: Vec<(Url, Url)>,
        stop: &StopSignal,
        report: &mut CrawlReport,
    ) -> bool {
        let mut probes = stream::iter(jobs)
            .map(|(page, link)| {
                let prober = Arc::clone(&self.prober);
                async move {
                    let outcome = prober.probe(&link).await;
                    (page, link, outcome)
                }
            })
            .buffer_unordered(self.config.probe_concurrency);

        loop {
            let probed = tokio::select! {
                biased;
                _ = stop.wait() => return false,
                probed = probes.next() => probed,
            };
            let Some((page, link, outcome)) = probed else {
                return true;
            };

            report.links_probed += 1;
            if let Some(failure) = LinkFailure::from_probe(&page, &link, &outcome) {
                info!(page = %page, link = %link, status = failure.status, "broken link");
                report.failures.push(failure);
            }
        }
    }
}

// Parses and validates the root URL; the fragment is dropped like any link's
fn parse_root(root_url: &str) -> Result<Url, CrawlError> {
    let mut root = Url::parse(root_url.trim()).map_err(|e| CrawlError::InvalidRootUrl {
        url: root_url.to_string(),
        reason: e.to_string(),
    })?;

    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(CrawlError::InvalidRootUrl {
            url: root_url.to_string(),
            reason: format!("unsupported scheme '{}'", root.scheme()),
        });
    }
    if root.host_str().is_none() {
        return Err(CrawlError::MissingHost(root_url.to_string()));
    }

    root.set_fragment(None);
    Ok(root)
}
