// src/render/mod.rs
// =============================================================================
// Page rendering: load one page, let its scripts run, return its links.
//
// Implementations:
// - browser: headless Chrome over CDP (chromiumoxide); the default
// - fetch: plain HTTP GET, no scripts; for machines without a browser
//
// The crawler only sees the Renderer trait, so tests swap in a fake site.
// =============================================================================

mod browser;
mod fetch;

pub use browser::{ChromeRenderer, PageGuard};
pub use fetch::StaticRenderer;

use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

/// Why a page could not be rendered
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("render timed out after {0}s")]
    Timeout(u64),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("reading the rendered page failed: {0}")]
    Script(String),

    /// No rendering context could be acquired at all
    #[error("rendering engine unavailable: {0}")]
    EngineUnavailable(String),
}

impl RenderError {
    /// Only an unavailable engine ends the crawl; everything else skips the
    /// page
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::EngineUnavailable(_))
    }
}

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Loads `url` and returns the absolute targets of its anchors, minus
    /// `javascript:` and in-page `#fragment` hrefs.
    ///
    /// Each call works in its own isolated context (a browser tab) that is
    /// released before the call returns, on success and on error.
    async fn render_and_extract_links(&self, url: &Url) -> Result<BTreeSet<String>, RenderError>;
}
