// src/render/browser.rs
// =============================================================================
// Renders pages in headless Chrome so client-side scripts run before we read
// the DOM. A static fetch misses every link a framework injects at runtime.
//
// Resource model:
// - One browser process per ChromeRenderer, shared by all renders
// - One tab per render, wrapped in a PageGuard that closes it on every exit
//   path (normal return, error, timeout, or the render future being dropped
//   when a crawl is cancelled)
// - A semaphore caps how many tabs are open at once
// =============================================================================

use super::{RenderError, Renderer};
use crate::checker::extract_anchor_targets;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Owns one tab; closes it when consumed with close() or, failing that, on
/// drop.
///
/// chromiumoxide's Page has no Drop of its own, so a tab abandoned on an
/// error path would stay open until the browser exits. Drop can't await, so
/// it hands the close to the runtime captured at construction.
pub struct PageGuard {
    page: Option<Page>,
    url: String,
    runtime_handle: tokio::runtime::Handle,
}

impl PageGuard {
    pub fn new(page: Page, url: String) -> Self {
        PageGuard {
            page: Some(page),
            url,
            runtime_handle: tokio::runtime::Handle::current(),
        }
    }

    /// Closes the tab and waits for the browser to confirm
    pub async fn close(mut self) {
        if let Some(page) = self.page.take() {
            match page.close().await {
                Ok(()) => debug!(url = %self.url, "tab closed"),
                Err(e) => warn!(url = %self.url, error = %e, "failed to close tab"),
            }
        }
    }
}

impl Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        // Only close() takes the page, and it consumes the guard
        self.page.as_ref().expect("PageGuard used after close")
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            let url = std::mem::take(&mut self.url);
            self.runtime_handle.spawn(async move {
                if let Err(e) = page.close().await {
                    warn!(%url, error = %e, "tab cleanup on drop failed");
                }
            });
        }
    }
}

pub struct ChromeRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
    tabs: Arc<Semaphore>,
    render_timeout: Duration,
    settle: Duration,
}

impl ChromeRenderer {
    /// Starts a headless browser. Failing to start is crawl-fatal.
    pub async fn launch(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let browser_config = BrowserConfig::builder()
            .request_timeout(config.render_timeout())
            .build()
            .map_err(CrawlError::RendererUnavailable)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CrawlError::RendererUnavailable(e.to_string()))?;

        // The CDP handler must be polled for the browser to make progress.
        // It ends when the browser connection closes.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser handler event error");
                }
            }
        });

        info!("headless browser started");

        Ok(ChromeRenderer {
            browser,
            handler_task,
            tabs: Arc::new(Semaphore::new(config.render_concurrency)),
            render_timeout: config.render_timeout(),
            settle: Duration::from_millis(config.render_settle_ms),
        })
    }

    /// Closes the browser process
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "failed to close browser");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "failed waiting for browser exit");
        }
        self.handler_task.abort();
    }

    async fn open_tab(&self, url: &Url) -> Result<PageGuard, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::EngineUnavailable(e.to_string()))?;
        Ok(PageGuard::new(page, url.to_string()))
    }

    // Navigates, lets late scripts settle, then reads the live DOM.
    // Returns the document and the URL it ended up at after redirects.
    async fn load(&self, tab: &Page, url: &Url) -> Result<(String, Url), RenderError> {
        tab.goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let html = tab
            .content()
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?;

        let final_url = tab
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        Ok((html, final_url))
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render_and_extract_links(&self, url: &Url) -> Result<BTreeSet<String>, RenderError> {
        let _permit = self
            .tabs
            .acquire()
            .await
            .map_err(|e| RenderError::EngineUnavailable(e.to_string()))?;

        let tab = self.open_tab(url).await?;
        let loaded = tokio::time::timeout(self.render_timeout, self.load(&tab, url)).await;
        tab.close().await;

        let (html, final_url) = match loaded {
            Err(_) => return Err(RenderError::Timeout(self.render_timeout.as_secs())),
            Ok(result) => result?,
        };

        let links = extract_anchor_targets(&html, &final_url);
        debug!(%url, links = links.len(), "rendered");
        Ok(links)
    }
}
