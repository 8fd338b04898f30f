// src/render/fetch.rs
// =============================================================================
// A renderer that never runs scripts: it GETs the page and parses the HTML
// the server sent.
//
// This under-reports links on script-heavy sites, which is why it is not the
// default. It exists for machines where no Chrome/Chromium is installed.
// =============================================================================

use super::{RenderError, Renderer};
use crate::checker::extract_anchor_targets;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct StaticRenderer {
    client: Client,
    timeout: Duration,
}

impl StaticRenderer {
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.render_timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CrawlError::HttpClient(e.to_string()))?;

        Ok(StaticRenderer {
            client,
            timeout: config.render_timeout(),
        })
    }

    // Fetches a web page and returns its HTML plus the URL it was served
    // from (after redirects)
    async fn fetch_page(&self, url: &Url) -> Result<(String, Url), RenderError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            return Err(RenderError::Navigation(format!("HTTP {}", response.status())));
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| self.map_error(e))?;
        Ok((html, final_url))
    }

    fn map_error(&self, error: reqwest::Error) -> RenderError {
        if error.is_timeout() {
            RenderError::Timeout(self.timeout.as_secs())
        } else {
            RenderError::Navigation(error.to_string())
        }
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn render_and_extract_links(&self, url: &Url) -> Result<BTreeSet<String>, RenderError> {
        let (html, final_url) = self.fetch_page(url).await?;
        Ok(extract_anchor_targets(&html, &final_url))
    }
}
