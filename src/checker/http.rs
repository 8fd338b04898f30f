// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET only when the server answers HEAD with 405
// - Sorts every answer into one of three outcomes: ok, failed with a status
//   code, or failed before any status arrived (timeout / connection error)
//
// The HEAD-then-GET policy lives in probe_with_fallback(), which is generic
// over ProbeTransport. HttpProber is the reqwest-backed transport; tests
// script their own transport to pin the policy down without a network.
// =============================================================================

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Why a probe got no HTTP status back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailure {
    /// The probe's time budget ran out
    Timeout,
    /// DNS, TLS, refused connection, redirect loop, ...
    ConnectionError,
}

/// Result of probing one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ok,
    FailedWithStatus(u16),
    FailedTransport(TransportFailure),
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Ok)
    }
}

/// The HTTP method a probe is sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

/// Sends one request and reports the final status code (after redirects)
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn send(&self, method: ProbeMethod, url: &Url) -> Result<u16, TransportFailure>;
}

/// Anything that can tell the crawler whether a link is alive
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &Url) -> ProbeOutcome;
}

// HEAD first; if (and only if) the server says 405 Method Not Allowed,
// retry once with GET. Any other status, or a transport failure on HEAD,
// is final.
pub async fn probe_with_fallback<T>(transport: &T, url: &Url) -> ProbeOutcome
where
    T: ProbeTransport + ?Sized,
{
    let status = match transport.send(ProbeMethod::Head, url).await {
        Ok(status) => status,
        Err(failure) => return ProbeOutcome::FailedTransport(failure),
    };

    let status = if status == StatusCode::METHOD_NOT_ALLOWED.as_u16() {
        debug!(%url, "HEAD rejected with 405, retrying with GET");
        match transport.send(ProbeMethod::Get, url).await {
            Ok(status) => status,
            Err(failure) => return ProbeOutcome::FailedTransport(failure),
        }
    } else {
        status
    };

    outcome_for_status(status)
}

// 2xx and 3xx count as alive. A 3xx only reaches us when the client was told
// not to follow it, and a redirect is not a broken link.
fn outcome_for_status(status: u16) -> ProbeOutcome {
    if (200..400).contains(&status) {
        ProbeOutcome::Ok
    } else {
        ProbeOutcome::FailedWithStatus(status)
    }
}

/// Prober backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.probe_timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CrawlError::HttpClient(e.to_string()))?;

        Ok(HttpProber {
            client,
            timeout: config.probe_timeout(),
        })
    }
}

#[async_trait]
impl ProbeTransport for HttpProber {
    async fn send(&self, method: ProbeMethod, url: &Url) -> Result<u16, TransportFailure> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url.clone()),
            ProbeMethod::Get => self.client.get(url.clone()),
        };

        // The client has the same timeout; this one also covers connection
        // setup stalls the client's timer can miss. The response body is
        // never read, so a GET fallback does not download the page.
        match tokio::time::timeout(self.timeout, request.send()).await {
            Err(_) => Err(TransportFailure::Timeout),
            Ok(Ok(response)) => Ok(response.status().as_u16()),
            Ok(Err(e)) => Err(categorize_error(&e)),
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &Url) -> ProbeOutcome {
        let outcome = probe_with_fallback(self, url).await;
        debug!(%url, ?outcome, "probed");
        outcome
    }
}

fn categorize_error(error: &reqwest::Error) -> TransportFailure {
    if error.is_timeout() {
        TransportFailure::Timeout
    } else {
        TransportFailure::ConnectionError
    }
}
