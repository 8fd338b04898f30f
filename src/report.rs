// src/report.rs
// =============================================================================
// What a crawl hands back to its caller.
//
// A LinkFailure is one broken link, recorded once no matter how many pages
// point at it. The page field names the first page it was found on.
// =============================================================================

use crate::checker::{classify, status_code, ProbeOutcome, TransportFailure};
use serde::{Deserialize, Serialize};
use url::Url;

/// What kind of failure a LinkFailure records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The server answered with a non-success status
    Http,
    /// No answer before the probe timeout
    Timeout,
    /// No answer at all (DNS, TLS, refused connection, ...)
    Connection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFailure {
    /// The page the link was found on
    pub page: String,
    /// The failing link target
    pub link: String,
    /// HTTP status, or 0 when no response arrived
    pub status: u16,
    pub kind: FailureKind,
    pub error_message: String,
    pub remediation_hint: String,
}

impl LinkFailure {
    /// Builds the record for a failed probe; None if the probe succeeded
    pub fn from_probe(page: &Url, link: &Url, outcome: &ProbeOutcome) -> Option<Self> {
        let kind = match outcome {
            ProbeOutcome::Ok => return None,
            ProbeOutcome::FailedWithStatus(_) => FailureKind::Http,
            ProbeOutcome::FailedTransport(TransportFailure::Timeout) => FailureKind::Timeout,
            ProbeOutcome::FailedTransport(TransportFailure::ConnectionError) => {
                FailureKind::Connection
            }
        };
        let classification = classify(link, outcome);

        Some(LinkFailure {
            page: page.to_string(),
            link: link.to_string(),
            status: status_code(outcome),
            kind,
            error_message: classification.message,
            remediation_hint: classification.remediation_hint,
        })
    }
}

/// Result of one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub root_url: String,
    pub max_depth: usize,
    pub failures: Vec<LinkFailure>,
    pub pages_rendered: usize,
    pub links_probed: usize,
    /// A page or probe ceiling stopped the crawl early
    pub truncated: bool,
    /// The crawl was cancelled or hit its deadline; results are partial
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn broken_count(&self) -> usize {
        self.failures.len()
    }

    /// One-line outcome for the caller to show; a crawl that finished is a
    /// success whether or not it found broken links
    pub fn summary(&self) -> String {
        match self.broken_count() {
            0 => "no broken links found".to_string(),
            1 => "1 broken link found".to_string(),
            n => format!("{n} broken links found"),
        }
    }
}
