// src/error.rs
// =============================================================================
// Errors that stop a crawl before (or while) it can produce a report.
//
// Broken links are NOT errors here: a 404 or a timeout on a link is data and
// ends up in the report as a LinkFailure. A page that fails to render is
// logged and skipped. Only the cases below are propagated to the caller.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The root URL could not be parsed as an absolute URL
    #[error("invalid root URL '{url}': {reason}")]
    InvalidRootUrl { url: String, reason: String },

    /// The root URL parsed, but it has no host to compare links against
    #[error("root URL has no host: {0}")]
    MissingHost(String),

    /// The rendering engine could not be started or stopped responding
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// The probe HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),

    /// A site identifier did not resolve to a root URL
    #[error("no root URL found for site '{0}'")]
    SiteNotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The report could not be handed to the storage collaborator
    #[error("failed to store report: {0}")]
    Persistence(String),
}
