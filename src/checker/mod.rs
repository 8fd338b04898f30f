// src/checker/mod.rs
// =============================================================================
// This module contains the per-link logic of a crawl.
//
// Submodules:
// - normalize: Canonicalizes a raw link and applies the exclusion list
// - http: Probes a link and reports ok / failed status / failed transport
// - classify: Turns a failed probe into a message and a remediation hint
// - html: Extracts anchor targets from a rendered HTML document
//
// None of these touch crawl state; the orchestrator in src/crawl/ decides
// which links reach them.
// =============================================================================

mod classify;
mod html;
mod http;
mod normalize;

pub use classify::{classify, status_code, Classification, NO_RESPONSE_STATUS};
pub use html::extract_anchor_targets;
pub use http::{
    probe_with_fallback, HttpProber, ProbeMethod, ProbeOutcome, ProbeTransport, Prober,
    TransportFailure,
};
pub use normalize::{normalize_link, same_host, Normalized};
