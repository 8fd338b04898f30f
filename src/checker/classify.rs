// src/checker/classify.rs
// =============================================================================
// Explains a failed probe to a human.
//
// Each known HTTP status gets its own message and a concrete next step.
// Transport failures (no status at all) are reported with the symbolic
// status 0. Anything not in the table falls through to a generic message
// that asks for manual triage.
// =============================================================================

use super::http::{ProbeOutcome, TransportFailure};
use url::Url;

/// Status reported for failures that never produced an HTTP status
pub const NO_RESPONSE_STATUS: u16 = 0;

/// Human-readable explanation of a probe outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub message: String,
    pub remediation_hint: String,
}

impl Classification {
    fn new(message: String, remediation_hint: &str) -> Self {
        Classification {
            message,
            remediation_hint: remediation_hint.to_string(),
        }
    }
}

/// Numeric status for a report row: the HTTP status, or 0 for transport
/// failures
pub fn status_code(outcome: &ProbeOutcome) -> u16 {
    match outcome {
        ProbeOutcome::FailedWithStatus(status) => *status,
        ProbeOutcome::Ok | ProbeOutcome::FailedTransport(_) => NO_RESPONSE_STATUS,
    }
}

pub fn classify(url: &Url, outcome: &ProbeOutcome) -> Classification {
    match outcome {
        ProbeOutcome::Ok => Classification::new(format!("{url} is reachable"), "No action needed."),
        ProbeOutcome::FailedWithStatus(status) => classify_status(url, *status),
        ProbeOutcome::FailedTransport(failure) => classify_transport(url, *failure),
    }
}

fn classify_status(url: &Url, status: u16) -> Classification {
    match status {
        400 => Classification::new(
            format!("Bad request: the server could not understand {url}"),
            "Check the link for malformed query parameters or encoding and fix the URL.",
        ),
        401 => Classification::new(
            format!("{url} requires authentication"),
            "Remove the link from public pages or put it behind a login-aware gate.",
        ),
        403 => Classification::new(
            format!("Access to {url} is forbidden"),
            "Check the target's permissions, firewall or bot-protection rules.",
        ),
        404 => Classification::new(
            format!("{url} was not found"),
            "Restore the page, add a redirect to its replacement, or remove the link.",
        ),
        408 => Classification::new(
            format!("The server hosting {url} timed out waiting for the request"),
            "Check the origin server's load and response times.",
        ),
        500 => Classification::new(
            format!("The server hit an internal error while serving {url}"),
            "Retry later; if it persists, investigate the origin server's logs.",
        ),
        NO_RESPONSE_STATUS => classify_transport(url, TransportFailure::ConnectionError),
        other => Classification::new(
            format!("Unhandled HTTP status {other} for {url}"),
            "Review this link manually to decide whether it is broken.",
        ),
    }
}

fn classify_transport(url: &Url, failure: TransportFailure) -> Classification {
    let hint = "Check that the domain resolves (DNS), its SSL certificate is valid, \
                and the server is up.";
    match failure {
        TransportFailure::Timeout => {
            Classification::new(format!("No response from {url} before the timeout"), hint)
        }
        TransportFailure::ConnectionError => {
            Classification::new(format!("Could not connect to {url}"), hint)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/x").unwrap()
    }

    #[test]
    fn test_known_statuses_have_message_and_hint() {
        for status in [404, 403, 500, 400, 401, 408, 0] {
            let c = classify(&url(), &ProbeOutcome::FailedWithStatus(status));
            assert!(!c.message.is_empty(), "empty message for {status}");
            assert!(!c.remediation_hint.is_empty(), "empty hint for {status}");
        }
    }

    #[test]
    fn test_known_statuses_are_distinct() {
        let messages: std::collections::HashSet<_> = [404, 403, 500, 400, 401, 408]
            .into_iter()
            .map(|s| classify(&url(), &ProbeOutcome::FailedWithStatus(s)).remediation_hint)
            .collect();
        assert_eq!(messages.len(), 6);
    }

    #[test]
    fn test_unmapped_status_uses_fallback() {
        let c = classify(&url(), &ProbeOutcome::FailedWithStatus(418));
        assert!(c.message.contains("Unhandled HTTP status 418"));
        assert!(c.remediation_hint.contains("manually"));
    }

    #[test]
    fn test_transport_failures() {
        let timeout = classify(&url(), &ProbeOutcome::FailedTransport(TransportFailure::Timeout));
        assert!(timeout.message.contains("timeout"));
        assert!(timeout.remediation_hint.contains("DNS"));

        let refused = classify(
            &url(),
            &ProbeOutcome::FailedTransport(TransportFailure::ConnectionError),
        );
        assert!(refused.message.contains("Could not connect"));
    }

    #[test]
    fn test_status_code_for_transport_is_zero() {
        assert_eq!(
            status_code(&ProbeOutcome::FailedTransport(TransportFailure::Timeout)),
            0
        );
        assert_eq!(status_code(&ProbeOutcome::FailedWithStatus(404)), 404);
    }
}
