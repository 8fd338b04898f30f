// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Everything a crawl can be tuned with lives in CrawlConfig: timeouts,
// concurrency limits, crawl ceilings and the exclusion list. Every field has
// a default, so a JSON config file only needs the fields it wants to change:
//
//   {
//     "probe_timeout_secs": 5,
//     "max_pages": 50,
//     "exclusions": { "domains": ["calendly.com"] }
//   }
//
// Rust concepts:
// - #[serde(default)]: missing fields fall back to the Default impl
// - Duration: typed time spans instead of raw integers
// =============================================================================

use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Links that are never worth probing.
///
/// `schemes` are matched as prefixes of the raw href (`mailto:`, `tel:`).
/// `domains` are matched against the link's host on a label boundary, so
/// `x.com` excludes `x.com` and `mobile.x.com` but not `box.com`. An entry
/// with a path (`google.com/maps`) additionally requires the URL path to
/// start with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionList {
    pub schemes: Vec<String>,
    pub domains: Vec<String>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        let schemes = ["mailto:", "tel:", "sms:"];
        let domains = [
            // social networks
            "facebook.com",
            "fb.com",
            "instagram.com",
            "twitter.com",
            "x.com",
            "linkedin.com",
            "youtube.com",
            "youtu.be",
            "tiktok.com",
            "pinterest.com",
            "snapchat.com",
            // messaging
            "whatsapp.com",
            "wa.me",
            "t.me",
            "telegram.me",
            "m.me",
            // maps
            "maps.google.com",
            "google.com/maps",
            "goo.gl/maps",
            "maps.app.goo.gl",
            "maps.apple.com",
        ];

        ExclusionList {
            schemes: schemes.iter().map(|s| s.to_string()).collect(),
            domains: domains.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExclusionList {
    /// An exclusion list that excludes nothing
    pub fn empty() -> Self {
        ExclusionList {
            schemes: Vec::new(),
            domains: Vec::new(),
        }
    }

    /// True if the raw href starts with an excluded scheme (case-insensitive)
    pub fn excludes_scheme(&self, raw: &str) -> bool {
        let raw = raw.trim_start().to_ascii_lowercase();
        self.schemes
            .iter()
            .any(|scheme| raw.starts_with(&scheme.to_ascii_lowercase()))
    }

    /// True if the URL's host (and path, for entries with one) matches an
    /// excluded domain
    pub fn excludes_domain(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let target = format!("{}{}", host, url.path().to_ascii_lowercase());

        self.domains.iter().any(|entry| {
            let entry = entry.trim().to_ascii_lowercase();
            if entry.is_empty() {
                return false;
            }
            let entry_host = entry.split('/').next().unwrap_or(&entry);

            let on_boundary = host == entry_host || host.ends_with(&format!(".{entry_host}"));
            if !on_boundary {
                return false;
            }

            // Where the matched host suffix starts inside `target`
            let start = host.len() - entry_host.len();
            target[start..].starts_with(&entry)
        })
    }
}

/// Tuning knobs for one crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Hard timeout for a single liveness probe
    pub probe_timeout_secs: u64,
    /// Hard timeout for rendering a single page
    pub render_timeout_secs: u64,
    /// Pause after the load event so late scripts can inject links
    pub render_settle_ms: u64,
    /// How many probes may be in flight at once
    pub probe_concurrency: usize,
    /// How many pages (browser tabs) may render at once
    pub render_concurrency: usize,
    /// Ceiling on rendered pages per crawl
    pub max_pages: usize,
    /// Ceiling on distinct links probed per crawl
    pub max_probes: usize,
    /// Optional deadline for the whole crawl
    pub crawl_timeout_secs: Option<u64>,
    /// Redirects a probe follows before giving up
    pub max_redirects: usize,
    pub user_agent: String,
    pub exclusions: ExclusionList,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            probe_timeout_secs: 10,
            render_timeout_secs: 30,
            render_settle_ms: 500,
            probe_concurrency: 16,
            render_concurrency: 2,
            max_pages: 100,
            max_probes: 1000,
            crawl_timeout_secs: None,
            max_redirects: 5,
            user_agent: format!("link-warden/{}", env!("CARGO_PKG_VERSION")),
            exclusions: ExclusionList::default(),
        }
    }
}

impl CrawlConfig {
    /// Loads a config from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, CrawlError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CrawlError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CrawlError> {
        let config: CrawlConfig =
            serde_json::from_str(text).map_err(|e| CrawlError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or disable a crawl
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.probe_timeout_secs == 0 || self.render_timeout_secs == 0 {
            return Err(CrawlError::Config("timeouts must be at least 1 second".into()));
        }
        if self.probe_concurrency == 0 || self.render_concurrency == 0 {
            return Err(CrawlError::Config("concurrency must be at least 1".into()));
        }
        if self.max_pages == 0 {
            return Err(CrawlError::Config("max_pages must be at least 1".into()));
        }
        if self.crawl_timeout_secs == Some(0) {
            return Err(CrawlError::Config("crawl timeout must be at least 1 second".into()));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn crawl_timeout(&self) -> Option<Duration> {
        self.crawl_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_excludes_social_domains() {
        let list = ExclusionList::default();
        assert!(list.excludes_domain(&url("https://facebook.com/x")));
        assert!(list.excludes_domain(&url("https://www.facebook.com/acme")));
        assert!(list.excludes_domain(&url("https://x.com/acme")));
        assert!(list.excludes_domain(&url("https://wa.me/15551234")));
    }

    #[test]
    fn test_domain_match_respects_label_boundary() {
        let list = ExclusionList::default();
        assert!(!list.excludes_domain(&url("https://box.com/files")));
        assert!(!list.excludes_domain(&url("https://notfacebook.com/")));
        assert!(!list.excludes_domain(&url("https://example.com/")));
    }

    #[test]
    fn test_domain_entry_with_path() {
        let list = ExclusionList::default();
        assert!(list.excludes_domain(&url("https://www.google.com/maps/place/Somewhere")));
        assert!(!list.excludes_domain(&url("https://www.google.com/search?q=rust")));
    }

    #[test]
    fn test_excludes_scheme_case_insensitive() {
        let list = ExclusionList::default();
        assert!(list.excludes_scheme("mailto:hi@example.com"));
        assert!(list.excludes_scheme("TEL:+15551234"));
        assert!(!list.excludes_scheme("https://example.com"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CrawlConfig::from_json(r#"{ "probe_timeout_secs": 3 }"#).unwrap();
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
        assert_eq!(config.render_timeout(), Duration::from_secs(30));
        assert_eq!(config.exclusions, ExclusionList::default());
    }

    #[test]
    fn test_custom_exclusions_replace_defaults() {
        let config =
            CrawlConfig::from_json(r#"{ "exclusions": { "domains": ["calendly.com"] } }"#)
                .unwrap();
        assert!(config.exclusions.excludes_domain(&url("https://calendly.com/me")));
        assert!(!config.exclusions.excludes_domain(&url("https://facebook.com/")));
        // schemes were not given, so they keep their defaults
        assert!(config.exclusions.excludes_scheme("mailto:a@b.c"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = CrawlConfig {
            probe_concurrency: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::Config(_))));
    }
}
