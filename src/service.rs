// src/service.rs
// =============================================================================
// The seams between the crawler and the services around it.
//
// - SiteResolver: turns a site identifier into the root URL to crawl
// - ReportSink: stores the finished list of failures under a caller key
// - Audit: resolve -> crawl -> store, the sequence a service handler runs
//
// The file-backed implementations here (SiteDirectory, JsonFileSink) are what
// the CLI uses; a hosted service plugs in its own lookups and storage.
// =============================================================================

use crate::crawl::{CrawlRequest, Crawler};
use crate::error::CrawlError;
use crate::report::{CrawlReport, LinkFailure};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub trait SiteResolver: Send + Sync {
    /// Root URL for the site, or None if the identifier is unknown
    fn resolve(&self, site_id: &str) -> Option<String>;
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn store(&self, key: &str, failures: &[LinkFailure], total: usize)
        -> Result<(), CrawlError>;
}

/// Site identifiers mapped to root URLs, e.g. loaded from
/// `{ "acme": "https://acme.example/" }`
#[derive(Debug, Clone, Default)]
pub struct SiteDirectory {
    sites: HashMap<String, String>,
}

impl SiteDirectory {
    pub fn new(sites: HashMap<String, String>) -> Self {
        SiteDirectory { sites }
    }

    pub fn from_file(path: &Path) -> Result<Self, CrawlError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CrawlError::Config(format!("reading {}: {}", path.display(), e)))?;
        let sites = serde_json::from_str(&text)
            .map_err(|e| CrawlError::Config(format!("parsing {}: {}", path.display(), e)))?;
        Ok(SiteDirectory::new(sites))
    }
}

impl SiteResolver for SiteDirectory {
    fn resolve(&self, site_id: &str) -> Option<String> {
        self.sites.get(site_id).cloned()
    }
}

// What JsonFileSink writes
#[derive(Serialize)]
struct StoredReport<'a> {
    key: &'a str,
    total_broken: usize,
    broken_links: &'a [LinkFailure],
}

/// Writes each stored report to a JSON file (overwriting it)
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSink { path: path.into() }
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    async fn store(
        &self,
        key: &str,
        failures: &[LinkFailure],
        total: usize,
    ) -> Result<(), CrawlError> {
        let stored = StoredReport {
            key,
            total_broken: total,
            broken_links: failures,
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| CrawlError::Persistence(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| CrawlError::Persistence(format!("{}: {}", self.path.display(), e)))
    }
}

/// One audit: optional lookup, the crawl, optional storage
pub struct Audit<'a> {
    pub crawler: &'a Crawler,
    /// When set, targets are site identifiers; otherwise they are root URLs
    pub resolver: Option<&'a dyn SiteResolver>,
    pub sink: Option<&'a dyn ReportSink>,
}

impl Audit<'_> {
    // Parameters:
    //   target: a root URL, or a site identifier when a resolver is set
    //   max_depth: passed through to the crawl
    //   key: what the report is stored under (defaults to the target)
    pub async fn run(
        &self,
        target: &str,
        max_depth: usize,
        key: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let root_url = match self.resolver {
            Some(resolver) => resolver
                .resolve(target)
                .ok_or_else(|| CrawlError::SiteNotFound(target.to_string()))?,
            None => target.to_string(),
        };

        let request = CrawlRequest::new(root_url, max_depth);
        let report = self.crawler.crawl_with_cancel(&request, cancel).await?;

        if let Some(sink) = self.sink {
            let key = key.unwrap_or(target);
            sink.store(key, &report.failures, report.broken_count()).await?;
            info!(key, "report stored");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{ProbeOutcome, Prober};
    use crate::config::CrawlConfig;
    use crate::render::{RenderError, Renderer};
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};
    use url::Url;

    struct OnePageSite;

    #[async_trait]
    impl Renderer for OnePageSite {
        async fn render_and_extract_links(&self, _url: &Url) -> Result<BTreeSet<String>, RenderError> {
            Ok(["https://acme.example/missing".to_string()].into_iter().collect())
        }
    }

    struct AllMissing;

    #[async_trait]
    impl Prober for AllMissing {
        async fn probe(&self, _url: &Url) -> ProbeOutcome {
            ProbeOutcome::FailedWithStatus(404)
        }
    }

    #[derive(Default)]
    struct MemorySink {
        stored: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl ReportSink for MemorySink {
        async fn store(
            &self,
            key: &str,
            _failures: &[LinkFailure],
            total: usize,
        ) -> Result<(), CrawlError> {
            self.stored.lock().unwrap().push((key.to_string(), total));
            Ok(())
        }
    }

    fn crawler() -> Crawler {
        Crawler::new(Arc::new(OnePageSite), Arc::new(AllMissing), CrawlConfig::default())
    }

    fn directory() -> SiteDirectory {
        SiteDirectory::new(HashMap::from([(
            "acme".to_string(),
            "https://acme.example/".to_string(),
        )]))
    }

    #[tokio::test]
    async fn test_audit_resolves_crawls_and_stores() {
        let crawler = crawler();
        let directory = directory();
        let sink = MemorySink::default();
        let audit = Audit {
            crawler: &crawler,
            resolver: Some(&directory),
            sink: Some(&sink),
        };

        let report = audit
            .run("acme", 0, Some("job-7"), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.root_url, "https://acme.example/");
        assert_eq!(report.summary(), "1 broken link found");
        assert_eq!(*sink.stored.lock().unwrap(), vec![("job-7".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_unknown_site_is_fatal() {
        let crawler = crawler();
        let directory = directory();
        let audit = Audit {
            crawler: &crawler,
            resolver: Some(&directory),
            sink: None,
        };

        let result = audit.run("nobody", 0, None, CancellationToken::new()).await;
        assert!(matches!(result, Err(CrawlError::SiteNotFound(id)) if id == "nobody"));
    }

    #[tokio::test]
    async fn test_without_resolver_target_is_the_url() {
        let crawler = crawler();
        let audit = Audit {
            crawler: &crawler,
            resolver: None,
            sink: None,
        };

        let report = audit
            .run("https://acme.example/", 0, None, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_json_file_sink_writes_report() {
        let path = std::env::temp_dir().join(format!("link-warden-sink-{}.json", std::process::id()));
        let sink = JsonFileSink::new(&path);
        let failure = LinkFailure::from_probe(
            &Url::parse("https://acme.example/").unwrap(),
            &Url::parse("https://acme.example/missing").unwrap(),
            &ProbeOutcome::FailedWithStatus(404),
        )
        .unwrap();

        sink.store("acme", &[failure], 1).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(written["key"], "acme");
        assert_eq!(written["total_broken"], 1);
        assert_eq!(written["broken_links"][0]["status"], 404);
    }
}
