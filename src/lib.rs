// src/lib.rs
// =============================================================================
// link-warden as a library: crawl a site from its root URL, render each
// same-host page in a headless browser, probe every link once, and return the
// broken ones with an explanation and a suggested fix.
//
//   let config = CrawlConfig::default();
//   let renderer = Arc::new(ChromeRenderer::launch(&config).await?);
//   let prober = Arc::new(HttpProber::new(&config)?);
//   let crawler = Crawler::new(renderer, prober, config);
//   let report = crawler.crawl(&CrawlRequest::new("https://example.com/", 1)).await?;
//   println!("{}", report.summary());
// =============================================================================

pub mod checker;
pub mod config;
pub mod crawl;
pub mod error;
pub mod render;
pub mod report;
pub mod service;

pub use config::{CrawlConfig, ExclusionList};
pub use crawl::{CrawlRequest, Crawler};
pub use error::CrawlError;
pub use report::{CrawlReport, FailureKind, LinkFailure};
