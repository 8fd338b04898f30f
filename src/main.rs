// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so --json output stays clean)
// 3. Build the crawl config, renderer and prober, then run the audit
// 4. Print the broken links and exit with a proper code
//    (0 = no broken links, 1 = broken links found, 2 = error)
//
// The crawling itself lives in the library (src/lib.rs); this file only
// wires it to the terminal.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, RendererKind, SiteArgs};
use link_warden::checker::HttpProber;
use link_warden::render::{ChromeRenderer, Renderer, StaticRenderer};
use link_warden::service::{Audit, JsonFileSink, ReportSink, SiteDirectory, SiteResolver};
use link_warden::{CrawlConfig, CrawlReport, Crawler, LinkFailure};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "link_warden=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Site(args) => handle_site_scan(args).await,
    }
}

// Handles the 'site' subcommand
async fn handle_site_scan(args: SiteArgs) -> Result<i32> {
    let config = build_config(&args)?;
    let prober = Arc::new(HttpProber::new(&config)?);

    if !args.json {
        println!("🔍 Scanning: {}", args.target);
        println!("📊 Max crawl depth: {}", args.max_depth);
    }

    let report = match args.renderer {
        RendererKind::Chrome => {
            let renderer = Arc::new(
                ChromeRenderer::launch(&config)
                    .await
                    .context("could not start headless Chrome (try --renderer static)")?,
            );
            let result = audit(renderer.clone(), prober, config, &args).await;

            // The crawler is gone by now, so this is the last reference
            if let Ok(mut renderer) = Arc::try_unwrap(renderer) {
                renderer.shutdown().await;
            }
            result?
        }
        RendererKind::Static => {
            let renderer = Arc::new(StaticRenderer::new(&config)?);
            audit(renderer, prober, config, &args).await?
        }
    };

    print_results(&report, args.json)?;

    if report.broken_count() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

async fn audit(
    renderer: Arc<dyn Renderer>,
    prober: Arc<HttpProber>,
    config: CrawlConfig,
    args: &SiteArgs,
) -> Result<CrawlReport> {
    let crawler = Crawler::new(renderer, prober, config);

    let directory = match &args.sites {
        Some(path) => Some(SiteDirectory::from_file(path)?),
        None => None,
    };
    let sink = args.output.as_ref().map(JsonFileSink::new);

    let audit = Audit {
        crawler: &crawler,
        resolver: directory.as_ref().map(|d| d as &dyn SiteResolver),
        sink: sink.as_ref().map(|s| s as &dyn ReportSink),
    };

    // Ctrl-C stops the crawl; whatever was found so far is still reported
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("⏹️  Interrupted, finishing with partial results...");
            on_interrupt.cancel();
        }
    });

    let report = audit
        .run(&args.target, args.max_depth, args.key.as_deref(), cancel)
        .await
        .with_context(|| format!("crawl of '{}' failed", args.target));
    interrupt_task.abort();

    Ok(report?)
}

// Config file (or defaults), then CLI overrides on top
fn build_config(args: &SiteArgs) -> Result<CrawlConfig> {
    let mut config = match &args.config {
        Some(path) => CrawlConfig::from_file(path)?,
        None => CrawlConfig::default(),
    };

    if let Some(secs) = args.probe_timeout {
        config.probe_timeout_secs = secs;
    }
    if let Some(secs) = args.render_timeout {
        config.render_timeout_secs = secs;
    }
    if let Some(n) = args.concurrency {
        config.probe_concurrency = n;
    }
    if let Some(n) = args.max_pages {
        config.max_pages = n;
    }
    if let Some(n) = args.max_probes {
        config.max_probes = n;
    }
    if let Some(secs) = args.crawl_timeout {
        config.crawl_timeout_secs = Some(secs);
    }
    config
        .exclusions
        .domains
        .extend(args.exclude_domains.iter().cloned());

    config.validate()?;
    Ok(config)
}

// Prints the report either as a table or JSON
fn print_results(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints broken links as a human-readable table in the terminal
fn print_table(report: &CrawlReport) {
    println!();

    if !report.failures.is_empty() {
        println!("{:<60} {:<8} {:<40}", "LINK", "STATUS", "FOUND ON");
        println!("{}", "=".repeat(110));

        for failure in &report.failures {
            println!(
                "{:<60} {:<8} {:<40}",
                truncate(&failure.link, 57),
                format_status(failure),
                truncate(&failure.page, 37)
            );
            println!("   ❌ {}", failure.error_message);
            println!("   💡 {}", failure.remediation_hint);
        }
        println!();
    }

    println!("📊 Summary: {}", report.summary());
    println!("   📄 Pages rendered: {}", report.pages_rendered);
    println!("   🌐 Links checked: {}", report.links_probed);
    println!("   ❌ Broken: {}", report.broken_count());
    if report.truncated {
        println!("   ⚠️  Stopped at the page/probe limit; raise --max-pages or --max-probes");
    }
    if report.cancelled {
        println!("   ⏹️  Crawl stopped early; results are partial");
    }
}

fn format_status(failure: &LinkFailure) -> String {
    match failure.kind {
        link_warden::FailureKind::Http => failure.status.to_string(),
        link_warden::FailureKind::Timeout => "TIMEOUT".to_string(),
        link_warden::FailureKind::Connection => "NO CONN".to_string(),
    }
}

// Shortens long URLs for display, on a char boundary
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
