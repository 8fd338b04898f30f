// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap's "derive" API lets us define the CLI structure with Rust structs and
// attributes (the #[...] things). Flags that mirror a CrawlConfig field are
// Options: when given they override the config file, otherwise the file (or
// the default) wins.
// =============================================================================

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-warden",
    version,
    about = "Find broken links on a website, including links added by JavaScript",
    long_about = "link-warden renders a website's pages in headless Chrome, collects every link \
                  (also the ones scripts add at runtime), checks each one once, and explains \
                  what is broken and how to fix it."
)]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides this)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and report its broken links
    ///
    /// Example: link-warden site https://example.com --max-depth 1
    Site(SiteArgs),
}

#[derive(clap::Args, Debug)]
pub struct SiteArgs {
    /// Root URL to crawl, or a site identifier when --sites is given
    pub target: String,

    /// How many link hops to follow from the root page
    ///
    /// 0 = check only the root page's own links
    /// 1 = also render the same-host pages it links to and check their links
    #[arg(long, default_value_t = 0)]
    pub max_depth: usize,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// How pages are loaded
    #[arg(long, value_enum, default_value_t = RendererKind::Chrome)]
    pub renderer: RendererKind,

    /// JSON config file (see CrawlConfig for the fields)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON file mapping site identifiers to root URLs
    #[arg(long)]
    pub sites: Option<PathBuf>,

    /// Also write the broken links to this JSON file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Key stored alongside the report in --output (defaults to TARGET)
    #[arg(long, requires = "output")]
    pub key: Option<String>,

    /// Extra domain to never probe (repeatable)
    #[arg(long = "exclude-domain", value_name = "DOMAIN")]
    pub exclude_domains: Vec<String>,

    /// Seconds before a single link probe gives up
    #[arg(long, value_name = "SECS")]
    pub probe_timeout: Option<u64>,

    /// Seconds before rendering a single page gives up
    #[arg(long, value_name = "SECS")]
    pub render_timeout: Option<u64>,

    /// Links probed at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Stop after rendering this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Stop after probing this many distinct links
    #[arg(long)]
    pub max_probes: Option<usize>,

    /// Seconds before the whole crawl stops and reports what it found
    #[arg(long, value_name = "SECS")]
    pub crawl_timeout: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererKind {
    /// Headless Chrome/Chromium; runs the page's scripts
    Chrome,
    /// Plain HTTP fetch; no scripts, for machines without a browser
    Static,
}
