//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use extractdl_core::DEFAULT_CONCURRENCY;
use extractdl_core::config::DEFAULT_TARGET_LANG;

/// Download manga chapters and media metadata from supported sites.
///
/// Extractdl resolves a URL with the named extractor and writes the resource
/// tree (chapter directories, page images, metadata sidecars) to disk.
#[derive(Parser, Debug)]
#[command(name = "extractdl")]
#[command(author, version, about)]
pub struct Args {
    /// Extractor to use (e.g. mangadex, youtube)
    #[arg(required_unless_present = "list_extractors")]
    pub extractor: Option<String>,

    /// URL of the resource to download
    #[arg(required_unless_present = "list_extractors")]
    pub url: Option<String>,

    /// Directory the resource tree is written under
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Maximum concurrent child downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Delay before each request in milliseconds (0 to disable, max 60000)
    #[arg(short = 'd', long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_ms: u64,

    /// Language code of the manga chapters to download
    #[arg(short, long, default_value = DEFAULT_TARGET_LANG)]
    pub lang: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the registered extractors and exit
    #[arg(long)]
    pub list_extractors: bool,
}
