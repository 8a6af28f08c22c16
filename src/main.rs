//! CLI entry point for the extractdl tool.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use extractdl_core::{ExtractorConfig, build_default_registry};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = ExtractorConfig {
        request_delay: Duration::from_millis(args.delay_ms),
        concurrency: usize::from(args.concurrency),
        target_lang: args.lang.clone(),
        ..ExtractorConfig::default()
    };
    let registry = build_default_registry(&config)?;

    if args.list_extractors {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let (Some(extractor), Some(url)) = (args.extractor.as_deref(), args.url.as_deref()) else {
        bail!("an extractor name and a URL are required");
    };

    info!(extractor, url, output = %args.output.display(), "Extractdl starting");

    let report = registry
        .download(extractor, url, &args.output)
        .await
        .with_context(|| format!("failed to download {url}"))?;

    info!(
        files = report.files().len(),
        failures = report.failures().len(),
        "Download complete"
    );

    if !report.is_clean() {
        bail!(
            "{} of {} downloads failed",
            report.failures().len(),
            report.files().len() + report.failures().len()
        );
    }

    Ok(())
}
