//! pagespeed_batch library: sitemap discovery and bulk PageSpeed scoring
//!
//! Finds a site's pages through robots.txt and its sitemaps (or takes an
//! explicit URL list) and scores every page with the PageSpeed Insights API,
//! a few calls at a time with a pause between rounds.
//!
//! # Example
//!
//! ```no_run
//! use pagespeed_batch::analyzer::PageSpeedClient;
//! use pagespeed_batch::batch::{BatchRequest, BatchScheduler};
//! use pagespeed_batch::discovery::SitemapDiscoverer;
//! use pagespeed_batch::progress::LogProgress;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//! let scheduler = BatchScheduler::new(
//!     PageSpeedClient::new(client.clone()),
//!     SitemapDiscoverer::new(client),
//! );
//!
//! let request = BatchRequest::discover("https://example.com", "my-api-key")
//!     .with_concurrency(2);
//! let result = scheduler.run(&request, &LogProgress::new(10)).await?;
//! println!(
//!     "{} of {} pages scored, average {:.2}",
//!     result.summary.successful,
//!     result.summary.total_urls,
//!     result.summary.average_performance_score
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! A Tokio runtime is required; all network operations are async.

pub mod analyzer;
pub mod app;
pub mod batch;
pub mod config;
pub mod discovery;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod progress;

// Re-export public API
pub use analyzer::{Analyzer, PageSpeedClient, PageSpeedReport};
pub use batch::{AnalysisOutcome, BatchRequest, BatchResult, BatchScheduler, BatchSummary};
pub use config::{Config, LogFormat, LogLevel, Strategy};
pub use discovery::{DiscoveredSitemap, DiscoveryResult, SitemapDiscoverer};
pub use error_handling::{AnalyzeError, BatchError, DiscoveryError, FetchError};
pub use progress::{ProgressEvent, ProgressSink};
pub use run::{build_request, discover_urls, run_batch, RunReport};

// Wiring from a `Config` to a finished batch
mod run {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{bail, Context, Result};
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::analyzer::PageSpeedClient;
    use crate::app::{print_batch_statistics, read_url_list, validate_and_normalize_url};
    use crate::batch::{BatchRequest, BatchResult, BatchScheduler};
    use crate::config::{Config, PROGRESS_LOG_INTERVAL, RETRY_INITIAL_DELAY_MS};
    use crate::discovery::{DiscoveryOptions, DiscoveryResult, SitemapDiscoverer};
    use crate::error_handling::ProcessingStats;
    use crate::export::export_jsonl;
    use crate::initialization::init_clients;
    use crate::progress::LogProgress;

    /// Results of a batch run started from a `Config`.
    #[derive(Debug)]
    pub struct RunReport {
        pub result: BatchResult,
        /// Failure counts by error type
        pub stats: Arc<ProcessingStats>,
        pub elapsed_seconds: f64,
    }

    fn discovery_options(config: &Config) -> DiscoveryOptions {
        DiscoveryOptions {
            paths: (!config.sitemap_paths.is_empty()).then(|| config.sitemap_paths.clone()),
            max_urls: config.max_urls,
        }
    }

    /// Normalizes `--site` the same way listed URLs are.
    fn normalized_site(site: &str) -> Result<String> {
        validate_and_normalize_url(site).with_context(|| format!("Invalid site URL: {site}"))
    }

    /// Export destination for `--output`; `-` means stdout.
    fn export_target(output: &Path) -> Option<&Path> {
        (output != Path::new("-")).then_some(output)
    }

    /// Turns `config` into a batch request, reading the URL file if one is
    /// given.
    ///
    /// # Errors
    ///
    /// Fails if neither or both sources are set, or the URL file is unreadable.
    pub async fn build_request(config: &Config) -> Result<BatchRequest> {
        let credential = config.api_key.clone().unwrap_or_default();
        let request = match (&config.file, &config.site) {
            (Some(path), None) => {
                let urls = read_url_list(path).await?;
                BatchRequest::from_urls(urls, credential)
            }
            (None, Some(site)) => BatchRequest::discover(normalized_site(site)?, credential)
                .with_discovery_options(discovery_options(config)),
            (Some(_), Some(_)) => bail!("Give either an input file or --site, not both"),
            (None, None) => bail!("No URL source: give an input file or --site"),
        };

        Ok(request
            .with_concurrency(config.concurrency)
            .with_delay(Duration::from_millis(config.delay_ms))
            .with_call_timeout(Duration::from_secs(config.timeout_seconds.max(1))))
    }

    /// Runs discovery only, for `--dry-run`.
    ///
    /// # Errors
    ///
    /// Fails if `config` has no site or discovery finds no sitemap.
    pub async fn discover_urls(config: &Config) -> Result<DiscoveryResult> {
        let Some(site) = &config.site else {
            bail!("--dry-run needs --site");
        };
        let site = normalized_site(site)?;
        let clients = init_clients(config).context("Failed to initialize HTTP clients")?;
        let discoverer = SitemapDiscoverer::new(clients.discovery);
        let progress = LogProgress::new(PROGRESS_LOG_INTERVAL);
        let result = discoverer
            .discover(&site, &discovery_options(config), &progress)
            .await
            .with_context(|| format!("Sitemap discovery failed for {site}"))?;
        Ok(result)
    }

    /// Runs a full batch described by `config`.
    ///
    /// Writes the JSONL export when `config.output` is set and logs the final
    /// statistics. `cancel` stops the run early.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, discovery failure, cancellation, or
    /// when the export file cannot be written. Individual URL failures are
    /// not errors.
    pub async fn run_batch(config: Config, cancel: CancellationToken) -> Result<RunReport> {
        let clients = init_clients(&config).context("Failed to initialize HTTP clients")?;
        let request = build_request(&config).await?;

        if config.api_key.as_deref().unwrap_or_default().is_empty() {
            info!("No API key set; requests share the anonymous PageSpeed quota");
        }

        let analyzer = PageSpeedClient::new(clients.analysis)
            .with_strategy(config.strategy)
            .with_retries(config.attempts, RETRY_INITIAL_DELAY_MS);
        let stats = Arc::new(ProcessingStats::new());
        let scheduler = BatchScheduler::new(analyzer, SitemapDiscoverer::new(clients.discovery))
            .with_stats(Arc::clone(&stats));

        let start_time = Instant::now();
        let progress = LogProgress::new(PROGRESS_LOG_INTERVAL);
        let result = scheduler
            .run_with_cancellation(&request, &progress, cancel)
            .await
            .context("Batch run failed")?;
        let elapsed_seconds = start_time.elapsed().as_secs_f64();

        if let Some(output) = &config.output {
            let target = export_target(output);
            let lines = export_jsonl(&result, target).await?;
            match target {
                Some(path) => info!("Wrote {lines} JSONL records to {}", path.display()),
                None => info!("Wrote {lines} JSONL records to stdout"),
            }
        }

        print_batch_statistics(&result, &stats, elapsed_seconds);

        Ok(RunReport {
            result,
            stats,
            elapsed_seconds,
        })
    }

}
