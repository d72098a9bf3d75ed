//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{ArgGroup, Parser, ValueEnum};

use crate::config::constants::{
    API_KEY_ENV, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS,
    DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Device profile Lighthouse emulates when scoring a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    /// Value of the `strategy` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

/// Command-line options and library configuration.
///
/// Exactly one URL source is expected: an input file (`-` for stdin) or a
/// site to discover through its sitemaps.
///
/// # Examples
///
/// ```bash
/// # Score every page listed in the site's sitemap
/// pagespeed_batch --site https://example.com
///
/// # Score a fixed list, two calls at a time, 3s between chunks
/// pagespeed_batch urls.txt --concurrency 2 --delay-ms 3000
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pagespeed_batch",
    about = "Scores a batch of pages with PageSpeed Insights.",
    group(ArgGroup::new("source").required(true).args(["file", "site"]))
)]
pub struct Config {
    /// File with one URL per line (`-` reads stdin)
    #[arg(value_parser)]
    pub file: Option<PathBuf>,

    /// Discover pages from this site's robots.txt and sitemaps
    #[arg(long)]
    pub site: Option<String>,

    /// Sitemap path to probe instead of the built-in list (repeatable)
    #[arg(long = "sitemap-path")]
    pub sitemap_paths: Vec<String>,

    /// Stop discovery after this many pages (at least 1)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_urls: Option<usize>,

    /// PageSpeed Insights API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Number of analysis calls issued together
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Pause between chunks in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CALL_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Total attempts per URL for transient API failures (1 disables retries)
    #[arg(long, default_value_t = 1)]
    pub attempts: usize,

    /// Device profile: mobile|desktop
    #[arg(long, value_enum, default_value_t = Strategy::Mobile)]
    pub strategy: Strategy,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Write outcomes as JSON Lines to this file (`-` writes to stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Only discover and print URLs, do not analyze them
    #[arg(long)]
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: None,
            site: None,
            sitemap_paths: Vec::new(),
            max_urls: None,
            api_key: None,
            concurrency: DEFAULT_CONCURRENCY,
            delay_ms: DEFAULT_DELAY_MS,
            timeout_seconds: DEFAULT_CALL_TIMEOUT_SECS,
            attempts: 1,
            strategy: Strategy::Mobile,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            output: None,
            dry_run: false,
        }
    }
}
