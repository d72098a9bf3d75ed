//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including endpoint locations, timeouts, and discovery limits.

use std::time::Duration;

/// PageSpeed Insights v5 endpoint.
pub const PAGESPEED_API_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Environment variable holding the PageSpeed API key.
pub const API_KEY_ENV: &str = "PAGESPEED_API_KEY";

/// Default number of analysis calls issued per chunk.
pub const DEFAULT_CONCURRENCY: usize = 3;
/// Default pause between chunks in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 1000;
/// Default per-call timeout in seconds.
///
/// A Lighthouse run regularly takes 20-40s on the service side.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;
/// Timeout for robots.txt and sitemap requests.
pub const DISCOVERY_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent sent with discovery requests and API calls.
pub const DEFAULT_USER_AGENT: &str = concat!("pagespeed_batch/", env!("CARGO_PKG_VERSION"));

/// Conventional sitemap locations probed when robots.txt declares none.
///
/// Order matters: discovery stops at the first path that yields pages.
pub const DEFAULT_SITEMAP_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemap/sitemap.xml",
    "/sitemaps/sitemap.xml",
    // CMS variants (WordPress core, Yoast, RankMath, WooCommerce)
    "/wp-sitemap.xml",
    "/post-sitemap.xml",
    "/page-sitemap.xml",
    "/product-sitemap.xml",
    "/category-sitemap.xml",
    // Compressed and legacy
    "/sitemap.xml.gz",
    "/sitemap_index.xml.gz",
    "/sitemap.txt",
    "/sitemap.php",
];

/// Log a progress line every this many analyzed URLs.
pub const PROGRESS_LOG_INTERVAL: usize = 10;

/// Maximum nesting of sitemap indexes followed below a candidate.
pub const MAX_SITEMAP_DEPTH: usize = 3;

/// Maximum URL length accepted from input files.
pub const MAX_URL_LENGTH: usize = 2048;

// Retry strategy for analysis calls
/// Base delay in milliseconds for the exponential backoff
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
