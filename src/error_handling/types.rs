//! Error type definitions.
//!
//! This module defines the error enums returned by discovery, analysis and the
//! batch scheduler, plus the `ErrorType` categories used for statistics.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Failure to retrieve a robots.txt or sitemap resource.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The location could not be parsed as a URL.
    #[error("Invalid location {0}")]
    InvalidUrl(String),

    /// Network-level failure (DNS, connect, TLS, body read).
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: ReqwestError,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// The declared content type is neither XML nor text.
    #[error("Unexpected content type {content_type:?} at {url}")]
    ContentType { url: String, content_type: String },
}

/// Fatal discovery failures.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The site location is not an absolute http(s) URL.
    #[error("Invalid site URL {0}")]
    InvalidBaseUrl(String),

    /// Every candidate was tried and none yielded a page.
    #[error("No valid sitemap found{}", last_error_suffix(.last_error))]
    NoSitemapFound {
        #[source]
        last_error: Option<FetchError>,
    },
}

fn last_error_suffix(last_error: &Option<FetchError>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(" (last error: {e})"))
        .unwrap_or_default()
}

/// Failure of a single analysis call.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The page or endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network-level failure talking to the scoring service.
    #[error("Network error: {0}")]
    Network(#[source] ReqwestError),

    /// The scoring service answered with a non-success status.
    #[error("HTTP error status: {0}")]
    HttpStatus(u16),

    /// The response body was not a valid report.
    #[error("Invalid report: {0}")]
    Decode(String),

    /// The call did not settle within the configured timeout.
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors that abort a whole batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The request was rejected before any network call.
    #[error("Invalid batch request: {0}")]
    InvalidRequest(String),

    /// URL discovery failed; no outcomes were produced.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The run was cancelled by the caller.
    #[error("Batch cancelled after {completed} URL(s)")]
    Cancelled { completed: usize },
}

/// Categories of per-URL analysis failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    InvalidUrl,
    HttpBadRequest,       // 400
    HttpForbidden,        // 403, usually an API key problem
    HttpNotFound,         // 404
    HttpTooManyRequests,  // 429, quota exhausted
    HttpServerError,      // 5xx
    HttpOtherStatus,
    NetworkTimeout,
    NetworkConnect,
    NetworkOther,
    ReportDecode,
    AnalysisTimeout,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidUrl => "Invalid URL",
            ErrorType::HttpBadRequest => "Bad Request (400)",
            ErrorType::HttpForbidden => "Forbidden (403)",
            ErrorType::HttpNotFound => "Not Found (404)",
            ErrorType::HttpTooManyRequests => "Too many requests (429)",
            ErrorType::HttpServerError => "Server error (5xx)",
            ErrorType::HttpOtherStatus => "Other HTTP status",
            ErrorType::NetworkTimeout => "Network timeout",
            ErrorType::NetworkConnect => "Connection error",
            ErrorType::NetworkOther => "Network error",
            ErrorType::ReportDecode => "Report decode error",
            ErrorType::AnalysisTimeout => "Analysis timeout",
        }
    }
}
