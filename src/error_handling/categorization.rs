//! Error categorization and retry strategy.
//!
//! This module maps analysis failures onto `ErrorType` categories and decides
//! which of them are worth another attempt.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{AnalyzeError, ErrorType};
use crate::config::HTTP_STATUS_TOO_MANY_REQUESTS;

/// Creates an exponential backoff retry strategy.
///
/// Yields one delay per retry, so `attempts` total attempts produce
/// `attempts - 1` delays. Delays start at `base_ms * RETRY_FACTOR` and are
/// capped at `RETRY_MAX_DELAY_SECS`.
pub fn get_retry_strategy(base_ms: u64, attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(base_ms)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(attempts.saturating_sub(1))
}

/// Categorizes a `reqwest::Error` that happened below the HTTP status layer.
fn categorize_network_error(error: &reqwest::Error) -> ErrorType {
    if error.is_timeout() {
        ErrorType::NetworkTimeout
    } else if error.is_connect() {
        ErrorType::NetworkConnect
    } else if error.is_decode() {
        ErrorType::ReportDecode
    } else {
        ErrorType::NetworkOther
    }
}

/// Categorizes an HTTP status returned by the scoring service.
fn categorize_status(status: u16) -> ErrorType {
    match status {
        400 => ErrorType::HttpBadRequest,
        403 => ErrorType::HttpForbidden,
        404 => ErrorType::HttpNotFound,
        HTTP_STATUS_TOO_MANY_REQUESTS => ErrorType::HttpTooManyRequests,
        500..=599 => ErrorType::HttpServerError,
        _ => ErrorType::HttpOtherStatus,
    }
}

/// Categorizes an `AnalyzeError` into an `ErrorType`.
pub fn categorize_analyze_error(error: &AnalyzeError) -> ErrorType {
    match error {
        AnalyzeError::InvalidUrl(_) => ErrorType::InvalidUrl,
        AnalyzeError::Network(e) => categorize_network_error(e),
        AnalyzeError::HttpStatus(status) => categorize_status(*status),
        AnalyzeError::Decode(_) => ErrorType::ReportDecode,
        AnalyzeError::Timeout(_) => ErrorType::AnalysisTimeout,
    }
}

/// Determines if an analysis error is transient.
///
/// Rate limiting (429), server errors (5xx), and timeouts or connection
/// failures are retried. Client errors, decode failures and invalid URLs are
/// permanent.
pub(crate) fn is_retriable_error(error: &AnalyzeError) -> bool {
    match error {
        AnalyzeError::HttpStatus(status) => {
            *status == HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(status)
        }
        AnalyzeError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        AnalyzeError::Timeout(_) => true,
        AnalyzeError::InvalidUrl(_) | AnalyzeError::Decode(_) => false,
    }
}
