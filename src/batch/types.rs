//! Batch request, outcome and summary types.

use std::time::Duration;

use serde::Serialize;

use crate::analyzer::PageSpeedReport;
use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS};
use crate::discovery::{DiscoveredSitemap, DiscoveryOptions};
use crate::error_handling::BatchError;

/// Where the URLs of a batch come from.
#[derive(Debug, Clone)]
pub enum UrlSource {
    /// Analyze exactly these URLs, in this order.
    List(Vec<String>),
    /// Discover URLs from the site's sitemaps first.
    Discover {
        base_url: String,
        options: DiscoveryOptions,
    },
}

/// Input to a batch run. Immutable for the duration of the run.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub source: UrlSource,
    /// API key handed to the analyzer; may be empty.
    pub credential: String,
    /// Calls issued together per chunk; must be at least 1.
    pub concurrency: usize,
    /// Pause between consecutive chunks.
    pub delay: Duration,
    /// Upper bound for each analysis call; `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
}

impl BatchRequest {
    fn with_source(source: UrlSource, credential: impl Into<String>) -> Self {
        Self {
            source,
            credential: credential.into(),
            concurrency: DEFAULT_CONCURRENCY,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            call_timeout: None,
        }
    }

    /// Batch over an explicit URL list.
    pub fn from_urls(urls: Vec<String>, credential: impl Into<String>) -> Self {
        Self::with_source(UrlSource::List(urls), credential)
    }

    /// Batch over the URLs discovered for `base_url`.
    pub fn discover(base_url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self::with_source(
            UrlSource::Discover {
                base_url: base_url.into(),
                options: DiscoveryOptions::default(),
            },
            credential,
        )
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Replaces the discovery options; no effect on list sources.
    pub fn with_discovery_options(mut self, new_options: DiscoveryOptions) -> Self {
        if let UrlSource::Discover { options, .. } = &mut self.source {
            *options = new_options;
        }
        self
    }

    /// Rejects requests that cannot be scheduled.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.concurrency == 0 {
            return Err(BatchError::InvalidRequest(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.call_timeout.is_some_and(|t| t.is_zero()) {
            return Err(BatchError::InvalidRequest(
                "call timeout must be greater than zero".to_string(),
            ));
        }
        if let UrlSource::Discover { base_url, options } = &self.source {
            if base_url.trim().is_empty() {
                return Err(BatchError::InvalidRequest(
                    "discovery requires a site URL".to_string(),
                ));
            }
            if options.max_urls == Some(0) {
                return Err(BatchError::InvalidRequest(
                    "max URLs must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Result of analyzing one URL.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub url: String,
    /// The report, or the failure message.
    pub result: Result<PageSpeedReport, String>,
}

impl AnalysisOutcome {
    pub fn success(url: impl Into<String>, report: PageSpeedReport) -> Self {
        Self {
            url: url.into(),
            result: Ok(report),
        }
    }

    pub fn failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            result: Err(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn report(&self) -> Option<&PageSpeedReport> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_urls: usize,
    pub successful: usize,
    pub failed: usize,
    /// Mean performance score over successes; `0.0` when there are none.
    pub average_performance_score: f64,
}

/// Output of a completed batch run.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// One entry per URL, in input order.
    pub outcomes: Vec<AnalysisOutcome>,
    pub summary: BatchSummary,
    /// Sitemaps that contributed URLs; empty for list sources.
    pub sitemaps: Vec<DiscoveredSitemap>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = BatchRequest::from_urls(vec!["https://x.test/".to_string()], "key");
        assert_eq!(request.concurrency, 3);
        assert_eq!(request.delay, Duration::from_millis(1000));
        assert!(request.call_timeout.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let request = BatchRequest::from_urls(vec![], "").with_concurrency(0);
        assert!(matches!(
            request.validate(),
            Err(BatchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let request =
            BatchRequest::from_urls(vec![], "").with_call_timeout(Duration::from_secs(0));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_discovery_requires_site() {
        assert!(BatchRequest::discover("  ", "").validate().is_err());
        assert!(BatchRequest::discover("https://x.test", "")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_zero_max_urls_is_rejected() {
        let request = BatchRequest::discover("https://x.test", "").with_discovery_options(
            DiscoveryOptions {
                paths: None,
                max_urls: Some(0),
            },
        );
        assert!(matches!(
            request.validate(),
            Err(BatchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_discovery_options_apply_only_to_discovery() {
        let options = DiscoveryOptions {
            paths: Some(vec!["/custom.xml".to_string()]),
            max_urls: Some(5),
        };
        let request = BatchRequest::discover("https://x.test", "").with_discovery_options(options);
        match request.source {
            UrlSource::Discover { options, .. } => assert_eq!(options.max_urls, Some(5)),
            UrlSource::List(_) => panic!("source should stay a discovery"),
        }
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = AnalysisOutcome::success("https://x.test/a", PageSpeedReport::default());
        assert!(ok.is_success());
        assert!(ok.report().is_some());
        assert!(ok.error().is_none());

        let err = AnalysisOutcome::failure("https://x.test/b", "HTTP error status: 500");
        assert!(!err.is_success());
        assert_eq!(err.error(), Some("HTTP error status: 500"));
    }
}
