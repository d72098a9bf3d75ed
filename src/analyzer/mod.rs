//! Page scoring.
//!
//! The batch scheduler only depends on the [`Analyzer`] trait; the
//! [`PageSpeedClient`] implementation talks to PageSpeed Insights.

mod pagespeed;
mod report;

use std::future::Future;

use crate::error_handling::AnalyzeError;

pub use pagespeed::PageSpeedClient;
pub use report::{
    Audit, Categories, CategoryScore, FieldMetric, LighthouseResult, LoadingExperience,
    LoadingMetric, PageSpeedReport,
};

/// Scores a single URL.
pub trait Analyzer: Send + Sync {
    /// Analyzes `url`, authenticating with `credential` (may be empty).
    fn analyze(
        &self,
        url: &str,
        credential: &str,
    ) -> impl Future<Output = Result<PageSpeedReport, AnalyzeError>> + Send;
}
