//! Chunked batch scheduling of analysis calls.
//!
//! URLs are split into consecutive chunks of `concurrency` entries. All calls
//! in a chunk run concurrently on the calling task and the chunk fully settles
//! before the next one starts; the configured delay separates chunks. A
//! failing URL becomes a failed outcome and never aborts the batch.

mod types;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::join_all;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::analyzer::Analyzer;
use crate::discovery::{DiscoveredSitemap, SitemapDiscoverer};
use crate::error_handling::{categorize_analyze_error, AnalyzeError, BatchError, ProcessingStats};
use crate::progress::{ProgressEvent, ProgressSink};

pub use types::{AnalysisOutcome, BatchRequest, BatchResult, BatchSummary, UrlSource};

/// Running totals shared by the calls of a batch.
#[derive(Default)]
struct BatchCounters {
    successful: AtomicUsize,
    failed: AtomicUsize,
    completed: AtomicUsize,
    score_total: Mutex<f64>,
}

impl BatchCounters {
    fn record_success(&self, score: f64) {
        self.successful.fetch_add(1, Ordering::SeqCst);
        *self
            .score_total
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += score;
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one URL as settled and returns the new completed count.
    fn complete_one(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn summary(&self, total_urls: usize) -> BatchSummary {
        let successful = self.successful.load(Ordering::SeqCst);
        let failed = self.failed.load(Ordering::SeqCst);
        let score_total = *self
            .score_total
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        BatchSummary {
            total_urls,
            successful,
            failed,
            average_performance_score: if successful > 0 {
                score_total / successful as f64
            } else {
                0.0
            },
        }
    }
}

/// Runs batches of analysis calls.
///
/// Counters and outcomes live inside each run, so one scheduler can serve any
/// number of sequential or concurrent runs. The failure statistics are the
/// exception: they are cumulative over every run of this scheduler (and of
/// any other holder of the same `Arc`). Give each run a fresh tracker through
/// [`BatchScheduler::with_stats`] when per-run counts are needed.
pub struct BatchScheduler<A: Analyzer> {
    analyzer: A,
    discoverer: SitemapDiscoverer,
    stats: Arc<ProcessingStats>,
}

impl<A: Analyzer> BatchScheduler<A> {
    pub fn new(analyzer: A, discoverer: SitemapDiscoverer) -> Self {
        Self {
            analyzer,
            discoverer,
            stats: Arc::new(ProcessingStats::new()),
        }
    }

    /// Shares a failure statistics tracker with the caller.
    pub fn with_stats(mut self, stats: Arc<ProcessingStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Failure statistics accumulated across all runs so far.
    pub fn stats(&self) -> &Arc<ProcessingStats> {
        &self.stats
    }

    /// Runs a batch to completion.
    ///
    /// # Errors
    ///
    /// - `BatchError::InvalidRequest` before any network call
    /// - `BatchError::Discovery` if discovery was requested and failed
    pub async fn run(
        &self,
        request: &BatchRequest,
        progress: &dyn ProgressSink,
    ) -> Result<BatchResult, BatchError> {
        self.run_with_cancellation(request, progress, CancellationToken::new())
            .await
    }

    /// Runs a batch that stops early when `cancel` fires.
    ///
    /// Cancellation is observed during discovery, while a chunk is in flight
    /// and during inter-chunk delays. A cancelled run returns
    /// `BatchError::Cancelled` and no partial result.
    pub async fn run_with_cancellation(
        &self,
        request: &BatchRequest,
        progress: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Result<BatchResult, BatchError> {
        request.validate()?;

        let (urls, sitemaps) = self.resolve_urls(request, progress, &cancel).await?;
        let total = urls.len();

        progress.publish(ProgressEvent::Started { total });
        if let Some(sitemaps) = &sitemaps {
            progress.publish(ProgressEvent::DiscoveryComplete {
                sitemaps: sitemaps.clone(),
            });
        }

        let counters = BatchCounters::default();
        let mut outcomes = Vec::with_capacity(total);
        let chunk_count = total.div_ceil(request.concurrency);

        for (index, chunk) in urls.chunks(request.concurrency).enumerate() {
            let calls = chunk
                .iter()
                .map(|url| self.analyze_one(url, request, &counters, total, progress));

            let settled = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(BatchError::Cancelled { completed: counters.completed() });
                }
                settled = join_all(calls) => settled,
            };
            outcomes.extend(settled);

            if index + 1 < chunk_count {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(BatchError::Cancelled { completed: counters.completed() });
                    }
                    _ = tokio::time::sleep(request.delay) => {}
                }
            }
        }

        let summary = counters.summary(total);
        info!(
            "Batch finished: {} succeeded, {} failed, average score {:.2}",
            summary.successful, summary.failed, summary.average_performance_score
        );

        Ok(BatchResult {
            outcomes,
            summary,
            sitemaps: sitemaps.unwrap_or_default(),
        })
    }

    async fn resolve_urls(
        &self,
        request: &BatchRequest,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<(Vec<String>, Option<Vec<DiscoveredSitemap>>), BatchError> {
        match &request.source {
            UrlSource::List(urls) => Ok((urls.clone(), None)),
            UrlSource::Discover { base_url, options } => {
                let discovery = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(BatchError::Cancelled { completed: 0 });
                    }
                    result = self.discoverer.discover(base_url, options, progress) => result?,
                };
                Ok((discovery.urls, Some(discovery.sitemaps)))
            }
        }
    }

    /// Analyzes one URL and records its outcome.
    async fn analyze_one(
        &self,
        url: &str,
        request: &BatchRequest,
        counters: &BatchCounters,
        total: usize,
        progress: &dyn ProgressSink,
    ) -> AnalysisOutcome {
        let call = self.analyzer.analyze(url, &request.credential);
        let result = match request.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(AnalyzeError::Timeout(limit))),
            None => call.await,
        };

        let outcome = match result {
            Ok(report) => {
                counters.record_success(report.performance_score());
                AnalysisOutcome::success(url, report)
            }
            Err(e) => {
                warn!("Failed to analyze {url}: {e}");
                self.stats.increment_error(categorize_analyze_error(&e));
                counters.record_failure();
                AnalysisOutcome::failure(url, e.to_string())
            }
        };

        let completed = counters.complete_one();
        progress.publish(ProgressEvent::Progress { completed, total });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_summary_invariants() {
        let counters = BatchCounters::default();
        counters.record_success(0.9);
        counters.complete_one();
        counters.record_failure();
        counters.complete_one();
        counters.record_success(0.5);
        counters.complete_one();

        let summary = counters.summary(3);
        assert_eq!(summary.total_urls, 3);
        assert_eq!(summary.successful + summary.failed, summary.total_urls);
        assert!((summary.average_performance_score - 0.7).abs() < 1e-9);
        assert_eq!(counters.completed(), 3);
    }

    #[test]
    fn test_counters_average_is_zero_without_successes() {
        let counters = BatchCounters::default();
        counters.record_failure();
        counters.complete_one();
        let summary = counters.summary(1);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.average_performance_score, 0.0);
    }
}
