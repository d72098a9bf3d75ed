//! Final statistics printout.

use log::info;

use crate::batch::BatchResult;
use crate::error_handling::ProcessingStats;

/// Logs failure counts per error type, skipping zero counts.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let total = stats.total_errors();
    if total == 0 {
        return;
    }
    info!("Error Counts ({total} total):");
    for (error_type, count) in stats.nonzero_errors() {
        info!("   {}: {count}", error_type.as_str());
    }
}

/// Logs the one-line batch summary followed by the error breakdown.
pub fn print_batch_statistics(result: &BatchResult, stats: &ProcessingStats, elapsed_seconds: f64) {
    let summary = &result.summary;
    if !result.sitemaps.is_empty() {
        info!("URLs came from {} sitemap(s)", result.sitemaps.len());
    }
    print_error_statistics(stats);
    info!(
        "✅ Analyzed {} URL{} ({} succeeded, {} failed) in {:.1}s, average performance score {:.2}",
        summary.total_urls,
        if summary.total_urls == 1 { "" } else { "s" },
        summary.successful,
        summary.failed,
        elapsed_seconds,
        summary.average_performance_score
    );
}
