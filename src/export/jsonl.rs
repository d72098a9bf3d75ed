//! JSONL export of batch results.
//!
//! Each analyzed URL becomes one line; the last line carries the batch
//! summary and the sitemaps discovery used. The format pipes cleanly into
//! `jq` or a document store.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use super::IgnoreBrokenPipe;
use crate::batch::{AnalysisOutcome, BatchResult};

/// JSON object for one analyzed URL.
pub fn outcome_record(outcome: &AnalysisOutcome) -> Value {
    match &outcome.result {
        Ok(report) => json!({
            "type": "result",
            "url": outcome.url,
            "success": true,
            "final_url": report
                .lighthouse_result
                .as_ref()
                .and_then(|lh| lh.final_url.clone()),
            "performance_score": report.performance_score(),
            "loading_metrics": report.loading_metrics(),
            "error": Value::Null,
        }),
        Err(message) => json!({
            "type": "result",
            "url": outcome.url,
            "success": false,
            "final_url": Value::Null,
            "performance_score": Value::Null,
            "loading_metrics": [],
            "error": message,
        }),
    }
}

/// JSON object for the batch summary.
pub fn summary_record(result: &BatchResult) -> Value {
    json!({
        "type": "summary",
        "total_urls": result.summary.total_urls,
        "successful": result.summary.successful,
        "failed": result.summary.failed,
        "average_performance_score": result.summary.average_performance_score,
        "sitemaps": result.sitemaps,
    })
}

/// Writes `result` to `writer` as JSON Lines.
///
/// Returns the number of lines written, summary included.
pub fn write_jsonl<W: Write>(mut writer: W, result: &BatchResult) -> Result<usize> {
    let mut lines = 0;
    for outcome in &result.outcomes {
        serde_json::to_writer(&mut writer, &outcome_record(outcome))?;
        writeln!(writer)?;
        lines += 1;
    }
    serde_json::to_writer(&mut writer, &summary_record(result))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(lines + 1)
}

/// Exports `result` to `output`, or to stdout when `output` is `None`.
///
/// Records are rendered in memory first; the file write goes through
/// `tokio::fs` and the stdout write runs on the blocking pool.
pub async fn export_jsonl(result: &BatchResult, output: Option<&Path>) -> Result<usize> {
    let mut buffer = Vec::new();
    let lines = write_jsonl(&mut buffer, result)?;

    match output {
        Some(path) => tokio::fs::write(path, &buffer)
            .await
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => tokio::task::spawn_blocking(move || {
            let mut stdout = IgnoreBrokenPipe::new(io::stdout().lock());
            stdout.write_all(&buffer)?;
            stdout.flush()
        })
        .await
        .context("Stdout writer task failed")?
        .context("Failed to write to stdout")?,
    }

    Ok(lines)
}
