//! Command-line entry point.
//!
//! Parses arguments, loads `.env`, sets up logging and hands the run to the
//! library. Ctrl-C cancels the batch.

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use pagespeed_batch::app::cancel_on_ctrl_c;
use pagespeed_batch::initialization::init_logger_with;
use pagespeed_batch::{discover_urls, run_batch, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the key can come from the environment or --api-key
    let _ = dotenvy::dotenv();

    let config = Config::parse();
    init_logger_with(config.log_level.into(), config.log_format)
        .context("Failed to initialize logger")?;

    if config.dry_run {
        return match discover_urls(&config).await {
            Ok(discovery) => {
                for url in &discovery.urls {
                    println!("{url}");
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("pagespeed_batch error: {e:#}");
                process::exit(1);
            }
        };
    }

    let cancel = CancellationToken::new();
    let signal_task = cancel_on_ctrl_c(cancel.clone());
    let outcome = run_batch(config, cancel).await;
    signal_task.abort();

    match outcome {
        Ok(report) => {
            let summary = &report.result.summary;
            println!(
                "Analyzed {} URL{} ({} succeeded, {} failed), average performance score {:.2}",
                summary.total_urls,
                if summary.total_urls == 1 { "" } else { "s" },
                summary.successful,
                summary.failed,
                summary.average_performance_score
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("pagespeed_batch error: {e:#}");
            process::exit(1);
        }
    }
}
