//! Progress events published by discovery and the batch scheduler.
//!
//! Producers publish through a [`ProgressSink`]; publishing never blocks and
//! never fails, so a missing or slow consumer cannot change the outcome of a
//! run.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use tokio::sync::mpsc::UnboundedSender;

use crate::discovery::DiscoveredSitemap;

/// One progress notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The final URL count is known and scheduling is about to begin.
    Started { total: usize },
    /// One more URL has settled, successfully or not.
    Progress { completed: usize, total: usize },
    /// Human-readable status message.
    Log(String),
    /// Discovery finished; emitted before scheduling starts.
    DiscoveryComplete { sitemaps: Vec<DiscoveredSitemap> },
}

/// Receiver of progress events.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn publish(&self, _event: ProgressEvent) {}
}

/// Sink that forwards events into an unbounded channel.
///
/// A closed receiver is ignored.
impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn publish(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

/// Sink that hands every event to a closure.
pub struct FnProgress<F>(pub F);

impl<F> ProgressSink for FnProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn publish(&self, event: ProgressEvent) {
        (self.0)(event)
    }
}

/// Sink that writes events to the log.
///
/// Per-URL progress is reported every `every` completions and on the last one.
pub struct LogProgress {
    every: usize,
    start_time: std::time::Instant,
    last_logged: AtomicUsize,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            start_time: std::time::Instant::now(),
            last_logged: AtomicUsize::new(0),
        }
    }
}

impl ProgressSink for LogProgress {
    fn publish(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                info!("Analyzing {} URL{}", total, if total == 1 { "" } else { "s" });
            }
            ProgressEvent::Progress { completed, total } => {
                if completed % self.every != 0 && completed != total {
                    return;
                }
                // Progress events can arrive out of order within a chunk
                if self.last_logged.fetch_max(completed, Ordering::SeqCst) >= completed {
                    return;
                }
                let elapsed_secs = self.start_time.elapsed().as_secs_f64();
                let rate = if elapsed_secs > 0.0 {
                    completed as f64 / elapsed_secs
                } else {
                    0.0
                };
                info!(
                    "Analyzed {}/{} URLs in {:.1} seconds (~{:.2} URLs/sec)",
                    completed, total, elapsed_secs, rate
                );
            }
            ProgressEvent::Log(message) => info!("{message}"),
            ProgressEvent::DiscoveryComplete { sitemaps } => {
                for sitemap in &sitemaps {
                    info!("  {} ({} URLs)", sitemap.location, sitemap.url_count);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_sink_receives_events() {
        let seen = Mutex::new(Vec::new());
        let sink = FnProgress(|event: ProgressEvent| seen.lock().unwrap().push(event));
        sink.publish(ProgressEvent::Started { total: 2 });
        sink.publish(ProgressEvent::Log("hello".to_string()));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ProgressEvent::Started { total: 2 },
                ProgressEvent::Log("hello".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_and_tolerates_closed_receiver() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.publish(ProgressEvent::Progress {
            completed: 1,
            total: 3,
        });
        assert_eq!(
            rx.recv().await,
            Some(ProgressEvent::Progress {
                completed: 1,
                total: 3
            })
        );

        drop(rx);
        tx.publish(ProgressEvent::Log("dropped".to_string()));
    }

    #[test]
    fn test_log_progress_handles_all_events() {
        let sink = LogProgress::new(2);
        sink.publish(ProgressEvent::Started { total: 3 });
        sink.publish(ProgressEvent::Progress {
            completed: 1,
            total: 3,
        });
        sink.publish(ProgressEvent::Progress {
            completed: 3,
            total: 3,
        });
        sink.publish(ProgressEvent::Progress {
            completed: 2,
            total: 3,
        });
        assert_eq!(sink.last_logged.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_shared_dyn_sink() {
        let sink: Arc<dyn ProgressSink> = Arc::new(NoopProgress);
        sink.publish(ProgressEvent::Started { total: 0 });
    }
}
