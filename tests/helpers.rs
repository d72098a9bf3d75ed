// Shared test helpers: sitemap bodies, mock responses and a scripted analyzer.
//
// Each integration test file pulls this in with `mod helpers;`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pagespeed_batch::{Analyzer, AnalyzeError, PageSpeedReport};
use tokio::time::Instant;
use wiremock::ResponseTemplate;

/// `<urlset>` document listing `locations`.
pub fn urlset(locations: &[String]) -> String {
    let entries: String = locations
        .iter()
        .map(|loc| format!("  <url><loc>{loc}</loc></url>\n"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</urlset>"
    )
}

/// `<sitemapindex>` document pointing at `children`.
pub fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|loc| format!("  <sitemap><loc>{loc}</loc></sitemap>\n"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</sitemapindex>"
    )
}

/// 200 response carrying an XML body.
pub fn xml_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

/// Absolute URLs under `base` for each path.
pub fn urls(base: &str, paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| format!("{base}{p}")).collect()
}

#[derive(Default)]
struct StubState {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<(String, Instant)>>,
}

/// Analyzer with scripted per-URL results and latency.
///
/// Unscripted URLs succeed with a score of 0.5. Clones share their call log.
#[derive(Clone, Default)]
pub struct StubAnalyzer {
    scores: HashMap<String, f64>,
    failures: HashMap<String, u16>,
    latencies: HashMap<String, Duration>,
    latency: Duration,
    state: Arc<StubState>,
}

impl StubAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, url: &str, score: f64) -> Self {
        self.scores.insert(url.to_string(), score);
        self
    }

    pub fn failing(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    /// Latency applied to every call without its own.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_latency_for(mut self, url: &str, latency: Duration) -> Self {
        self.latencies.insert(url.to_string(), latency);
        self
    }

    /// URLs in the order their calls started.
    pub fn calls(&self) -> Vec<String> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Start time of each call, in call order.
    pub fn call_starts(&self) -> Vec<Instant> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Analyzer for StubAnalyzer {
    async fn analyze(&self, url: &str, _credential: &str) -> Result<PageSpeedReport, AnalyzeError> {
        self.state
            .calls
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self.latencies.get(url).copied().unwrap_or(self.latency);
        tokio::time::sleep(latency).await;
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(status) = self.failures.get(url) {
            return Err(AnalyzeError::HttpStatus(*status));
        }
        let score = self.scores.get(url).copied().unwrap_or(0.5);
        Ok(PageSpeedReport::with_performance_score(score))
    }
}
