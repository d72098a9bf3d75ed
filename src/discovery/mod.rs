//! Sitemap-based URL discovery.
//!
//! Candidate sitemaps come from robots.txt when it declares any, otherwise
//! from a fixed list of conventional paths. Candidates are probed in order and
//! discovery stops at the first one that yields pages, so a site's first
//! working sitemap is treated as authoritative.

mod robots;
mod sitemap;

use std::collections::{HashSet, VecDeque};

use log::debug;
use serde::Serialize;
use url::Url;

use crate::config::{DEFAULT_SITEMAP_PATHS, MAX_SITEMAP_DEPTH};
use crate::error_handling::{DiscoveryError, FetchError};
use crate::progress::{ProgressEvent, ProgressSink};

pub use robots::{parse_sitemap_directives, RobotsResolver};
pub use sitemap::{
    classify, extract_child_sitemap_locations, extract_page_locations, SitemapDocument,
    SitemapReader,
};

/// A sitemap that contributed page URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredSitemap {
    pub location: String,
    /// Number of page locations the sitemap listed, duplicates included.
    pub url_count: usize,
}

/// Output of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryResult {
    /// Deduplicated page URLs in first-seen order.
    pub urls: Vec<String>,
    pub sitemaps: Vec<DiscoveredSitemap>,
}

/// Tuning knobs for discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Fallback paths to probe instead of `DEFAULT_SITEMAP_PATHS`.
    pub paths: Option<Vec<String>>,
    /// Stop collecting once this many unique URLs are known.
    pub max_urls: Option<usize>,
}

/// Deduplicating URL accumulator.
struct Accumulator {
    urls: Vec<String>,
    seen: HashSet<String>,
    sitemaps: Vec<DiscoveredSitemap>,
    max_urls: Option<usize>,
}

impl Accumulator {
    fn new(max_urls: Option<usize>) -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
            sitemaps: Vec::new(),
            max_urls,
        }
    }

    fn is_full(&self) -> bool {
        self.max_urls.is_some_and(|max| self.urls.len() >= max)
    }

    fn add_sitemap(&mut self, location: &str, pages: Vec<String>) {
        self.sitemaps.push(DiscoveredSitemap {
            location: location.to_string(),
            url_count: pages.len(),
        });
        for page in pages {
            if self.is_full() {
                break;
            }
            if self.seen.insert(page.clone()) {
                self.urls.push(page);
            }
        }
    }

    fn into_result(self) -> DiscoveryResult {
        DiscoveryResult {
            urls: self.urls,
            sitemaps: self.sitemaps,
        }
    }
}

/// Resolves `loc` values against the sitemap that listed them, keeping
/// http(s) URLs only.
fn resolve_locations(sitemap_url: &Url, locations: Vec<String>) -> Vec<String> {
    locations
        .into_iter()
        .filter_map(|loc| match sitemap_url.join(&loc) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
            _ => {
                debug!("Skipping unusable sitemap location {loc:?} in {sitemap_url}");
                None
            }
        })
        .collect()
}

fn report(progress: &dyn ProgressSink, message: String) {
    debug!("{message}");
    progress.publish(ProgressEvent::Log(message));
}

/// Discovers a site's page URLs from its sitemaps.
pub struct SitemapDiscoverer {
    robots: RobotsResolver,
    reader: SitemapReader,
}

impl SitemapDiscoverer {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            robots: RobotsResolver::new(client.clone()),
            reader: SitemapReader::new(client),
        }
    }

    /// Builds the ordered candidate list for `base`.
    ///
    /// robots.txt locations take precedence; the fallback paths are used only
    /// when robots.txt declares none.
    pub async fn candidates(
        &self,
        base: &Url,
        options: &DiscoveryOptions,
        progress: &dyn ProgressSink,
    ) -> Vec<String> {
        let declared = self.robots.sitemap_locations(base).await;
        if !declared.is_empty() {
            report(
                progress,
                format!("Found {} sitemap(s) in robots.txt", declared.len()),
            );
            return declared;
        }

        report(
            progress,
            "No sitemaps declared in robots.txt, trying common paths".to_string(),
        );
        let mut candidates: Vec<String> = Vec::new();
        let paths: Vec<&str> = match &options.paths {
            Some(paths) if !paths.is_empty() => paths.iter().map(String::as_str).collect(),
            _ => DEFAULT_SITEMAP_PATHS.to_vec(),
        };
        for path in paths {
            match base.join(path) {
                Ok(url) => {
                    let location = url.to_string();
                    if !candidates.contains(&location) {
                        candidates.push(location);
                    }
                }
                Err(e) => debug!("Skipping sitemap path {path:?}: {e}"),
            }
        }
        candidates
    }

    /// Discovers page URLs for the site at `base_url`.
    ///
    /// # Errors
    ///
    /// - `DiscoveryError::InvalidBaseUrl` if `base_url` is not an absolute
    ///   http(s) URL
    /// - `DiscoveryError::NoSitemapFound` if no candidate yields a page; it
    ///   carries the last fetch error seen
    pub async fn discover(
        &self,
        base_url: &str,
        options: &DiscoveryOptions,
        progress: &dyn ProgressSink,
    ) -> Result<DiscoveryResult, DiscoveryError> {
        let base = Url::parse(base_url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| DiscoveryError::InvalidBaseUrl(base_url.to_string()))?;

        let candidates = self.candidates(&base, options, progress).await;
        let mut acc = Accumulator::new(options.max_urls);
        let mut visited: HashSet<String> = HashSet::new();
        let mut last_error: Option<FetchError> = None;

        for candidate in candidates {
            if !visited.insert(candidate.clone()) {
                continue;
            }
            report(progress, format!("Checking {candidate}"));
            self.visit_candidate(&candidate, &mut acc, &mut visited, &mut last_error, progress)
                .await;

            if !acc.urls.is_empty() {
                break;
            }
        }

        if acc.urls.is_empty() {
            return Err(DiscoveryError::NoSitemapFound { last_error });
        }

        report(
            progress,
            format!(
                "Discovered {} unique URL(s) from {} sitemap(s)",
                acc.urls.len(),
                acc.sitemaps.len()
            ),
        );
        Ok(acc.into_result())
    }

    /// Processes one candidate and every sitemap below it, breadth first.
    async fn visit_candidate(
        &self,
        candidate: &str,
        acc: &mut Accumulator,
        visited: &mut HashSet<String>,
        last_error: &mut Option<FetchError>,
        progress: &dyn ProgressSink,
    ) {
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(candidate.to_string(), 0)]);

        while let Some((location, depth)) = queue.pop_front() {
            if acc.is_full() {
                break;
            }

            let document = match self.reader.fetch_and_classify(&location).await {
                Ok(document) => document,
                Err(e) => {
                    report(progress, format!("Skipping {location}: {e}"));
                    *last_error = Some(e);
                    continue;
                }
            };

            // `location` came from a parsed URL or a resolved join
            let Ok(sitemap_url) = Url::parse(&location) else {
                continue;
            };

            match document {
                SitemapDocument::Index(children) => {
                    let children = resolve_locations(&sitemap_url, children);
                    report(
                        progress,
                        format!(
                            "Sitemap index found at {location} with {} children",
                            children.len()
                        ),
                    );
                    if depth >= MAX_SITEMAP_DEPTH {
                        report(
                            progress,
                            format!("Not following {location}: nested too deeply"),
                        );
                        continue;
                    }
                    for child in children {
                        if visited.insert(child.clone()) {
                            queue.push_back((child, depth + 1));
                        }
                    }
                }
                SitemapDocument::UrlSet(pages) => {
                    let pages = resolve_locations(&sitemap_url, pages);
                    report(progress, format!("Loaded {location}: {} URL(s)", pages.len()));
                    if !pages.is_empty() {
                        acc.add_sitemap(&location, pages);
                    }
                }
                SitemapDocument::Empty => {
                    report(progress, format!("No URLs found in {location}"));
                }
            }
        }
    }
}
