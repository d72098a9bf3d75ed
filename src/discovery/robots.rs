//! robots.txt sitemap hints.

use log::{debug, warn};
use reqwest::header::ACCEPT;
use url::Url;

use crate::config::HTTP_STATUS_NOT_FOUND;

/// Reads `Sitemap:` directives from a site's robots.txt.
#[derive(Clone)]
pub struct RobotsResolver {
    client: reqwest::Client,
}

impl RobotsResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns the sitemap locations declared in `{origin}/robots.txt`.
    ///
    /// Never fails: a missing file, an error status or a transport failure
    /// all yield an empty list.
    pub async fn sitemap_locations(&self, base: &Url) -> Vec<String> {
        let robots_url = match base.join("/robots.txt") {
            Ok(url) => url,
            Err(e) => {
                debug!("Cannot build robots.txt location for {base}: {e}");
                return Vec::new();
            }
        };

        let response = match self
            .client
            .get(robots_url.clone())
            .header(ACCEPT, "text/plain")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Unable to access robots.txt at {robots_url}: {e}");
                return Vec::new();
            }
        };

        let status = response.status();
        if status.as_u16() == HTTP_STATUS_NOT_FOUND {
            debug!("No robots.txt at {robots_url}");
            return Vec::new();
        }
        if !status.is_success() {
            warn!("Unable to access robots.txt at {robots_url} ({status})");
            return Vec::new();
        }

        match response.text().await {
            Ok(text) => parse_sitemap_directives(&text, base),
            Err(e) => {
                warn!("Failed to read robots.txt at {robots_url}: {e}");
                Vec::new()
            }
        }
    }
}

/// Extracts `Sitemap:` directive values, in file order and without duplicates.
///
/// Values must be absolute http(s) URLs or root-relative paths, which are
/// resolved against `base`. Anything else is skipped.
pub fn parse_sitemap_directives(text: &str, base: &Url) -> Vec<String> {
    let mut locations: Vec<String> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        let Some(prefix) = trimmed.get(..8) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case("sitemap:") {
            continue;
        }
        let value = trimmed[8..].trim();
        let Some(location) = resolve_location(value, base) else {
            debug!("Skipping malformed sitemap directive: {trimmed}");
            continue;
        };
        if !locations.contains(&location) {
            locations.push(location);
        }
    }
    locations
}

fn resolve_location(value: &str, base: &Url) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) if value.starts_with('/') => {
            base.join(value).ok()?
        }
        Err(_) => return None,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
