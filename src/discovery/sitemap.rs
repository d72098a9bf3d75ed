//! Sitemap retrieval and classification.
//!
//! Extraction is pattern based rather than a full XML parse: a namespace
//! prefix is accepted on every element, attributes are ignored, and truncated
//! or otherwise malformed documents still yield every `<loc>` pair that is
//! syntactically complete.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;

use crate::error_handling::FetchError;

/// Optional XML namespace prefix, e.g. `sm:` or `ns0:`.
const NS: &str = r"(?:[A-Za-z_][\w.\-]*:)?";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("sitemap pattern is valid")
}

/// Opening and closing tags of one kind of sitemap entry.
struct EntryPattern {
    open: Regex,
    close: Regex,
}

impl EntryPattern {
    fn new(element: &str) -> Self {
        Self {
            open: compile(&format!(r"<{NS}{element}(?:\s[^>]*)?>")),
            close: compile(&format!(r"</{NS}{element}\s*>")),
        }
    }

    /// Content of each entry, up to its closing tag or the next entry's
    /// opening tag, whichever comes first.
    fn bodies<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.open
            .find_iter(text)
            .map(|open| {
                let rest = &text[open.end()..];
                let end = [self.open.find(rest), self.close.find(rest)]
                    .into_iter()
                    .flatten()
                    .map(|m| m.start())
                    .min()
                    .unwrap_or(rest.len());
                &rest[..end]
            })
            .collect()
    }
}

static URL_ENTRY: LazyLock<EntryPattern> = LazyLock::new(|| EntryPattern::new("url"));
static SITEMAP_ENTRY: LazyLock<EntryPattern> = LazyLock::new(|| EntryPattern::new("sitemap"));

static LOC: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"<{NS}loc(?:\s[^>]*)?>\s*(?:<!\[CDATA\[(?s:(.*?))\]\]>|([^<]*))\s*</{NS}loc\s*>"
    ))
});

/// Image extension blocks, whose `<image:loc>` is not the entry's location.
static IMAGE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"<{NS}image(?:\s[^>]*)?>(?s:.*?)</{NS}image\s*>"))
});

/// What a retrieved sitemap resource turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapDocument {
    /// Points at child sitemaps.
    Index(Vec<String>),
    /// Lists page locations directly.
    UrlSet(Vec<String>),
    /// Neither kind of entry was found.
    Empty,
}

fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn extract_locations(entry: &EntryPattern, text: &str) -> Vec<String> {
    entry
        .bodies(text)
        .into_iter()
        .filter_map(|body| {
            let body = IMAGE_BLOCK.replace_all(body, "");
            LOC.captures(&body)
                .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
                .map(|m| unescape_xml(m.as_str().trim()))
        })
        .filter(|loc| !loc.is_empty())
        .collect()
}

/// Extracts page locations from `<url><loc>…</loc></url>` entries.
pub fn extract_page_locations(text: &str) -> Vec<String> {
    extract_locations(&URL_ENTRY, text)
}

/// Extracts child sitemap locations from `<sitemap><loc>…</loc></sitemap>` entries.
pub fn extract_child_sitemap_locations(text: &str) -> Vec<String> {
    extract_locations(&SITEMAP_ENTRY, text)
}

/// Extracts page locations from a plain-text sitemap (one URL per line).
fn extract_plain_text_locations(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            Url::parse(line)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false)
        })
        .map(str::to_string)
        .collect()
}

/// Classifies a sitemap body.
///
/// Index entries win over URL entries. A body without any markup is read as
/// a plain-text sitemap.
pub fn classify(text: &str) -> SitemapDocument {
    let children = extract_child_sitemap_locations(text);
    if !children.is_empty() {
        return SitemapDocument::Index(children);
    }
    let pages = if text.contains('<') {
        extract_page_locations(text)
    } else {
        extract_plain_text_locations(text)
    };
    if pages.is_empty() {
        SitemapDocument::Empty
    } else {
        SitemapDocument::UrlSet(pages)
    }
}

/// Whether a declared content type can carry a sitemap.
fn is_sitemap_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("xml") || lower.contains("text")
}

/// Retrieves sitemap resources over HTTP.
#[derive(Clone)]
pub struct SitemapReader {
    client: reqwest::Client,
}

impl SitemapReader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetches one sitemap resource and returns its body.
    ///
    /// # Errors
    ///
    /// - `FetchError::Transport` on network failure
    /// - `FetchError::HttpStatus` on a non-success response
    /// - `FetchError::ContentType` when the declared type is neither XML nor
    ///   text (a missing `Content-Type` header is accepted)
    pub async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let url = Url::parse(location).map_err(|_| FetchError::InvalidUrl(location.to_string()))?;

        let response = self
            .client
            .get(url)
            .header(
                ACCEPT,
                "application/xml,text/xml;q=0.9,text/plain;q=0.8,*/*;q=0.5",
            )
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: location.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: location.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(value) = response.headers().get(CONTENT_TYPE) {
            let content_type = value.to_str().unwrap_or_default();
            if !is_sitemap_content_type(content_type) {
                return Err(FetchError::ContentType {
                    url: location.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: location.to_string(),
            source,
        })
    }

    /// Fetches a sitemap resource and classifies it.
    pub async fn fetch_and_classify(&self, location: &str) -> Result<SitemapDocument, FetchError> {
        let text = self.fetch(location).await?;
        Ok(classify(&text))
    }
}
