//! PageSpeed Insights HTTP client.

use log::debug;
use tokio_retry::RetryIf;
use url::Url;

use super::report::PageSpeedReport;
use super::Analyzer;
use crate::config::{Strategy, PAGESPEED_API_URL, RETRY_INITIAL_DELAY_MS};
use crate::error_handling::{get_retry_strategy, is_retriable_error, AnalyzeError};

/// Scores pages through the PageSpeed Insights v5 API.
///
/// Transient failures (429, 5xx, timeouts, connection errors) are retried
/// with exponential backoff up to `attempts` total attempts.
#[derive(Clone)]
pub struct PageSpeedClient {
    client: reqwest::Client,
    endpoint: String,
    strategy: Strategy,
    attempts: usize,
    retry_base_ms: u64,
}

impl PageSpeedClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: PAGESPEED_API_URL.to_string(),
            strategy: Strategy::Mobile,
            attempts: 1,
            retry_base_ms: RETRY_INITIAL_DELAY_MS,
        }
    }

    /// Overrides the API endpoint (used against mock servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the total attempts per URL and the backoff base in milliseconds.
    pub fn with_retries(mut self, attempts: usize, retry_base_ms: u64) -> Self {
        self.attempts = attempts.max(1);
        self.retry_base_ms = retry_base_ms;
        self
    }

    /// Builds the API request URL for one page.
    fn request_url(&self, url: &str, credential: &str) -> Result<Url, AnalyzeError> {
        let page = Url::parse(url).map_err(|e| AnalyzeError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(page.scheme(), "http" | "https") {
            return Err(AnalyzeError::InvalidUrl(format!(
                "{url}: unsupported scheme"
            )));
        }

        let mut params = vec![("url", url), ("strategy", self.strategy.as_str())];
        if !credential.is_empty() {
            params.push(("key", credential));
        }
        Url::parse_with_params(&self.endpoint, &params)
            .map_err(|e| AnalyzeError::InvalidUrl(format!("{}: {e}", self.endpoint)))
    }

    async fn analyze_once(&self, request_url: &Url) -> Result<PageSpeedReport, AnalyzeError> {
        let response = self
            .client
            .get(request_url.clone())
            .send()
            .await
            .map_err(AnalyzeError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzeError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(AnalyzeError::Network)?;
        serde_json::from_str(&body).map_err(|e| AnalyzeError::Decode(e.to_string()))
    }
}

impl Analyzer for PageSpeedClient {
    async fn analyze(&self, url: &str, credential: &str) -> Result<PageSpeedReport, AnalyzeError> {
        let request_url = self.request_url(url, credential)?;
        debug!("Analyzing {url} ({})", self.strategy.as_str());

        let strategy = get_retry_strategy(self.retry_base_ms, self.attempts);
        RetryIf::spawn(
            strategy,
            || self.analyze_once(&request_url),
            |e: &AnalyzeError| {
                let retry = is_retriable_error(e);
                if retry {
                    debug!("Retrying {url} after: {e}");
                }
                retry
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_includes_key_only_when_present() {
        let client = PageSpeedClient::new(reqwest::Client::new());

        let with_key = client
            .request_url("https://example.com/a?b=c", "secret")
            .unwrap();
        let pairs: Vec<(String, String)> = with_key
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("url".to_string(), "https://example.com/a?b=c".to_string()),
                ("strategy".to_string(), "mobile".to_string()),
                ("key".to_string(), "secret".to_string()),
            ]
        );
        assert!(with_key.as_str().starts_with(PAGESPEED_API_URL));

        let without_key = client.request_url("https://example.com/", "").unwrap();
        assert!(without_key.query_pairs().all(|(k, _)| k != "key"));
    }

    #[test]
    fn test_request_url_rejects_bad_pages() {
        let client = PageSpeedClient::new(reqwest::Client::new());
        assert!(matches!(
            client.request_url("example.com", "k"),
            Err(AnalyzeError::InvalidUrl(_))
        ));
        assert!(matches!(
            client.request_url("ftp://example.com/", "k"),
            Err(AnalyzeError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_desktop_strategy() {
        let client =
            PageSpeedClient::new(reqwest::Client::new()).with_strategy(Strategy::Desktop);
        let url = client.request_url("https://example.com/", "").unwrap();
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "strategy" && v == "desktop"));
    }
}
