//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, DISCOVERY_REQUEST_TIMEOUT};
use crate::error_handling::InitializationError;

/// The two clients a run needs.
///
/// Discovery requests are small and get a short timeout; analysis calls wait
/// for a full Lighthouse run.
#[derive(Debug, Clone)]
pub struct HttpClients {
    pub discovery: reqwest::Client,
    pub analysis: reqwest::Client,
}

/// Builds the discovery and analysis clients from `config`.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if a client cannot be built.
pub fn init_clients(config: &Config) -> Result<HttpClients, InitializationError> {
    let discovery = ClientBuilder::new()
        .timeout(DISCOVERY_REQUEST_TIMEOUT)
        .user_agent(config.user_agent.clone())
        .gzip(true)
        .build()?;

    let analysis = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
        .user_agent(config.user_agent.clone())
        .build()?;

    Ok(HttpClients {
        discovery,
        analysis,
    })
}
