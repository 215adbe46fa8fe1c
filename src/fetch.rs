//! Resilient HTTP fetch layer
//!
//! Two strategies for reaching the regulatory source:
//! - Direct: a single GET against the target URL, no fallback
//! - ProxyChain: an ordered chain of CORS-bypass relays, first non-empty
//!   success wins
//!
//! Attempts are strictly sequential; each proxy is tried at most once per
//! call. Direct mode never falls back to the proxy chain - it is for
//! callers already in a privileged network context.

use crate::config::{AppConfig, ProxyConfig, ProxyResponseShape};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum HTTP response body size (10 MB).
/// Bodies exceeding this limit are truncated during streaming reads
/// rather than rejected after full download, preventing memory exhaustion
/// from adversarial or unexpectedly large responses.
const MAX_HTTP_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Which fetch strategy to use for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// One GET against the target URL; any failure is final
    Direct,
    /// Bypass direct fetch and walk the configured proxy chain
    ProxyChain,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Direct request failed: {0}")]
    Direct(#[source] reqwest::Error),

    #[error("Direct request returned status {0}")]
    DirectStatus(reqwest::StatusCode),

    #[error("All {0} proxies in the chain were exhausted without a usable response")]
    ProxiesExhausted(usize),
}

/// JSON envelope returned by relays with the `json_contents` response shape
#[derive(Deserialize)]
struct ProxyEnvelope {
    contents: Option<String>,
}

/// HTTP fetcher with a direct strategy and an ordered proxy-chain strategy.
#[derive(Debug, Clone)]
pub struct ResilientFetcher {
    client: reqwest::Client,
    proxies: Vec<ProxyConfig>,
}

impl ResilientFetcher {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self {
            client,
            proxies: config.proxies.clone(),
        })
    }

    /// Fetch `url` with the given strategy, returning the response body.
    pub async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError> {
        match mode {
            FetchMode::Direct => self.fetch_direct(url).await,
            FetchMode::ProxyChain => self.fetch_via_proxies(url).await,
        }
    }

    async fn fetch_direct(&self, url: &str) -> Result<String, FetchError> {
        debug!("Direct fetch: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Direct)?;

        if !response.status().is_success() {
            return Err(FetchError::DirectStatus(response.status()));
        }

        read_response_body_capped(response, MAX_HTTP_BODY_BYTES)
            .await
            .map_err(FetchError::Direct)
    }

    async fn fetch_via_proxies(&self, url: &str) -> Result<String, FetchError> {
        let encoded_target = urlencoding::encode(url);

        for proxy in &self.proxies {
            let proxy_url = proxy.url_template.replace("{url}", &encoded_target);
            debug!("Proxy attempt via {}: {}", proxy.name, proxy_url);

            let response = match self.client.get(&proxy_url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("Proxy {} request failed: {}", proxy.name, e);
                    continue;
                }
            };

            if !response.status().is_success() {
                debug!(
                    "Proxy {} returned status {}, trying next",
                    proxy.name,
                    response.status()
                );
                continue;
            }

            let body = match read_response_body_capped(response, MAX_HTTP_BODY_BYTES).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Proxy {} body read failed: {}", proxy.name, e);
                    continue;
                }
            };

            let content = match proxy.response_shape {
                ProxyResponseShape::Raw => body,
                ProxyResponseShape::JsonContents => {
                    match serde_json::from_str::<ProxyEnvelope>(&body) {
                        Ok(ProxyEnvelope {
                            contents: Some(contents),
                        }) => contents,
                        Ok(ProxyEnvelope { contents: None }) => {
                            debug!("Proxy {} envelope had no contents field", proxy.name);
                            continue;
                        }
                        Err(e) => {
                            debug!("Proxy {} envelope decode failed: {}", proxy.name, e);
                            continue;
                        }
                    }
                }
            };

            if content.is_empty() {
                debug!("Proxy {} returned an empty body, trying next", proxy.name);
                continue;
            }

            debug!("Proxy {} succeeded ({} bytes)", proxy.name, content.len());
            return Ok(content);
        }

        Err(FetchError::ProxiesExhausted(self.proxies.len()))
    }
}

/// Read an HTTP response body with streaming truncation.
/// Reads the body in chunks, stopping at `max_bytes` to prevent
/// memory exhaustion. Returns the body as a String (lossy UTF-8 conversion
/// for truncated multi-byte boundaries).
async fn read_response_body_capped(
    response: reqwest::Response,
    max_bytes: usize,
) -> Result<String, reqwest::Error> {
    use futures::StreamExt;

    let mut body = Vec::with_capacity(max_bytes.min(256 * 1024));
    let mut stream = response.bytes_stream();
    let mut total = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        let remaining = max_bytes.saturating_sub(total);
        if remaining == 0 {
            debug!("HTTP response truncated at {} bytes (limit: {})", total, max_bytes);
            break;
        }
        let take = chunk.len().min(remaining);
        body.extend_from_slice(&chunk[..take]);
        total += take;
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
