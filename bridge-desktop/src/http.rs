//! Retrieval Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{FetchOptions, Fetcher, RedirectPolicy},
};
use bytes::Bytes;
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::{debug, warn};

/// Reqwest-based fetcher.
///
/// Redirect handling is a client-level setting in reqwest, so one client is
/// kept per behaviour: `follow` walks redirects, `direct` stops at the first
/// 3xx response.
pub struct ReqwestFetcher {
    follow: Client,
    direct: Client,
}

impl ReqwestFetcher {
    /// Create a fetcher with the default 30 second request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a fetcher with a custom default timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let build = |policy: redirect::Policy| {
            Client::builder()
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(10))
                .redirect(policy)
                .user_agent("sandbox-fs/0.1.0")
                .build()
                .map_err(|e| BridgeError::NotAvailable(format!("HTTP client: {}", e)))
        };

        Ok(Self {
            follow: build(redirect::Policy::limited(10))?,
            direct: build(redirect::Policy::none())?,
        })
    }

    fn client_for(&self, policy: RedirectPolicy) -> &Client {
        match policy {
            RedirectPolicy::Follow => &self.follow,
            RedirectPolicy::Error | RedirectPolicy::Manual => &self.direct,
        }
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Bytes> {
        debug!(url = %url, redirect = ?options.redirect, "Fetching");

        let mut request = self.client_for(options.redirect).get(url);
        for (key, value) in &options.headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::Http(format!("{}: {}", url, e)))?;

        let status = response.status();
        if status.is_redirection() && options.redirect == RedirectPolicy::Error {
            warn!(url = %url, status = status.as_u16(), "Redirect refused");
            return Err(BridgeError::Http(format!("{}: unexpected redirect {}", url, status)));
        }
        if !status.is_success() && !status.is_redirection() {
            warn!(url = %url, status = status.as_u16(), "Fetch failed");
            return Err(BridgeError::Http(format!("{}: HTTP {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::Http(format!("{}: {}", url, e)))?;
        debug!(url = %url, size = body.len(), "Fetched");
        Ok(body)
    }
}
