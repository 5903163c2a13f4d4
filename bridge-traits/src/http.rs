//! Retrieval Abstraction
//!
//! Fetches raw bytes from a fully qualified locator. Used by the
//! network-sourced archive expansion.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// Redirect handling for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectPolicy {
    #[default]
    Follow,
    Error,
    Manual,
}

/// Caller-tunable part of a fetch request.
///
/// The response type is always raw bytes and requests are never abortable
/// by the caller; neither is configurable here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub redirect: RedirectPolicy,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn redirect(mut self, policy: RedirectPolicy) -> Self {
        self.redirect = policy;
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// Retrieval collaborator.
///
/// A non-2xx status is a failure, reported as
/// [`BridgeError::Http`](crate::BridgeError::Http).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Bytes>;
}
