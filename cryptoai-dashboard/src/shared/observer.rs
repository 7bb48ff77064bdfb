//! HTTP request observer
//!
//! Clients report each request, response and failure to an injected
//! [`HttpObserver`]. The default implementation forwards to `tracing`.

use reqwest::{Method, StatusCode};
use tracing::{debug, warn};
use url::Url;

use super::error::FetchError;

/// Receives notifications about outbound HTTP traffic
pub trait HttpObserver: Send + Sync {
    fn on_request(&self, _method: &Method, _url: &Url) {}

    fn on_response(&self, _url: &Url, _status: StatusCode) {}

    fn on_error(&self, _url: &Url, _error: &FetchError) {}
}

/// Logs HTTP traffic through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HttpObserver for TracingObserver {
    fn on_request(&self, method: &Method, url: &Url) {
        debug!(%method, %url, "API request");
    }

    fn on_response(&self, url: &Url, status: StatusCode) {
        debug!(%url, status = status.as_u16(), "API response");
    }

    fn on_error(&self, url: &Url, error: &FetchError) {
        warn!(%url, %error, "API error");
    }
}
