/// Dashboard configuration
///
/// Everything except the prediction backend URL is a fixed constant; the
/// builder methods exist so tests can shrink intervals and point the clients
/// at local mock servers.

use std::time::Duration;

use url::Url;

use super::error::ConfigError;
use super::types::{Asset, SUPPORTED_ASSETS};

/// Environment variable overriding the prediction backend base URL
pub const API_URL_ENV: &str = "CRYPTOAI_API_URL";

/// Default public price endpoint base
pub const DEFAULT_QUOTE_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Default prediction backend base
pub const DEFAULT_API_BASE_URL: &str = "https://pbqj4cxv71.execute-api.us-east-1.amazonaws.com/dev";

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the public price endpoint
    pub quote_base_url: Url,
    /// Base URL of the prediction backend
    pub api_base_url: Url,
    /// Timeout for a single quote request
    pub quote_timeout: Duration,
    /// Timeout for prediction backend requests
    pub api_timeout: Duration,
    /// Data refresh cadence
    pub refresh_interval: Duration,
    /// Chart redraw cadence
    pub redraw_interval: Duration,
    /// Artificial latency of the insight generator
    pub insight_delay: Duration,
    /// Assets to display
    pub assets: Vec<Asset>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            quote_base_url: Url::parse(DEFAULT_QUOTE_BASE_URL)
                .expect("default quote URL is valid"),
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid"),
            quote_timeout: Duration::from_secs(10),
            api_timeout: Duration::from_secs(30),
            refresh_interval: Duration::from_secs(30),
            redraw_interval: Duration::from_secs(2),
            insight_delay: Duration::from_millis(800),
            assets: SUPPORTED_ASSETS.to_vec(),
        }
    }
}

impl DashboardConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config.api_base_url =
                Url::parse(raw.trim()).map_err(|error| ConfigError::InvalidUrl {
                    variable: API_URL_ENV.to_string(),
                    reason: error.to_string(),
                })?;
        }

        Ok(config)
    }

    /// Set the price endpoint base URL
    pub fn with_quote_base_url(mut self, url: Url) -> Self {
        self.quote_base_url = url;
        self
    }

    /// Set the prediction backend base URL
    pub fn with_api_base_url(mut self, url: Url) -> Self {
        self.api_base_url = url;
        self
    }

    /// Set the data refresh cadence
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the chart redraw cadence
    pub fn with_redraw_interval(mut self, interval: Duration) -> Self {
        self.redraw_interval = interval;
        self
    }

    /// Set the insight generator delay
    pub fn with_insight_delay(mut self, delay: Duration) -> Self {
        self.insight_delay = delay;
        self
    }

    /// Set the quote request timeout
    pub fn with_quote_timeout(mut self, timeout: Duration) -> Self {
        self.quote_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.quote_base_url.as_str(), "https://api.coingecko.com/api/v3");
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.redraw_interval, Duration::from_secs(2));
        assert_eq!(config.insight_delay, Duration::from_millis(800));
        assert_eq!(config.assets.len(), 3);
    }

    #[test]
    fn test_config_builder() {
        let config = DashboardConfig::default()
            .with_refresh_interval(Duration::from_secs(5))
            .with_redraw_interval(Duration::from_millis(250))
            .with_insight_delay(Duration::ZERO);

        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.redraw_interval, Duration::from_millis(250));
        assert_eq!(config.insight_delay, Duration::ZERO);
    }

    #[test]
    fn test_env_override() {
        let config = DashboardConfig::from_lookup(|key| {
            (key == API_URL_ENV).then(|| "http://localhost:3000/dev".to_string())
        })
        .unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:3000/dev");

        let unset = DashboardConfig::from_lookup(|_| None).unwrap();
        assert_eq!(unset.api_base_url.as_str(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let result = DashboardConfig::from_lookup(|_| Some("not a url".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }
}
