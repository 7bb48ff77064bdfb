//! Prediction backend REST client
//!
//! Only [`PredictionApi::test_connection`] feeds the dashboard (as the
//! connectivity probe behind the status chip). The remaining endpoints are
//! exposed for scripting against the same backend.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use url::Url;

use super::config::DashboardConfig;
use super::error::FetchError;
use super::observer::{HttpObserver, TracingObserver};

/// Backend reachability shown in the header chip
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiStatus {
    /// No probe has completed yet
    #[default]
    Unknown,
    Connected,
    /// Last probe failed, with the reason
    Offline(String),
}

impl ApiStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ApiStatus::Connected)
    }

    /// Chip label
    pub fn label(&self) -> &'static str {
        match self {
            ApiStatus::Unknown => "API Checking",
            ApiStatus::Connected => "API Connected",
            ApiStatus::Offline(_) => "API Offline",
        }
    }
}

/// Anything that can report backend reachability
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> ApiStatus;
}

/// Body of `POST /predictions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub symbol: String,
    pub pattern: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnalyzeChartRequest<'a> {
    symbol: &'a str,
}

/// Client for the prediction backend
pub struct PredictionApi {
    http: Client,
    base_url: Url,
    timeout: Duration,
    observer: Arc<dyn HttpObserver>,
}

impl PredictionApi {
    /// Create a client from the dashboard configuration
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_base_url.clone(),
            timeout: config.api_timeout,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the HTTP observer
    pub fn with_observer(mut self, observer: Arc<dyn HttpObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /predictions`, used as a reachability check
    pub async fn test_connection(&self) -> Result<Value, FetchError> {
        let url = self.endpoint("predictions")?;
        self.execute(Method::GET, url, |request| request).await
    }

    /// `GET /patterns?symbol=...`
    pub async fn patterns(&self, symbol: &str) -> Result<Value, FetchError> {
        let mut url = self.endpoint("patterns")?;
        url.query_pairs_mut().append_pair("symbol", symbol);
        self.execute(Method::GET, url, |request| request).await
    }

    /// `POST /predictions`
    pub async fn create_prediction(&self, prediction: &NewPrediction) -> Result<Value, FetchError> {
        let url = self.endpoint("predictions")?;
        self.execute(Method::POST, url, |request| request.json(prediction))
            .await
    }

    /// `POST /analyze-chart`
    pub async fn analyze_chart(&self, symbol: &str) -> Result<Value, FetchError> {
        let url = self.endpoint("analyze-chart")?;
        let body = AnalyzeChartRequest { symbol };
        self.execute(Method::POST, url, |request| request.json(&body))
            .await
    }

    fn endpoint(&self, segment: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    async fn execute<F>(&self, method: Method, url: Url, build: F) -> Result<Value, FetchError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        self.observer.on_request(&method, &url);

        let request = self
            .http
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout);

        let result = match build(request).send().await {
            Ok(response) => {
                let status = response.status();
                self.observer.on_response(&url, status);
                if status.is_success() {
                    response
                        .json::<Value>()
                        .await
                        .map_err(|error| FetchError::Decode(error.to_string()))
                } else {
                    Err(FetchError::Status(status.as_u16()))
                }
            }
            Err(error) => Err(FetchError::from(error)),
        };

        if let Err(error) = &result {
            self.observer.on_error(&url, error);
        }
        result
    }
}

#[async_trait]
impl ConnectivityProbe for PredictionApi {
    async fn probe(&self) -> ApiStatus {
        match self.test_connection().await {
            Ok(_) => ApiStatus::Connected,
            Err(error) => {
                warn!(%error, "Prediction backend unreachable");
                ApiStatus::Offline(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::observer::testing::RecordingObserver;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn api_for(base: &str) -> PredictionApi {
        let config = DashboardConfig::default().with_api_base_url(Url::parse(base).unwrap());
        PredictionApi::new(&config)
    }

    #[tokio::test]
    async fn test_probe_connected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dev/predictions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "predictions": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&format!("{}/dev", server.uri()));
        assert_eq!(api.probe().await, ApiStatus::Connected);
    }

    #[tokio::test]
    async fn test_probe_offline_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let observer = Arc::new(RecordingObserver::default());
        let api = api_for(&server.uri()).with_observer(observer.clone());
        let status = api.probe().await;

        assert_eq!(status, ApiStatus::Offline("HTTP error: 502".to_string()));
        assert_eq!(status.label(), "API Offline");
        assert_eq!(observer.events.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_probe_offline_when_unreachable() {
        let status = api_for("http://127.0.0.1:1").probe().await;
        assert!(matches!(status, ApiStatus::Offline(_)));
        assert!(!status.is_connected());
    }

    #[tokio::test]
    async fn test_patterns_passes_symbol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/patterns"))
            .and(query_param("symbol", "ETHUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pattern": "double_top" })))
            .expect(1)
            .mount(&server)
            .await;

        let value = api_for(&server.uri()).patterns("ETHUSDT").await.unwrap();
        assert_eq!(value["pattern"], "double_top");
    }

    #[tokio::test]
    async fn test_create_prediction_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predictions"))
            .and(body_json(json!({
                "symbol": "BTCUSDT",
                "pattern": "bullish_flag",
                "confidence": 0.9
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let prediction = NewPrediction {
            symbol: "BTCUSDT".to_string(),
            pattern: "bullish_flag".to_string(),
            confidence: 0.9,
            timeframe: None,
        };
        let value = api_for(&server.uri())
            .create_prediction(&prediction)
            .await
            .unwrap();
        assert_eq!(value["id"], "abc");
    }

    #[tokio::test]
    async fn test_analyze_chart_posts_symbol() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze-chart"))
            .and(body_json(json!({ "symbol": "SOLUSDT" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let value = api_for(&server.uri()).analyze_chart("SOLUSDT").await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let api = api_for("https://example.com/dev/");
        assert_eq!(
            api.endpoint("analyze-chart").unwrap().as_str(),
            "https://example.com/dev/analyze-chart"
        );
    }
}
