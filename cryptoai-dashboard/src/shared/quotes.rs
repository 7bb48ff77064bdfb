//! Quote client for the public price endpoint
//!
//! One GET per refresh, no retries. Any failure (network, non-2xx, bad JSON)
//! returns the hardcoded fallback quotes together with the reason, so the
//! caller can show a warning instead of stopping.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::{header::ACCEPT, Client, Method};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use super::config::DashboardConfig;
use super::error::FetchError;
use super::insights::project_price;
use super::observer::{HttpObserver, TracingObserver};
use super::random::{RandomSource, SystemRandom};
use super::types::{Asset, AssetQuote, PricePrediction};

/// Result of one quote fetch
///
/// Always carries exactly one quote and one prediction per requested asset,
/// in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteBatch {
    pub quotes: Vec<AssetQuote>,
    pub predictions: Vec<PricePrediction>,
    /// Set when the fallback constants were used, with the failure reason
    pub degraded: Option<FetchError>,
}

impl QuoteBatch {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Anything that can produce a [`QuoteBatch`] for a set of assets
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quotes(&self, assets: &[Asset]) -> QuoteBatch;
}

/// Per-asset entry of the `/simple/price` response
#[derive(Debug, Default, Deserialize)]
struct SimplePrice {
    #[serde(default)]
    usd: Option<f64>,
    #[serde(default)]
    usd_24h_change: Option<f64>,
    #[serde(default)]
    usd_24h_vol: Option<f64>,
    #[serde(default)]
    usd_market_cap: Option<f64>,
}

/// Client for the CoinGecko `/simple/price` endpoint
pub struct CoinGeckoClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
    rng: Mutex<Box<dyn RandomSource>>,
    observer: Arc<dyn HttpObserver>,
}

impl CoinGeckoClient {
    /// Create a client from the dashboard configuration
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.quote_base_url.clone(),
            timeout: config.quote_timeout,
            rng: Mutex::new(Box::new(SystemRandom::new())),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the random source used for price projections
    pub fn with_random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.rng = Mutex::new(Box::new(source));
        self
    }

    /// Replace the HTTP observer
    pub fn with_observer(mut self, observer: Arc<dyn HttpObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Build `{base}/simple/price?ids=...` for the given assets
    fn price_url(&self, assets: &[Asset]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("simple")
            .push("price");

        let ids = assets.iter().map(|asset| asset.id).collect::<Vec<_>>().join(",");
        url.query_pairs_mut()
            .append_pair("ids", &ids)
            .append_pair("vs_currencies", "usd")
            .append_pair("include_24hr_change", "true")
            .append_pair("include_market_cap", "true")
            .append_pair("include_24hr_vol", "true");

        Ok(url)
    }

    async fn request(&self, url: &Url) -> Result<HashMap<String, SimplePrice>, FetchError> {
        self.observer.on_request(&Method::GET, url);

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        self.observer.on_response(url, status);

        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<HashMap<String, SimplePrice>>()
            .await
            .map_err(|error| FetchError::Decode(error.to_string()))
    }

    async fn fetch_raw(&self, assets: &[Asset]) -> Result<HashMap<String, SimplePrice>, FetchError> {
        let url = self.price_url(assets)?;
        let result = self.request(&url).await;
        if let Err(error) = &result {
            self.observer.on_error(&url, error);
        }
        result
    }
}

#[async_trait]
impl QuoteSource for CoinGeckoClient {
    async fn fetch_quotes(&self, assets: &[Asset]) -> QuoteBatch {
        if assets.is_empty() {
            return QuoteBatch {
                quotes: Vec::new(),
                predictions: Vec::new(),
                degraded: None,
            };
        }

        match self.fetch_raw(assets).await {
            Ok(body) => {
                let mut rng = self.rng.lock();
                let batch = resolve_quotes(assets, &body, rng.as_mut(), Utc::now());
                info!(count = batch.quotes.len(), "Fetched live quotes");
                batch
            }
            Err(error) => {
                warn!(%error, "Quote fetch failed, using fallback prices");
                fallback_batch(assets, error)
            }
        }
    }
}

/// Fallback constants for every asset, tagged with the failure reason
pub fn fallback_batch(assets: &[Asset], reason: FetchError) -> QuoteBatch {
    let now = Utc::now();
    QuoteBatch {
        quotes: assets.iter().map(|asset| asset.fallback_quote(now)).collect(),
        predictions: assets.iter().map(Asset::fallback_prediction).collect(),
        degraded: Some(reason),
    }
}

/// Merge a live response with the fallback constants field by field
fn resolve_quotes<R: RandomSource + ?Sized>(
    assets: &[Asset],
    body: &HashMap<String, SimplePrice>,
    rng: &mut R,
    now: DateTime<Utc>,
) -> QuoteBatch {
    let empty = SimplePrice::default();
    let mut quotes = Vec::with_capacity(assets.len());
    let mut predictions = Vec::with_capacity(assets.len());

    for asset in assets {
        let entry = body.get(asset.id).unwrap_or(&empty);
        let fallback = asset.fallback;

        let quote = AssetQuote {
            symbol: asset.symbol.to_string(),
            name: asset.name.to_string(),
            price: non_negative(entry.usd, fallback.price),
            change_24h: finite(entry.usd_24h_change, fallback.change_24h),
            volume_24h: non_negative(entry.usd_24h_vol, fallback.volume_24h),
            market_cap: non_negative(entry.usd_market_cap, fallback.market_cap),
            timestamp: now,
        };

        predictions.push(project_price(rng, asset, quote.price));
        quotes.push(quote);
    }

    QuoteBatch {
        quotes,
        predictions,
        degraded: None,
    }
}

fn finite(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

fn non_negative(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v >= 0.0).unwrap_or(fallback)
}
