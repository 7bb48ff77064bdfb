//! Merged view model published to the presentation layer

use chrono::{DateTime, Utc};

use super::api::ApiStatus;
use super::quotes::QuoteBatch;
use super::types::{AssetQuote, PatternInsight, PricePrediction};

/// Maximum number of pattern panels shown under the cards
pub const MAX_PATTERN_PANELS: usize = 3;

/// Dashboard lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// No refresh cycle has completed yet
    #[default]
    Loading,
    Ready,
}

/// One card per quoted asset
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCard {
    pub quote: AssetQuote,
    pub prediction: Option<PricePrediction>,
    pub insight: Option<PatternInsight>,
}

/// One pattern canvas: an insight with the quote it is drawn around
#[derive(Debug, Clone, PartialEq)]
pub struct PatternPanel {
    pub quote: AssetQuote,
    pub insight: PatternInsight,
}

/// Everything the presentation layer draws
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewModel {
    pub phase: LoadPhase,
    pub cards: Vec<AssetCard>,
    pub panels: Vec<PatternPanel>,
    /// Reason the quote feed fell back to constants, if it did
    pub quote_warning: Option<String>,
    pub api_status: ApiStatus,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ViewModel {
    /// Initial state before the first refresh completes
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    pub fn card(&self, symbol: &str) -> Option<&AssetCard> {
        self.cards.iter().find(|card| card.quote.symbol == symbol)
    }
}

/// Join quotes, predictions and insights by symbol
///
/// Quote order drives card order. Insights without a quote are dropped.
/// Panels take the first [`MAX_PATTERN_PANELS`] insights that survive the
/// join, in insight order.
pub fn merge(batch: QuoteBatch, insights: Vec<PatternInsight>, api_status: ApiStatus) -> ViewModel {
    let QuoteBatch {
        quotes,
        predictions,
        degraded,
    } = batch;

    let cards = quotes
        .iter()
        .map(|quote| AssetCard {
            quote: quote.clone(),
            prediction: predictions
                .iter()
                .find(|prediction| prediction.symbol == quote.symbol)
                .cloned(),
            insight: insights
                .iter()
                .find(|insight| insight.symbol == quote.symbol)
                .cloned(),
        })
        .collect();

    let panels = insights
        .into_iter()
        .filter_map(|insight| {
            quotes
                .iter()
                .find(|quote| quote.symbol == insight.symbol)
                .map(|quote| PatternPanel {
                    quote: quote.clone(),
                    insight,
                })
        })
        .take(MAX_PATTERN_PANELS)
        .collect();

    ViewModel {
        phase: LoadPhase::Ready,
        cards,
        panels,
        quote_warning: degraded.map(|error| error.to_string()),
        api_status,
        last_updated: Some(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::FetchError;
    use crate::shared::quotes::fallback_batch;
    use crate::shared::types::{PatternKind, RiskLevel, Sentiment, SUPPORTED_ASSETS};

    fn insight(symbol: &str, pattern: PatternKind) -> PatternInsight {
        PatternInsight {
            symbol: symbol.to_string(),
            pattern,
            sentiment: Sentiment::Bullish,
            confidence: 0.8,
            timeframe: "4h".to_string(),
            risk: RiskLevel::Low,
            target_bias: Sentiment::Bullish,
            timestamp: Utc::now(),
        }
    }

    fn live_batch() -> QuoteBatch {
        let mut batch = fallback_batch(&SUPPORTED_ASSETS, FetchError::Status(500));
        batch.degraded = None;
        batch
    }

    #[test]
    fn test_loading_view_is_empty() {
        let view = ViewModel::loading();
        assert_eq!(view.phase, LoadPhase::Loading);
        assert!(view.cards.is_empty());
        assert!(view.last_updated.is_none());
        assert_eq!(view.api_status, ApiStatus::Unknown);
    }

    #[test]
    fn test_merge_joins_by_symbol() {
        let insights = vec![
            insight("SOLUSDT", PatternKind::CupAndHandle),
            insight("BTCUSDT", PatternKind::DoubleTop),
        ];
        let view = merge(live_batch(), insights, ApiStatus::Connected);

        assert!(view.is_ready());
        assert_eq!(view.cards.len(), 3);
        assert_eq!(view.cards[0].quote.symbol, "BTCUSDT");
        assert_eq!(
            view.card("BTCUSDT").and_then(|card| card.insight.as_ref()).map(|i| i.pattern),
            Some(PatternKind::DoubleTop)
        );
        assert!(view.card("ETHUSDT").and_then(|card| card.insight.as_ref()).is_none());
        assert_eq!(
            view.card("ETHUSDT")
                .and_then(|card| card.prediction.as_ref())
                .map(|p| p.predicted_price),
            Some(4_580.0)
        );
        assert!(view.quote_warning.is_none());
        assert!(view.last_updated.is_some());

        // Panels keep insight order
        assert_eq!(view.panels[0].quote.symbol, "SOLUSDT");
        assert_eq!(view.panels[1].quote.symbol, "BTCUSDT");
    }

    #[test]
    fn test_unknown_symbol_is_dropped() {
        let insights = vec![
            insight("DOGEUSDT", PatternKind::BullishFlag),
            insight("BTCUSDT", PatternKind::BullishFlag),
            insight("ETHUSDT", PatternKind::BearishFlag),
            insight("SOLUSDT", PatternKind::AscendingTriangle),
        ];
        let view = merge(live_batch(), insights, ApiStatus::Connected);

        assert!(view
            .cards
            .iter()
            .filter_map(|card| card.insight.as_ref())
            .all(|insight| insight.symbol != "DOGEUSDT"));
        assert_eq!(view.panels.len(), 3);
        assert!(view.panels.iter().all(|panel| panel.insight.symbol != "DOGEUSDT"));
        assert_eq!(view.panels[2].insight.pattern, PatternKind::AscendingTriangle);
    }

    #[test]
    fn test_panels_capped_at_three() {
        let insights = SUPPORTED_ASSETS
            .iter()
            .chain(SUPPORTED_ASSETS.iter())
            .map(|asset| insight(asset.symbol, PatternKind::HeadAndShoulders))
            .collect();
        let view = merge(live_batch(), insights, ApiStatus::Unknown);
        assert_eq!(view.panels.len(), MAX_PATTERN_PANELS);
    }

    #[test]
    fn test_degraded_batch_sets_warning() {
        let batch = fallback_batch(&SUPPORTED_ASSETS, FetchError::Status(429));
        let view = merge(batch, Vec::new(), ApiStatus::Offline("down".to_string()));

        assert_eq!(view.quote_warning.as_deref(), Some("HTTP error: 429"));
        assert_eq!(view.cards.len(), 3);
        assert!(view.panels.is_empty());
        assert_eq!(view.cards[0].quote.price, 108_714.0);
    }

    #[test]
    fn test_empty_quotes_drop_every_insight() {
        let batch = QuoteBatch {
            quotes: Vec::new(),
            predictions: Vec::new(),
            degraded: None,
        };
        let view = merge(batch, vec![insight("BTCUSDT", PatternKind::AscendingTriangle)], ApiStatus::Connected);
        assert!(view.cards.is_empty());
        assert!(view.panels.is_empty());
        assert!(view.is_ready());
    }
}
