/// Core data types for quotes, synthetic insights and chart curves
///
/// Quote field names follow the JSON shape of the public price endpoint
/// (`usd`, `usd_24h_change`, ...), see [`crate::shared::quotes`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Constants substituted when the price endpoint is unreachable or omits a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackQuote {
    pub price: f64,
    pub change_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    /// Projected price shown while degraded
    pub predicted_price: f64,
    /// Confidence of the projected price shown while degraded
    pub prediction_confidence: f64,
}

/// Parameters of the random price projection for an asset
///
/// projected = price * (1 + (u - 0.3) * spread)
/// confidence = confidence_floor + u * confidence_width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub spread: f64,
    pub confidence_floor: f64,
    pub confidence_width: f64,
}

/// A supported asset: price-service id, display symbol and fallback constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asset {
    /// Identifier used by the price endpoint (e.g., "bitcoin")
    pub id: &'static str,
    /// Display symbol, also the merge key (e.g., "BTCUSDT")
    pub symbol: &'static str,
    /// Human readable name (e.g., "Bitcoin")
    pub name: &'static str,
    pub fallback: FallbackQuote,
    pub projection: Projection,
}

impl Asset {
    /// Quote built entirely from the fallback constants
    pub fn fallback_quote(&self, timestamp: DateTime<Utc>) -> AssetQuote {
        AssetQuote {
            symbol: self.symbol.to_string(),
            name: self.name.to_string(),
            price: self.fallback.price,
            change_24h: self.fallback.change_24h,
            volume_24h: self.fallback.volume_24h,
            market_cap: self.fallback.market_cap,
            timestamp,
        }
    }

    /// Fixed prediction shown while the quote feed is degraded
    pub fn fallback_prediction(&self) -> PricePrediction {
        PricePrediction {
            symbol: self.symbol.to_string(),
            predicted_price: self.fallback.predicted_price,
            confidence: self.fallback.prediction_confidence,
        }
    }

    /// Look up a supported asset by display symbol
    pub fn by_symbol(symbol: &str) -> Option<&'static Asset> {
        SUPPORTED_ASSETS.iter().find(|asset| asset.symbol == symbol)
    }
}

/// Assets shown on the dashboard, in display order
pub const SUPPORTED_ASSETS: [Asset; 3] = [
    Asset {
        id: "bitcoin",
        symbol: "BTCUSDT",
        name: "Bitcoin",
        fallback: FallbackQuote {
            price: 108_714.0,
            change_24h: -4.2,
            volume_24h: 72_130_000_000.0,
            market_cap: 2_220_000_000_000.0,
            predicted_price: 112_000.0,
            prediction_confidence: 0.85,
        },
        projection: Projection {
            spread: 0.15,
            confidence_floor: 0.75,
            confidence_width: 0.20,
        },
    },
    Asset {
        id: "ethereum",
        symbol: "ETHUSDT",
        name: "Ethereum",
        fallback: FallbackQuote {
            price: 4_334.0,
            change_24h: -0.7,
            volume_24h: 18_900_000_000.0,
            market_cap: 521_000_000_000.0,
            predicted_price: 4_580.0,
            prediction_confidence: 0.82,
        },
        projection: Projection {
            spread: 0.12,
            confidence_floor: 0.80,
            confidence_width: 0.15,
        },
    },
    Asset {
        id: "solana",
        symbol: "SOLUSDT",
        name: "Solana",
        fallback: FallbackQuote {
            price: 214.0,
            change_24h: 3.5,
            volume_24h: 12_900_000_000.0,
            market_cap: 117_630_000_000.0,
            predicted_price: 245.0,
            prediction_confidence: 0.78,
        },
        projection: Projection {
            spread: 0.20,
            confidence_floor: 0.70,
            confidence_width: 0.25,
        },
    },
];

/// Price quote for a single asset
///
/// Recreated wholesale on every refresh, never patched in place.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssetQuote {
    /// Display symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Display name (e.g., "Bitcoin")
    pub name: String,
    /// Current price in USD, never negative
    pub price: f64,
    /// 24 hour change in percent (signed)
    pub change_24h: f64,
    /// 24 hour traded volume in USD
    pub volume_24h: f64,
    /// Market capitalisation in USD
    pub market_cap: f64,
    /// When the quote was assembled
    pub timestamp: DateTime<Utc>,
}

impl AssetQuote {
    /// Check if the 24h change is non-negative
    pub fn is_up(&self) -> bool {
        self.change_24h >= 0.0
    }
}

/// Synthetic projected price attached to a quote by symbol
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricePrediction {
    pub symbol: String,
    pub predicted_price: f64,
    /// Always within [0.70, 1.00]
    pub confidence: f64,
}

impl PricePrediction {
    /// Expected move relative to the current price, in percent
    pub fn expected_move_pct(&self, current_price: f64) -> Option<f64> {
        if current_price > 0.0 {
            Some((self.predicted_price - current_price) / current_price * 100.0)
        } else {
            None
        }
    }
}

/// Chart pattern labels the insight generator draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    HeadAndShoulders,
    CupAndHandle,
    AscendingTriangle,
    DoubleBottom,
    BullishFlag,
    BearishFlag,
    DoubleTop,
    DescendingTriangle,
}

impl PatternKind {
    pub const ALL: [PatternKind; 8] = [
        PatternKind::HeadAndShoulders,
        PatternKind::CupAndHandle,
        PatternKind::AscendingTriangle,
        PatternKind::DoubleBottom,
        PatternKind::BullishFlag,
        PatternKind::BearishFlag,
        PatternKind::DoubleTop,
        PatternKind::DescendingTriangle,
    ];

    /// Wire label (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => "head_and_shoulders",
            PatternKind::CupAndHandle => "cup_and_handle",
            PatternKind::AscendingTriangle => "ascending_triangle",
            PatternKind::DoubleBottom => "double_bottom",
            PatternKind::BullishFlag => "bullish_flag",
            PatternKind::BearishFlag => "bearish_flag",
            PatternKind::DoubleTop => "double_top",
            PatternKind::DescendingTriangle => "descending_triangle",
        }
    }

    /// Display title (e.g., "Head & Shoulders")
    pub fn title(&self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => "Head & Shoulders",
            PatternKind::CupAndHandle => "Cup & Handle",
            PatternKind::AscendingTriangle => "Ascending Triangle",
            PatternKind::DoubleBottom => "Double Bottom",
            PatternKind::BullishFlag => "Bullish Flag",
            PatternKind::BearishFlag => "Bearish Flag",
            PatternKind::DoubleTop => "Double Top",
            PatternKind::DescendingTriangle => "Descending Triangle",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => "Reversal pattern indicating potential downtrend",
            PatternKind::CupAndHandle => "Bullish continuation pattern with breakout potential",
            PatternKind::AscendingTriangle => {
                "Bullish pattern with rising support and horizontal resistance"
            }
            PatternKind::DoubleBottom => "Reversal pattern suggesting upward price movement",
            PatternKind::BullishFlag => "Short-term consolidation in an uptrend",
            PatternKind::BearishFlag => "Short-term consolidation in a downtrend",
            PatternKind::DoubleTop => "Reversal pattern indicating potential downtrend",
            PatternKind::DescendingTriangle => "Bearish pattern with falling resistance",
        }
    }

    /// Single-width glyph for terminal chips
    pub fn glyph(&self) -> &'static str {
        match self {
            PatternKind::HeadAndShoulders => "⩘",
            PatternKind::CupAndHandle => "◡",
            PatternKind::AscendingTriangle => "◮",
            PatternKind::DoubleBottom => "⩊",
            PatternKind::BullishFlag => "⚑",
            PatternKind::BearishFlag => "⚐",
            PatternKind::DoubleTop => "⩋",
            PatternKind::DescendingTriangle => "◭",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = String;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == label)
            .ok_or_else(|| format!("unknown pattern label: {label}"))
    }
}

/// Market sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Bullish, Sentiment::Bearish, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk label attached to an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synthetic pattern annotation for an asset
///
/// Purely decorative: no relationship to the actual price data.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PatternInsight {
    /// Display symbol this insight is attached to
    pub symbol: String,
    pub pattern: PatternKind,
    pub sentiment: Sentiment,
    /// Always within [0.75, 0.95]
    pub confidence: f64,
    /// Chart timeframe label (e.g., "4h")
    pub timeframe: String,
    pub risk: RiskLevel,
    /// Direction of the price target, bullish or bearish only
    pub target_bias: Sentiment,
    pub timestamp: DateTime<Utc>,
}

/// A single point of a synthesized curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Horizontal position scaled to the canvas width
    pub x: f64,
    /// Synthesized price
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_label_parsing() {
        assert_eq!(
            "cup_and_handle".parse::<PatternKind>(),
            Ok(PatternKind::CupAndHandle)
        );
        assert!("rising_wedge".parse::<PatternKind>().is_err());
        assert_eq!(PatternKind::ALL.len(), 8);
    }

    #[test]
    fn test_pattern_serde_uses_snake_case() {
        let json = serde_json::to_string(&PatternKind::HeadAndShoulders).unwrap();
        assert_eq!(json, "\"head_and_shoulders\"");
        let sentiment: Sentiment = serde_json::from_str("\"bearish\"").unwrap();
        assert_eq!(sentiment, Sentiment::Bearish);
    }

    #[test]
    fn test_fallback_quote_uses_constants() {
        let btc = Asset::by_symbol("BTCUSDT").unwrap();
        let quote = btc.fallback_quote(Utc::now());
        assert_eq!(quote.price, 108_714.0);
        assert_eq!(quote.change_24h, -4.2);
        assert!(!quote.is_up());

        let prediction = btc.fallback_prediction();
        assert_eq!(prediction.predicted_price, 112_000.0);
        assert_eq!(prediction.confidence, 0.85);
    }

    #[test]
    fn test_expected_move() {
        let prediction = PricePrediction {
            symbol: "SOLUSDT".to_string(),
            predicted_price: 220.0,
            confidence: 0.8,
        };
        let pct = prediction.expected_move_pct(200.0).unwrap();
        assert!((pct - 10.0).abs() < 1e-9);
        assert!(prediction.expected_move_pct(0.0).is_none());
    }
}
