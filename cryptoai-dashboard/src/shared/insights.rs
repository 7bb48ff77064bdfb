//! Synthetic pattern insights and price projections
//!
//! Nothing here analyses price data. Labels and confidences are uniform
//! draws over fixed enumerations, delayed to look like a remote inference
//! call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::debug;

use super::random::{RandomSource, SystemRandom};
use super::types::{Asset, PatternInsight, PatternKind, PricePrediction, RiskLevel, Sentiment};

/// Lower bound of the insight confidence range
pub const INSIGHT_CONFIDENCE_MIN: f64 = 0.75;
/// Width of the insight confidence range (upper bound 0.95)
pub const INSIGHT_CONFIDENCE_WIDTH: f64 = 0.20;
/// Timeframe label attached to every insight
pub const INSIGHT_TIMEFRAME: &str = "4h";

/// Anything that produces one pattern insight per asset
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn generate_insights(&self, assets: &[Asset]) -> Vec<PatternInsight>;
}

/// Random insight generator with an artificial delay
pub struct InsightGenerator {
    rng: Mutex<Box<dyn RandomSource>>,
    delay: Duration,
}

impl InsightGenerator {
    /// Generator backed by the system RNG
    pub fn new(delay: Duration) -> Self {
        Self::with_source(SystemRandom::new(), delay)
    }

    /// Generator backed by an arbitrary random source
    pub fn with_source(source: impl RandomSource + 'static, delay: Duration) -> Self {
        Self {
            rng: Mutex::new(Box::new(source)),
            delay,
        }
    }

    /// Draw insights without the artificial delay
    pub fn draw(&self, assets: &[Asset]) -> Vec<PatternInsight> {
        let mut rng = self.rng.lock();
        assets
            .iter()
            .map(|asset| draw_insight(rng.as_mut(), asset.symbol))
            .collect()
    }
}

#[async_trait]
impl InsightSource for InsightGenerator {
    async fn generate_insights(&self, assets: &[Asset]) -> Vec<PatternInsight> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let insights = self.draw(assets);
        debug!(count = insights.len(), "Generated synthetic insights");
        insights
    }
}

fn draw_insight<R: RandomSource + ?Sized>(rng: &mut R, symbol: &str) -> PatternInsight {
    let pattern = PatternKind::ALL[rng.index(PatternKind::ALL.len())];
    let sentiment = Sentiment::ALL[rng.index(Sentiment::ALL.len())];
    let confidence = INSIGHT_CONFIDENCE_MIN + rng.unit() * INSIGHT_CONFIDENCE_WIDTH;
    let target_bias = if rng.unit() > 0.5 {
        Sentiment::Bullish
    } else {
        Sentiment::Bearish
    };
    let risk = if rng.unit() > 0.7 {
        RiskLevel::High
    } else if rng.unit() > 0.4 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    PatternInsight {
        symbol: symbol.to_string(),
        pattern,
        sentiment,
        confidence,
        timeframe: INSIGHT_TIMEFRAME.to_string(),
        risk,
        target_bias,
        timestamp: Utc::now(),
    }
}

/// Project a price with the asset's spread and confidence range
///
/// Draws twice: once for the move, once for the confidence.
pub fn project_price<R: RandomSource + ?Sized>(
    rng: &mut R,
    asset: &Asset,
    price: f64,
) -> PricePrediction {
    let projection = asset.projection;
    let predicted_price = price * (1.0 + (rng.unit() - 0.3) * projection.spread);
    let confidence = projection.confidence_floor + rng.unit() * projection.confidence_width;

    PricePrediction {
        symbol: asset.symbol.to_string(),
        predicted_price: predicted_price.max(0.0),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::random::FixedSequence;
    use crate::shared::types::SUPPORTED_ASSETS;

    #[test]
    fn test_insights_stay_in_range() {
        let generator = InsightGenerator::with_source(SystemRandom::seeded(7), Duration::ZERO);
        for _ in 0..200 {
            let insights = generator.draw(&SUPPORTED_ASSETS);
            assert_eq!(insights.len(), SUPPORTED_ASSETS.len());
            for insight in insights {
                assert!(insight.confidence >= 0.75 && insight.confidence <= 0.95);
                assert!(PatternKind::ALL.contains(&insight.pattern));
                assert_ne!(insight.target_bias, Sentiment::Neutral);
                assert_eq!(insight.timeframe, "4h");
            }
        }
    }

    #[test]
    fn test_insight_draw_order() {
        // pattern, sentiment, confidence, target bias, risk
        let generator = InsightGenerator::with_source(
            FixedSequence::new(vec![0.5, 0.9, 0.5, 0.9, 0.8]),
            Duration::ZERO,
        );
        let insights = generator.draw(&SUPPORTED_ASSETS[..1]);
        let insight = &insights[0];

        assert_eq!(insight.symbol, "BTCUSDT");
        assert_eq!(insight.pattern, PatternKind::BullishFlag);
        assert_eq!(insight.sentiment, Sentiment::Neutral);
        assert!((insight.confidence - 0.85).abs() < 1e-9);
        assert_eq!(insight.target_bias, Sentiment::Bullish);
        assert_eq!(insight.risk, RiskLevel::High);
    }

    #[test]
    fn test_low_risk_takes_two_draws() {
        let generator = InsightGenerator::with_source(
            FixedSequence::new(vec![0.0, 0.0, 0.0, 0.0, 0.1, 0.1]),
            Duration::ZERO,
        );
        let insight = &generator.draw(&SUPPORTED_ASSETS[..1])[0];
        assert_eq!(insight.risk, RiskLevel::Low);
        assert_eq!(insight.pattern, PatternKind::HeadAndShoulders);
        assert_eq!(insight.target_bias, Sentiment::Bearish);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_waits_for_delay() {
        let generator = InsightGenerator::with_source(
            SystemRandom::seeded(1),
            Duration::from_millis(800),
        );
        let started = tokio::time::Instant::now();
        let insights = generator.generate_insights(&SUPPORTED_ASSETS).await;
        assert!(started.elapsed() >= Duration::from_millis(800));
        assert_eq!(insights.len(), 3);
    }

    #[test]
    fn test_projection_uses_asset_parameters() {
        let btc = &SUPPORTED_ASSETS[0];

        let mut neutral = FixedSequence::new(vec![0.3, 0.0]);
        let prediction = project_price(&mut neutral, btc, 100_000.0);
        assert!((prediction.predicted_price - 100_000.0).abs() < 1e-6);
        assert!((prediction.confidence - 0.75).abs() < 1e-9);

        let mut rng = SystemRandom::seeded(3);
        for asset in SUPPORTED_ASSETS.iter() {
            for _ in 0..100 {
                let prediction = project_price(&mut rng, asset, asset.fallback.price);
                assert!(prediction.confidence >= 0.70 && prediction.confidence <= 1.0);
                assert!(prediction.predicted_price >= 0.0);
            }
        }
    }
}
