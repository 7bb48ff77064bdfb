/// CryptoAI Dashboard - Shared Library
///
/// This library backs the two binaries:
/// - cryptoai-dashboard: the interactive terminal dashboard
/// - cryptoai-snapshot: a headless single refresh cycle printed to stdout
///
/// The library includes:
/// - Quote client for the public price endpoint, with fallback constants
/// - Synthetic pattern insights and price projections (random, not inference)
/// - Pattern curve synthesis for the decorative chart panels
/// - The refresh loop that merges everything into a view model
/// - Ratatui widgets rendering that view model
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{
    Asset, AssetQuote, CurvePoint, PatternInsight, PatternKind, PricePrediction, RiskLevel,
    Sentiment, SUPPORTED_ASSETS,
};

pub use shared::config::DashboardConfig;
pub use shared::error::{ConfigError, FetchError};
pub use shared::random::{FixedSequence, RandomSource, SystemRandom};

pub use shared::api::{ApiStatus, ConnectivityProbe, NewPrediction, PredictionApi};
pub use shared::observer::{HttpObserver, TracingObserver};
pub use shared::quotes::{fallback_batch, CoinGeckoClient, QuoteBatch, QuoteSource};
pub use shared::insights::{project_price, InsightGenerator, InsightSource};

pub use shared::curve::{
    pattern_overlay, synthesize_curve, trend_series, CurveBounds, OverlayShape,
};
pub use shared::format::{format_change, format_market_cap, format_price};

// Refresh loop (shared across both binaries)
pub use shared::refresh::{Dashboard, DashboardHandle, RedrawTick};
pub use shared::view::{merge, AssetCard, LoadPhase, PatternPanel, ViewModel};

pub use shared::logging::{init_file_logging, init_logging};
pub use shared::widget::{render_dashboard, UiState};
