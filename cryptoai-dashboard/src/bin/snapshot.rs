/// CryptoAI Snapshot
///
/// Runs a single refresh cycle without a terminal UI and prints the merged
/// view. Exits non-zero only on configuration errors.
use std::{error::Error, sync::Arc};

use cryptoai_dashboard::{
    format_change, format_market_cap, format_price, init_logging, CoinGeckoClient, Dashboard,
    DashboardConfig, InsightGenerator, PredictionApi, ViewModel,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let config = DashboardConfig::from_env()?;

    let quotes = Arc::new(CoinGeckoClient::new(&config));
    let insights = Arc::new(InsightGenerator::new(config.insight_delay));
    let api = Arc::new(PredictionApi::new(&config));

    let dashboard = Dashboard::new(config, quotes, insights).with_probe(api);
    let view = dashboard.refresh_cycle().await;

    print_view(&view);
    Ok(())
}

fn print_view(view: &ViewModel) {
    println!("CryptoAI Analytics [{}]", view.api_status.label());
    if let Some(reason) = &view.quote_warning {
        println!("! live prices unavailable ({reason}), showing fallback data");
    }
    println!();

    for card in &view.cards {
        let quote = &card.quote;
        println!(
            "{:<9} {:<10} {:>14} {:>8}  mcap {:>9}  vol {:>9}",
            quote.symbol,
            quote.name,
            format_price(quote.price),
            format_change(quote.change_24h),
            format_market_cap(quote.market_cap),
            format_market_cap(quote.volume_24h),
        );

        if let Some(prediction) = &card.prediction {
            let change = prediction
                .expected_move_pct(quote.price)
                .map(format_change)
                .unwrap_or_else(|| "--".to_string());
            println!(
                "          target {} ({}) at {:.0}% confidence",
                format_price(prediction.predicted_price),
                change,
                prediction.confidence * 100.0
            );
        }

        if let Some(insight) = &card.insight {
            println!(
                "          {} {} {:.0}% [{} {} risk]",
                insight.pattern.title(),
                insight.sentiment,
                insight.confidence * 100.0,
                insight.timeframe,
                insight.risk,
            );
        }
    }
}
