/// CryptoAI Dashboard
///
/// Live quotes for BTC, ETH and SOL next to synthetic pattern annotations.
/// Data refreshes every 30s (or on `r`), pattern curves redraw every 2s.
use std::{error::Error, io, sync::Arc, time::Duration};

use cryptoai_dashboard::{
    init_file_logging, render_dashboard, CoinGeckoClient, Dashboard, DashboardConfig,
    InsightGenerator, PredictionApi, UiState,
};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

/// Log file path from CRYPTOAI_LOG_FILE (default: cryptoai-dashboard.log)
fn get_log_file() -> String {
    std::env::var("CRYPTOAI_LOG_FILE").unwrap_or_else(|_| "cryptoai-dashboard.log".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_file_logging(get_log_file())?;
    let config = DashboardConfig::from_env()?;
    info!(api = %config.api_base_url, "Starting CryptoAI dashboard");

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let quotes = Arc::new(CoinGeckoClient::new(&config));
    let insights = Arc::new(InsightGenerator::new(config.insight_delay));
    let api = Arc::new(PredictionApi::new(&config));

    let mut ui = UiState::new(&config);
    let mut handle = Dashboard::new(config, quotes, insights).with_probe(api).start();

    let mut view = handle.view();
    let mut dirty = true;

    loop {
        if let Some(update) = handle.take_view_update() {
            view = update;
            ui.on_view(&view);
            dirty = true;
        }

        let mut ticked = false;
        while handle.redraw_ticks().try_recv().is_ok() {
            ticked = true;
        }
        if ticked {
            ui.animate(&view);
            dirty = true;
        }

        if dirty {
            terminal.draw(|f| {
                let area = f.area();
                render_dashboard(f, area, &view, &ui)
            })?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        if !handle.request_refresh() {
                            info!("Refresh already pending");
                        }
                    }
                    _ => {}
                },
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    handle.abort().await;
    info!("Dashboard stopped");
    Ok(())
}
