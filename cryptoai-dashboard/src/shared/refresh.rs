//! Refresh and redraw scheduling
//!
//! Two independent tasks drive the dashboard. The refresh task runs one
//! cycle immediately and then on every refresh tick or manual request,
//! publishing each merged [`ViewModel`] through a `watch` channel. The redraw
//! ticker only emits [`RedrawTick`]s so the UI can regenerate its curves.
//!
//! Cycles run inline in the refresh task, so two of them never overlap.
//! Missed ticks are skipped and manual requests are coalesced into a single
//! pending slot.

use std::sync::Arc;

use futures::future::OptionFuture;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::api::{ApiStatus, ConnectivityProbe};
use super::config::DashboardConfig;
use super::insights::InsightSource;
use super::quotes::QuoteSource;
use super::view::{merge, ViewModel};

/// Capacity of the redraw tick channel; extra ticks are dropped
const REDRAW_BUFFER: usize = 4;

/// Emitted by the redraw ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedrawTick;

/// Wires the data sources together and schedules refreshes
pub struct Dashboard {
    config: DashboardConfig,
    quotes: Arc<dyn QuoteSource>,
    insights: Arc<dyn InsightSource>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        quotes: Arc<dyn QuoteSource>,
        insights: Arc<dyn InsightSource>,
    ) -> Self {
        Self {
            config,
            quotes,
            insights,
            probe: None,
        }
    }

    /// Report backend reachability in every cycle
    pub fn with_probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run one refresh cycle
    ///
    /// Quotes, insights and the optional probe run concurrently. The merge
    /// waits for all of them, so the cycle takes as long as the slowest.
    pub async fn refresh_cycle(&self) -> ViewModel {
        let assets = self.config.assets.as_slice();
        let probe: OptionFuture<_> = self.probe.as_ref().map(|probe| probe.probe()).into();

        let (batch, insights, api_status) = tokio::join!(
            self.quotes.fetch_quotes(assets),
            self.insights.generate_insights(assets),
            probe,
        );

        merge(batch, insights, api_status.unwrap_or_default())
    }

    /// Spawn the refresh task and the redraw ticker
    pub fn start(self) -> DashboardHandle {
        let (view_tx, view_rx) = watch::channel(Arc::new(ViewModel::loading()));
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let (redraw_tx, redraw_rx) = mpsc::channel(REDRAW_BUFFER);
        let (refresh_shutdown_tx, refresh_shutdown_rx) = watch::channel(false);
        let (redraw_shutdown_tx, redraw_shutdown_rx) = watch::channel(false);

        let redraw_interval = self.config.redraw_interval;

        let refresh_task = tokio::spawn(async move {
            run_refresh_loop(self, view_tx, refresh_rx, refresh_shutdown_rx).await;
        });
        let redraw_task = tokio::spawn(async move {
            run_redraw_ticker(redraw_interval, redraw_tx, redraw_shutdown_rx).await;
        });

        DashboardHandle {
            view_rx,
            redraw_rx,
            refresh_tx,
            refresh_shutdown_tx,
            redraw_shutdown_tx,
            tasks: vec![refresh_task, redraw_task],
        }
    }
}

/// Control surface of a running dashboard
///
/// Dropping the handle stops both tasks.
pub struct DashboardHandle {
    view_rx: watch::Receiver<Arc<ViewModel>>,
    redraw_rx: mpsc::Receiver<RedrawTick>,
    refresh_tx: mpsc::Sender<()>,
    refresh_shutdown_tx: watch::Sender<bool>,
    redraw_shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl DashboardHandle {
    /// Latest published view
    pub fn view(&self) -> Arc<ViewModel> {
        self.view_rx.borrow().clone()
    }

    /// Independent receiver for view updates
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewModel>> {
        self.view_rx.clone()
    }

    /// Take the latest view if one was published since the last call
    pub fn take_view_update(&mut self) -> Option<Arc<ViewModel>> {
        match self.view_rx.has_changed() {
            Ok(true) => Some(self.view_rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Redraw ticks from the ticker task
    pub fn redraw_ticks(&mut self) -> &mut mpsc::Receiver<RedrawTick> {
        &mut self.redraw_rx
    }

    /// Ask for an out-of-schedule refresh
    ///
    /// Returns `false` when a request is already pending or the dashboard
    /// has been torn down.
    pub fn request_refresh(&self) -> bool {
        if self.is_torn_down() {
            return false;
        }
        self.refresh_tx.try_send(()).is_ok()
    }

    /// Stop both tasks
    ///
    /// No new cycle or redraw tick starts afterwards. A cycle already in
    /// flight finishes but its result is not published.
    pub fn teardown(&self) {
        self.refresh_shutdown_tx.send_replace(true);
        self.redraw_shutdown_tx.send_replace(true);
    }

    pub fn is_torn_down(&self) -> bool {
        *self.refresh_shutdown_tx.borrow()
    }

    /// Tear down and wait for both tasks to exit, including any cycle in flight
    pub async fn shutdown(self) {
        self.teardown();
        join_tasks(self.tasks).await;
    }

    /// Tear down and cancel both tasks without waiting for a cycle in flight
    ///
    /// The cancelled cycle is never published, same as after [`teardown`].
    ///
    /// [`teardown`]: DashboardHandle::teardown
    pub async fn abort(self) {
        self.teardown();
        for task in &self.tasks {
            task.abort();
        }
        join_tasks(self.tasks).await;
    }
}

async fn join_tasks(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        if let Err(error) = task.await {
            if error.is_panic() {
                warn!(%error, "Dashboard task panicked");
            }
        }
    }
}

async fn run_refresh_loop(
    dashboard: Dashboard,
    view_tx: watch::Sender<Arc<ViewModel>>,
    mut refresh_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = time::interval(dashboard.config.refresh_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                debug!("Refresh task shutting down");
                break;
            }
            _ = interval.tick() => {}
            Some(()) = refresh_rx.recv() => {
                debug!("Manual refresh requested");
            }
        }

        let started = Instant::now();
        let view = dashboard.refresh_cycle().await;

        if *shutdown_rx.borrow() {
            debug!("Dashboard torn down during refresh, discarding result");
            break;
        }

        info!(
            cards = view.cards.len(),
            panels = view.panels.len(),
            degraded = view.quote_warning.is_some(),
            api = view.api_status.label(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Refresh cycle complete"
        );
        view_tx.send_replace(Arc::new(view));
    }
}

async fn run_redraw_ticker(
    period: std::time::Duration,
    redraw_tx: mpsc::Sender<RedrawTick>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                debug!("Redraw ticker shutting down");
                break;
            }
            _ = interval.tick() => {
                if let Err(mpsc::error::TrySendError::Closed(_)) = redraw_tx.try_send(RedrawTick) {
                    break;
                }
            }
        }
    }
}
