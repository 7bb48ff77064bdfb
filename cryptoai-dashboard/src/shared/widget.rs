//! Ratatui rendering for the dashboard
//!
//! Rendering is a pure function of the published [`ViewModel`] and the
//! locally regenerated [`UiState`] (trend series and pattern curves).

use std::collections::HashMap;
use std::f64::consts::PI;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Borders, Gauge, Paragraph, Sparkline, Wrap,
    },
    Frame,
};

use super::api::ApiStatus;
use super::config::DashboardConfig;
use super::curve::{
    pattern_overlay, synthesize_curve, trend_series, CurveBounds, OverlayShape,
    DEFAULT_CURVE_POINTS, DEFAULT_TREND_POINTS,
};
use super::format::{format_change, format_market_cap, format_price};
use super::random::{RandomSource, SystemRandom};
use super::types::{CurvePoint, PatternInsight, RiskLevel, Sentiment};
use super::view::{AssetCard, PatternPanel, ViewModel};

const C_BUY: Color = Color::Rgb(100, 220, 100);
const C_SELL: Color = Color::Rgb(220, 100, 100);
const C_NEUTRAL: Color = Color::Rgb(180, 180, 100);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_GAUGE_BG: Color = Color::Rgb(30, 30, 40);

/// Horizontal extent of every pattern curve, in canvas units
pub const CURVE_WIDTH: f64 = 100.0;

/// Pieces a dashed overlay segment is split into
const DASH_PIECES: usize = 12;

/// Samples used to approximate the cup outline
const ARC_SAMPLES: usize = 24;

/// A regenerated curve for one pattern panel
#[derive(Debug, Clone)]
struct PanelCurve {
    points: Vec<CurvePoint>,
    overlay: Vec<OverlayShape>,
    bounds: CurveBounds,
}

/// Decorative state regenerated on the UI side
pub struct UiState {
    rng: Box<dyn RandomSource>,
    refresh_interval: Duration,
    curve_points: usize,
    trends: HashMap<String, Vec<f64>>,
    curves: Vec<PanelCurve>,
}

impl UiState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            rng: Box::new(SystemRandom::new()),
            refresh_interval: config.refresh_interval,
            curve_points: DEFAULT_CURVE_POINTS,
            trends: HashMap::new(),
            curves: Vec::new(),
        }
    }

    /// Replace the random source behind trends and curves
    pub fn with_random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(source);
        self
    }

    /// A new view arrived: regenerate trend series and curves
    pub fn on_view(&mut self, view: &ViewModel) {
        self.trends.clear();
        for card in &view.cards {
            let series = trend_series(self.rng.as_mut(), card.quote.price, DEFAULT_TREND_POINTS);
            self.trends.insert(card.quote.symbol.clone(), series);
        }
        self.animate(view);
    }

    /// Redraw tick: regenerate the pattern curves only
    pub fn animate(&mut self, view: &ViewModel) {
        let curve_points = self.curve_points;
        self.curves = view
            .panels
            .iter()
            .map(|panel| {
                let pattern = panel.insight.pattern;
                let points = synthesize_curve(
                    self.rng.as_mut(),
                    panel.quote.price,
                    Some(pattern),
                    curve_points,
                    CURVE_WIDTH,
                );
                PanelCurve {
                    overlay: pattern_overlay(&points, pattern, CURVE_WIDTH),
                    bounds: CurveBounds::of(&points),
                    points,
                }
            })
            .collect();
    }
}

/// Render the whole dashboard into `area`
pub fn render_dashboard(f: &mut Frame, area: Rect, view: &ViewModel, ui: &UiState) {
    if !view.is_ready() {
        render_loading(f, area);
        return;
    }

    let banner_height = if view.quote_warning.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Length(11),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(f, chunks[0], view);
    if let Some(reason) = &view.quote_warning {
        render_banner(f, chunks[1], reason);
    }
    render_cards(f, chunks[2], &view.cards, ui);
    render_panels(f, chunks[3], &view.panels, ui);
    render_footer(f, chunks[4], view.last_updated, ui.refresh_interval);
}

fn render_loading(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let text = Paragraph::new(Line::from(Span::styled(
        "Loading CryptoAI Analytics...",
        Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(text, middle[1]);
}

fn render_header(f: &mut Frame, area: Rect, view: &ViewModel) {
    let chip_color = match view.api_status {
        ApiStatus::Connected => C_BUY,
        ApiStatus::Offline(_) => C_SELL,
        ApiStatus::Unknown => C_NEUTRAL,
    };

    let mut spans = vec![
        Span::styled(
            "CryptoAI Analytics",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("● {}", view.api_status.label()),
            Style::default().fg(chip_color),
        ),
    ];
    if let ApiStatus::Offline(reason) = &view.api_status {
        spans.push(Span::styled(format!(" ({reason})"), Style::default().fg(C_SELL)));
    }
    if let Some(updated) = view.last_updated {
        spans.push(Span::styled(
            format!("  Updated {}", clock(updated)),
            Style::default().fg(C_DIM),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_DIM)),
    );
    f.render_widget(header, area);
}

fn render_banner(f: &mut Frame, area: Rect, reason: &str) {
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(
            "⚠ Live prices unavailable ",
            Style::default().fg(C_NEUTRAL).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({reason}), showing fallback data"),
            Style::default().fg(C_NEUTRAL),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_NEUTRAL)),
    );
    f.render_widget(banner, area);
}

fn render_cards(f: &mut Frame, area: Rect, cards: &[AssetCard], ui: &UiState) {
    if cards.is_empty() {
        let empty = Paragraph::new(Span::styled("No assets", Style::default().fg(C_DIM)))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let constraints = vec![Constraint::Ratio(1, cards.len() as u32); cards.len()];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        render_card(f, *column, card, ui.trends.get(&card.quote.symbol));
    }
}

fn render_card(f: &mut Frame, area: Rect, card: &AssetCard, trend: Option<&Vec<f64>>) {
    let quote = &card.quote;
    let block = Block::default()
        .title(format!(" {} ({}) ", quote.name, quote.symbol))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    // === PRICE ===
    let (arrow, change_color) = if quote.is_up() { ("▲", C_BUY) } else { ("▼", C_SELL) };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format_price(quote.price),
                Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}{}", arrow, format_change(quote.change_24h)),
                Style::default().fg(change_color),
            ),
        ])),
        rows[0],
    );

    // === TREND ===
    if let Some(series) = trend {
        let data = sparkline_data(series);
        let sparkline = Sparkline::default()
            .data(&data)
            .style(Style::default().fg(change_color))
            .max(data.iter().max().copied().unwrap_or(100));
        f.render_widget(sparkline, rows[1]);
    }

    // === PATTERN ===
    match &card.insight {
        Some(insight) => {
            f.render_widget(Paragraph::new(pattern_chip(insight)), rows[2]);
            let gauge = Gauge::default()
                .gauge_style(
                    Style::default()
                        .fg(confidence_color(insight.confidence))
                        .bg(C_GAUGE_BG),
                )
                .ratio(insight.confidence.clamp(0.0, 1.0))
                .label(Span::styled(
                    format!("AI confidence {:.0}%", insight.confidence * 100.0),
                    Style::default().fg(C_BRIGHT),
                ));
            f.render_widget(gauge, rows[3]);
        }
        None => {
            f.render_widget(
                Paragraph::new(Span::styled("No pattern detected", Style::default().fg(C_DIM))),
                rows[2],
            );
        }
    }

    // === PREDICTION / MARKET ===
    let mut lines = Vec::new();
    if let Some(prediction) = &card.prediction {
        let mut spans = vec![
            Span::styled("Target ", Style::default().fg(C_DIM)),
            Span::styled(
                format_price(prediction.predicted_price),
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(pct) = prediction.expected_move_pct(quote.price) {
            let color = if pct >= 0.0 { C_BUY } else { C_SELL };
            spans.push(Span::styled(format!(" ({})", format_change(pct)), Style::default().fg(color)));
        }
        spans.push(Span::styled(
            format!("  {:.0}% conf", prediction.confidence * 100.0),
            Style::default().fg(confidence_color(prediction.confidence)),
        ));
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(vec![
        Span::styled("MCap ", Style::default().fg(C_DIM)),
        Span::styled(format_market_cap(quote.market_cap), Style::default().fg(C_BRIGHT)),
        Span::styled("  Vol ", Style::default().fg(C_DIM)),
        Span::styled(format_market_cap(quote.volume_24h), Style::default().fg(C_BRIGHT)),
    ]));
    f.render_widget(Paragraph::new(lines), rows[4]);
}

fn render_panels(f: &mut Frame, area: Rect, panels: &[PatternPanel], ui: &UiState) {
    if panels.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "Waiting for pattern analysis...",
            Style::default().fg(C_DIM),
        ))
        .block(Block::default().title(" AI PATTERNS ").borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let constraints = vec![Constraint::Ratio(1, panels.len() as u32); panels.len()];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (index, (panel, column)) in panels.iter().zip(columns.iter()).enumerate() {
        render_panel(f, *column, panel, ui.curves.get(index));
    }
}

fn render_panel(f: &mut Frame, area: Rect, panel: &PatternPanel, curve: Option<&PanelCurve>) {
    let insight = &panel.insight;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(area);

    let y_bounds = curve
        .map(|curve| curve.bounds.padded(0.1))
        .unwrap_or(CurveBounds { min: 0.0, max: 1.0 });
    let current_color = sentiment_color(insight.sentiment);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(
                    " {} {} · {} ",
                    insight.pattern.glyph(),
                    insight.pattern.title(),
                    panel.quote.symbol
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(current_color)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, CURVE_WIDTH])
        .y_bounds([y_bounds.min, y_bounds.max])
        .paint(move |ctx| {
            if let Some(curve) = curve {
                paint_curve(ctx, curve, current_color);
            }
        });
    f.render_widget(canvas, rows[0]);

    let details = Paragraph::new(vec![
        Line::from(Span::styled(insight.pattern.description(), Style::default().fg(C_BRIGHT))),
        Line::from(vec![
            Span::styled(
                format!("{:.0}%", insight.confidence * 100.0),
                Style::default()
                    .fg(confidence_color(insight.confidence))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}  ", insight.sentiment.as_str().to_uppercase()),
                Style::default().fg(current_color),
            ),
            Span::styled(format!("TF {}", insight.timeframe), Style::default().fg(C_DIM)),
            Span::styled("  Risk ", Style::default().fg(C_DIM)),
            Span::styled(insight.risk.as_str(), Style::default().fg(risk_color(insight.risk))),
        ]),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_style(Style::default().fg(C_DIM)),
    );
    f.render_widget(details, rows[1]);
}

fn paint_curve(ctx: &mut Context, curve: &PanelCurve, current_color: Color) {
    for pair in curve.points.windows(2) {
        ctx.draw(&CanvasLine::new(pair[0].x, pair[0].price, pair[1].x, pair[1].price, C_ACCENT));
    }

    for shape in &curve.overlay {
        match shape {
            OverlayShape::Segment { from, to, dashed } => {
                if *dashed {
                    for (a, b) in dash_pieces(*from, *to, DASH_PIECES) {
                        ctx.draw(&CanvasLine::new(a.0, a.1, b.0, b.1, C_NEUTRAL));
                    }
                } else {
                    ctx.draw(&CanvasLine::new(from.0, from.1, to.0, to.1, C_NEUTRAL));
                }
            }
            OverlayShape::HalfCircle { center, radius } => {
                // Radius is in x units; keep the arc proportional on the price axis
                let radius_y = radius / CURVE_WIDTH * curve.bounds.range();
                let arc = (0..=ARC_SAMPLES)
                    .map(|i| {
                        let theta = PI * i as f64 / ARC_SAMPLES as f64;
                        (center.0 - radius * theta.cos(), center.1 - radius_y * theta.sin())
                    })
                    .collect::<Vec<_>>();
                for pair in arc.windows(2) {
                    ctx.draw(&CanvasLine::new(pair[0].0, pair[0].1, pair[1].0, pair[1].1, C_NEUTRAL));
                }
            }
            OverlayShape::Label { at, text } => {
                ctx.print(at.0, at.1, Span::styled(*text, Style::default().fg(C_NEUTRAL)));
            }
        }
    }

    let markers = curve
        .points
        .iter()
        .step_by(5)
        .map(|point| (point.x, point.price))
        .collect::<Vec<_>>();
    ctx.draw(&Points {
        coords: &markers,
        color: C_BRIGHT,
    });

    if let Some(last) = curve.points.last() {
        ctx.draw(&Points {
            coords: &[(last.x, last.price)],
            color: current_color,
        });
    }

    ctx.print(
        0.0,
        curve.bounds.max,
        Span::styled(format_price(curve.bounds.max), Style::default().fg(C_DIM)),
    );
    ctx.print(
        0.0,
        curve.bounds.min,
        Span::styled(format_price(curve.bounds.min), Style::default().fg(C_DIM)),
    );
}

fn render_footer(f: &mut Frame, area: Rect, last_updated: Option<DateTime<Utc>>, refresh: Duration) {
    let updated = last_updated.map(clock).unwrap_or_else(|| "--".to_string());
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(format!("Last updated {updated}"), Style::default().fg(C_DIM)),
        Span::styled(
            format!("  ·  refresh every {}s", refresh.as_secs()),
            Style::default().fg(C_DIM),
        ),
        Span::styled("  ·  ", Style::default().fg(C_DIM)),
        Span::styled("r", Style::default().fg(C_ACCENT)),
        Span::styled(" refresh  ", Style::default().fg(C_DIM)),
        Span::styled("q/Esc", Style::default().fg(C_ACCENT)),
        Span::styled(" quit", Style::default().fg(C_DIM)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_DIM)),
    );
    f.render_widget(footer, area);
}

fn pattern_chip(insight: &PatternInsight) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{} {}", insight.pattern.glyph(), insight.pattern.title()),
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", insight.sentiment.as_str()),
            Style::default().fg(sentiment_color(insight.sentiment)),
        ),
    ])
}

/// Confidence tier colour
fn confidence_color(confidence: f64) -> Color {
    if confidence > 0.9 {
        C_BUY
    } else if confidence > 0.8 {
        C_ACCENT
    } else if confidence > 0.7 {
        C_NEUTRAL
    } else {
        C_SELL
    }
}

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Bullish => C_BUY,
        Sentiment::Bearish => C_SELL,
        Sentiment::Neutral => C_NEUTRAL,
    }
}

fn risk_color(risk: RiskLevel) -> Color {
    match risk {
        RiskLevel::Low => C_BUY,
        RiskLevel::Medium => C_NEUTRAL,
        RiskLevel::High => C_SELL,
    }
}

fn clock(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Rescale a price series to sparkline heights (1..=100)
fn sparkline_data(series: &[f64]) -> Vec<u64> {
    let lo = series.iter().copied().fold(f64::MAX, f64::min);
    let hi = series.iter().copied().fold(f64::MIN, f64::max);
    let span = (hi - lo).max(f64::EPSILON);
    series
        .iter()
        .map(|value| ((value - lo) / span * 99.0).round() as u64 + 1)
        .collect()
}

/// Every other piece of a segment split into `pieces` parts
fn dash_pieces(from: (f64, f64), to: (f64, f64), pieces: usize) -> Vec<((f64, f64), (f64, f64))> {
    let lerp = |t: f64| (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
    (0..pieces)
        .step_by(2)
        .map(|i| {
            let start = i as f64 / pieces as f64;
            let end = (i + 1) as f64 / pieces as f64;
            (lerp(start), lerp(end))
        })
        .collect()
}
