//! Ratatui-based terminal UI.
//!
//! The dashboard shows one card per key rate (latest value, trend, provenance)
//! and the recent policy decisions. Enter opens a modal chart with the rate's
//! history; ←/→ step through single years.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use tracing::debug;

use crate::app::pipeline::{RateService, current_rates};
use crate::cli::RangeArgs;
use crate::data::ObservationSource;
use crate::domain::{CurrentRate, RateSeries, SeriesKind, Trend};
use crate::error::AppError;
use crate::report::fmt_rate;

mod plotters_chart;
pub mod registry;

use plotters_chart::RateStepChart;
use registry::{ChartHandle, ChartRegistry, ChartView};

/// Start the TUI.
pub fn run(args: RangeArgs) -> Result<(), AppError> {
    let service = crate::app::build_service(&args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(service);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<S> {
    service: RateService<S>,
    series: BTreeMap<SeriesKind, RateSeries>,
    current: BTreeMap<SeriesKind, CurrentRate>,
    selected: SeriesKind,
    /// The open chart's view; the chart always belongs to `selected`.
    modal: Option<ChartView>,
    charts: ChartRegistry,
    needs_refresh: bool,
    status: String,
}

impl<S: ObservationSource> App<S> {
    fn new(service: RateService<S>) -> Self {
        Self {
            service,
            series: BTreeMap::new(),
            current: BTreeMap::new(),
            selected: SeriesKind::MainRefinancing,
            modal: None,
            charts: ChartRegistry::new(),
            needs_refresh: true,
            status: "Fetching ECB rates...".to_string(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // Draw the "fetching" status first; the refresh itself blocks.
            if self.needs_refresh {
                self.refresh();
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }

        self.charts.close_all();
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if let KeyCode::Char('q') = code {
            return true;
        }
        if let KeyCode::Char('r') = code {
            self.needs_refresh = true;
            self.status = "Refreshing...".to_string();
            return false;
        }

        match self.modal {
            Some(view) => self.handle_modal_key(code, view),
            None => self.handle_card_key(code),
        }
        false
    }

    fn handle_card_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.selected = self.selected.prev(),
            KeyCode::Down => self.selected = self.selected.next(),
            KeyCode::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                self.selected = SeriesKind::ALL[idx];
            }
            KeyCode::Enter => self.open_chart(ChartView::AllYears),
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, code: KeyCode, view: ChartView) {
        let years = self
            .series
            .get(&self.selected)
            .map(RateSeries::years)
            .unwrap_or_default();

        match code {
            KeyCode::Esc => self.close_chart(),
            KeyCode::Left => self.open_chart(view.step(&years, -1)),
            KeyCode::Right => self.open_chart(view.step(&years, 1)),
            KeyCode::Char('a') => self.open_chart(ChartView::AllYears),
            _ => {}
        }
    }

    fn open_chart(&mut self, view: ChartView) {
        let Some(series) = self.series.get(&self.selected) else {
            self.status = "No data yet.".to_string();
            return;
        };
        let handle = self.charts.open(series, view);
        debug!(series = %handle.kind, view = %view.title(), points = handle.points.len(), "chart opened");
        self.modal = Some(view);
    }

    fn close_chart(&mut self) {
        self.charts.close(self.selected);
        self.modal = None;
    }

    fn refresh(&mut self) {
        self.needs_refresh = false;
        let today = Local::now().date_naive();
        self.series = self.service.all_rates();
        self.current = current_rates(&self.series, today);

        let sources = SeriesKind::ALL
            .iter()
            .filter_map(|kind| {
                self.series
                    .get(kind)
                    .map(|s| format!("{}: {}", kind.id(), s.source.display_name()))
            })
            .collect::<Vec<_>>()
            .join(" | ");
        self.status = format!("Updated {today} ({sources})");

        // Rebuild an open chart from the new data; a year that vanished falls back to all years.
        if let Some(view) = self.modal {
            let view = match view {
                ChartView::Year(year)
                    if self
                        .series
                        .get(&self.selected)
                        .is_some_and(|s| s.bucket(year).is_some()) =>
                {
                    view
                }
                _ => ChartView::AllYears,
            };
            self.open_chart(view);
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.modal.is_some() {
            self.draw_modal(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let config = self.service.config();
        let latest = crate::data::decisions::latest_decision()
            .map(|d| crate::report::format_latest_decision(&d))
            .unwrap_or_default();
        let lines = vec![
            Line::from(vec![
                Span::styled("ecb", Style::default().fg(Color::Cyan)),
                Span::raw(" | ECB key interest rates  "),
                Span::styled(latest, Style::default().fg(Color::Gray)),
            ]),
            Line::from(Span::styled(
                format!(
                    "years: {}..{} | mode: {}",
                    config.start_year,
                    config.end_year,
                    if config.offline { "offline" } else { "online" },
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(area);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .split(chunks[0]);

        for (i, kind) in SeriesKind::ALL.iter().enumerate() {
            self.draw_card(frame, cards[i], *kind, i + 1);
        }
        self.draw_decisions(frame, chunks[1]);
    }

    fn draw_card(&self, frame: &mut ratatui::Frame<'_>, area: Rect, kind: SeriesKind, key: usize) {
        let selected = kind == self.selected;
        let border = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .title(format!("{key} {}", kind.label()))
            .borders(Borders::ALL)
            .border_style(border);

        let Some(rate) = self.current.get(&kind) else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let source = self
            .series
            .get(&kind)
            .map(|s| s.source.display_name())
            .unwrap_or("-");

        let lines = vec![
            Line::from(Span::styled(
                fmt_rate(rate.value),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{} {}", rate.trend.symbol(), rate.trend.display_name()),
                Style::default().fg(trend_color(rate.trend)),
            )),
            Line::from(Span::styled(
                format!("{source} | as of {}", rate.as_of),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(p, area);
    }

    fn draw_decisions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = vec![ListItem::new(Span::styled(
            format!("{:<12} {:>8} {:>8} {:>8}", "date", "deposit", "refi", "lending"),
            Style::default().fg(Color::Gray),
        ))];
        for d in crate::data::decisions::decisions() {
            items.push(ListItem::new(format!(
                "{:<12} {:>8.2} {:>8.2} {:>8.2}",
                d.date.to_string(),
                d.deposit_facility,
                d.main_refinancing,
                d.marginal_lending
            )));
        }

        let list = List::new(items).block(Block::default().title("Policy decisions").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.modal.is_some() {
            "←/→ year  a all years  Esc close  r refresh  q quit"
        } else {
            "↑/↓ or 1-3 select  Enter chart  r refresh  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_modal(&self, frame: &mut ratatui::Frame<'_>, size: Rect) {
        let area = centered_rect(size, 85, 80);
        frame.render_widget(Clear, area);

        let Some(handle) = self.charts.get(self.selected) else {
            return;
        };

        let source = self
            .series
            .get(&self.selected)
            .map(|s| s.source.display_name())
            .unwrap_or("-");
        let block = Block::default()
            .title(format!("{} | {} ({source})", self.selected.label(), handle.view.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if handle.points.is_empty() {
            let msg = Paragraph::new("No values for this period.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let x_label = match handle.view {
            ChartView::AllYears => "year",
            ChartView::Year(_) => "month",
        };
        let (chart_rect, insets) = chart_layout(inner);
        let widget = RateStepChart {
            line: &handle.line,
            points: &handle.points,
            x_bounds: handle.x_bounds,
            y_bounds: handle.y_bounds,
            x_label,
            y_label: "rate (%)",
            fmt_x: handle.fmt_x(),
            fmt_y: fmt_axis_y_pct,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, handle, x_label);
        }
    }
}

fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Increasing => Color::Green,
        Trend::Decreasing => Color::Red,
        Trend::NoChange | Trend::Indeterminate => Color::Gray,
    }
}

fn centered_rect(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let width = area.width * pct_x / 100;
    let height = area.height * pct_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn fmt_axis_y_pct(v: f64) -> String {
    format!("{v:.2}")
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    handle: &ChartHandle,
    x_label: &str,
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);
    let [x0, x1] = handle.x_bounds;
    let [y0, y1] = handle.y_bounds;
    let fmt_x = handle.fmt_x();

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_x(x0 + u * (x1 - x0));
        let label_len = label.len() as u16;
        let start = x.saturating_sub(label_len / 2);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_y_pct(y0 + u * (y1 - y0));
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(x_label.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("rate %")
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::OfflineSource;
    use crate::domain::DashboardConfig;
    use ratatui::backend::TestBackend;

    fn app() -> App<OfflineSource> {
        let config = DashboardConfig {
            start_year: 2022,
            end_year: 2025,
            offline: true,
        };
        let mut app = App::new(RateService::new(OfflineSource, config));
        app.refresh();
        app
    }

    #[test]
    fn refresh_fills_all_cards() {
        let app = app();
        assert_eq!(app.current.len(), 3);
        assert!(!app.needs_refresh);
        assert!(app.status.contains("refi: static table"));
    }

    #[test]
    fn number_keys_and_arrows_select_cards() {
        let mut app = app();
        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.selected, SeriesKind::ALL[2]);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected, SeriesKind::ALL[2].next());
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, SeriesKind::ALL[2]);
    }

    #[test]
    fn chart_navigation_reuses_one_handle_per_rate() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.modal, Some(ChartView::AllYears));
        assert_eq!(app.charts.len(), 1);

        app.handle_key(KeyCode::Left);
        assert_eq!(app.modal, Some(ChartView::Year(2025)));
        app.handle_key(KeyCode::Left);
        assert_eq!(app.modal, Some(ChartView::Year(2024)));
        app.handle_key(KeyCode::Right);
        assert_eq!(app.modal, Some(ChartView::Year(2025)));
        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.modal, Some(ChartView::AllYears));
        assert_eq!(app.charts.len(), 1);
        assert_eq!(app.charts.disposed_count(), 4);

        app.handle_key(KeyCode::Esc);
        assert_eq!(app.modal, None);
        assert!(app.charts.is_empty());
        assert_eq!(app.charts.disposed_count(), 5);
    }

    #[test]
    fn card_keys_are_ignored_while_the_chart_is_open() {
        let mut app = app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char('2'));
        assert_eq!(app.selected, SeriesKind::MainRefinancing);
    }

    #[test]
    fn refresh_and_quit_keys() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Char('r')));
        assert!(app.needs_refresh);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn dashboard_renders_cards() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Main Refinancing Rate"));
        assert!(text.contains("2.15%"));
        assert!(text.contains("Policy decisions"));
        assert!(text.contains("Last decision 2025-06-11"));
    }
}
