//! Ratatui-based terminal UI.
//!
//! The TUI runs the same pipeline as `sales report` once up front, then lets
//! the user page through an overview, a resampled trend chart, and the
//! state/group rankings.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
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
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs},
};

use crate::analysis::{Ranking, Resampled};
use crate::app::pipeline::{RunOutput, run_analysis};
use crate::domain::{AnalysisConfig, Frequency};
use crate::error::AppError;
use crate::report::format;

mod plotters_chart;

use plotters_chart::SalesTrendChart;

/// Start the TUI.
///
/// The pipeline runs before the terminal is taken over, so load/clean
/// failures print like any other command.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    let output = run_analysis(&config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, output);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    Trend,
    States,
    Groups,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Overview, Tab::Trend, Tab::States, Tab::Groups];

    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Trend => "Trend",
            Tab::States => "States",
            Tab::Groups => "Groups",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

struct App {
    config: AnalysisConfig,
    run: RunOutput,
    tab: Tab,
    frequency: Frequency,
    /// Vertical scroll of the overview text.
    scroll: u16,
    status: String,
}

impl App {
    fn new(config: AnalysisConfig, run: RunOutput) -> Self {
        let status = format!("Loaded {} rows from {}", run.table.len(), run.source);
        Self {
            config,
            run,
            tab: Tab::Overview,
            frequency: Frequency::Weekly,
            scroll: 0,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
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
        Ok(())
    }

    /// Apply one key press. Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.tab = Tab::ALL[idx];
            }
            KeyCode::Char('f') => {
                self.frequency = self.frequency.next();
                self.status = format!("Trend frequency: {}", self.frequency.label());
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    /// Re-run the pipeline; a failure keeps the previous results on screen.
    fn reload(&mut self) {
        match run_analysis(&self.config) {
            Ok(run) => {
                self.status = format!("Reloaded {} rows from {}", run.table.len(), run.source);
                self.run = run;
            }
            Err(err) => {
                tracing::warn!(%err, "reload failed");
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_tabs(frame, chunks[1]);
        match self.tab {
            Tab::Overview => self.draw_overview(frame, chunks[2]),
            Tab::Trend => self.draw_trend(frame, chunks[2]),
            Tab::States => self.draw_states(frame, chunks[2]),
            Tab::Groups => self.draw_groups(frame, chunks[2]),
        }
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let run = &self.run;
        let dates = run
            .table
            .date_range()
            .map(|(a, b)| format!("{a} .. {b}"))
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("sales", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" - {}", run.source)),
            ]),
            Line::from(Span::styled(
                format!(
                    "rows: {} | dates: {dates} | sales: {:.2} | units: {}",
                    run.table.len(),
                    run.table.total_sales(),
                    run.table.total_units()
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_tabs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let titles = Tab::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} {}", i + 1, t.title()));
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, area);
    }

    fn draw_overview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut text = String::new();
        text.push_str(&format::format_clean_report(&self.run.clean));
        text.push('\n');
        text.push_str(&format::format_describe(&self.run.summaries));
        text.push('\n');
        text.push_str(&format::format_recommendations(&crate::report::build_recommendations(
            &self.run,
        )));

        let p = Paragraph::new(text)
            .scroll((self.scroll, 0))
            .block(Block::default().title("Overview").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = format!("{} sales", self.frequency.title());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = self.run.series(self.frequency) else {
            let msg = Paragraph::new("No buckets for this frequency.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (points, x_bounds, y_bounds) = trend_points(series);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = SalesTrendChart {
            series: &points,
            x_bounds,
            y_bounds,
            x_label: "bucket end",
            y_label: "sales",
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_sales,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
    }

    fn draw_states(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let pivot_rows = self.run.pivot.states.len() as u16 + 3;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(pivot_rows)])
            .split(area);

        render_ranking_bars(frame, chunks[0], "Revenue by State", &self.run.state_revenue);

        let pivot = Paragraph::new(format::format_pivot(&self.run.pivot))
            .block(Block::default().title("State x Group").borders(Borders::ALL));
        frame.render_widget(pivot, chunks[1]);
    }

    fn draw_groups(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        render_ranking_bars(frame, top[0], "Sales by Group", &self.run.group_totals.sales);
        render_ranking_bars(frame, top[1], "Units by Group", &self.run.group_totals.units);
        render_ranking_bars(frame, rows[1], "Sales by Time of Day", &self.run.time_of_day);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/←/→ switch  1-4 jump  f frequency  ↑/↓ scroll  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Vertical bar chart of a ranking, highest first.
fn render_ranking_bars(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, ranking: &Ranking) {
    let entries = ranking_bars(ranking);
    let bars: Vec<Bar> = entries
        .iter()
        .map(|(key, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(key.clone()))
                .text_value(fmt_axis_sales(*value as f64))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let n = bars.len().max(1) as u16;
    let bar_width = (inner_width / n).saturating_sub(1).clamp(3, 12);

    let chart = BarChart::default()
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Ranking entries as `(label, rounded value)` in descending order.
fn ranking_bars(ranking: &Ranking) -> Vec<(String, u64)> {
    ranking
        .descending()
        .into_iter()
        .map(|e| (e.key, e.value.max(0.0).round() as u64))
        .collect()
}

/// Chart points and bounds for a resampled series.
///
/// X is the bucket end as days since the common era; Y starts at zero.
fn trend_points(series: &Resampled) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
    let points: Vec<(f64, f64)> = series
        .buckets
        .iter()
        .map(|b| (b.end.num_days_from_ce() as f64, b.sales))
        .collect();

    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let x_max = points.last().map(|p| p.0).unwrap_or(1.0);
    let x_bounds = if x_max > x_min {
        [x_min, x_max]
    } else {
        [x_min - 1.0, x_min + 1.0]
    };

    let y_max = points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
    let y_bounds = if y_max > 0.0 { [0.0, y_max * 1.05] } else { [0.0, 1.0] };

    (points, x_bounds, y_bounds)
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d-%b").to_string())
        .unwrap_or_default()
}

fn fmt_axis_sales(v: f64) -> String {
    if v.abs() >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v.abs() >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
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
        right: 3,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
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
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_axis_date(x_bounds[0] + u * (x_bounds[1] - x_bounds[0]));
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_axis_sales(y_bounds[0] + u * (y_bounds[1] - y_bounds[0]));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let width = label.len() as u16;
        frame.render_widget(Paragraph::new(label).style(style), Rect { x: start, y, width, height: 1 });
    }

    let x_label = Paragraph::new("bucket end")
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

    let y_label = Paragraph::new("sales").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}
