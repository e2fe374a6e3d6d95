//! Ratatui-based terminal UI.
//!
//! Shows the raw and smoothed series with detected turning points, plus the
//! boom/bust segment list. Cadence and validation policy can be toggled and
//! the run re-executed without leaving the UI.

use std::io;
use std::path::PathBuf;
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
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{RunOutput, run_analysis};
use crate::domain::{AnalysisConfig, Classification, ExtremumKind};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::CycleChart;

const DEBUG_DIR: &str = "debug";

/// Start the TUI.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config);
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

struct App {
    config: AnalysisConfig,
    run: Option<RunOutput>,
    selected_segment: usize,
    status: String,
}

impl App {
    fn new(config: AnalysisConfig) -> Self {
        let mut app = Self {
            config,
            run: None,
            selected_segment: 0,
            status: String::new(),
        };
        app.reload();
        app
    }

    /// Re-run the pipeline; failures are shown in the status line.
    fn reload(&mut self) {
        self.selected_segment = 0;
        match run_analysis(&self.config) {
            Ok(run) => {
                self.status = format!(
                    "{} turning points, {} segments",
                    run.analysis.extrema.len(),
                    run.analysis.segments.len()
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = err.to_string();
                self.run = None;
            }
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
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_segment = self.selected_segment.saturating_sub(1);
            }
            KeyCode::Down => {
                let n = self.run.as_ref().map_or(0, |r| r.analysis.segments.len());
                if self.selected_segment + 1 < n {
                    self.selected_segment += 1;
                }
            }
            KeyCode::Char('c') => {
                self.config.cadence = self.config.cadence.toggle();
                self.reload();
            }
            KeyCode::Char('p') => {
                self.config.policy = self.config.policy.toggle();
                self.reload();
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let path = crate::io::annotated_path(&self.config.input);
        self.status = match crate::io::write_annotated_csv(&path, &run.analysis.rows) {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn write_debug(&mut self) {
        let Some(run) = &self.run else {
            self.status = "No run to debug.".to_string();
            return;
        };
        self.status = match crate::debug::write_debug_bundle(&PathBuf::from(DEBUG_DIR), run) {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);
        self.draw_chart(frame, body[0]);
        self.draw_segments(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines = vec![Line::from(vec![
            Span::styled("cycles", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" - {}", self.config.input.display())),
        ])];

        let detail = match &self.run {
            Some(run) => format!(
                "cadence: {} | policy: {:?} | rows: {}/{} | threshold: {:.2} | min sep: {}",
                self.config.cadence,
                self.config.policy,
                run.loaded.rows_used,
                run.loaded.rows_read,
                run.analysis.detection.threshold,
                run.analysis.detection.params.min_separation,
            ),
            None => format!("cadence: {} | policy: {:?}", self.config.cadence, self.config.policy),
        };
        lines.push(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Series").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No analysis (see status line).").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let data = chart_series(run);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = CycleChart {
            raw: &data.raw,
            smoothed: &data.smoothed,
            peaks: &data.peaks,
            troughs: &data.troughs,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            x_label: "year",
            y_label: "value",
            fmt_x: fmt_axis_year,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, data.x_bounds, data.y_bounds);
        }
    }

    fn draw_segments(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Boom / Bust").borders(Borders::ALL);
        let Some(run) = self.run.as_ref().filter(|r| !r.analysis.segments.is_empty()) else {
            let msg = Paragraph::new("Fewer than two turning points.")
                .style(Style::default().fg(Color::Gray))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let items: Vec<ListItem> = run
            .analysis
            .segments
            .iter()
            .map(|s| {
                let color = match s.classification {
                    Classification::Boom => Color::Green,
                    Classification::Bust => Color::Red,
                };
                ListItem::new(crate::report::format_segment_line(s)).style(Style::default().fg(color))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        state.select(Some(self.selected_segment));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ segments  c cadence  p policy  r reload  e export  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series in (fractional year, value) coordinates.
#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    raw: Vec<(f64, f64)>,
    smoothed: Vec<(f64, f64)>,
    peaks: Vec<(f64, f64)>,
    troughs: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

fn chart_series(run: &RunOutput) -> ChartData {
    let rows = &run.analysis.rows;
    let raw: Vec<_> = rows.iter().map(|r| (year_fraction(r.date), r.value)).collect();
    let smoothed: Vec<_> = rows.iter().map(|r| (year_fraction(r.date), r.smoothed)).collect();

    let point = |kind: ExtremumKind| -> Vec<(f64, f64)> {
        run.analysis
            .extrema
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| (year_fraction(e.date), e.value))
            .collect()
    };

    let x_bounds = match (raw.first(), raw.last()) {
        (Some(a), Some(b)) if b.0 > a.0 => [a.0, b.0],
        _ => [0.0, 1.0],
    };

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in raw.iter().chain(smoothed.iter()) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-12);

    ChartData {
        peaks: point(ExtremumKind::Peak),
        troughs: point(ExtremumKind::Trough),
        raw,
        smoothed,
        x_bounds,
        y_bounds: [y_min - pad, y_max + pad],
    }
}

fn year_fraction(date: NaiveDate) -> f64 {
    date.year() as f64 + date.ordinal0() as f64 / 365.25
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.0}")
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

    let y = chart.y + chart.height;
    if y < inner.y + inner.height - 1 {
        for i in 0..ticks {
            let u = i as f64 / (ticks as f64 - 1.0);
            let label = fmt_axis_year(x_bounds[0] + u * (x_bounds[1] - x_bounds[0]));
            let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
            let rect = Rect {
                x: x.saturating_sub(label.len() as u16 / 2),
                y,
                width: label.len() as u16,
                height: 1,
            };
            frame.render_widget(Paragraph::new(label).style(style), rect);
        }
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let label = fmt_axis_value(y_bounds[0] + u * (y_bounds[1] - y_bounds[0]));
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let start = (inner.x + insets.left.saturating_sub(1)).saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let rect = Rect {
            x: start,
            y,
            width: label.len() as u16,
            height: 1,
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);
    }

    let x_label = Paragraph::new("year")
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
}
