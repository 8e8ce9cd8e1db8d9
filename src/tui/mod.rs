//! Ratatui-based terminal UI.
//!
//! One screen per tool: the form on the left, the live analysis and the
//! prediction results on the right, with a Plotters bar chart underneath.

use std::io;
use std::time::Duration;

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
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::pipeline::{CarRun, LoanRun, run_car, run_loan};
use crate::config::AppConfig;
use crate::domain::{LoanClass, Tier, Tool};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::form::car::CarLiveInputs;
use crate::form::{CAR_FIELDS, Field, FormState, LOAN_FIELDS};
use crate::inference::{AdapterState, InferenceAdapter};
use crate::report::{LoanAnalysis, car_live_metrics, fmt_money, fmt_percent};

mod plotters_chart;

use plotters_chart::{
    APPROVED_COLOR, BarPlottersChart, ChartBar, DEFAULT_COLOR, LOWER_COLOR, PRICE_COLOR, UPPER_COLOR,
};

/// Start the TUI on `tool`.
pub fn run(tool: Tool, config: AppConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(tool, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(
                EXIT_RUNTIME,
                format!("Failed to enter alternate screen: {e}"),
            ));
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
    tool: Tool,
    config: AppConfig,
    loan_form: FormState,
    car_form: FormState,
    selected_field: usize,
    /// Text being typed into the selected field, if editing.
    edit_buffer: Option<String>,
    status: String,
    loan_adapter: InferenceAdapter,
    car_adapter: InferenceAdapter,
    loan_run: Option<LoanRun>,
    car_run: Option<CarRun>,
}

impl App {
    fn new(tool: Tool, config: AppConfig) -> Self {
        let loan_adapter = InferenceAdapter::from_path(&config.loan_model);
        let car_adapter = InferenceAdapter::from_path(&config.car_model);
        Self {
            tool,
            loan_form: FormState::new(&LOAN_FIELDS),
            car_form: FormState::new(&CAR_FIELDS),
            selected_field: 0,
            edit_buffer: None,
            status: "Fill in the form and press p to predict.".to_string(),
            loan_adapter,
            car_adapter,
            loan_run: None,
            car_run: None,
            config,
        }
    }

    fn form(&self) -> &FormState {
        match self.tool {
            Tool::Loan => &self.loan_form,
            Tool::Car => &self.car_form,
        }
    }

    fn form_mut(&mut self) -> &mut FormState {
        match self.tool {
            Tool::Loan => &mut self.loan_form,
            Tool::Car => &mut self.car_form,
        }
    }

    fn adapter(&self) -> &InferenceAdapter {
        match self.tool {
            Tool::Loan => &self.loan_adapter,
            Tool::Car => &self.car_adapter,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_RUNTIME, format!("Event read error: {e}")))? {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.edit_buffer.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < self.form().len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                let idx = self.selected_field;
                match self.form().field(idx) {
                    Some(Field::Numeric(spec)) => {
                        self.edit_buffer = Some(self.form().text_at(idx).to_string());
                        self.status = format!("Editing {}. Enter to apply, Esc to cancel.", spec.label);
                    }
                    Some(Field::Choice(_)) => self.adjust_field(1),
                    None => {}
                }
            }
            KeyCode::Char('p') => self.predict(),
            KeyCode::Char('t') | KeyCode::Tab => {
                self.tool = self.tool.next();
                self.selected_field = 0;
                self.status = format!("Switched to {}.", self.tool.display_name());
            }
            KeyCode::Char('r') => {
                *self.form_mut() = FormState::new(self.form().fields());
                self.clear_result();
                self.status = "Form reset to defaults.".to_string();
            }
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.edit_buffer.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.edit_buffer = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let text = buffer.trim().to_string();
                self.edit_buffer = None;
                let idx = self.selected_field;
                self.form_mut().set_at(idx, text);
                self.clear_result();
                self.status = "Value updated.".to_string();
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '.' || c == '-' {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn adjust_field(&mut self, delta: i32) {
        let idx = self.selected_field;
        self.form_mut().adjust(idx, delta);
        self.clear_result();
        if let Some(field) = self.form().field(idx) {
            self.status = format!("{}: {}", field.label(), self.form().text_at(idx));
        }
    }

    /// Results describe the inputs they came from; any edit invalidates them.
    fn clear_result(&mut self) {
        match self.tool {
            Tool::Loan => self.loan_run = None,
            Tool::Car => self.car_run = None,
        }
    }

    fn predict(&mut self) {
        let profile = self.config.profile;
        let outcome = match self.tool {
            Tool::Loan => run_loan(&self.loan_form, &self.loan_adapter, profile).map(|run| {
                let verdict = run.prediction.predicted_class.display_name();
                self.loan_run = Some(run);
                verdict.to_string()
            }),
            Tool::Car => run_car(&self.car_form, &self.car_adapter, profile).map(|run| {
                let price = fmt_money(&self.config.currency, run.prediction.predicted_price);
                self.car_run = Some(run);
                format!("Predicted price {price}")
            }),
        };
        match outcome {
            Ok(message) => self.status = message,
            Err(err) => {
                self.clear_result();
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let model_state = match self.adapter().state() {
            AdapterState::Unloaded => "not loaded yet".to_string(),
            AdapterState::Loaded => "loaded".to_string(),
            AdapterState::Failed(reason) => format!("unavailable ({reason})"),
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("predict", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" · {}", self.tool.display_name())),
            ]),
            Line::from(Span::styled(
                format!(
                    "model: {} [{model_state}] | profile: {:?} | currency: {}",
                    self.adapter().source(),
                    self.config.profile,
                    self.config.currency
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(52), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Length(8), Constraint::Min(0)])
            .split(columns[1]);

        self.draw_live(frame, right[0]);
        self.draw_results(frame, right[1]);
        self.draw_chart(frame, right[2]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let form = self.form();
        let items: Vec<ListItem> = form
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let value = match (&self.edit_buffer, idx == self.selected_field) {
                    (Some(buffer), true) => format!("{buffer}_"),
                    _ => form.text_at(idx).to_string(),
                };
                let hint = match field {
                    Field::Choice(_) => " ‹›",
                    Field::Numeric(_) => "",
                };
                ListItem::new(format!("{:<28} {value}{hint}", field.label()))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} Details", self.tool.display_name()))
                    .borders(Borders::ALL),
            )
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_live(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let currency = &self.config.currency;
        let lines: Vec<Line> = match self.tool {
            Tool::Loan => {
                let analysis = LoanAnalysis::new(
                    self.loan_form.lenient("loan_amnt"),
                    self.loan_form.lenient("person_income"),
                    self.config.profile,
                );
                let mut lines = vec![
                    metric_line("Loan Amount", fmt_money(currency, analysis.loan_amount), None),
                    metric_line("Annual Income", fmt_money(currency, analysis.income), None),
                    metric_line("Loan-to-Income Ratio", fmt_percent(analysis.ratio), None),
                ];
                if let Some(risk) = analysis.risk {
                    lines.push(metric_line(
                        "Risk Level",
                        risk.display_name().to_string(),
                        Some(risk.tier()),
                    ));
                }
                lines
            }
            Tool::Car if self.config.profile.shows_live_metrics() => {
                car_live_metrics(&CarLiveInputs::from_form(&self.car_form))
                    .iter()
                    .map(|m| metric_line(m.title, m.value.to_string(), Some(m.tier)))
                    .collect()
            }
            Tool::Car => vec![Line::from(Span::styled(
                "Live vehicle metrics are shown in the extended profile.",
                Style::default().fg(Color::Gray),
            ))],
        };

        let title = match self.tool {
            Tool::Loan => "Loan Analysis",
            Tool::Car => "Vehicle Analysis",
        };
        let p = Paragraph::new(Text::from(lines)).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let currency = &self.config.currency;
        let lines: Vec<Line> = match self.tool {
            Tool::Loan => match &self.loan_run {
                Some(run) => {
                    let p = &run.prediction;
                    let (color, verdict) = match p.predicted_class {
                        LoanClass::Approved => (Color::Green, "Low Default Risk Detected"),
                        LoanClass::NotApproved => (Color::Red, "High Default Risk Detected"),
                    };
                    vec![
                        Line::from(Span::styled(
                            p.predicted_class.display_name(),
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        )),
                        Line::from(verdict),
                        Line::from(format!("Confidence: {}", fmt_percent(p.confidence()))),
                        metric_line("Approval Probability", fmt_percent(p.probability_approved), None),
                        metric_line("Default Risk", fmt_percent(p.probability_default), None),
                    ]
                }
                None => vec![pending_line()],
            },
            Tool::Car => match &self.car_run {
                Some(run) => {
                    let p = &run.prediction;
                    let (lo, hi) = p.price_range();
                    vec![
                        Line::from(Span::styled(
                            fmt_money(currency, p.predicted_price),
                            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                        )),
                        metric_line(
                            "Estimated Range",
                            format!("{} - {}", fmt_money(currency, lo), fmt_money(currency, hi)),
                            None,
                        ),
                        metric_line(
                            "Value per Year",
                            fmt_money(currency, p.value_per_year(run.listing.age)),
                            None,
                        ),
                    ]
                }
                None => vec![pending_line()],
            },
        };

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Prediction Results").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Chart").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(chart) = self.chart_data() else {
            let msg = Paragraph::new("Press p to predict.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        // Bottom row carries the bar labels.
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        let widget = BarPlottersChart {
            bars: &chart.bars,
            y_max: chart.y_max,
            reference: chart.reference,
            y_label: chart.y_label,
            fmt_y: chart.fmt_y,
        };
        frame.render_widget(widget, rows[0]);
        draw_bar_labels(frame, rows[1], &chart.labels);
    }

    fn chart_data(&self) -> Option<ChartData> {
        match self.tool {
            Tool::Loan => self.loan_run.as_ref().map(|run| {
                let p = &run.prediction;
                ChartData {
                    bars: vec![
                        ChartBar {
                            value: p.probability_approved * 100.0,
                            color: APPROVED_COLOR,
                        },
                        ChartBar {
                            value: p.probability_default * 100.0,
                            color: DEFAULT_COLOR,
                        },
                    ],
                    labels: vec![
                        format!("Approval {}", fmt_percent(p.probability_approved)),
                        format!("Default {}", fmt_percent(p.probability_default)),
                    ],
                    y_max: 110.0,
                    reference: Some(crate::inference::APPROVAL_THRESHOLD * 100.0),
                    y_label: "Probability (%)",
                    fmt_y: fmt_axis_percent,
                }
            }),
            Tool::Car => self.car_run.as_ref().map(|run| {
                let p = &run.prediction;
                let (lo, hi) = p.price_range();
                let currency = &self.config.currency;
                ChartData {
                    bars: vec![
                        ChartBar {
                            value: p.predicted_price,
                            color: PRICE_COLOR,
                        },
                        ChartBar {
                            value: lo,
                            color: LOWER_COLOR,
                        },
                        ChartBar {
                            value: hi,
                            color: UPPER_COLOR,
                        },
                    ],
                    labels: vec![
                        format!("Predicted {}", fmt_money(currency, p.predicted_price)),
                        format!("Lower {}", fmt_money(currency, lo)),
                        format!("Upper {}", fmt_money(currency, hi)),
                    ],
                    y_max: hi * 1.1,
                    reference: None,
                    y_label: "Price",
                    fmt_y: fmt_axis_price,
                }
            }),
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.edit_buffer.is_some() {
            "type digits  Backspace delete  Enter apply  Esc cancel"
        } else {
            "↑/↓ select  ←/→ adjust  Enter edit  p predict  t switch tool  r reset  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

struct ChartData {
    bars: Vec<ChartBar>,
    labels: Vec<String>,
    y_max: f64,
    reference: Option<f64>,
    y_label: &'static str,
    fmt_y: fn(f64) -> String,
}

fn metric_line(title: &str, value: String, tier: Option<Tier>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{title:<22}"),
        Style::default().fg(Color::Gray),
    )];
    if let Some(tier) = tier {
        let color = match tier {
            Tier::Good => Color::Green,
            Tier::Fair => Color::Yellow,
            Tier::Poor => Color::Red,
        };
        spans.push(Span::styled(format!("{} ", tier.marker()), Style::default().fg(color)));
    }
    spans.push(Span::raw(value));
    Line::from(spans)
}

fn pending_line() -> Line<'static> {
    Line::from(Span::styled(
        "No prediction yet. Press p to predict.",
        Style::default().fg(Color::Gray),
    ))
}

/// Labels centered under each bar slot, matching the chart's 8-column label area.
fn draw_bar_labels(frame: &mut ratatui::Frame<'_>, area: Rect, labels: &[String]) {
    if labels.is_empty() || area.width <= 10 {
        return;
    }
    let left = 9u16.min(area.width);
    let slot = (area.width - left) / labels.len() as u16;
    for (i, label) in labels.iter().enumerate() {
        let rect = Rect {
            x: area.x + left + slot * i as u16,
            y: area.y,
            width: slot,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(label.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray)),
            rect,
        );
    }
}

fn fmt_axis_percent(v: f64) -> String {
    format!("{v:.0}%")
}

fn fmt_axis_price(v: f64) -> String {
    if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Profile;
    use crate::encode::FeatureVector;
    use crate::error::PredictError;
    use crate::model::Model;
    use std::sync::Arc;

    struct Constant(f64);

    impl Model for Constant {
        fn predict(&self, _vector: &FeatureVector) -> Result<f64, PredictError> {
            Ok(self.0)
        }
    }

    fn app_with(loan: f64, car: f64) -> App {
        let mut app = App::new(Tool::Loan, AppConfig::default());
        app.loan_adapter = InferenceAdapter::with_model(Arc::new(Constant(loan)));
        app.car_adapter = InferenceAdapter::with_model(Arc::new(Constant(car)));
        app
    }

    fn select(app: &mut App, key: &str) {
        app.selected_field = app.form().fields().iter().position(|f| f.key() == key).unwrap();
    }

    #[test]
    fn predict_stores_result_and_edits_clear_it() {
        let mut app = app_with(0.8, 12.0);
        app.handle_key(KeyCode::Char('p'));
        assert!(app.loan_run.is_some());
        assert_eq!(app.status, "LOAN APPROVED");

        app.handle_key(KeyCode::Right);
        assert!(app.loan_run.is_none());
    }

    #[test]
    fn even_odds_are_not_an_approval() {
        let mut app = app_with(0.5, 12.0);
        app.handle_key(KeyCode::Char('p'));
        assert_eq!(app.status, "LOAN NOT APPROVED");
    }

    #[test]
    fn typed_value_is_validated_on_predict() {
        let mut app = app_with(0.8, 12.0);
        select(&mut app, "person_age");
        app.handle_key(KeyCode::Enter);
        for _ in 0..2 {
            app.handle_key(KeyCode::Backspace);
        }
        app.handle_key(KeyCode::Char('1'));
        app.handle_key(KeyCode::Char('7'));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.loan_form.text("person_age"), "17");

        app.handle_key(KeyCode::Char('p'));
        assert!(app.loan_run.is_none());
        assert!(app.status.starts_with("Invalid input"));
    }

    #[test]
    fn tool_switch_keeps_each_form() {
        let mut app = app_with(0.8, 12.0);
        select(&mut app, "person_age");
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Char('t'));
        assert_eq!(app.tool, Tool::Car);
        app.handle_key(KeyCode::Char('p'));
        assert!(app.car_run.is_some());
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.loan_form.text("person_age"), "31");
    }

    #[test]
    fn missing_model_is_reported_in_status() {
        let mut config = AppConfig::default();
        config.car_model = std::env::temp_dir().join("tabular-predict-tui-missing.json");
        config.profile = Profile::Extended;
        let mut app = App::new(Tool::Car, config);
        app.handle_key(KeyCode::Char('p'));
        assert!(app.status.starts_with("Model not available"));
        assert!(matches!(app.car_adapter.state(), AdapterState::Failed(_)));
    }

    #[test]
    fn quit_keys() {
        let mut app = app_with(0.5, 1.0);
        assert!(app.handle_key(KeyCode::Char('q')));
        app.edit_buffer = Some(String::new());
        assert!(!app.handle_key(KeyCode::Char('q')));
    }
}
