//! Rendering for the Reframing Room dashboard.
//!
//! Every frame is drawn from scratch from the current [`Dashboard`] snapshot.

use crate::dashboard::{Dashboard, Idea, Tab};
use crate::pulse::{self, GaugeBand};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, Gauge, GraphType, List, ListItem, ListState,
        Paragraph, Tabs, Wrap,
    },
    Frame,
};
use reframe_core::{LoveLanguage, MessageRecord, TIMESTAMP_FORMAT};

const RAW_COLOR: Color = Color::Rgb(243, 139, 168);
const REFRAMED_COLOR: Color = Color::Rgb(166, 227, 161);
const TENSE_COLOR: Color = Color::Rgb(250, 179, 135);
const PULSE_COLOR: Color = Color::Rgb(137, 180, 250);
const HEADING_COLOR: Color = Color::Rgb(205, 214, 244);

fn band_color(band: GaugeBand) -> Color {
    match band {
        GaugeBand::Calm => REFRAMED_COLOR,
        GaugeBand::Tense => TENSE_COLOR,
        GaugeBand::Heated => RAW_COLOR,
    }
}

/// Draw the whole dashboard.
pub fn render(frame: &mut Frame, dashboard: &Dashboard) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Length(1), // Tabs
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Footer
        ])
        .split(size);

    render_header(frame, chunks[0], dashboard);
    render_tabs(frame, chunks[1], dashboard.active_tab());

    match dashboard.active_tab() {
        Tab::Translator => render_translator(frame, chunks[2], dashboard),
        Tab::Biometrics => render_biometrics(frame, chunks[2], dashboard.latest()),
        Tab::PeaceOffering => render_peace_offering(frame, chunks[2], dashboard),
    }

    render_footer(frame, chunks[3], dashboard);

    if let Some(highlighted) = dashboard.selector() {
        render_selector(frame, size, highlighted);
    }
}

fn render_header(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let updated = dashboard
        .latest()
        .and_then(|m| chrono::NaiveDateTime::parse_from_str(&m.timestamp, TIMESTAMP_FORMAT).ok())
        .map(|ts| format!("  ·  last message {}", ts.format("%H:%M:%S")))
        .unwrap_or_default();

    let lines = vec![
        Line::from(Span::styled(
            "🕊️ The Reframing Room",
            Style::default()
                .fg(HEADING_COLOR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Turning Conflict into Connection{}", updated),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, active: Tab) {
    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()).collect::<Vec<_>>())
        .select(active.index())
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider("│");
    frame.render_widget(tabs, area);
}

fn boxed_text<'a>(title: &'a str, text: String, color: Color) -> Paragraph<'a> {
    Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title),
        )
}

fn render_translator(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let mode = dashboard.love_language();

    match dashboard.latest() {
        Some(latest) => {
            frame.render_widget(
                boxed_text(
                    "Raw Vent (You said)",
                    latest.original_text.clone(),
                    RAW_COLOR,
                ),
                columns[0],
            );

            let right = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(columns[1]);
            frame.render_widget(
                boxed_text(
                    "Reframed Connection (We heard)",
                    latest.reframed_text.clone(),
                    REFRAMED_COLOR,
                ),
                right[0],
            );
            frame.render_widget(
                Paragraph::new(format!(
                    "Reasoning: {} | Mode: {}",
                    latest.hidden_need, mode
                ))
                .style(Style::default().fg(Color::Gray)),
                right[1],
            );
        }
        None => {
            frame.render_widget(
                boxed_text(
                    "Raw Vent (You said)",
                    "Waiting for WhatsApp messages...".to_string(),
                    Color::Gray,
                ),
                columns[0],
            );
            frame.render_widget(
                boxed_text(
                    "Reframed Connection (We heard)",
                    format!("AI is listening... (Mode: {})", mode),
                    Color::Gray,
                ),
                columns[1],
            );
        }
    }
}

fn render_biometrics(frame: &mut Frame, area: Rect, latest: Option<&MessageRecord>) {
    let Some(latest) = latest else {
        frame.render_widget(
            boxed_text(
                "Biometrics & Emotion",
                "No biometric data yet.".to_string(),
                Color::Gray,
            ),
            area,
        );
        return;
    };

    let score = latest.conflict_score;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let mut gauge_style = Style::default().fg(band_color(pulse::gauge_band(score)));
    if pulse::is_alert(score) {
        gauge_style = gauge_style.add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK);
    }
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Conflict Temperature (alert at {})",
            pulse::ALERT_THRESHOLD
        )))
        .gauge_style(gauge_style)
        .percent(u16::from(score.min(100)))
        .label(format!("{}/100", score));
    frame.render_widget(gauge, rows[0]);

    let points = pulse::pulse_wave(score);
    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(PULSE_COLOR))
        .data(&points);
    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title("Emotional Pulse"))
        .x_axis(Axis::default().bounds([0.0, pulse::PULSE_X_MAX]))
        .y_axis(Axis::default().bounds(pulse::PULSE_Y_BOUNDS));
    frame.render_widget(chart, rows[1]);
}

fn render_peace_offering(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let Some(latest) = dashboard.latest() else {
        frame.render_widget(
            boxed_text(
                "The Peace Offering",
                "Waiting for conflict resolution...".to_string(),
                Color::Gray,
            ),
            area,
        );
        return;
    };

    let idea = match dashboard.idea() {
        Some(Idea::Generating) => "Generating a new micro-date idea...".to_string(),
        Some(Idea::Ready(idea)) => format!("💡 {}", idea),
        None => "Press 'g' to generate a new micro-date idea.".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("🕊️ Suggestion: {}", latest.peace_offering),
            Style::default().fg(REFRAMED_COLOR),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Why this works",
            Style::default()
                .fg(HEADING_COLOR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "This addresses the hidden need for {} by creating a shared moment of safety.",
            latest.hidden_need
        )),
        Line::from(""),
        Line::from(Span::styled(idea, Style::default().fg(PULSE_COLOR))),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("The Peace Offering"),
            ),
        area,
    );
}

fn render_footer(frame: &mut Frame, area: Rect, dashboard: &Dashboard) {
    let text = match dashboard.status() {
        Some(status) => status.to_string(),
        None => format!(
            "Partner's Love Language: {}  ·  [s] settings  [g] idea  [tab] switch  [q] quit",
            dashboard.love_language()
        ),
    };
    let color = if dashboard.status().is_some() {
        Color::Red
    } else {
        Color::Gray
    };
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        area,
    );
}

fn render_selector(frame: &mut Frame, size: Rect, highlighted: LoveLanguage) {
    let area = centered_rect(44, LoveLanguage::ALL.len() as u16 + 2, size);
    let items: Vec<ListItem> = LoveLanguage::ALL
        .iter()
        .map(|lang| ListItem::new(lang.as_str()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("❤️ Partner's Love Language"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(highlighted.index()));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}
