pub mod chart;
pub mod widgets;

use crate::app::{App, HealthStatus};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_search_bar(frame, app, chunks[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let areas = [top[0], top[1], chunks[2]];
    for (i, (widget, area)) in app.widgets.iter().zip(areas).enumerate() {
        widget.render(frame, area, i == app.selected_widget);
    }

    render_status_bar(frame, app, chunks[3]);

    if let Some(alert) = &app.alert {
        render_alert(frame, frame.area(), alert);
    }
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Twitter handle ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut spans = vec![
        Span::styled("@", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.input.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("█", Style::default().fg(Color::DarkGray)),
    ];

    if app.loading {
        let frame_idx = (chrono::Local::now().timestamp_subsec_millis() / 250) as usize;
        spans.push(Span::styled(
            format!("  {} analysing...", SPINNER[frame_idx % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let health = match &app.health {
        HealthStatus::Unknown => Span::styled("API: ?", Style::default().fg(Color::DarkGray)),
        HealthStatus::Healthy => Span::styled("API: healthy", Style::default().fg(Color::Green)),
        HealthStatus::Unreachable(reason) => Span::styled(
            format!("API: unreachable ({})", reason),
            Style::default().fg(Color::Red),
        ),
    };

    let shown = match &app.shown {
        Some(shown) => format!(
            " | @{} at {}",
            shown.handle,
            shown.received_at.format("%H:%M:%S")
        ),
        None => String::new(),
    };

    let line = Line::from(vec![
        health,
        Span::styled(shown, Style::default().fg(Color::Cyan)),
        Span::styled(
            " | Enter: search  Tab: next panel  Esc: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let modal_area = center_rect(60, 30, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(" Alert ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter/Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, modal_area);
}

fn center_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
