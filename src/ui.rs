use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
    Frame,
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::results::TARGET_CHOICES;
use crate::util::{format_secs, format_signed_secs, mean, std_dev};
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;

/// Color grading for how close a measurement landed to its target
fn error_color(target_secs: u32, signed_error: f64) -> Color {
    let ratio = signed_error.abs() / target_secs as f64;
    if ratio <= 0.05 {
        Color::Green
    } else if ratio <= 0.15 {
        Color::Yellow
    } else {
        Color::Red
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Pick => render_pick(self, area, buf),
            AppState::Running => render_running(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            // History has its own renderer with a stateful table
            AppState::History => {}
        }
    }
}

fn centered_chunks(area: Rect, lines: u16) -> std::rc::Rc<[Rect]> {
    let pad = area.height.saturating_sub(lines) / 2;
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(lines),
            Constraint::Min(0),
        ])
        .split(area)
}

fn render_pick(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let selected = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let italic = Style::default()
        .add_modifier(Modifier::ITALIC)
        .add_modifier(Modifier::DIM);

    let mut spans: Vec<Span> = Vec::new();
    for (idx, target) in TARGET_CHOICES.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        let label = format!("{}s", target);
        if idx == app.target_idx {
            spans.push(Span::styled(label, selected));
        } else {
            spans.push(Span::styled(label, dim));
        }
    }

    let chunks = centered_chunks(area, 7);
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1),
            Constraint::Length(2), // target row (may wrap)
            Constraint::Length(1),
            Constraint::Length(2), // hints
        ])
        .split(chunks[1]);

    Paragraph::new(Span::styled("chronosense", bold))
        .alignment(Alignment::Center)
        .render(body[0], buf);

    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(body[2], buf);

    Paragraph::new(Span::styled(
        "←/→ pick a duration · space to start · (v)iew history · (esc)ape",
        italic,
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(body[4], buf);
}

fn render_running(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let italic = Style::default()
        .add_modifier(Modifier::ITALIC)
        .add_modifier(Modifier::DIM);

    let chunks = centered_chunks(area, 6);
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // target
            Constraint::Length(1),
            Constraint::Length(1), // pulse
            Constraint::Length(1),
            Constraint::Length(1), // hint
        ])
        .split(chunks[1]);

    Paragraph::new(Span::styled(format!("{}s", app.target_secs()), bold))
        .alignment(Alignment::Center)
        .render(body[0], buf);

    // A slow pulse so the screen reads as alive; deliberately no elapsed
    // time anywhere, that is the whole point of the exercise.
    let dots = (app.pulse / 5) % 4;
    Paragraph::new(Span::styled("· ".repeat(dots), dim))
        .alignment(Alignment::Center)
        .render(body[2], buf);

    Paragraph::new(Span::styled("space to stop when time feels up", italic))
        .alignment(Alignment::Center)
        .render(body[4], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default()
        .add_modifier(Modifier::ITALIC)
        .add_modifier(Modifier::DIM);

    let Some((target_secs, actual_secs)) = app.last_attempt else {
        // Defensive: nothing recorded yet, fall back to the picker view
        render_pick(app, area, buf);
        return;
    };

    let signed_error = actual_secs - target_secs as f64;
    let error_style = Style::default()
        .fg(error_color(target_secs, signed_error))
        .add_modifier(Modifier::BOLD);

    let chunks = centered_chunks(area, 8);
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // target
            Constraint::Length(1), // actual
            Constraint::Length(1),
            Constraint::Length(1), // difference
            Constraint::Length(1),
            Constraint::Length(2), // hints
        ])
        .split(chunks[1]);

    Paragraph::new(Line::from(vec![
        Span::raw("target "),
        Span::styled(format!("{}s", target_secs), bold),
    ]))
    .alignment(Alignment::Center)
    .render(body[0], buf);

    Paragraph::new(Line::from(vec![
        Span::raw("your time "),
        Span::styled(format_secs(actual_secs), bold),
    ]))
    .alignment(Alignment::Center)
    .render(body[1], buf);

    Paragraph::new(Line::from(vec![
        Span::raw("difference "),
        Span::styled(format_signed_secs(signed_error), error_style),
    ]))
    .alignment(Alignment::Center)
    .render(body[3], buf);

    Paragraph::new(Span::styled(
        "(r)etry · (n)ew target · (v)iew history · (esc)ape",
        italic,
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(body[5], buf);
}

/// History screen: table of every recorded attempt plus a summary line
pub fn render_history(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // attempts table
            Constraint::Length(1), // summary
            Constraint::Length(3), // instructions
        ])
        .split(area);

    let title = Paragraph::new("Your Previous Attempts")
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let attempts = app.store.attempts();
    if attempts.is_empty() {
        let no_data = Paragraph::new("No results yet.\nComplete an attempt to build a history!")
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(no_data, chunks[1]);
    } else {
        let table_height = chunks[1].height.saturating_sub(3) as usize;
        let max_scroll = attempts.len().saturating_sub(table_height);
        if app.history_state.scroll_offset > max_scroll {
            app.history_state.scroll_offset = max_scroll;
        }

        let header = Row::new(vec![
            Cell::from("Target"),
            Cell::from("Actual"),
            Cell::from("Error"),
            Cell::from("When"),
        ])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let now = Local::now();
        let rows: Vec<Row> = attempts
            .iter()
            .skip(app.history_state.scroll_offset)
            .take(table_height)
            .map(|attempt| {
                let target_cell = match attempt.target_secs {
                    Some(target) => Cell::from(format!("{}s", target)),
                    // legacy records never stored a target
                    None => Cell::from("?").style(Style::default().fg(Color::DarkGray)),
                };

                let error_cell = match (attempt.target_secs, attempt.signed_error()) {
                    (Some(target), Some(err)) => Cell::from(format_signed_secs(err))
                        .style(Style::default().fg(error_color(target, err))),
                    _ => Cell::from("—").style(Style::default().fg(Color::DarkGray)),
                };

                let age_secs = (now - attempt.timestamp).num_seconds().max(0) as u64;
                let when = HumanTime::from(std::time::Duration::from_secs(age_secs))
                    .to_text_en(Accuracy::Rough, Tense::Past);

                Row::new(vec![
                    target_cell,
                    Cell::from(format_secs(attempt.actual_secs)),
                    error_cell,
                    Cell::from(when).style(Style::default().fg(Color::Gray)),
                ])
            })
            .collect();

        let scroll_info = if attempts.len() > table_height {
            format!(
                " ({}/{} rows)",
                app.history_state.scroll_offset + rows.len().min(table_height),
                attempts.len()
            )
        } else {
            String::new()
        };

        let table = Table::new(
            rows,
            &[
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Min(16),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Attempts{}", scroll_info)),
        );

        f.render_widget(table, chunks[1]);
    }

    let errors: Vec<f64> = attempts.iter().filter_map(|a| a.signed_error()).collect();
    let summary = match (mean(&errors), std_dev(&errors)) {
        (Some(avg), Some(sd)) => format!(
            "{} attempts · mean error {} · σ {}",
            attempts.len(),
            format_signed_secs(avg),
            format_secs(sd)
        ),
        _ => format!("{} attempts", attempts.len()),
    };
    let summary = Paragraph::new(summary)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(summary, chunks[2]);

    let instructions = Paragraph::new("↑/↓ scroll | (x) reset all data | (b)ack | (esc)ape")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[3]);
}
