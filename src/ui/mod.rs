mod pr_table;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Mode};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    pr_table::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("pr-watcher - {} open pull requests", app.records().len());

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else {
        let help = match app.mode {
            Mode::Navigating => "arrows/hjkl: move | g/G: top/bottom | Enter: select rows | Esc/q: quit",
            Mode::RowSelectable => "j/k: row | Enter: open in browser | Esc/q: quit",
        };
        let mut spans = vec![Span::styled(help, Style::default().fg(Color::Gray))];
        if let (Mode::RowSelectable, Some(record)) = (app.mode, app.selected_record()) {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                record.html_url.clone(),
                Style::default().fg(Color::Cyan),
            ));
        }
        Line::from(spans)
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
