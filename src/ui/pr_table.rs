use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;

use crate::app::{App, Mode, COLUMNS};

const WIDTHS: [Constraint; 5] = [
    Constraint::Min(30),
    Constraint::Length(8),
    Constraint::Length(24),
    Constraint::Length(18),
    Constraint::Length(24),
];

fn cursor_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let navigating = app.mode == Mode::Navigating;
    let cursor = app.cursor;

    let header = Row::new(COLUMNS.iter().enumerate().map(|(c, title)| {
        let style = if navigating && cursor.row == 0 && cursor.column == c {
            cursor_style()
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        };
        Cell::from(*title).style(style)
    }))
    .height(1)
    .bottom_margin(1);

    let rows: Vec<Row> = app
        .records()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let row = i + 1;
            let cells = record.columns().into_iter().enumerate().map(|(c, text)| {
                let style = if navigating && cursor.row == row && cursor.column == c {
                    cursor_style()
                } else if c == 0 {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Cell::from(text).style(style)
            });
            Row::new(cells)
        })
        .collect();

    let highlight = if navigating {
        Style::default()
    } else {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    };

    let table = Table::new(rows, WIDTHS)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Open Pull Requests "),
        )
        .highlight_style(highlight);

    // The widget's row index excludes the header.
    let mut state = TableState::default();
    state.select(cursor.row.checked_sub(1));

    frame.render_stateful_widget(table, area, &mut state);
}
