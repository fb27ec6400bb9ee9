use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::browser;
use crate::event::Event;
use crate::types::PullRequestRecord;

pub const COLUMNS: [&str; 5] = ["PR title", "state", "repo name", "user name", "created at"];

/// Interaction mode of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Arrow keys move a single highlighted cell.
    #[default]
    Navigating,
    /// Whole rows highlight; Enter opens the row's pull request.
    RowSelectable,
}

/// Table position. Row 0 is the header, row `i >= 1` is the i-th received record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub row: usize,
    pub column: usize,
}

pub struct App {
    records: Vec<PullRequestRecord>,
    pub mode: Mode,
    pub cursor: Cursor,
    pub error: Option<String>,
    pub should_quit: bool,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            records: Vec::new(),
            mode: Mode::default(),
            cursor: Cursor::default(),
            error: None,
            should_quit: false,
            action_tx,
        }
    }

    /// Records in arrival order.
    pub fn records(&self) -> &[PullRequestRecord] {
        &self.records
    }

    /// Number of table rows, header included.
    pub fn row_count(&self) -> usize {
        self.records.len() + 1
    }

    pub fn record_at(&self, row: usize) -> Option<&PullRequestRecord> {
        row.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn selected_record(&self) -> Option<&PullRequestRecord> {
        self.record_at(self.cursor.row)
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Record(record) => Action::RecordReceived(record),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
            KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
            KeyCode::Char('h') | KeyCode::Left => Action::MoveLeft,
            KeyCode::Char('l') | KeyCode::Right => Action::MoveRight,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter => Action::Confirm,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && !matches!(action, Action::RecordReceived(_) | Action::None) {
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::MoveUp => {
                if self.cursor.row > self.first_row() {
                    self.cursor.row -= 1;
                }
            }
            Action::MoveDown => {
                if self.cursor.row + 1 < self.row_count() {
                    self.cursor.row += 1;
                }
            }
            Action::MoveLeft => {
                if self.mode == Mode::Navigating && self.cursor.column > 0 {
                    self.cursor.column -= 1;
                }
            }
            Action::MoveRight => {
                if self.mode == Mode::Navigating && self.cursor.column + 1 < COLUMNS.len() {
                    self.cursor.column += 1;
                }
            }
            Action::GoToTop => {
                self.cursor.row = self.first_row();
            }
            Action::GoToBottom => {
                self.cursor.row = self.row_count() - 1;
            }
            Action::Confirm => match self.mode {
                Mode::Navigating => {
                    self.mode = Mode::RowSelectable;
                    self.cursor.row = self.cursor.row.max(self.first_row());
                }
                Mode::RowSelectable => self.select_row(self.cursor.row),
            },
            Action::RecordReceived(record) => {
                self.records.push(record);
            }
            Action::OpenInBrowser(url) => {
                if let Err(e) = browser::open_url(&url) {
                    self.action_tx.send(e.into()).ok();
                }
            }
            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    /// Opens the record behind `row`. The header and rows not yet received are ignored.
    pub fn select_row(&mut self, row: usize) {
        let Some(record) = self.record_at(row) else {
            return;
        };
        self.action_tx
            .send(Action::OpenInBrowser(record.html_url.clone()))
            .ok();
        self.mode = Mode::Navigating;
    }

    /// The header is only reachable while navigating cells, or when there are no rows yet.
    fn first_row(&self) -> usize {
        match self.mode {
            Mode::RowSelectable if !self.records.is_empty() => 1,
            _ => 0,
        }
    }
}
