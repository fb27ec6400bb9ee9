use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::PullRequestRecord;

#[derive(Debug, Clone)]
pub enum Event {
    Render,
    Key(KeyEvent),
    /// Next pull request from the aggregator.
    Record(PullRequestRecord),
}

impl Event {
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}
