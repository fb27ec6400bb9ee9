use crate::error::WatchError;
use crate::types::PullRequestRecord;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    GoToTop,
    GoToBottom,
    /// Enter: enable row selection, or select the current row.
    Confirm,

    RecordReceived(PullRequestRecord),
    OpenInBrowser(String),

    Error(String),
    None,
}

impl From<WatchError> for Action {
    fn from(err: WatchError) -> Self {
        Action::Error(err.to_string())
    }
}
