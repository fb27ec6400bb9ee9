use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{Event as CrosstermEvent, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::event::Event;
use crate::types::PullRequestRecord;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn init() -> io::Result<Tui> {
    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    Terminal::new(CrosstermBackend::new(io::stdout()))
}

pub fn restore() -> io::Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// Single source for the run loop: terminal input and frame ticks from a
/// background pump, plus records pulled straight off the aggregator stream.
///
/// Records are only received when `next` is awaited, so the producer stays
/// blocked on its one-slot channel until the table has taken the previous row.
pub struct EventSource {
    input: mpsc::UnboundedReceiver<Event>,
    records: mpsc::Receiver<PullRequestRecord>,
    records_open: bool,
    _pump: Option<InputPump>,
}

impl EventSource {
    pub fn new(render_rate: Duration, records: mpsc::Receiver<PullRequestRecord>) -> Self {
        let (tx, input) = mpsc::unbounded_channel();
        let pump = InputPump::spawn(render_rate, tx);
        Self::from_parts(input, records, Some(pump))
    }

    fn from_parts(
        input: mpsc::UnboundedReceiver<Event>,
        records: mpsc::Receiver<PullRequestRecord>,
        pump: Option<InputPump>,
    ) -> Self {
        Self {
            input,
            records,
            records_open: true,
            _pump: pump,
        }
    }

    /// `None` once the input pump has stopped. A finished record stream is
    /// not an end of events; keys keep flowing.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                event = self.input.recv() => return event,
                record = self.records.recv(), if self.records_open => match record {
                    Some(record) => return Some(Event::Record(record)),
                    None => self.records_open = false,
                },
            }
        }
    }
}

/// Background task reading key presses and emitting frame ticks.
struct InputPump {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl InputPump {
    fn spawn(render_rate: Duration, tx: mpsc::UnboundedSender<Event>) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(pump_terminal(render_rate, tx, cancel.clone()));
        Self { cancel, task }
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn pump_terminal(
    render_rate: Duration,
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) {
    let mut keys = EventStream::new();
    let mut frames = interval(render_rate);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => return,
            _ = frames.tick() => Event::Render,
            Some(Ok(CrosstermEvent::Key(key))) = keys.next() => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                Event::Key(key)
            }
        };
        if tx.send(event).is_err() {
            return;
        }
    }
}
