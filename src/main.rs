mod action;
mod aggregator;
mod app;
mod auth;
mod browser;
mod config;
mod credentials;
mod error;
mod event;
mod forge;
mod github;
mod tui;
mod types;
mod ui;

use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::aggregator::PullRequestStream;
use crate::app::App;
use crate::auth::{Bootstrap, TerminalPrompt};
use crate::config::{Config, StoreKind};
use crate::error::{Result, WatchError};
use crate::event::Event;
use crate::github::{GitHub, GitHubVerifier};
use crate::tui::EventSource;

#[derive(Parser, Debug)]
#[command(name = "pr-watcher", version, about = "Watch open pull requests across GitHub repositories")]
struct Cli {
    /// Config file (default: ./pr-watcher.toml, then ~/.config/pr-watcher/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where the GitHub token is kept; overrides `credential_store` in the config
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Remove the stored GitHub token and exit
    #[arg(long)]
    forget_token: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = try_main(Cli::parse()).await {
        eprintln!("pr-watcher: {}", err);
        if err.is_bad_credentials() {
            eprintln!("The GitHub token was rejected. Run with --forget-token to enter a new one.");
        }
        std::process::exit(1);
    }
}

async fn try_main(cli: Cli) -> Result<()> {
    let config = Config::load(&config::resolve_path(cli.config)?)?;
    let store = credentials::open_store(cli.store.unwrap_or(config.credential_store))?;

    if cli.forget_token {
        return match store.delete() {
            Ok(()) | Err(WatchError::CredentialNotFound) => {
                println!("Stored token removed.");
                Ok(())
            }
            Err(e) => Err(e),
        };
    }

    let verifier = GitHubVerifier::default();
    let token = Bootstrap::new(store.as_ref(), &TerminalPrompt, &verifier)
        .acquire_token()
        .await?;
    let github = GitHub::new(token)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(config, github).await;

    // Restore terminal
    tui::restore()?;

    result
}

async fn run(config: Config, github: GitHub) -> Result<()> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(action_tx.clone());

    info!(pairs = config.pair_count(), "starting aggregation");
    let PullRequestStream {
        records,
        mut producer,
    } = aggregator::stream_pull_requests(config.repos, Arc::new(github));
    let mut producing = true;

    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventSource::new(render_rate, records);

    // Header goes up before anything arrives.
    terminal.draw(|frame| ui::render(frame, &app))?;

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    Event::Record(_) => {
                        let action = app.handle_event(event);
                        app.update(action);
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    Event::Key(_) => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action).ok();
                        }
                    }
                }
            }
            joined = &mut producer, if producing => {
                producing = false;
                match joined {
                    Ok(Ok(emitted)) => info!(emitted, "aggregation finished"),
                    Ok(Err(e)) => return Err(e),
                    Err(e) => return Err(WatchError::Api(format!("aggregation task failed: {}", e))),
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
