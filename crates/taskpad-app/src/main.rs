//! # taskpad
//!
//! Terminal UI binary — wires settings, the backend clients, and the page
//! controller together, then runs the draw/input loop.

#![deny(unsafe_code)]

mod app;
mod logging;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use taskpad_backend::{load_session, session_file_path, AuthClient, TaskStore};
use taskpad_settings::{
    get_settings, init_settings, load_settings, load_settings_from_path, TaskpadSettings,
};

use app::{Action, App};

/// Task manager backed by a hosted table/auth service.
#[derive(Parser, Debug)]
#[command(name = "taskpad", about = "Task manager backed by a hosted backend")]
struct Cli {
    /// Path to the settings file (defaults to `~/.taskpad/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the backend base URL.
    #[arg(long)]
    backend_url: Option<String>,

    /// Path to the log file (defaults to `~/.taskpad/taskpad.log`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Resolve the data directory (`~/.taskpad`).
fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".taskpad")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match cli
        .settings
        .as_deref()
        .map_or_else(load_settings, load_settings_from_path)
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("warning: failed to load settings ({e}), using defaults");
            TaskpadSettings::default()
        }
    };
    if let Some(url) = cli.backend_url {
        settings.backend.url = url;
    }

    let log_path = cli
        .log_file
        .unwrap_or_else(|| data_dir().join("taskpad.log"));
    logging::init(&log_path, &settings.logging.level)?;
    init_settings(settings);
    let settings = get_settings();

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(settings.backend.timeout_ms))
        .build()
        .context("failed to build HTTP client")?;

    let auth = AuthClient::new(
        http.clone(),
        settings.backend.url.clone(),
        settings.backend.anon_key.clone(),
    );

    let session_file = session_file_path(&data_dir());
    if let Some(session) = load_session(&session_file) {
        let _ = auth.restore(session);
    }

    let store = TaskStore::new(
        http,
        settings.backend.url.clone(),
        settings.backend.anon_key.clone(),
        auth.subscribe(),
    );

    let mut app = App::new(store, auth, session_file);

    // A restored session lands on Home; fetch its tasks before first draw.
    if app.session.is_some() {
        app.perform(Action::Reload).await;
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Draw/input loop.
///
/// Remote work happens between two draws: the key handler yields an
/// [`Action`], a loading frame is drawn, and the action runs to completion
/// before the next event is read. Access-layer calls therefore never
/// interleave.
async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();

    while !app.should_quit {
        terminal.draw(|f| ui::render(f, app))?;

        let Some(event) = events.next().await else {
            break;
        };
        let event = event.context("terminal event stream failed")?;

        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(action) = app.on_key(key) {
                app.loading = true;
                terminal.draw(|f| ui::render(f, app))?;
                app.perform(action).await;
                app.loading = false;
            }
        }
    }

    Ok(())
}
