//! diffnav CLI - terminal browser for working-tree, commit and branch diffs

mod app;
mod config;
mod dispatch;
mod time_format;
mod ui;
mod views;

use anyhow::{Context, Result};
use app::{Action, App, AppSettings, Message, ViewMode};
use clap::Parser;
use config::Config;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use diffnav_core::{is_git_repo, GitCli};
use dispatch::Dispatcher;
use ratatui::prelude::*;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time_format::TimeFormatter;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "diffnav")]
#[command(author, version, about = "Browse working-tree, commit and branch diffs")]
struct Args {
    /// View mode: unified or split
    #[arg(short, long)]
    view: Option<CliViewMode>,

    /// Repository to open (defaults to the current directory)
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// Number of commits to load per log
    #[arg(short, long)]
    limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliViewMode {
    /// Old and new lines interleaved in one column
    Unified,
    /// Old on the left, new on the right
    #[value(alias = "sbs")]
    Split,
}

impl From<CliViewMode> for ViewMode {
    fn from(mode: CliViewMode) -> Self {
        match mode {
            CliViewMode::Unified => ViewMode::Unified,
            CliViewMode::Split => ViewMode::Split,
        }
    }
}

/// Log to a file in the cache dir; the terminal belongs to the TUI
fn init_logging() {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("diffnav")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("diffnav.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_env("DIFFNAV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    let config = Config::load();

    let cwd = match args.repo {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    if !is_git_repo(&cwd) {
        anyhow::bail!(
            "Not in a git repository: {}\n\
             \n\
             Run diffnav inside a repository or pass --repo <path>.",
            cwd.display()
        );
    }
    let git = GitCli::discover(&cwd).context("Failed to get git repository root")?;
    tracing::info!(repo = %git.repo().display(), "opening repository");

    // CLI overrides config
    let view_mode = args
        .view
        .map(ViewMode::from)
        .or_else(|| config.parse_view_mode())
        .unwrap_or_default();
    let settings = AppSettings {
        view_mode,
        commit_limit: args.limit.unwrap_or(config.git.commit_limit),
        virtual_threshold: config.render.virtual_threshold,
        timeout: config.git.timeout(),
        scrollbar: config.ui.scrollbar,
        file_panel_width: config.ui.file_panel_width,
        time: TimeFormatter::new(config.ui.time, &config.ui.time_format),
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(
        Arc::new(git),
        runtime.handle().clone(),
        tx,
        settings.timeout,
    );
    let mut app = App::new(settings);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &dispatcher, rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Don't wait on git calls still in flight
    drop(dispatcher);
    runtime.shutdown_background();

    if let Err(err) = result {
        tracing::error!(error = %err, "exiting with error");
        eprintln!("Error: {}", err);
        return Err(err);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher,
    mut rx: UnboundedReceiver<Message>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(16);
    dispatcher.dispatch_all(app.show());

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick_rate)? {
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
                Event::Mouse(me) => match me.kind {
                    MouseEventKind::ScrollUp => Some(Action::Up),
                    MouseEventKind::ScrollDown => Some(Action::Down),
                    _ => None,
                },
                _ => None,
            };
            if let Some(action) = action {
                dispatcher.dispatch_all(app.update(Message::Action(action)));
            }
        }

        // Completed tasks, one at a time
        while let Ok(message) = rx.try_recv() {
            dispatcher.dispatch_all(app.update(message));
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn map_key(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('u') if ctrl => Action::PageUp,
        KeyCode::Char('d') if ctrl => Action::PageDown,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Home | KeyCode::Char('g') => Action::Top,
        KeyCode::End | KeyCode::Char('G') => Action::Bottom,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Tab => Action::Cycle,
        KeyCode::Enter => Action::Select,
        KeyCode::Esc | KeyCode::Backspace => Action::Back,
        KeyCode::Char(']') | KeyCode::Char('n') => Action::NextSection,
        KeyCode::Char('[') | KeyCode::Char('p') | KeyCode::Char('N') => Action::PrevSection,
        KeyCode::Char('v') => Action::ToggleViewMode,
        KeyCode::Char('r') => Action::Retry,
        KeyCode::Char('R') => Action::Reload,
        KeyCode::Char('o') => Action::ViewRaw,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_map_key() {
        assert_eq!(map_key(key(KeyCode::Char('j'))), Some(Action::Down));
        assert_eq!(map_key(key(KeyCode::Up)), Some(Action::Up));
        assert_eq!(map_key(key(KeyCode::Tab)), Some(Action::Cycle));
        assert_eq!(map_key(key(KeyCode::Enter)), Some(Action::Select));
        assert_eq!(map_key(key(KeyCode::Char(']'))), Some(Action::NextSection));
        assert_eq!(map_key(key(KeyCode::Char('N'))), Some(Action::PrevSection));
        assert_eq!(map_key(key(KeyCode::Char('R'))), Some(Action::Reload));
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(Action::PageDown)
        );
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args::parse_from(["diffnav", "--view", "sbs", "--limit", "5"]);
        assert_eq!(args.view.map(ViewMode::from), Some(ViewMode::Split));
        assert_eq!(args.limit, Some(5));
        assert!(args.repo.is_none());
    }
}
