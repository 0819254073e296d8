pub mod app_dirs;
pub mod config;
pub mod results;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;

use crate::config::{ConfigStore, FileConfigStore};
use crate::results::{is_valid_target, ResultsStore, TARGET_CHOICES};
use crate::runtime::{AppEvent, CrosstermEventSource, EventSource, Runner};
use crate::session::TimingSession;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// terminal time-perception trainer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Pick a target duration, start a silent timer, and stop it when you believe the duration has passed. Every attempt is recorded so you can track how your sense of time drifts."
)]
pub struct Cli {
    /// target duration in seconds (multiple of 5, between 5 and 90)
    #[clap(short = 't', long)]
    target: Option<u32>,

    /// open directly on the history screen
    #[clap(long)]
    history: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Pick,
    Running,
    Results,
    History,
}

#[derive(Debug, Default)]
pub struct HistoryState {
    pub scroll_offset: usize,
}

pub struct App {
    pub state: AppState,
    pub target_idx: usize,
    pub session: TimingSession,
    pub store: ResultsStore,
    /// target and measured seconds of the attempt just completed
    pub last_attempt: Option<(u32, f64)>,
    pub history_state: HistoryState,
    /// advanced on ticks while a run is live, drives the running indicator
    pub pulse: usize,
}

impl App {
    pub fn new(store: ResultsStore, target_idx: usize, open_history: bool) -> Self {
        Self {
            state: if open_history {
                AppState::History
            } else {
                AppState::Pick
            },
            target_idx: target_idx.min(TARGET_CHOICES.len() - 1),
            session: TimingSession::new(),
            store,
            last_attempt: None,
            history_state: HistoryState::default(),
            pulse: 0,
        }
    }

    pub fn target_secs(&self) -> u32 {
        TARGET_CHOICES[self.target_idx]
    }

    fn start_run(&mut self) {
        self.pulse = 0;
        self.session.start();
        self.state = AppState::Running;
    }

    fn stop_run(&mut self) {
        let target_secs = self.target_secs();
        let actual_secs = self.session.stop();
        self.store.add_result(target_secs, actual_secs);
        self.last_attempt = Some((target_secs, actual_secs));
        self.state = AppState::Results;
    }

    pub fn on_tick(&mut self) {
        if self.session.is_running() {
            self.pulse = self.pulse.wrapping_add(1);
        }
    }

    /// Handle one key event. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc {
            return true;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.state {
            AppState::Pick => match key.code {
                KeyCode::Left | KeyCode::Char('h') => {
                    self.target_idx = self.target_idx.saturating_sub(1);
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    if self.target_idx + 1 < TARGET_CHOICES.len() {
                        self.target_idx += 1;
                    }
                }
                KeyCode::Char(' ') | KeyCode::Enter => self.start_run(),
                KeyCode::Char('v') => self.state = AppState::History,
                _ => {}
            },
            AppState::Running => {
                if let KeyCode::Char(' ') | KeyCode::Enter = key.code {
                    self.stop_run();
                }
            }
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Char(' ') | KeyCode::Enter => self.start_run(),
                KeyCode::Char('n') | KeyCode::Char('b') => self.state = AppState::Pick,
                KeyCode::Char('v') => self.state = AppState::History,
                _ => {}
            },
            AppState::History => match key.code {
                KeyCode::Char('x') => {
                    self.store.reset_all();
                    self.history_state.scroll_offset = 0;
                }
                KeyCode::Char('b') | KeyCode::Backspace => {
                    self.history_state.scroll_offset = 0;
                    self.state = if self.last_attempt.is_some() {
                        AppState::Results
                    } else {
                        AppState::Pick
                    };
                }
                KeyCode::Up => {
                    self.history_state.scroll_offset =
                        self.history_state.scroll_offset.saturating_sub(1);
                }
                // max scroll is clamped in the render function
                KeyCode::Down => self.history_state.scroll_offset += 1,
                KeyCode::PageUp => {
                    self.history_state.scroll_offset =
                        self.history_state.scroll_offset.saturating_sub(10);
                }
                KeyCode::PageDown => self.history_state.scroll_offset += 10,
                KeyCode::Home => self.history_state.scroll_offset = 0,
                _ => {}
            },
        }

        false
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(target) = cli.target {
        if !is_valid_target(target) {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::ValueValidation,
                format!("target must be a multiple of 5 between 5 and 90, got {target}"),
            )
            .exit();
        }
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(target) = cli.target {
        config.target_secs = target;
    }

    let store = ResultsStore::open();
    let mut app = App::new(store, config.target_index(), cli.history);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    // the last selected target survives restarts
    config.target_secs = app.target_secs();
    if let Err(err) = config_store.save(&config) {
        log::warn!("failed to save config: {err}");
    }

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    run_event_loop(&runner, terminal, app)
}

/// Drive the app until a key handler asks to exit. Generic over the event
/// source so headless tests can feed scripted events.
fn run_event_loop<E: EventSource, B: Backend>(
    runner: &Runner<E>,
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                app.on_tick();
                if app.session.is_running() {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if app.handle_key(key) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    match app.state {
        AppState::History => ui::render_history(app, f),
        _ => f.render_widget(&*app, f.area()),
    }
}
