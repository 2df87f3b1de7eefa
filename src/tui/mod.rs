use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::time::Instant;

use crossterm::event::{self, Event, KeyEventKind};

use crate::process_manager::{ProcessConfig, ProcessSupervisor};
use crate::ui::UiError;

mod config;
mod diagnostics;
mod events;
mod lifecycle;
mod render;
mod state;
mod terminal_text;
mod view_model;

use config::{DEFAULT_COLUMN_BUDGET, ERROR_BANNER_TIMEOUT, INPUT_POLL_WAIT};
use diagnostics::RuntimeDiagnostics;
use events::{KeyOutcome, UiCommand, ViewContext};
use state::ViewState;

use crate::log::store::LogStore;

#[derive(Debug)]
pub enum LogTuiError {
    Io(io::Error),
    Ui(UiError),
    NoProcesses,
}

impl std::fmt::Display for LogTuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogTuiError::Io(err) => write!(f, "{err}"),
            LogTuiError::Ui(err) => write!(f, "{err}"),
            LogTuiError::NoProcesses => write!(f, "no commands to supervise"),
        }
    }
}

impl std::error::Error for LogTuiError {}

impl From<io::Error> for LogTuiError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<UiError> for LogTuiError {
    fn from(value: UiError) -> Self {
        Self::Ui(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTuiOutcome {
    /// Commands that did not exit cleanly, as `(id, diagnostic)`.
    pub non_zero_exits: Vec<(usize, String)>,
}

/// Runs the merged-log TUI until the user quits, then shuts every command
/// down and prints the results summary.
///
/// This loop is the single writer for the log store and the view state; the
/// supervisor's drain threads only ever hand it entries over a channel.
pub fn run_log_tui(configs: Vec<ProcessConfig>) -> Result<LogTuiOutcome, LogTuiError> {
    if configs.is_empty() {
        return Err(LogTuiError::NoProcesses);
    }

    let mut supervisor = ProcessSupervisor::spawn_all(configs, DEFAULT_COLUMN_BUDGET);
    let mut process_started_at: HashMap<usize, Instant> = supervisor
        .configs()
        .iter()
        .map(|config| (config.id, Instant::now()))
        .collect();

    let mut terminal = lifecycle::init_terminal()?;
    let mut store = LogStore::new();
    let mut view_state = ViewState::new();
    let mut runtime_diagnostics = RuntimeDiagnostics::from_env();
    let mut spinner_tick = 0usize;

    let result: Result<(), LogTuiError> = loop {
        events::drain_entries(&supervisor, &mut store, &mut runtime_diagnostics);
        view_state.dismiss_expired_banner(ERROR_BANNER_TIMEOUT);
        spinner_tick = spinner_tick.wrapping_add(1);

        let size = terminal.size()?;
        supervisor.set_column_budget(view_model::column_budget(
            size.width,
            supervisor.process_count(),
        ));
        let viewport_height = view_model::viewport_height(size.height);
        let view = view_model::build_view_model(&store, &mut view_state, viewport_height);
        let exit_states = supervisor.exit_states();

        terminal.draw(|frame| {
            render::render_ui(
                frame,
                &render::FrameView {
                    configs: supervisor.configs(),
                    exit_states: &exit_states,
                    view: &view,
                    state: &view_state,
                    spinner_tick,
                    diagnostics: &runtime_diagnostics,
                },
            )
        })?;
        runtime_diagnostics.record_frame();

        if event::poll(INPUT_POLL_WAIT)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    runtime_diagnostics.record_keypress();
                    let context = ViewContext {
                        max_offset: view.max_offset,
                        process_count: supervisor.process_count(),
                    };
                    match events::handle_key_event(&key, &mut view_state, context) {
                        KeyOutcome::Continue => {}
                        KeyOutcome::Quit => break Ok(()),
                        KeyOutcome::Command(command) => run_ui_command(
                            command,
                            &mut supervisor,
                            &store,
                            &mut view_state,
                            &mut process_started_at,
                        ),
                    }
                }
                // The next frame re-derives viewport height and column
                // budget from the new size; buffered entries are kept.
                Event::Resize(..) => {}
                _ => {}
            }
        }
    };

    let non_zero_exits =
        lifecycle::shutdown_and_render_summary(&mut terminal, &supervisor, &process_started_at)?;
    result?;
    Ok(LogTuiOutcome { non_zero_exits })
}

fn run_ui_command(
    command: UiCommand,
    supervisor: &mut ProcessSupervisor,
    store: &LogStore,
    view_state: &mut ViewState,
    process_started_at: &mut HashMap<usize, Instant>,
) {
    match command {
        UiCommand::RestartFiltered => {
            let targets = supervisor
                .configs()
                .iter()
                .map(|config| config.id)
                .filter(|id| view_state.filter.is_none_or(|f| f == *id))
                .collect::<Vec<usize>>();
            for id in targets {
                match supervisor.restart(id) {
                    Ok(()) => {
                        process_started_at.insert(id, Instant::now());
                    }
                    // The supervisor already logged the failure; the banner
                    // makes it impossible to miss.
                    Err(err) => view_state.show_banner(err.to_string()),
                }
            }
        }
        UiCommand::SaveFiltered { path } => {
            match events::save_filtered(store, view_state.filter, Path::new(&path)) {
                Ok(count) => view_state.show_banner(format!("saved {count} lines to {path}")),
                Err(err) => view_state.show_banner(format!("save failed: {err}")),
            }
        }
    }
}
