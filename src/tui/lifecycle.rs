use std::collections::HashMap;
use std::io;
use std::time::Instant;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;

use crate::process_manager::{is_expected_shutdown_diagnostic, ProcessSupervisor, ShutdownProgress};
use crate::ui::{NoticeLevel, OutputMode, PlainRenderer, Renderer, TableSpec};

use super::config::SHUTDOWN_GRACE_TIMEOUT;
use super::terminal_text::format_elapsed;
use super::LogTuiError;

pub(super) type TuiTerminal = Terminal<CrosstermBackend<std::io::Stdout>>;

pub(super) fn init_terminal() -> Result<TuiTerminal, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// Shuts every process down gracefully, restores the terminal, and prints
/// the per-process results section. Returns the non-clean exits.
pub(super) fn shutdown_and_render_summary(
    terminal: &mut TuiTerminal,
    supervisor: &ProcessSupervisor,
    process_started_at: &HashMap<usize, Instant>,
) -> Result<Vec<(usize, String)>, LogTuiError> {
    supervisor.terminate_all_graceful_with_progress(SHUTDOWN_GRACE_TIMEOUT, |progress| {
        let label = match progress {
            ShutdownProgress::SendingTerm => "Shutdown: sending SIGTERM to commands...",
            ShutdownProgress::Waiting => "Shutdown: waiting for commands to exit...",
            ShutdownProgress::ForceKilling => "Shutdown: forcing remaining commands to stop...",
            ShutdownProgress::Complete { .. } => "Shutdown: complete.",
        };
        let _ = draw_shutdown_status(terminal, label);
    });

    let diagnostics = supervisor.exit_diagnostics();
    let non_zero_exits = diagnostics
        .iter()
        .filter(|(_, diagnostic)| {
            diagnostic != "exit=0" && !is_expected_shutdown_diagnostic(diagnostic)
        })
        .cloned()
        .collect::<Vec<(usize, String)>>();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, EnableLineWrap)?;
    terminal.show_cursor()?;

    let mut renderer = PlainRenderer::stdout(OutputMode::from_env());
    renderer.section("Process Results")?;
    let now = Instant::now();
    let rows = supervisor
        .configs()
        .iter()
        .zip(diagnostics.iter())
        .map(|(config, (_, diagnostic))| {
            let elapsed = process_started_at
                .get(&config.id)
                .map(|started| format_elapsed(now.saturating_duration_since(*started)))
                .unwrap_or_else(|| "0s".to_owned());
            let clean = diagnostic == "exit=0" || is_expected_shutdown_diagnostic(diagnostic);
            let status = if clean {
                "OK".to_owned()
            } else {
                diagnostic.clone()
            };
            vec![
                format!("[{}] {}", config.id, config.command_line()),
                status,
                elapsed,
            ]
        })
        .collect::<Vec<Vec<String>>>();
    renderer.table(&TableSpec::new(
        vec![
            "command".to_owned(),
            "status".to_owned(),
            "time".to_owned(),
        ],
        rows,
    ))?;
    if non_zero_exits.is_empty() {
        renderer.notice(NoticeLevel::Success, "all commands finished cleanly")?;
    } else {
        renderer.notice(
            NoticeLevel::Warning,
            &format!("{} command(s) did not exit cleanly", non_zero_exits.len()),
        )?;
    }
    renderer.text("")?;

    Ok(non_zero_exits)
}

fn draw_shutdown_status(terminal: &mut TuiTerminal, status: &str) -> Result<(), io::Error> {
    terminal.draw(|frame| {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let footer = Paragraph::new(status.to_owned()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(footer, chunks[1]);
    })?;
    Ok(())
}
