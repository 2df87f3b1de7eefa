use std::collections::HashMap;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Color;
use ratatui::Frame;

use crate::process_manager::{ProcessConfig, ProcessExitState};

use super::diagnostics::RuntimeDiagnostics;
use super::state::{Modal, ViewState};
use super::view_model::LogViewModel;

mod footer;
mod header;
mod log_pane;
mod overlays;

use footer::render_footer;
use header::render_filter_tabs;
use log_pane::render_log_pane;
use overlays::{render_help_overlay, render_save_modal};

/// Per-command identity colors, assigned by id modulo the palette.
const PROCESS_COLORS: [Color; 7] = [
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::White,
    Color::Gray,
];

pub(super) fn color_for_id(id: usize) -> Color {
    PROCESS_COLORS[id % PROCESS_COLORS.len()]
}

/// Everything one frame is drawn from: the windowed view model plus the
/// state flags the chrome needs.
pub(super) struct FrameView<'a> {
    pub(super) configs: &'a [ProcessConfig],
    pub(super) exit_states: &'a HashMap<usize, ProcessExitState>,
    pub(super) view: &'a LogViewModel,
    pub(super) state: &'a ViewState,
    pub(super) spinner_tick: usize,
    pub(super) diagnostics: &'a RuntimeDiagnostics,
}

pub(super) fn render_ui(frame: &mut Frame<'_>, frame_view: &FrameView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_filter_tabs(
        frame,
        chunks[0],
        frame_view.configs,
        frame_view.state.filter,
        frame_view.exit_states,
    );

    if matches!(frame_view.state.modal, Modal::Help) {
        render_help_overlay(frame, chunks[1]);
    } else {
        render_log_pane(
            frame,
            chunks[1],
            frame_view.view,
            frame_view.exit_states,
            frame_view.spinner_tick,
        );
    }

    if let Modal::Save { input } = &frame_view.state.modal {
        render_save_modal(frame, input);
    }

    render_footer(frame, chunks[2], frame_view.state, frame_view.diagnostics);
}
