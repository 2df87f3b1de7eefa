use std::collections::HashMap;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::log::StreamKind;
use crate::process_manager::ProcessExitState;

use super::super::view_model::{tag_width, LogViewModel};
use super::color_for_id;
use super::header::panel_block;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn render_log_pane(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &LogViewModel,
    exit_states: &HashMap<usize, ProcessExitState>,
    spinner_tick: usize,
) {
    let panel = panel_block(None, false, Color::DarkGray);
    let output_height = area.height.saturating_sub(2) as usize;

    let all_exited = !exit_states.is_empty()
        && exit_states
            .values()
            .all(|state| !matches!(state, ProcessExitState::Running));
    if view.filtered_len == 0 && !all_exited {
        let spinner = SPINNER_FRAMES[spinner_tick % SPINNER_FRAMES.len()];
        let waiting = Paragraph::new(Line::from(vec![
            Span::styled(spinner.to_owned(), Style::default().fg(Color::Yellow)),
            Span::styled(
                " waiting for output...",
                Style::default().fg(Color::DarkGray),
            ),
        ]))
        .block(panel);
        frame.render_widget(waiting, area);
        return;
    }

    let lines = view
        .visible
        .iter()
        .map(|entry| {
            let tag = if entry.continuation {
                Span::raw(" ".repeat(tag_width(entry.command_id)))
            } else {
                Span::styled(
                    format!("[{}] ", entry.command_id),
                    Style::default().fg(color_for_id(entry.command_id)),
                )
            };
            let text = match entry.stream {
                StreamKind::Stdout => Span::raw(entry.text.clone()),
                StreamKind::Stderr => {
                    Span::styled(entry.text.clone(), Style::default().fg(Color::LightRed))
                }
                StreamKind::System => Span::styled(
                    entry.text.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::DIM),
                ),
            };
            Line::from(vec![tag, text])
        })
        .collect::<Vec<Line>>();

    frame.render_widget(Paragraph::new(lines).block(panel), area);

    let mut scrollbar_state = ScrollbarState::new(view.scrollbar_total.max(1))
        .viewport_content_length(output_height.max(1))
        .position(view.scroll_offset.min(view.max_offset));
    frame.render_stateful_widget(
        Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
        area,
        &mut scrollbar_state,
    );
}
