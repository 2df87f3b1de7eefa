use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::Frame;

use crate::process_manager::{ProcessConfig, ProcessExitState};

use super::color_for_id;

const TAB_COMMAND_WIDTH: usize = 20;

/// One tab per filter position: "All" first, then every command. Exited
/// commands recolor to green/red so failures are visible from any tab.
pub(super) fn render_filter_tabs(
    frame: &mut Frame<'_>,
    area: ratatui::layout::Rect,
    configs: &[ProcessConfig],
    filter: Option<usize>,
    exit_states: &HashMap<usize, ProcessExitState>,
) {
    let selected = filter.map(|id| id + 1).unwrap_or(0);
    let mut titles = Vec::with_capacity(configs.len() + 1);
    titles.push(Line::from(Span::styled(
        "All",
        if filter.is_none() {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::DarkGray)
        },
    )));
    for config in configs {
        let mut label = config.command.clone();
        if label.chars().count() > TAB_COMMAND_WIDTH {
            label = label.chars().take(TAB_COMMAND_WIDTH).collect();
        }
        let style = match exit_states.get(&config.id) {
            Some(ProcessExitState::Success) => Style::default().fg(Color::Green),
            Some(ProcessExitState::Failure) => Style::default().fg(Color::Red),
            _ => {
                if filter == Some(config.id) {
                    Style::default().fg(color_for_id(config.id))
                } else {
                    Style::default().fg(Color::DarkGray)
                }
            }
        };
        titles.push(Line::from(Span::styled(
            format!("[{}] {label}", config.id),
            style,
        )));
    }

    let tabs = Tabs::new(titles)
        .select(selected)
        .block(panel_block(Some(" BRAID "), true, Color::Magenta))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

pub(super) fn panel_block<'a>(
    title: Option<&'a str>,
    show_version: bool,
    border_color: Color,
) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(border_color));
    if let Some(title) = title {
        block = block.title_top(
            Line::from(Span::styled(
                title.to_owned(),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
            .left_aligned(),
        );
    }
    if show_version {
        let version = format!(" v{} ", env!("CARGO_PKG_VERSION"));
        block = block.title_bottom(
            Line::from(Span::styled(
                version,
                Style::default().fg(Color::LightMagenta),
            ))
            .right_aligned(),
        );
    }
    block
}
