use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

use super::header::panel_block;

pub(super) fn render_help_overlay(frame: &mut Frame<'_>, area: Rect) {
    let help_lines = vec![
        Line::from(vec![Span::styled(
            "Log view",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from("up/down          scroll one line (up leaves tail mode)"),
        Line::from("pgup/pgdn        scroll by page"),
        Line::from("home/end         jump to top/bottom (end re-enables tail)"),
        Line::from("left/right       cycle the command filter (All, then each command)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Commands",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from("r               restart the filtered commands"),
        Line::from("s               save the filtered log to a file"),
        Line::from("h               toggle this help"),
        Line::from("q, ctrl+c       quit and shut down every command"),
        Line::from(""),
        Line::from(Span::styled(
            "any key dismisses this overlay",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let help = Paragraph::new(help_lines).block(panel_block(Some(" Help "), false, Color::Magenta));
    frame.render_widget(help, area);
}

pub(super) fn render_save_modal(frame: &mut Frame<'_>, input: &str) {
    let area = centered_rect(54, 24, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(Span::styled(
            "filename:",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::styled(input.to_owned(), Style::default().fg(Color::Gray)),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "enter save · esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let modal = Paragraph::new(lines).block(panel_block(
        Some(" Save filtered log "),
        false,
        Color::Magenta,
    ));
    frame.render_widget(modal, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
