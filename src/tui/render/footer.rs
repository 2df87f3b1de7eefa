use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::super::diagnostics::RuntimeDiagnostics;
use super::super::state::{Modal, ViewState};

/// One-line footer: the error banner when one is active, key hints
/// otherwise. Diagnostics counters are appended when enabled.
pub(super) fn render_footer(
    frame: &mut Frame<'_>,
    area: ratatui::layout::Rect,
    state: &ViewState,
    diagnostics: &RuntimeDiagnostics,
) {
    if let Modal::Error { message, .. } = &state.modal {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(
                "✕ ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(message.clone(), Style::default().fg(Color::Red)),
            Span::styled(
                "  (any key to dismiss)",
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        frame.render_widget(banner, area);
        return;
    }

    let muted = Style::default().fg(Color::DarkGray);
    let active = Style::default().fg(Color::Yellow);
    let mut spans = vec![
        Span::styled("←/→ filter", muted),
        Span::styled("  |  ", muted),
        Span::styled("↑/↓ scroll", muted),
        Span::styled("  |  ", muted),
        Span::styled("r restart", muted),
        Span::styled("  |  ", muted),
        Span::styled("s save", muted),
        Span::styled("  |  ", muted),
        Span::styled("h help", muted),
        Span::styled("  |  ", muted),
        Span::styled("q quit", muted),
        Span::styled("  |  ", muted),
        Span::styled(
            if state.tail_mode { "tail:on" } else { "tail:off" },
            if state.tail_mode { active } else { muted },
        ),
    ];
    if let Some(id) = state.filter {
        spans.push(Span::styled("  |  ", muted));
        spans.push(Span::styled(format!("filter:[{id}]"), active));
    }
    if diagnostics.enabled() {
        spans.push(Span::styled("  |  ", muted));
        spans.push(Span::styled(diagnostics.summary_line(), muted));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
