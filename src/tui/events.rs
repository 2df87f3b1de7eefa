use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::log::store::LogStore;
use crate::process_manager::ProcessSupervisor;

use super::config::{ENTRY_DRAIN_WAIT, MAX_ENTRIES_PER_TICK, PAGE_SCROLL_LINES};
use super::diagnostics::RuntimeDiagnostics;
use super::state::{Modal, ViewState};

/// Side effects a key transition asks the event loop to perform. The
/// transition function itself never touches the supervisor or the
/// filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum UiCommand {
    RestartFiltered,
    SaveFiltered { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum KeyOutcome {
    Continue,
    Quit,
    Command(UiCommand),
}

/// The slice of derived view data a transition needs: the clamp bound and
/// the number of configured processes (for filter cycling).
#[derive(Debug, Clone, Copy)]
pub(super) struct ViewContext {
    pub(super) max_offset: usize,
    pub(super) process_count: usize,
}

/// Moves entries from the supervisor channel into the store, bounded per
/// tick so a chatty process cannot starve rendering.
pub(super) fn drain_entries(
    supervisor: &ProcessSupervisor,
    store: &mut LogStore,
    diagnostics: &mut RuntimeDiagnostics,
) {
    let mut drained = 0usize;
    while drained < MAX_ENTRIES_PER_TICK {
        let Some(entry) = supervisor.next_entry_timeout(ENTRY_DRAIN_WAIT) else {
            break;
        };
        drained += 1;
        diagnostics.record_entry(entry.stream);
        store.append(entry);
    }
}

/// The explicit view state transition: `(state, key, context) -> outcome`.
/// Invoked synchronously per key event; offset clamping is a pure step here
/// and in the per-frame view model recomputation.
pub(super) fn handle_key_event(
    key: &KeyEvent,
    state: &mut ViewState,
    ctx: ViewContext,
) -> KeyOutcome {
    match &mut state.modal {
        // Banner and help dismiss on any key; the keystroke is absorbed.
        Modal::Error { .. } | Modal::Help => {
            state.modal = Modal::None;
            return KeyOutcome::Continue;
        }
        // The save prompt recognizes text entry, cancel, and submit only;
        // every other shortcut is suppressed while it is open.
        Modal::Save { input } => {
            match key.code {
                KeyCode::Esc => {
                    state.modal = Modal::None;
                }
                KeyCode::Enter => {
                    if !input.is_empty() {
                        let path = input.clone();
                        state.modal = Modal::None;
                        return KeyOutcome::Command(UiCommand::SaveFiltered { path });
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    input.push(c);
                }
                _ => {}
            }
            return KeyOutcome::Continue;
        }
        Modal::None => {}
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return KeyOutcome::Quit;
    }

    match key.code {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Up => {
            state.tail_mode = false;
            state.scroll_offset = state.scroll_offset.saturating_sub(1);
        }
        KeyCode::Down => {
            scroll_down(state, 1, ctx.max_offset);
        }
        KeyCode::PageUp => {
            state.tail_mode = false;
            state.scroll_offset = state.scroll_offset.saturating_sub(PAGE_SCROLL_LINES);
        }
        KeyCode::PageDown => {
            scroll_down(state, PAGE_SCROLL_LINES, ctx.max_offset);
        }
        KeyCode::Home => {
            state.tail_mode = false;
            state.scroll_offset = 0;
        }
        KeyCode::End => {
            state.tail_mode = true;
            state.scroll_offset = ctx.max_offset;
        }
        KeyCode::Left => state.cycle_filter_left(),
        KeyCode::Right => state.cycle_filter_right(ctx.process_count),
        KeyCode::Char('s') => {
            state.modal = Modal::Save {
                input: String::new(),
            };
        }
        KeyCode::Char('r') => return KeyOutcome::Command(UiCommand::RestartFiltered),
        KeyCode::Char('h') | KeyCode::Char('?') => {
            state.modal = Modal::Help;
        }
        _ => {}
    }

    KeyOutcome::Continue
}

/// Scrolling back down to the clamped maximum re-enables tail mode; the
/// offset is then re-pinned on the next entry arrival, not retroactively.
fn scroll_down(state: &mut ViewState, lines: usize, max_offset: usize) {
    state.scroll_offset = state.scroll_offset.saturating_add(lines).min(max_offset);
    if state.scroll_offset == max_offset {
        state.tail_mode = true;
    }
}

/// Writes the filtered log as plain text, one `[id] text` line per entry.
/// Returns the number of lines written.
pub(super) fn save_filtered(
    store: &LogStore,
    filter: Option<usize>,
    path: &Path,
) -> Result<usize, std::io::Error> {
    let filtered = store.filtered(filter);
    let mut text = String::new();
    for entry in &filtered {
        text.push_str(&format!("[{}] {}\n", entry.command_id, entry.text));
    }
    std::fs::write(path, text)?;
    Ok(filtered.len())
}
