use crate::log::store::LogStore;
use crate::log::LogEntry;

use super::config::{CHROME_ROWS, MIN_COLUMN_BUDGET};
use super::state::ViewState;

/// Everything the render layer needs for one frame of the log pane.
pub(super) struct LogViewModel {
    pub(super) visible: Vec<LogEntry>,
    pub(super) scroll_offset: usize,
    pub(super) max_offset: usize,
    pub(super) filtered_len: usize,
    pub(super) scrollbar_total: usize,
}

/// Recomputes the visible window for the current frame: filter, clamp the
/// stored offset into `[0, max]`, pin to the bottom while tail mode is on,
/// then slice. Clamping happens here on every recomputation (new entries,
/// filter change, resize) rather than through change detection.
pub(super) fn build_view_model(
    store: &LogStore,
    state: &mut ViewState,
    viewport_height: usize,
) -> LogViewModel {
    let filtered = store.filtered(state.filter);
    let max_offset = filtered.len().saturating_sub(viewport_height);
    state.scroll_offset = if state.tail_mode {
        max_offset
    } else {
        state.scroll_offset.min(max_offset)
    };
    let visible = LogStore::windowed(&filtered, state.scroll_offset, viewport_height)
        .iter()
        .map(|entry| (*entry).clone())
        .collect::<Vec<LogEntry>>();

    LogViewModel {
        visible,
        scroll_offset: state.scroll_offset,
        max_offset,
        filtered_len: filtered.len(),
        scrollbar_total: viewport_height.max(1).saturating_add(max_offset),
    }
}

pub(super) fn viewport_height(total_rows: u16) -> usize {
    (total_rows as usize).saturating_sub(CHROME_ROWS).max(1)
}

/// Column budget for wrapping newly captured lines: terminal width minus
/// pane borders and the widest `[id] ` tag.
pub(super) fn column_budget(total_cols: u16, process_count: usize) -> usize {
    let reserved = 2 + tag_width(process_count.saturating_sub(1));
    (total_cols as usize)
        .saturating_sub(reserved)
        .max(MIN_COLUMN_BUDGET)
}

/// Width of the `[id] ` prefix for a given command id.
pub(super) fn tag_width(id: usize) -> usize {
    let mut digits = 1usize;
    let mut value = id;
    while value >= 10 {
        digits += 1;
        value /= 10;
    }
    digits + 3
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::{build_view_model, column_budget, tag_width, viewport_height};
    use crate::log::store::LogStore;
    use crate::log::{LogEntry, StreamKind};
    use crate::tui::state::ViewState;

    fn store_with_lines(count: u64) -> LogStore {
        let mut store = LogStore::new();
        for index in 0..count {
            store.append(LogEntry {
                command_id: (index % 2) as usize,
                text: format!("line-{index}"),
                timestamp: SystemTime::now(),
                stream: StreamKind::Stdout,
                index,
                continuation: false,
            });
        }
        store
    }

    #[test]
    fn stored_offset_is_clamped_to_filtered_length() {
        let store = store_with_lines(20);
        let mut state = ViewState::new();
        state.tail_mode = false;
        state.scroll_offset = 999;

        let view = build_view_model(&store, &mut state, 5);
        assert_eq!(view.max_offset, 15);
        assert_eq!(view.scroll_offset, 15);
        assert_eq!(state.scroll_offset, 15);
        assert_eq!(view.visible.len(), 5);
    }

    #[test]
    fn tail_mode_pins_offset_to_newest_entries() {
        let store = store_with_lines(12);
        let mut state = ViewState::new();
        assert!(state.tail_mode);

        let view = build_view_model(&store, &mut state, 5);
        assert_eq!(view.scroll_offset, 7);
        assert_eq!(view.visible.last().map(|e| e.index), Some(11));
    }

    #[test]
    fn filter_change_reclamps_without_discarding_entries() {
        let store = store_with_lines(20);
        let mut state = ViewState::new();
        state.tail_mode = false;
        state.scroll_offset = 15;
        state.filter = Some(1);

        let view = build_view_model(&store, &mut state, 5);
        assert_eq!(view.filtered_len, 10);
        assert_eq!(view.max_offset, 5);
        assert_eq!(view.scroll_offset, 5);
        assert!(view.visible.iter().all(|e| e.command_id == 1));
    }

    #[test]
    fn short_logs_have_zero_max_offset() {
        let store = store_with_lines(3);
        let mut state = ViewState::new();
        let view = build_view_model(&store, &mut state, 10);
        assert_eq!(view.max_offset, 0);
        assert_eq!(view.scroll_offset, 0);
        assert_eq!(view.visible.len(), 3);
    }

    #[test]
    fn viewport_height_reserves_chrome_rows() {
        assert_eq!(viewport_height(30), 24);
        assert_eq!(viewport_height(4), 1);
    }

    #[test]
    fn column_budget_reserves_tag_and_borders_with_a_floor() {
        assert_eq!(tag_width(0), 4);
        assert_eq!(tag_width(12), 5);
        assert_eq!(column_budget(80, 2), 74);
        assert_eq!(column_budget(10, 2), 20);
    }
}
