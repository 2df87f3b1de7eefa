use std::time::{Duration, Instant};

/// Transient UI surfaces layered over the log view. Mutually exclusive by
/// construction; every one of them returns to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Modal {
    None,
    /// Filename prompt for saving the filtered log.
    Save { input: String },
    /// Status/error banner; auto-dismisses after a fixed delay or on the
    /// next keystroke.
    Error { message: String, shown_at: Instant },
    Help,
}

/// The view's mutable state, owned exclusively by the event loop.
#[derive(Debug)]
pub(super) struct ViewState {
    /// Lines from the top of the filtered log to the top of the window.
    pub(super) scroll_offset: usize,
    /// Restricts the view to one command id; `None` shows everything.
    pub(super) filter: Option<usize>,
    /// When true the offset is pinned to the newest entries.
    pub(super) tail_mode: bool,
    pub(super) modal: Modal,
}

impl ViewState {
    pub(super) fn new() -> Self {
        Self {
            scroll_offset: 0,
            filter: None,
            tail_mode: true,
            modal: Modal::None,
        }
    }

    pub(super) fn show_banner(&mut self, message: impl Into<String>) {
        self.modal = Modal::Error {
            message: message.into(),
            shown_at: Instant::now(),
        };
    }

    pub(super) fn dismiss_expired_banner(&mut self, timeout: Duration) {
        if let Modal::Error { shown_at, .. } = &self.modal {
            if shown_at.elapsed() >= timeout {
                self.modal = Modal::None;
            }
        }
    }

    /// Filter cycle order is `None, 0, 1, …, N-1`, clamped at both ends.
    pub(super) fn cycle_filter_right(&mut self, process_count: usize) {
        self.filter = match self.filter {
            None if process_count > 0 => Some(0),
            None => None,
            Some(current) => Some((current + 1).min(process_count.saturating_sub(1))),
        };
    }

    pub(super) fn cycle_filter_left(&mut self) {
        self.filter = match self.filter {
            None | Some(0) => None,
            Some(current) => Some(current - 1),
        };
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{Modal, ViewState};

    #[test]
    fn tail_mode_starts_enabled_with_no_filter() {
        let state = ViewState::new();
        assert!(state.tail_mode);
        assert_eq!(state.filter, None);
        assert_eq!(state.scroll_offset, 0);
        assert_eq!(state.modal, Modal::None);
    }

    #[test]
    fn filter_cycles_clamp_at_both_ends() {
        let mut state = ViewState::new();
        state.cycle_filter_left();
        assert_eq!(state.filter, None);

        state.cycle_filter_right(3);
        assert_eq!(state.filter, Some(0));
        state.cycle_filter_right(3);
        state.cycle_filter_right(3);
        assert_eq!(state.filter, Some(2));
        state.cycle_filter_right(3);
        assert_eq!(state.filter, Some(2));

        state.cycle_filter_left();
        state.cycle_filter_left();
        assert_eq!(state.filter, Some(0));
        state.cycle_filter_left();
        assert_eq!(state.filter, None);
    }

    #[test]
    fn filter_stays_unfiltered_when_no_processes_are_configured() {
        let mut state = ViewState::new();
        state.cycle_filter_right(0);
        assert_eq!(state.filter, None);
    }

    #[test]
    fn banner_expires_after_timeout() {
        let mut state = ViewState::new();
        state.modal = Modal::Error {
            message: "save failed".to_owned(),
            shown_at: Instant::now() - Duration::from_secs(10),
        };
        state.dismiss_expired_banner(Duration::from_secs(4));
        assert_eq!(state.modal, Modal::None);
    }

    #[test]
    fn fresh_banner_is_not_dismissed() {
        let mut state = ViewState::new();
        state.show_banner("saved 3 lines");
        state.dismiss_expired_banner(Duration::from_secs(4));
        assert!(matches!(state.modal, Modal::Error { .. }));
    }
}
