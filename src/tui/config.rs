use std::time::Duration;

pub(super) const MAX_ENTRIES_PER_TICK: usize = 200;
pub(super) const ENTRY_DRAIN_WAIT: Duration = Duration::from_millis(1);
pub(super) const INPUT_POLL_WAIT: Duration = Duration::from_millis(50);
pub(super) const SHUTDOWN_GRACE_TIMEOUT: Duration = Duration::from_secs(3);
pub(super) const ERROR_BANNER_TIMEOUT: Duration = Duration::from_secs(4);

pub(super) const PAGE_SCROLL_LINES: usize = 10;

/// Rows taken by chrome around the log pane: tab bar (3), pane borders (2),
/// footer (1).
pub(super) const CHROME_ROWS: usize = 6;

/// Wrapping narrower than this produces unreadable confetti on tiny
/// terminals; clamp the budget instead.
pub(super) const MIN_COLUMN_BUDGET: usize = 20;

pub(super) const DEFAULT_COLUMN_BUDGET: usize = 80;
