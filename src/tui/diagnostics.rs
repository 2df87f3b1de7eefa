use std::time::Instant;

use crate::log::StreamKind;

/// Env-gated runtime counters (`BRAID_TUI_DIAGNOSTICS=1`), surfaced in the
/// footer. Costs nothing when disabled.
#[derive(Debug, Clone)]
pub(super) struct RuntimeDiagnostics {
    enabled: bool,
    started_at: Instant,
    frame_count: usize,
    keypress_count: usize,
    stdout_entries: usize,
    stderr_entries: usize,
    system_entries: usize,
}

impl RuntimeDiagnostics {
    pub(super) fn from_env() -> Self {
        let enabled = std::env::var("BRAID_TUI_DIAGNOSTICS")
            .ok()
            .is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true"));
        Self::new(enabled)
    }

    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            started_at: Instant::now(),
            frame_count: 0,
            keypress_count: 0,
            stdout_entries: 0,
            stderr_entries: 0,
            system_entries: 0,
        }
    }

    pub(super) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(super) fn record_frame(&mut self) {
        if !self.enabled {
            return;
        }
        self.frame_count = self.frame_count.saturating_add(1);
    }

    pub(super) fn record_keypress(&mut self) {
        if !self.enabled {
            return;
        }
        self.keypress_count = self.keypress_count.saturating_add(1);
    }

    pub(super) fn record_entry(&mut self, stream: StreamKind) {
        if !self.enabled {
            return;
        }
        let counter = match stream {
            StreamKind::Stdout => &mut self.stdout_entries,
            StreamKind::Stderr => &mut self.stderr_entries,
            StreamKind::System => &mut self.system_entries,
        };
        *counter = counter.saturating_add(1);
    }

    pub(super) fn summary_line(&self) -> String {
        format!(
            "diag {}ms frames={} keys={} out={} err={} sys={}",
            self.started_at.elapsed().as_millis(),
            self.frame_count,
            self.keypress_count,
            self.stdout_entries,
            self.stderr_entries,
            self.system_entries
        )
    }
}
