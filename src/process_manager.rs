use std::collections::HashMap;
use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::{setpgid, Pid};

use crate::log::text::{sanitize_text, split_line, strip_ansi};
use crate::log::{LogEntry, LogSequencer, StreamKind};

const READ_CHUNK_SIZE: usize = 8192;
const EXIT_POLL_WAIT: Duration = Duration::from_millis(40);

/// One command to supervise, as parsed from the command line. `id` is stable
/// for the process's lifetime and doubles as its color and filter identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    pub id: usize,
    pub command: String,
    pub args: Vec<String>,
}

impl ProcessConfig {
    pub fn command_line(&self) -> String {
        let mut line = self.command.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExitState {
    Running,
    Success,
    Failure,
}

#[derive(Debug)]
pub enum ProcessManagerError {
    Spawn {
        command: String,
        error: std::io::Error,
    },
    UnknownProcess {
        id: usize,
    },
}

impl std::fmt::Display for ProcessManagerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessManagerError::Spawn { command, error } => {
                write!(f, "failed to spawn `{command}`: {error}")
            }
            ProcessManagerError::UnknownProcess { id } => {
                write!(f, "no supervised process with id {id}")
            }
        }
    }
}

impl std::error::Error for ProcessManagerError {}

/// Everything a drain or watcher thread needs to turn raw output into
/// sequenced log entries: the owning command id, the shared index source,
/// the shared column budget, and the channel back to the event loop.
///
/// `emit_lock` serializes index assignment with the send, so entries arrive
/// on the channel in strictly increasing index order and the fragments of
/// one wrapped line stay contiguous.
#[derive(Clone)]
struct EntryEmitter {
    command_id: usize,
    sequencer: Arc<LogSequencer>,
    column_budget: Arc<AtomicUsize>,
    emit_lock: Arc<Mutex<()>>,
    tx: Sender<LogEntry>,
}

impl EntryEmitter {
    /// Emits one supervisor-level message. System entries are never split:
    /// start echoes and exit notices must stay exactly one entry each.
    fn system(&self, text: String) {
        let _guard = self.emit_lock.lock().expect("emit lock");
        let _ = self.tx.send(LogEntry {
            command_id: self.command_id,
            text,
            timestamp: SystemTime::now(),
            stream: StreamKind::System,
            index: self.sequencer.next(),
            continuation: false,
        });
    }

    /// Strips escapes, sanitizes, and wraps one complete output line into
    /// width-bounded fragments. All fragments share the chunk's capture
    /// timestamp; all but the first are flagged as continuations.
    fn line(&self, stream: StreamKind, raw: &str, timestamp: SystemTime) {
        let clean = sanitize_text(&strip_ansi(raw));
        let budget = self.column_budget.load(Ordering::Relaxed).max(1);
        let _guard = self.emit_lock.lock().expect("emit lock");
        for (position, fragment) in split_line(&clean, budget).into_iter().enumerate() {
            let _ = self.tx.send(LogEntry {
                command_id: self.command_id,
                text: fragment,
                timestamp,
                stream,
                index: self.sequencer.next(),
                continuation: position > 0,
            });
        }
    }
}

/// A live child process plus its config. `superseded` is set when a restart
/// deliberately replaces the handle, so the old exit notification is reaped
/// silently instead of surfacing as a fresh log entry.
struct ProcessHandle {
    config: ProcessConfig,
    child: Arc<Mutex<Child>>,
    superseded: Arc<AtomicBool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownProgress {
    SendingTerm,
    Waiting,
    ForceKilling,
    Complete { total: usize, forced: usize },
}

/// Owns the lifecycle of every configured command and converts their output
/// into `LogEntry` values on a single channel.
///
/// Each successful spawn starts three threads: one drain per output stream
/// and one exit watcher. They share no mutable state beyond the atomic
/// sequencer and column budget; everything else flows through the channel.
pub struct ProcessSupervisor {
    handles: HashMap<usize, ProcessHandle>,
    configs: Vec<ProcessConfig>,
    sequencer: Arc<LogSequencer>,
    column_budget: Arc<AtomicUsize>,
    emit_lock: Arc<Mutex<()>>,
    entries_tx: Sender<LogEntry>,
    entries_rx: Receiver<LogEntry>,
}

impl ProcessSupervisor {
    /// Spawns every config. Per-process spawn failures are isolated: the
    /// failure becomes one `System` entry and the remaining processes run
    /// unaffected.
    pub fn spawn_all(configs: Vec<ProcessConfig>, max_line_width: usize) -> Self {
        let (entries_tx, entries_rx) = mpsc::channel::<LogEntry>();
        let mut supervisor = Self {
            handles: HashMap::with_capacity(configs.len()),
            configs: configs.clone(),
            sequencer: Arc::new(LogSequencer::new()),
            column_budget: Arc::new(AtomicUsize::new(max_line_width.max(1))),
            emit_lock: Arc::new(Mutex::new(())),
            entries_tx,
            entries_rx,
        };
        for config in configs {
            let _ = supervisor.start_process(config);
        }
        supervisor
    }

    pub fn configs(&self) -> &[ProcessConfig] {
        &self.configs
    }

    pub fn process_count(&self) -> usize {
        self.configs.len()
    }

    /// Updates the column budget used to wrap newly captured lines. Entries
    /// already emitted keep their original wrapping.
    pub fn set_column_budget(&self, width: usize) {
        self.column_budget.store(width.max(1), Ordering::Relaxed);
    }

    /// Receives the next emitted entry, waiting at most `timeout`.
    pub fn next_entry_timeout(&self, timeout: Duration) -> Option<LogEntry> {
        self.entries_rx.recv_timeout(timeout).ok()
    }

    /// Requests termination of one process. Does not wait for exit and is
    /// idempotent on already-exited processes.
    pub fn terminate(&self, id: usize) -> Result<(), ProcessManagerError> {
        let Some(handle) = self.handles.get(&id) else {
            return Err(ProcessManagerError::UnknownProcess { id });
        };
        request_termination(&handle.child);
        Ok(())
    }

    /// Kills the old process (suppressing its exit notification) and spawns
    /// a fresh child with the same configuration and the same sequencer.
    /// Spawn failures are reported as a `System` entry and returned.
    pub fn restart(&mut self, id: usize) -> Result<(), ProcessManagerError> {
        let Some(handle) = self.handles.remove(&id) else {
            // Never spawned successfully; retry from the stored config.
            let Some(config) = self.configs.iter().find(|c| c.id == id).cloned() else {
                return Err(ProcessManagerError::UnknownProcess { id });
            };
            return self.start_process(config);
        };
        handle.superseded.store(true, Ordering::SeqCst);
        request_termination(&handle.child);
        self.start_process(handle.config)
    }

    fn emitter_for(&self, command_id: usize) -> EntryEmitter {
        EntryEmitter {
            command_id,
            sequencer: self.sequencer.clone(),
            column_budget: self.column_budget.clone(),
            emit_lock: self.emit_lock.clone(),
            tx: self.entries_tx.clone(),
        }
    }

    fn start_process(&mut self, config: ProcessConfig) -> Result<(), ProcessManagerError> {
        let emitter = self.emitter_for(config.id);
        let mut child = match spawn_child(&config) {
            Ok(child) => child,
            Err(error) => {
                let failure = ProcessManagerError::Spawn {
                    command: config.command_line(),
                    error,
                };
                emitter.system(format!("{failure}"));
                return Err(failure);
            }
        };

        emitter.system(config.command_line());

        if let Some(stdout) = child.stdout.take() {
            let emitter = emitter.clone();
            thread::spawn(move || drain_stream(stdout, StreamKind::Stdout, emitter));
        }
        if let Some(stderr) = child.stderr.take() {
            let emitter = emitter.clone();
            thread::spawn(move || drain_stream(stderr, StreamKind::Stderr, emitter));
        }

        let child = Arc::new(Mutex::new(child));
        let superseded = Arc::new(AtomicBool::new(false));
        {
            let child = child.clone();
            let superseded = superseded.clone();
            thread::spawn(move || watch_exit(child, superseded, emitter));
        }

        self.handles.insert(
            config.id,
            ProcessHandle {
                config,
                child,
                superseded,
            },
        );
        Ok(())
    }

    /// Current exit state per configured process, for tab coloring and the
    /// final summary. Processes that never spawned count as failures.
    pub fn exit_states(&self) -> HashMap<usize, ProcessExitState> {
        self.configs
            .iter()
            .map(|config| {
                let state = match self.handles.get(&config.id) {
                    Some(handle) => match handle.child.lock().expect("child lock").try_wait() {
                        Ok(Some(status)) => {
                            if status_is_clean(status) {
                                ProcessExitState::Success
                            } else {
                                ProcessExitState::Failure
                            }
                        }
                        Ok(None) => ProcessExitState::Running,
                        Err(_) => ProcessExitState::Failure,
                    },
                    None => ProcessExitState::Failure,
                };
                (config.id, state)
            })
            .collect()
    }

    /// Per-process exit diagnostic strings (`exit=0`, `signal=15`,
    /// `running`, `never started`), sorted by id.
    pub fn exit_diagnostics(&self) -> Vec<(usize, String)> {
        let mut diagnostics = self
            .configs
            .iter()
            .map(|config| {
                let diagnostic = match self.handles.get(&config.id) {
                    Some(handle) => match handle.child.lock().expect("child lock").try_wait() {
                        Ok(Some(status)) => format_exit_diagnostic(status),
                        Ok(None) => "running".to_owned(),
                        Err(err) => format!("wait-error={err}"),
                    },
                    None => "never started".to_owned(),
                };
                (config.id, diagnostic)
            })
            .collect::<Vec<(usize, String)>>();
        diagnostics.sort_by_key(|(id, _)| *id);
        diagnostics
    }

    pub fn terminate_all(&self) {
        for handle in self.handles.values() {
            request_termination(&handle.child);
        }
    }

    /// Graceful shutdown: SIGTERM to every process group, bounded wait,
    /// then SIGKILL whatever is left.
    pub fn terminate_all_graceful_with_progress<F>(&self, timeout: Duration, mut on_progress: F)
    where
        F: FnMut(ShutdownProgress),
    {
        on_progress(ShutdownProgress::SendingTerm);
        self.terminate_all();

        on_progress(ShutdownProgress::Waiting);
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let all_exited = self.handles.values().all(|handle| {
                handle
                    .child
                    .lock()
                    .expect("child lock")
                    .try_wait()
                    .ok()
                    .flatten()
                    .is_some()
            });
            if all_exited {
                on_progress(ShutdownProgress::Complete {
                    total: self.handles.len(),
                    forced: 0,
                });
                return;
            }
            thread::sleep(EXIT_POLL_WAIT);
        }

        on_progress(ShutdownProgress::ForceKilling);
        let mut forced = 0usize;
        for handle in self.handles.values() {
            let mut child = handle.child.lock().expect("child lock");
            let still_running = child.try_wait().ok().flatten().is_none();
            if !still_running {
                continue;
            }
            #[cfg(unix)]
            {
                let _ = signal_process_group(&mut child, Signal::SIGKILL);
            }
            #[cfg(not(unix))]
            {
                let _ = child.kill();
            }
            forced += 1;
        }
        on_progress(ShutdownProgress::Complete {
            total: self.handles.len(),
            forced,
        });
    }
}

fn spawn_child(config: &ProcessConfig) -> Result<Child, std::io::Error> {
    let mut command = Command::new(&config.command);
    command
        .args(&config.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    unsafe {
        command.pre_exec(|| {
            setpgid(Pid::from_raw(0), Pid::from_raw(0))
                .map_err(|error| std::io::Error::other(error.to_string()))
        });
    }
    command.spawn()
}

/// Reads raw byte chunks, assembles complete lines across chunk boundaries,
/// and emits each line through the emitter. Decoding is best-effort
/// (replacement characters for invalid UTF-8); a stream closing mid-line
/// still flushes its trailing partial content.
fn drain_stream<R: Read>(mut reader: R, stream: StreamKind, emitter: EntryEmitter) {
    let mut pending: Vec<u8> = Vec::new();
    let mut buf = [0u8; READ_CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                let timestamp = SystemTime::now();
                pending.extend_from_slice(&buf[..n]);
                while let Some(newline) = pending.iter().position(|byte| *byte == b'\n') {
                    let line: Vec<u8> = pending.drain(..=newline).collect();
                    let text = String::from_utf8_lossy(&line[..line.len() - 1]);
                    emitter.line(stream, &text, timestamp);
                }
            }
            Err(_) => break,
        }
    }
    if !pending.is_empty() {
        let text = String::from_utf8_lossy(&pending);
        emitter.line(stream, &text, SystemTime::now());
    }
}

/// Polls for process exit and emits the exit notification. The watcher is
/// independent of the drains, runs once per handle, and stays silent when
/// the handle was superseded by a restart — but keeps polling so the child
/// is still reaped.
fn watch_exit(child: Arc<Mutex<Child>>, superseded: Arc<AtomicBool>, emitter: EntryEmitter) {
    loop {
        let status = child.lock().expect("child lock").try_wait();
        match status {
            Ok(Some(status)) => {
                if !superseded.load(Ordering::SeqCst) {
                    emitter.system(format_exit_message(status));
                }
                break;
            }
            Ok(None) => thread::sleep(EXIT_POLL_WAIT),
            Err(err) => {
                if !superseded.load(Ordering::SeqCst) {
                    emitter.system(format!("wait failed: {err}"));
                }
                break;
            }
        }
    }
}

fn request_termination(child: &Arc<Mutex<Child>>) {
    let mut child = child.lock().expect("child lock");
    #[cfg(unix)]
    {
        let _ = signal_process_group(&mut child, Signal::SIGTERM);
    }
    #[cfg(not(unix))]
    {
        let _ = child.kill();
    }
}

fn format_exit_message(status: ExitStatus) -> String {
    #[cfg(unix)]
    {
        if let Some(code) = status.code() {
            return format!("process exited with code {code}");
        }
        if let Some(signal) = status.signal() {
            return format!("process terminated by signal {signal}");
        }
        "process exited".to_owned()
    }
    #[cfg(not(unix))]
    {
        format!("process exited with code {}", status.code().unwrap_or(-1))
    }
}

fn format_exit_diagnostic(status: ExitStatus) -> String {
    #[cfg(unix)]
    {
        if let Some(code) = status.code() {
            return format!("exit={code}");
        }
        if let Some(signal) = status.signal() {
            return format!("signal={signal}");
        }
        "exit=unknown".to_owned()
    }
    #[cfg(not(unix))]
    {
        format!("exit={}", status.code().unwrap_or(-1))
    }
}

fn status_is_clean(status: ExitStatus) -> bool {
    status.success() || is_expected_shutdown_diagnostic(&format_exit_diagnostic(status))
}

/// SIGTERM/SIGKILL delivered by our own shutdown path are not failures.
pub fn is_expected_shutdown_diagnostic(diagnostic: &str) -> bool {
    matches!(diagnostic, "signal=15" | "signal=9")
}

#[cfg(unix)]
fn signal_process_group(child: &mut Child, signal: Signal) -> Result<(), nix::Error> {
    let pid = child.id() as i32;
    if pid > 0 {
        kill(Pid::from_raw(-pid), signal)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{is_expected_shutdown_diagnostic, ProcessConfig};

    #[test]
    fn command_line_joins_command_and_args() {
        let config = ProcessConfig {
            id: 0,
            command: "cargo".to_owned(),
            args: vec!["watch".to_owned(), "-x".to_owned(), "check".to_owned()],
        };
        assert_eq!(config.command_line(), "cargo watch -x check");
    }

    #[test]
    fn command_line_without_args_is_just_the_command() {
        let config = ProcessConfig {
            id: 3,
            command: "date".to_owned(),
            args: Vec::new(),
        };
        assert_eq!(config.command_line(), "date");
    }

    #[test]
    fn expected_shutdown_diagnostics_cover_term_and_kill() {
        assert!(is_expected_shutdown_diagnostic("signal=15"));
        assert!(is_expected_shutdown_diagnostic("signal=9"));
        assert!(!is_expected_shutdown_diagnostic("exit=1"));
        assert!(!is_expected_shutdown_diagnostic("signal=11"));
    }
}
