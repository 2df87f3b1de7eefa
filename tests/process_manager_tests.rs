use std::time::{Duration, Instant};

use braid::log::{LogEntry, StreamKind};
use braid::process_manager::{ProcessConfig, ProcessSupervisor};

fn config(id: usize, command: &str, args: &[&str]) -> ProcessConfig {
    ProcessConfig {
        id,
        command: command.to_owned(),
        args: args.iter().map(|a| (*a).to_owned()).collect(),
    }
}

fn shell(id: usize, script: &str) -> ProcessConfig {
    config(id, "sh", &["-c", script])
}

/// Drains entries until `done` says enough arrived or the deadline passes.
fn drain_until<F>(supervisor: &ProcessSupervisor, timeout: Duration, mut done: F) -> Vec<LogEntry>
where
    F: FnMut(&[LogEntry]) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut entries = Vec::new();
    while Instant::now() < deadline {
        if let Some(entry) = supervisor.next_entry_timeout(Duration::from_millis(100)) {
            entries.push(entry);
            if done(&entries) {
                break;
            }
        }
    }
    entries
}

fn exit_count(entries: &[LogEntry], id: usize) -> usize {
    entries
        .iter()
        .filter(|e| {
            e.command_id == id
                && e.stream == StreamKind::System
                && (e.text.starts_with("process exited") || e.text.starts_with("process terminated"))
        })
        .count()
}

#[test]
fn two_commands_emit_start_echo_output_and_one_exit_each() {
    let supervisor = ProcessSupervisor::spawn_all(
        vec![config(0, "echo", &["a"]), config(1, "echo", &["b"])],
        80,
    );

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1 && exit_count(seen, 1) >= 1
    });

    // Indices are strictly increasing in arrival order.
    for pair in entries.windows(2) {
        assert!(pair[1].index > pair[0].index);
    }

    for (id, expected_echo, expected_line) in [(0usize, "echo a", "a"), (1usize, "echo b", "b")] {
        let own = entries
            .iter()
            .filter(|e| e.command_id == id)
            .collect::<Vec<&LogEntry>>();
        assert_eq!(
            own.first().map(|e| (e.stream, e.text.as_str())),
            Some((StreamKind::System, expected_echo)),
            "first entry per command is the start echo"
        );
        assert!(own
            .iter()
            .any(|e| e.stream == StreamKind::Stdout && e.text == expected_line));
        assert_eq!(exit_count(&entries, id), 1);
        assert!(entries
            .iter()
            .filter(|e| e.command_id == id)
            .any(|e| e.text == "process exited with code 0"));
    }

    // Filtering by one id yields an order-preserving subsequence of the log.
    let only_one = entries
        .iter()
        .filter(|e| e.command_id == 1)
        .collect::<Vec<&LogEntry>>();
    for pair in only_one.windows(2) {
        assert!(pair[1].index > pair[0].index);
    }
}

#[test]
fn stderr_is_captured_on_its_own_stream() {
    let supervisor =
        ProcessSupervisor::spawn_all(vec![shell(0, "printf 'boom\\n' 1>&2")], 80);

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });

    assert!(entries
        .iter()
        .any(|e| e.stream == StreamKind::Stderr && e.text == "boom"));
}

#[test]
fn trailing_partial_line_is_flushed_when_the_stream_closes() {
    let supervisor = ProcessSupervisor::spawn_all(vec![shell(0, "printf no-newline")], 80);

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });

    assert!(entries
        .iter()
        .any(|e| e.stream == StreamKind::Stdout && e.text == "no-newline"));
}

#[test]
fn genuinely_empty_lines_become_empty_entries() {
    let supervisor = ProcessSupervisor::spawn_all(vec![shell(0, "printf '\\n\\n'")], 80);

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });

    let empties = entries
        .iter()
        .filter(|e| e.stream == StreamKind::Stdout && e.text.is_empty())
        .count();
    assert_eq!(empties, 2);
}

#[test]
fn long_lines_wrap_into_continuation_fragments() {
    let supervisor =
        ProcessSupervisor::spawn_all(vec![shell(0, "printf 'abcdefghijklmnop\\n'")], 8);

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });

    let fragments = entries
        .iter()
        .filter(|e| e.stream == StreamKind::Stdout)
        .collect::<Vec<&LogEntry>>();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].text, "abcdefgh");
    assert!(!fragments[0].continuation);
    assert_eq!(fragments[1].text, "ijklmnop");
    assert!(fragments[1].continuation);
    // Fragments of one line share the chunk's capture timestamp.
    assert_eq!(fragments[0].timestamp, fragments[1].timestamp);
}

#[test]
fn escape_sequences_are_stripped_from_output() {
    let supervisor = ProcessSupervisor::spawn_all(
        vec![shell(0, "printf '\\033[31mred\\033[0m plain\\n'")],
        80,
    );

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });

    assert!(entries
        .iter()
        .any(|e| e.stream == StreamKind::Stdout && e.text == "red plain"));
}

#[test]
fn invalid_utf8_is_decoded_with_replacement_characters() {
    let supervisor = ProcessSupervisor::spawn_all(vec![shell(0, "printf '\\377hi\\n'")], 80);

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });

    let line = entries
        .iter()
        .find(|e| e.stream == StreamKind::Stdout)
        .expect("stdout entry");
    assert!(line.text.contains('\u{FFFD}'));
    assert!(line.text.ends_with("hi"));
}

#[test]
fn spawn_failure_is_logged_and_leaves_other_processes_running() {
    let supervisor = ProcessSupervisor::spawn_all(
        vec![
            config(0, "braid-test-no-such-command", &[]),
            config(1, "echo", &["ok"]),
        ],
        80,
    );

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 1) >= 1
    });

    assert!(entries.iter().any(|e| {
        e.command_id == 0 && e.stream == StreamKind::System && e.text.contains("failed to spawn")
    }));
    assert!(entries
        .iter()
        .any(|e| e.command_id == 1 && e.stream == StreamKind::Stdout && e.text == "ok"));
    assert_eq!(exit_count(&entries, 1), 1);
}

#[test]
fn restart_replaces_the_handle_without_leaking_the_old_exit() {
    let mut supervisor = ProcessSupervisor::spawn_all(vec![config(0, "sleep", &["5"])], 80);

    let startup = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        seen.iter().any(|e| e.stream == StreamKind::System)
    });
    assert_eq!(
        startup.first().map(|e| e.text.as_str()),
        Some("sleep 5"),
        "start echo for the first handle"
    );

    supervisor.restart(0).expect("restart");

    // The old handle is killed deliberately; its exit must not surface.
    let after_restart = drain_until(&supervisor, Duration::from_millis(800), |seen| {
        seen.iter()
            .any(|e| e.stream == StreamKind::System && e.text == "sleep 5")
    });
    assert!(after_restart
        .iter()
        .any(|e| e.stream == StreamKind::System && e.text == "sleep 5"));
    assert_eq!(exit_count(&after_restart, 0), 0);

    supervisor.terminate(0).expect("terminate");
    let shutdown = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });
    assert_eq!(exit_count(&shutdown, 0), 1);
    assert!(shutdown
        .iter()
        .any(|e| e.text == "process terminated by signal 15"));
}

#[test]
fn terminate_is_idempotent_on_exited_processes() {
    let supervisor = ProcessSupervisor::spawn_all(vec![config(0, "echo", &["done"])], 80);

    let entries = drain_until(&supervisor, Duration::from_secs(10), |seen| {
        exit_count(seen, 0) >= 1
    });
    assert_eq!(exit_count(&entries, 0), 1);

    supervisor.terminate(0).expect("terminate once");
    supervisor.terminate(0).expect("terminate twice");

    // No second exit notification appears.
    let extra = drain_until(&supervisor, Duration::from_millis(400), |_| false);
    assert_eq!(exit_count(&extra, 0), 0);
}
