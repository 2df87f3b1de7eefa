pub mod log;
pub mod process_manager;
pub mod tui;
pub mod ui;

use process_manager::ProcessConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliParseError {
    NoCommands,
    EmptyCommand { position: usize },
}

impl std::fmt::Display for CliParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliParseError::NoCommands => write!(f, "no commands given"),
            CliParseError::EmptyCommand { position } => {
                write!(f, "command {position} is empty (check the `--` separators)")
            }
        }
    }
}

impl std::error::Error for CliParseError {}

/// Parses `braid <cmd> [args…] [-- <cmd> [args…]]…` into process configs.
/// Ids are assigned left to right and are stable for the run.
pub fn parse_process_configs<I>(args: I) -> Result<Vec<ProcessConfig>, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut configs: Vec<ProcessConfig> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    let flush = |current: &mut Vec<String>, configs: &mut Vec<ProcessConfig>| {
        if current.is_empty() {
            return Err(CliParseError::EmptyCommand {
                position: configs.len(),
            });
        }
        let mut words = std::mem::take(current).into_iter();
        let command = words.next().expect("non-empty segment");
        configs.push(ProcessConfig {
            id: configs.len(),
            command,
            args: words.collect(),
        });
        Ok(())
    };

    for arg in args {
        if arg == "--" {
            flush(&mut current, &mut configs)?;
        } else {
            current.push(arg);
        }
    }

    if current.is_empty() {
        if configs.is_empty() {
            return Err(CliParseError::NoCommands);
        }
        // A trailing `--` announced another command that never came.
        return Err(CliParseError::EmptyCommand {
            position: configs.len(),
        });
    }
    flush(&mut current, &mut configs)?;

    Ok(configs)
}

pub fn print_usage() {
    eprintln!(
        "braid\n\nUSAGE:\n  braid <command> [args…] [-- <command> [args…]]…\n\nRuns every command concurrently and braids their stdout/stderr into one\nchronologically ordered, scrollable log.\n\nKEYS:\n  up/down pgup/pgdn  scroll the merged log (end re-enables tail mode)\n  left/right         cycle the command filter (All, then each command)\n  r                  restart the filtered commands\n  s                  save the filtered log to a file\n  h                  toggle help\n  q, ctrl+c          quit and shut down every command\n\nENVIRONMENT:\n  BRAID_COLOR=always|never|auto   summary color mode (NO_COLOR also honored)\n  BRAID_TUI_DIAGNOSTICS=1         show runtime counters in the footer\n\nGENERAL:\n  -h, --help         Print help\n"
    );
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
