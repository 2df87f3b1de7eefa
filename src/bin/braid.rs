use braid::tui::run_log_tui;
use braid::ui::{MessageBlock, OutputMode, PlainRenderer, Renderer};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output_mode = OutputMode::from_env();

    if matches!(args.first().map(String::as_str), Some("--help") | Some("-h")) {
        braid::print_usage();
        return;
    }

    let configs = match braid::parse_process_configs(args) {
        Ok(configs) => configs,
        Err(err) => {
            let mut renderer = PlainRenderer::stderr(output_mode);
            let _ = renderer.error_block(
                &MessageBlock::new("Invalid command arguments", err.to_string())
                    .with_hint("Separate commands with `--`: braid cmd a -- cmd2 b"),
            );
            braid::print_usage();
            std::process::exit(2);
        }
    };

    match run_log_tui(configs) {
        Ok(outcome) => {
            if !outcome.non_zero_exits.is_empty() {
                std::process::exit(1);
            }
        }
        Err(err) => {
            let mut renderer = PlainRenderer::stderr(output_mode);
            let _ = renderer.error_block(&MessageBlock::new("braid failed", err.to_string()));
            std::process::exit(1);
        }
    }
}
