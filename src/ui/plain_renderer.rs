use std::io::{IsTerminal, Write};

use anstream::{AutoStream, ColorChoice};
use anstyle::Style;

use crate::ui::renderer::{Renderer, UiResult};
use crate::ui::table::render_table;
use crate::ui::theme::{resolve_color_enabled, OutputMode, Theme};
use crate::ui::widgets::{KeyValue, MessageBlock, NoticeLevel, TableSpec};

pub struct PlainRenderer<W: Write> {
    writer: W,
    color_enabled: bool,
    theme: Theme,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(writer: W, color_enabled: bool) -> Self {
        Self {
            writer,
            color_enabled,
            theme: Theme::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn style_text(&self, style: Style, text: &str) -> String {
        if !self.color_enabled {
            return text.to_owned();
        }
        format!("{}{}{}", style.render(), text, style.render_reset())
    }
}

impl PlainRenderer<AutoStream<std::io::Stdout>> {
    pub fn stdout(mode: OutputMode) -> Self {
        let choice = match mode {
            OutputMode::Auto => ColorChoice::Auto,
            OutputMode::Always => ColorChoice::AlwaysAnsi,
            OutputMode::Never => ColorChoice::Never,
        };
        let stream = AutoStream::new(std::io::stdout(), choice);
        let color_enabled = resolve_color_enabled(mode, std::io::stdout().is_terminal());
        Self::new(stream, color_enabled)
    }
}

impl PlainRenderer<AutoStream<std::io::Stderr>> {
    pub fn stderr(mode: OutputMode) -> Self {
        let choice = match mode {
            OutputMode::Auto => ColorChoice::Auto,
            OutputMode::Always => ColorChoice::AlwaysAnsi,
            OutputMode::Never => ColorChoice::Never,
        };
        let stream = AutoStream::new(std::io::stderr(), choice);
        let color_enabled = resolve_color_enabled(mode, std::io::stderr().is_terminal());
        Self::new(stream, color_enabled)
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn text(&mut self, body: &str) -> UiResult<()> {
        write!(self.writer, "{body}")?;
        if !body.ends_with('\n') {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn section(&mut self, title: &str) -> UiResult<()> {
        let rendered = self.style_text(self.theme.accent, title);
        let underline = self.style_text(self.theme.muted, &"─".repeat(title.chars().count()));
        writeln!(self.writer, "{rendered}")?;
        writeln!(self.writer, "{underline}")?;
        Ok(())
    }

    fn notice(&mut self, level: NoticeLevel, body: &str) -> UiResult<()> {
        let (label, style) = match level {
            NoticeLevel::Info => ("info", self.theme.accent),
            NoticeLevel::Success => ("ok", self.theme.success),
            NoticeLevel::Warning => ("warn", self.theme.warning),
            NoticeLevel::Error => ("error", self.theme.error),
        };
        let marker = self.style_text(style, "•");
        let label = self.style_text(self.theme.muted, label);
        writeln!(self.writer, "{marker} {label}: {body}")?;
        Ok(())
    }

    fn error_block(&mut self, block: &MessageBlock) -> UiResult<()> {
        let marker = self.style_text(self.theme.error, "[error]");
        writeln!(self.writer, "{marker} {}", block.title)?;
        writeln!(self.writer, "  {}", block.body)?;
        if let Some(hint) = &block.hint {
            let hint_label = self.style_text(self.theme.muted, "hint");
            writeln!(self.writer, "  {hint_label}: {hint}")?;
        }
        Ok(())
    }

    fn key_values(&mut self, items: &[KeyValue]) -> UiResult<()> {
        for item in items {
            let key = self.style_text(self.theme.label, &item.key);
            let value = self.style_text(self.theme.value, &item.value);
            writeln!(self.writer, "{key}: {value}")?;
        }
        Ok(())
    }

    fn table(&mut self, spec: &TableSpec) -> UiResult<()> {
        let rendered = render_table(spec);
        writeln!(self.writer, "{rendered}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::renderer::Renderer;

    #[test]
    fn renders_error_block_without_color_when_disabled() {
        let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);

        renderer
            .error_block(
                &MessageBlock::new("Invalid command arguments", "no commands given")
                    .with_hint("Separate commands with `--`"),
            )
            .expect("render error block");

        let rendered = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert_eq!(
            rendered,
            "[error] Invalid command arguments\n  no commands given\n  hint: Separate commands with `--`\n"
        );
    }

    #[test]
    fn renders_section_and_key_values_without_color_when_disabled() {
        let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);

        renderer.section("Process Results").expect("section");
        renderer
            .key_values(&[KeyValue::new("[0] echo", "OK 2s")])
            .expect("key values");

        let rendered = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert_eq!(
            rendered,
            "Process Results\n───────────────\n[0] echo: OK 2s\n"
        );
    }

    #[test]
    fn renders_notice_and_table_without_color_when_disabled() {
        let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);
        renderer
            .notice(NoticeLevel::Warning, "1 process exited non-zero")
            .expect("notice");
        renderer
            .table(&TableSpec::new(
                vec!["command".to_owned(), "status".to_owned()],
                vec![vec!["[0] echo".to_owned(), "exit=1".to_owned()]],
            ))
            .expect("table");

        let rendered = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(rendered.contains("warn: 1 process exited non-zero"));
        assert!(rendered.contains("command"));
        assert!(rendered.contains("exit=1"));
    }
}
