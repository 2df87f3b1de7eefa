/// Splits `text` into consecutive fragments of at most `max_width`
/// characters, preserving every character and their order. The empty string
/// yields a single empty fragment so an empty output line still becomes
/// exactly one log entry.
///
/// A zero width is a contract violation on the caller's side and panics.
pub fn split_line(text: &str, max_width: usize) -> Vec<String> {
    assert!(max_width > 0, "split width must be positive");
    if text.is_empty() {
        return vec![String::new()];
    }
    let chars = text.chars().collect::<Vec<char>>();
    chars
        .chunks(max_width)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect()
}

/// Removes terminal escape sequences (CSI and OSC, plus two-byte escapes)
/// from `raw`. The view paints its own per-command colors, so process color
/// output is dropped rather than re-parsed.
pub fn strip_ansi(raw: &str) -> String {
    let chars = raw.chars().collect::<Vec<char>>();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0usize;
    while i < chars.len() {
        let ch = chars[i];
        if ch == '\u{1b}' && i + 1 < chars.len() {
            match chars[i + 1] {
                '[' => {
                    i += 2;
                    while i < chars.len() {
                        if ('@'..='~').contains(&chars[i]) {
                            break;
                        }
                        i += 1;
                    }
                }
                ']' => {
                    i += 2;
                    while i < chars.len() {
                        if chars[i] == '\u{0007}' {
                            break;
                        }
                        if chars[i] == '\u{1b}' && i + 1 < chars.len() && chars[i + 1] == '\\' {
                            i += 1;
                            break;
                        }
                        i += 1;
                    }
                }
                _ => {
                    i += 1;
                }
            }
        } else {
            out.push(ch);
        }
        i += 1;
    }
    out
}

/// Drops control bytes that would corrupt a terminal cell grid. Run after
/// `strip_ansi`; the range also swallows any stray ESC left by a sequence
/// truncated at a chunk boundary.
pub fn sanitize_text(raw: &str) -> String {
    raw.chars()
        .filter(|ch| {
            !matches!(
                ch,
                '\r' | '\u{0000}'..='\u{0008}'
                    | '\u{000B}'
                    | '\u{000C}'
                    | '\u{000E}'..='\u{001F}'
                    | '\u{007F}'
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_line_preserves_every_character() {
        for width in 1..12usize {
            let fragments = split_line("the quick brown fox", width);
            assert_eq!(fragments.concat(), "the quick brown fox");
            for fragment in &fragments {
                assert!(fragment.chars().count() <= width);
            }
            assert!(!fragments.is_empty());
        }
    }

    #[test]
    fn split_line_counts_characters_not_bytes() {
        let fragments = split_line("héllo wörld", 4);
        assert_eq!(fragments, vec!["héll", "o wö", "rld"]);
    }

    #[test]
    fn split_line_empty_input_yields_one_empty_fragment() {
        assert_eq!(split_line("", 80), vec![String::new()]);
    }

    #[test]
    fn split_line_exact_width_yields_single_fragment() {
        assert_eq!(split_line("abcd", 4), vec!["abcd"]);
    }

    #[test]
    #[should_panic(expected = "split width must be positive")]
    fn split_line_zero_width_is_a_contract_violation() {
        split_line("anything", 0);
    }

    #[test]
    fn strip_ansi_removes_sgr_sequences() {
        assert_eq!(strip_ansi("\u{1b}[31merror\u{1b}[0m ok"), "error ok");
    }

    #[test]
    fn strip_ansi_removes_cursor_and_erase_sequences() {
        assert_eq!(strip_ansi("\u{1b}[2K\u{1b}[1Ahello"), "hello");
    }

    #[test]
    fn strip_ansi_removes_osc_titles() {
        assert_eq!(strip_ansi("\u{1b}]0;title\u{0007}body"), "body");
        assert_eq!(strip_ansi("\u{1b}]8;;url\u{1b}\\link"), "link");
    }

    #[test]
    fn strip_ansi_leaves_plain_text_untouched() {
        assert_eq!(strip_ansi("plain text 123"), "plain text 123");
    }

    #[test]
    fn sanitize_text_removes_control_bytes() {
        assert_eq!(sanitize_text("a\u{0008}b\rc\u{0007}d"), "abcd");
    }

    #[test]
    fn sanitize_text_keeps_tabs() {
        assert_eq!(sanitize_text("col1\tcol2"), "col1\tcol2");
    }
}
