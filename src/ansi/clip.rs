use super::strip::{Token, tokens, visible_len};

/// Lines with `n` or fewer visible chars come back whole, trailing controls included.
pub fn truncate_visible(line: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }

    let mut seen = 0;
    for (offset, token) in tokens(line) {
        if let Token::Glyph(glyph) = token {
            seen += 1;
            if seen == n {
                let end = offset + glyph.len();
                return if end == line.len() || visible_len(&line[end..]) == 0 {
                    line
                } else {
                    &line[..end]
                };
            }
        }
    }
    line
}

/// Controls between the cut and the next visible char stay in the suffix.
pub fn skip_visible(line: &str, n: usize) -> &str {
    if n == 0 {
        return line;
    }

    let mut seen = 0;
    for (offset, token) in tokens(line) {
        if let Token::Glyph(glyph) = token {
            seen += 1;
            if seen == n {
                return &line[offset + glyph.len()..];
            }
        }
    }
    ""
}

// SGR codes since the last full reset, then the hyperlink still open.
fn carried_state(prefix: &str) -> String {
    let mut sgr: Vec<&str> = Vec::new();
    let mut hyperlink: Option<&str> = None;

    for (_, token) in tokens(prefix) {
        let Token::Control(control) = token else {
            continue;
        };
        if let Some(params) = control.strip_prefix("\x1b]8;") {
            let url = params
                .split_once(';')
                .map(|(_, rest)| rest.trim_end_matches(['\x1b', '\\', '\x07']))
                .unwrap_or_default();
            hyperlink = (!url.is_empty()).then_some(control);
        } else if control.starts_with("\x1b[") && control.ends_with('m') {
            if control == "\x1b[0m" || control == "\x1b[m" {
                sgr.clear();
            } else {
                sgr.push(control);
            }
        }
    }

    let mut state = sgr.concat();
    if let Some(open) = hyperlink {
        state.push_str(open);
    }
    state
}

/// Style and hyperlink state opened left of column `x` is replayed at the
/// start of the window.
pub fn clip_line(line: &str, x: usize, width: usize) -> String {
    let rest = skip_visible(line, x);
    let window = truncate_visible(rest, width);
    if x == 0 || window.is_empty() {
        return window.to_string();
    }
    let mut clipped = carried_state(&line[..line.len() - rest.len()]);
    clipped.push_str(window);
    clipped
}

pub fn composite(background: &[String], overlay: &[String], x: usize, y: usize) -> Vec<String> {
    let mut frame = background.to_vec();

    for (i, overlay_row) in overlay.iter().enumerate() {
        let Some(row) = frame.get_mut(y + i) else {
            break;
        };

        let left = truncate_visible(row, x);
        let left_width = visible_len(left);
        let overlay_width = visible_len(overlay_row);
        let right = skip_visible(row, x + overlay_width);

        let mut merged = String::with_capacity(row.len() + overlay_row.len() + x);
        merged.push_str(left);
        if left_width < x {
            merged.push_str(&" ".repeat(x - left_width));
        }
        merged.push_str(overlay_row);
        merged.push_str(right);
        *row = merged;
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::strip::strip;
    use proptest::prelude::*;

    #[test]
    fn truncate_keeps_controls_before_the_cut() {
        let line = "\x1b[31mred\x1b[0m plain";
        assert_eq!(truncate_visible(line, 2), "\x1b[31mre");
        assert_eq!(truncate_visible(line, 3), "\x1b[31mred");
        assert_eq!(truncate_visible(line, 0), "");
    }

    #[test]
    fn truncate_returns_short_lines_whole() {
        let line = "\x1b[31mred\x1b[0m";
        assert_eq!(truncate_visible(line, 3), line);
        assert_eq!(truncate_visible(line, 10), line);
        assert_eq!(truncate_visible("", 4), "");
    }

    #[test]
    fn truncate_counts_codepoints_not_bytes() {
        assert_eq!(truncate_visible("漢字かな", 2), "漢字");
    }

    #[test]
    fn skip_carries_controls_at_the_cut() {
        let line = "ab\x1b[4mcd\x1b[24m";
        assert_eq!(skip_visible(line, 2), "\x1b[4mcd\x1b[24m");
        assert_eq!(skip_visible(line, 3), "d\x1b[24m");
        assert_eq!(skip_visible(line, 4), "\x1b[24m");
        assert_eq!(skip_visible(line, 9), "");
        assert_eq!(skip_visible(line, 0), line);
    }

    #[test]
    fn clip_line_windows_by_visible_columns() {
        let line = "\x1b[1mhello\x1b[22m world";
        assert_eq!(strip(&clip_line(line, 3, 5)), "lo wo");
        assert_eq!(clip_line(line, 40, 5), "");
        assert_eq!(clip_line(line, 0, 40), line);
    }

    #[test]
    fn clip_line_reopens_a_link_cut_in_the_middle() {
        let line = "ab\x1b]8;;https://x.io\x1b\\\x1b[4mlink\x1b[24m\x1b]8;;\x1b\\ z";
        let clipped = clip_line(line, 3, 10);
        assert!(clipped.starts_with("\x1b[4m\x1b]8;;https://x.io\x1b\\"), "{clipped:?}");
        assert_eq!(strip(&clipped), "ink z");
    }

    #[test]
    fn clip_line_drops_state_closed_before_the_cut() {
        let line = "\x1b[31mred\x1b[0m \x1b]8;;https://x.io\x1b\\go\x1b]8;;\x1b\\ tail";
        let clipped = clip_line(line, 7, 10);
        assert_eq!(clipped, "tail");
    }

    #[test]
    fn composite_overlays_at_offset() {
        let background = vec!["0123456789".to_string(), "abcdefghij".to_string()];
        let overlay = vec!["XY".to_string()];
        let frame = composite(&background, &overlay, 3, 1);
        assert_eq!(frame[0], "0123456789");
        assert_eq!(frame[1], "abcXYfghij");
    }

    #[test]
    fn composite_pads_short_background_rows() {
        let background = vec!["ab".to_string()];
        let overlay = vec!["\x1b[0m[]".to_string()];
        let frame = composite(&background, &overlay, 4, 0);
        assert_eq!(frame[0], "ab  \x1b[0m[]");
    }

    #[test]
    fn composite_keeps_background_styles_outside_the_box() {
        let background = vec!["\x1b[32mgreen\x1b[39m text".to_string()];
        let overlay = vec!["##".to_string()];
        let frame = composite(&background, &overlay, 1, 0);
        assert_eq!(frame[0], "\x1b[32mg##en\x1b[39m text");
    }

    #[test]
    fn composite_drops_rows_past_the_background() {
        let background = vec!["one".to_string()];
        let overlay = vec!["A".to_string(), "B".to_string()];
        let frame = composite(&background, &overlay, 0, 0);
        assert_eq!(frame, vec!["Ane".to_string()]);
    }

    proptest! {
        #[test]
        fn truncate_then_skip_rebuilds_the_line(
            parts in prop::collection::vec(
                prop_oneof![
                    "[a-z é]{0,3}",
                    Just("\x1b[7m".to_string()),
                    Just("\x1b]8;;https://q\x1b\\".to_string()),
                ],
                0..10,
            ),
            n in 0usize..12,
        ) {
            let line = parts.concat();
            let joined = format!("{}{}", truncate_visible(&line, n), skip_visible(&line, n));
            if visible_len(&line) > n {
                prop_assert_eq!(&joined, &line);
            }
            prop_assert_eq!(strip(&joined), strip(&line));
        }

        #[test]
        fn truncate_is_idempotent_on_short_lines(line in "[a-z]{0,6}", extra in 0usize..4) {
            let styled = format!("\x1b[1m{line}\x1b[22m");
            let n = visible_len(&styled) + extra;
            prop_assert_eq!(truncate_visible(&styled, n), styled.as_str());
        }
    }
}
