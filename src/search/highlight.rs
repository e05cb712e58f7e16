use super::SearchMatch;
use crate::ansi::sgr::RESET;
use crate::ansi::strip::{Token, tokens};
use crate::ansi::strip_with_mapping;

/// Matches must be in document order. Controls inside a match span are
/// replayed after its closing reset.
pub fn highlight_matches(
    content: &str,
    matches: &[SearchMatch],
    current: Option<&SearchMatch>,
    style_current: &str,
    style_other: &str,
) -> String {
    let mut out = String::with_capacity(content.len() + matches.len() * 16);
    let mut pending = matches.iter().peekable();

    for (line_number, line) in content.split('\n').enumerate() {
        if line_number > 0 {
            out.push('\n');
        }

        let mut on_line = Vec::new();
        while let Some(m) = pending.next_if(|m| m.line == line_number) {
            on_line.push(m);
        }
        // Anything left behind belongs to a line that no longer exists.
        while pending.next_if(|m| m.line < line_number).is_some() {}

        if on_line.is_empty() {
            out.push_str(line);
            continue;
        }
        highlight_line(&mut out, line, &on_line, current, style_current, style_other);
    }

    out
}

fn highlight_line(
    out: &mut String,
    line: &str,
    matches: &[&SearchMatch],
    current: Option<&SearchMatch>,
    style_current: &str,
    style_other: &str,
) {
    let stripped = strip_with_mapping(line);
    let plain: Vec<char> = stripped.plain.chars().collect();
    let mut cursor = 0;
    let mut last_end_column = 0;

    for m in matches {
        let len = m.text.chars().count();
        if len == 0 || m.column < last_end_column || m.column + len > plain.len() {
            continue;
        }

        let start = stripped.raw_start_of(line, m.column);
        let end = stripped.raw_end_of(line, m.column + len - 1);

        let is_current = current.is_some_and(|c| c.line == m.line && c.column == m.column);
        let style = if is_current { style_current } else { style_other };

        out.push_str(&line[cursor..start]);
        out.push_str(style);
        out.extend(&plain[m.column..m.column + len]);
        out.push_str(RESET);
        for (_, token) in tokens(&line[start..end]) {
            if let Token::Control(sequence) = token {
                out.push_str(sequence);
            }
        }

        cursor = end;
        last_end_column = m.column + len;
    }

    out.push_str(&line[cursor..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::strip;
    use crate::search::find_matches;

    const CUR: &str = "\x1b[30;43m";
    const OTHER: &str = "\x1b[30;47m";

    #[test]
    fn current_and_other_matches_get_distinct_styles() {
        let content = "a foo b foo c";
        let matches = find_matches("foo", content, false);
        let out = highlight_matches(content, &matches, matches.get(1), CUR, OTHER);
        assert_eq!(
            out,
            format!("a {OTHER}foo{RESET} b {CUR}foo{RESET} c")
        );
    }

    #[test]
    fn visible_text_is_unchanged() {
        let content = "\x1b[1mTitle\x1b[22m\nsome \x1b[4mtitle\x1b[24m here";
        let matches = find_matches("title", content, false);
        assert_eq!(matches.len(), 2);
        let out = highlight_matches(content, &matches, None, CUR, OTHER);
        assert_eq!(strip(&out), strip(content));
    }

    #[test]
    fn controls_inside_a_match_are_replayed_after_reset() {
        let content = "x\x1b[34mab\x1b[39mc";
        let matches = find_matches("ab", content, false);
        let out = highlight_matches(content, &matches, None, CUR, OTHER);
        assert_eq!(out, format!("x{OTHER}ab{RESET}\x1b[34m\x1b[39mc"));
    }

    #[test]
    fn leading_controls_are_kept() {
        let content = "\x1b[32mfoo\x1b[39m";
        let matches = find_matches("foo", content, false);
        let out = highlight_matches(content, &matches, matches.first(), CUR, OTHER);
        assert_eq!(out, format!("\x1b[32m{CUR}foo{RESET}\x1b[39m"));
    }

    #[test]
    fn lines_without_matches_pass_through() {
        let content = "one\n\x1b[1mtwo\x1b[22m\nthree two";
        let matches = find_matches("three", content, false);
        let out = highlight_matches(content, &matches, None, CUR, OTHER);
        let lines: Vec<_> = out.split('\n').collect();
        assert_eq!(lines[0], "one");
        assert_eq!(lines[1], "\x1b[1mtwo\x1b[22m");
        assert!(lines[2].starts_with(OTHER));
    }

    #[test]
    fn stale_matches_are_ignored() {
        let stale = SearchMatch {
            line: 0,
            column: 10,
            raw_column: 10,
            text: "zz".to_string(),
        };
        let out = highlight_matches("short", &[stale], None, CUR, OTHER);
        assert_eq!(out, "short");
    }
}
