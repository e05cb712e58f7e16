use crate::ansi::sgr::{HYPERLINK_CLOSE, UNDERLINE_COLOR_RESET, UNDERLINE_OFF, UNDERLINE_ON, hyperlink_open};
use crate::ansi::strip::ESC;
use crate::ansi::strip;
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStyle {
    pub underline: Option<String>,
    pub hovered_underline: Option<String>,
}

#[derive(Debug)]
struct Candidate {
    start: usize,
    end: usize,
    text_start: usize,
    text_end: usize,
    url: String,
}

/// Spans whose target does not look like a URL stay literal.
pub fn inject_hyperlinks(styled: &str, hover: Option<&str>, style: &LinkStyle) -> String {
    let mut out = String::with_capacity(styled.len() + styled.len() / 4);
    let mut injected = 0;

    for (i, line) in styled.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let candidates = find_candidates(line);
        injected += candidates.len();
        out.push_str(&rewrite_line(line, &candidates, hover, style));
    }

    trace!(links = injected, hovered = hover.is_some(), "hyperlinks injected");
    out
}

fn find_candidates(line: &str) -> Vec<Candidate> {
    let bytes = line.as_bytes();
    let mut found: Vec<Candidate> = Vec::new();

    let mut search_from = 0;
    while let Some(rel) = line[search_from..].find("](") {
        let bracket = search_from + rel;
        search_from = bracket + 2;

        let floor = found.last().map(|c| c.end).unwrap_or(0);
        let Some(open) = find_open_bracket(bytes, floor, bracket) else {
            continue;
        };

        let url_start = bracket + 2;
        let Some(close_rel) = line[url_start..].find(')') else {
            continue;
        };
        let close = url_start + close_rel;

        let Some(url) = recover_url(&line[url_start..close]) else {
            continue;
        };

        found.push(Candidate {
            start: open,
            end: close + 1,
            text_start: open + 1,
            text_end: bracket,
            url,
        });
        search_from = close + 1;
    }

    found
}

// A `[` right after ESC is a CSI introducer, not a link opener.
fn find_open_bracket(bytes: &[u8], floor: usize, bracket: usize) -> Option<usize> {
    let mut i = bracket;
    while i > floor {
        i -= 1;
        if bytes[i] != b'[' {
            continue;
        }
        if i == 0 || bytes[i - 1] != ESC {
            return Some(i);
        }
    }
    None
}

fn recover_url(raw: &str) -> Option<String> {
    let plain = strip(raw);
    let url = plain.trim().split(' ').next().unwrap_or_default();
    if url.is_empty() {
        return None;
    }
    if url.contains("://") || url.starts_with("mailto:") {
        Some(url.to_string())
    } else {
        None
    }
}

fn rewrite_line(
    line: &str,
    candidates: &[Candidate],
    hover: Option<&str>,
    style: &LinkStyle,
) -> String {
    let mut line = line.to_string();
    for c in candidates.iter().rev() {
        let text = &line[c.text_start..c.text_end];
        let color = if hover == Some(c.url.as_str()) {
            style.hovered_underline.as_deref()
        } else {
            style.underline.as_deref()
        };
        let replacement = decorate(text, &c.url, color);
        line.replace_range(c.start..c.end, &replacement);
    }
    line
}

fn decorate(text: &str, url: &str, underline_color: Option<&str>) -> String {
    let open = hyperlink_open(url);
    match underline_color {
        Some(color) => format!(
            "{color}{UNDERLINE_ON}{open}{text}{HYPERLINK_CLOSE}{UNDERLINE_COLOR_RESET}{UNDERLINE_OFF}"
        ),
        None => format!("{UNDERLINE_ON}{open}{text}{HYPERLINK_CLOSE}{UNDERLINE_OFF}"),
    }
}
