use super::LinkSpan;
use crate::ansi::{strip, visible_len};
use regex::Regex;
use std::sync::OnceLock;

fn hyperlink_regex() -> &'static Regex {
    static HYPERLINK: OnceLock<Regex> = OnceLock::new();
    HYPERLINK.get_or_init(|| {
        Regex::new(r"\x1b\]8;;([^\x1b]+)\x1b\\((?:[^\x1b]|\x1b\[[0-9;:]*[A-Za-z])+?)\x1b\]8;;\x1b\\")
            .unwrap()
    })
}

/// Coordinates are visible columns, so `text` must be the clipped frame.
pub fn extract_links(text: &str) -> Vec<LinkSpan> {
    let re = hyperlink_regex();
    let mut spans = Vec::new();

    for (y, line) in text.split('\n').enumerate() {
        for caps in re.captures_iter(line) {
            let (Some(url), Some(body)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            spans.push(LinkSpan {
                url: url.as_str().to_string(),
                text: strip(body.as_str()),
                x: visible_len(&line[..body.start()]),
                y,
                width: visible_len(body.as_str()),
            });
        }
    }

    spans
}
