//! Rewrites shields.io badge images into short text labels.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;
use url::form_urlencoded;

fn linked_badge_regex() -> &'static Regex {
    static LINKED: OnceLock<Regex> = OnceLock::new();
    LINKED.get_or_init(|| {
        Regex::new(r"\[!\[[^\]]*\]\((https://img\.shields\.io/[^)]+)\)\]\(([^)]+)\)").unwrap()
    })
}

fn standalone_badge_regex() -> &'static Regex {
    static STANDALONE: OnceLock<Regex> = OnceLock::new();
    STANDALONE.get_or_init(|| {
        Regex::new(r"!\[[^\]]*\]\((https://img\.shields\.io/[^)]+)\)").unwrap()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub message: String,
}

impl Badge {
    fn text(&self) -> String {
        match (self.label.is_empty(), self.message.is_empty()) {
            (false, false) => format!("{}: {}", self.label, self.message),
            (false, true) => self.label.clone(),
            _ => "badge".to_string(),
        }
    }
}

/// Linked badges become `[label: message](link)`, which still renders as a
/// clickable link. Bare badges become the literal text `[label: message]`.
pub fn rewrite_badges(markdown: &str) -> String {
    let linked = linked_badge_regex().replace_all(markdown, |caps: &regex::Captures<'_>| {
        let badge = parse_shields_badge(&caps[1]);
        format!("[{}]({})", badge.text(), &caps[2])
    });

    standalone_badge_regex()
        .replace_all(&linked, |caps: &regex::Captures<'_>| {
            format!("[{}]", parse_shields_badge(&caps[1]).text())
        })
        .into_owned()
}

pub fn parse_shields_badge(badge_url: &str) -> Badge {
    let Ok(url) = Url::parse(badge_url) else {
        return Badge {
            label: "badge".to_string(),
            message: String::new(),
        };
    };
    let path = url.path().trim_start_matches('/');
    let parts: Vec<&str> = path.split('/').collect();

    if let ["github", kind @ ("license" | "stars"), user, repo, ..] = parts.as_slice() {
        let repo = repo.trim_end_matches(".svg");
        return Badge {
            label: kind.to_string(),
            message: format!("{user}/{repo}"),
        };
    }

    if let Some(info) = path.strip_prefix("badge/") {
        let info = info.trim_end_matches(".svg");
        let pieces: Vec<&str> = info.split('-').collect();
        let (label, message) = match pieces.as_slice() {
            [label] => (label.to_string(), String::new()),
            [label, message] => (label.to_string(), message.to_string()),
            [head @ .., message, _color] => (head.join("-"), message.to_string()),
            [] => (String::new(), String::new()),
        };
        return Badge {
            label: decode(&label),
            message: decode(&message),
        };
    }

    Badge {
        label: path.to_string(),
        message: String::new(),
    }
}

fn decode(text: &str) -> String {
    if text.contains(['&', '=']) {
        return text.to_string();
    }
    form_urlencoded::parse(text.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}
