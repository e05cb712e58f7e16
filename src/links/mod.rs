//! Hyperlink injection and pointer hit-testing.

mod hits;
mod inject;

pub use hits::extract_links;
pub use inject::{LinkStyle, inject_hyperlinks};

use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub url: String,
    pub text: String,
    pub x: usize,
    pub y: usize,
    pub width: usize,
}

impl LinkSpan {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        y == self.y && x >= self.x && x < self.x + self.width
    }
}

pub fn hit_test(links: &[LinkSpan], x: usize, y: usize) -> Option<&LinkSpan> {
    links.iter().find(|link| link.contains(x, y))
}

pub fn open_url(url: &str) -> std::io::Result<()> {
    info!(url, "opening link");
    open::that(url)
}
