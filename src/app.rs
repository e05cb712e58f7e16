use crate::ansi::visible_len;
use crate::config::Config;
use crate::keymap::Keymap;
use crate::links::{self, LinkSpan, hit_test, inject_hyperlinks};
use crate::markdown::{self, RenderOptions};
use crate::models::{Mode, Source, Viewport};
use crate::search::{SearchMatch, SearchState};
use crate::ui::theme::ThemeTokens;
use chrono::{DateTime, Duration, Local};
use tracing::{debug, warn};

pub const SEARCH_BOX_HEIGHT: usize = 3;
pub const WHEEL_STEP: usize = 3;

pub struct App {
    pub config: Config,
    pub keymap: Keymap,
    pub tokens: ThemeTokens,
    pub source: Source,
    pub markdown: String,
    rendered: String,
    document: String,
    pub lines: Vec<String>,
    max_line_width: usize,
    pub viewport: Viewport,
    pub mode: Mode,
    pub mode_before_help: Mode,
    pub search: SearchState,
    pub search_input: String,
    pub hovered_url: Option<String>,
    pub links: Vec<LinkSpan>,
    pub mouse_enabled: bool,
    pub mouse_capture_changed: bool,
    pub toast_message: Option<String>,
    pub toast_expiry: Option<DateTime<Local>>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, source: Source, markdown: String, width: u16, height: u16) -> App {
        let keymap = Keymap::from_bindings(&config.keybindings);
        let tokens = ThemeTokens::from_colors(&config.colors);
        let mut app = App {
            config,
            keymap,
            tokens,
            source,
            markdown,
            rendered: String::new(),
            document: String::new(),
            lines: Vec::new(),
            max_line_width: 0,
            viewport: Viewport {
                width: width as usize,
                height: height as usize,
                ..Viewport::default()
            },
            mode: Mode::Reading,
            mode_before_help: Mode::Reading,
            search: SearchState::new(),
            search_input: String::new(),
            hovered_url: None,
            links: Vec::new(),
            mouse_enabled: true,
            mouse_capture_changed: false,
            toast_message: None,
            toast_expiry: None,
            should_quit: false,
        };
        app.rerender();
        app
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            styles: self.tokens.markdown.clone(),
            code_theme: self.config.markdown.code_theme.clone(),
            left_margin: self.config.markdown.left_margin,
            badges: self.config.markdown.badges,
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn rerender(&mut self) {
        self.rendered = markdown::render(&self.markdown, self.viewport.width, &self.render_options());
        self.reinject();
    }

    pub fn reinject(&mut self) {
        self.document = inject_hyperlinks(
            &self.rendered,
            self.hovered_url.as_deref(),
            &self.tokens.links,
        );
        self.search.refresh(&self.document);
        self.rebuild_lines();
    }

    fn rebuild_lines(&mut self) {
        let content = if self.search.is_active() {
            self.search.highlight(
                &self.document,
                &self.tokens.search_current,
                &self.tokens.search_other,
            )
        } else {
            self.document.clone()
        };
        self.lines = content.split('\n').map(str::to_string).collect();
        self.max_line_width = self.lines.iter().map(|l| visible_len(l)).max().unwrap_or(0);
        self.clamp_scroll();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport.width = width as usize;
        self.viewport.height = height as usize;
        self.hovered_url = None;
        self.links.clear();
        self.rerender();
        debug!(width, height, lines = self.lines.len(), "resized");
    }

    /// Mode that decides the layout; help is drawn over the mode it was opened from.
    pub fn base_mode(&self) -> Mode {
        match self.mode {
            Mode::Help => self.mode_before_help,
            mode => mode,
        }
    }

    pub fn content_height(&self) -> usize {
        let mut chrome = 1;
        if self.search.is_active() {
            chrome += 1;
        }
        if self.base_mode() == Mode::Searching {
            chrome += SEARCH_BOX_HEIGHT;
        }
        self.viewport.height.saturating_sub(chrome)
    }

    fn max_y_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.content_height())
    }

    fn max_x_offset(&self) -> usize {
        self.max_line_width.saturating_sub(self.viewport.width)
    }

    fn clamp_scroll(&mut self) {
        self.viewport.y_offset = self.viewport.y_offset.min(self.max_y_offset());
        self.viewport.x_offset = self.viewport.x_offset.min(self.max_x_offset());
    }

    fn half_page(&self) -> usize {
        (self.content_height() / 2).max(1)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.viewport.y_offset = self.viewport.y_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.viewport.y_offset = (self.viewport.y_offset + lines).min(self.max_y_offset());
    }

    pub fn scroll_left(&mut self, columns: usize) {
        self.viewport.x_offset = self.viewport.x_offset.saturating_sub(columns);
    }

    pub fn scroll_right(&mut self, columns: usize) {
        self.viewport.x_offset = (self.viewport.x_offset + columns).min(self.max_x_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.half_page());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.half_page());
    }

    pub fn scroll_to_top(&mut self) {
        self.viewport.y_offset = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.viewport.y_offset = self.max_y_offset();
    }

    pub fn scroll_to_line(&mut self, line: usize) {
        let target = line.saturating_sub(self.content_height() / 2);
        self.viewport.y_offset = target.min(self.max_y_offset());
    }

    fn reveal_column(&mut self, column: usize) {
        let width = self.viewport.width;
        if width == 0 {
            return;
        }
        let x = self.viewport.x_offset;
        if column < x || column >= x + width {
            self.viewport.x_offset = column.saturating_sub(width / 2).min(self.max_x_offset());
        }
    }

    fn jump_to_match(&mut self, m: &SearchMatch) {
        self.scroll_to_line(m.line);
        self.reveal_column(m.column);
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_expiry = Some(Local::now() + Duration::seconds(2));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn start_search(&mut self) {
        self.search.clear();
        self.search_input.clear();
        self.mode = Mode::Searching;
        self.rebuild_lines();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.search_input.clear();
        self.mode = Mode::Reading;
        self.rebuild_lines();
    }

    pub fn submit_search(&mut self) {
        if self.search_input.is_empty() {
            self.clear_search();
            return;
        }
        let term = self.search_input.clone();
        self.search.set_term(&term, &self.document);
        self.mode = Mode::SearchNav;
        self.rebuild_lines();
        self.step_match(true);
    }

    pub fn next_match(&mut self) {
        self.step_match(true);
    }

    pub fn prev_match(&mut self) {
        self.step_match(false);
    }

    fn step_match(&mut self, forward: bool) {
        if !self.search.is_active() {
            self.toast("No active search");
            return;
        }
        let found = if forward {
            self.search.next_match().cloned()
        } else {
            self.search.prev_match().cloned()
        };
        self.rebuild_lines();
        match found {
            Some(m) => self.jump_to_match(&m),
            None => {
                let status = self.search.status_text();
                self.toast(status);
            }
        }
    }

    pub fn toggle_case(&mut self) {
        self.search.toggle_case_sensitive(&self.document);
        if self.mode == Mode::SearchNav
            && let Some(m) = self.search.next_match().cloned()
        {
            self.jump_to_match(&m);
        }
        self.rebuild_lines();
        let state = if self.search.case_sensitive() { "on" } else { "off" };
        self.toast(format!("Case-sensitive search {state}"));
    }

    pub fn open_help(&mut self) {
        if self.mode != Mode::Help {
            self.mode_before_help = self.mode;
            self.mode = Mode::Help;
        }
    }

    pub fn close_help(&mut self) {
        if self.mode == Mode::Help {
            self.mode = self.mode_before_help;
        }
    }

    pub fn set_hover(&mut self, x: usize, y: usize) {
        let url = hit_test(&self.links, x, y).map(|link| link.url.clone());
        if url != self.hovered_url {
            debug!(url = ?url, "hover changed");
            self.hovered_url = url;
            self.reinject();
        }
    }

    pub fn clear_hover(&mut self) {
        if self.hovered_url.take().is_some() {
            self.reinject();
        }
    }

    pub fn click(&mut self, x: usize, y: usize) {
        let Some(url) = hit_test(&self.links, x, y).map(|link| link.url.clone()) else {
            return;
        };
        match links::open_url(&url) {
            Ok(()) => self.toast(format!("Opened {url}")),
            Err(e) => {
                warn!(url = %url, error = %e, "failed to open link");
                self.toast("Could not open link");
            }
        }
    }

    pub fn toggle_mouse(&mut self) {
        self.mouse_enabled = !self.mouse_enabled;
        self.mouse_capture_changed = true;
        if self.mouse_enabled {
            self.toast("Mouse enabled: hover and click links");
        } else {
            self.clear_hover();
            self.toast("Mouse disabled: text selection enabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_app(markdown: &str) -> App {
        App::new(
            Config::default(),
            Source::Stdin,
            markdown.to_string(),
            80,
            24,
        )
    }

    fn long_document() -> String {
        (0..100)
            .map(|i| {
                if i == 70 {
                    "the needle is here".to_string()
                } else {
                    format!("paragraph {i}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn app_starts_in_reading_mode() {
        let app = make_test_app("# Hello");
        assert_eq!(app.mode, Mode::Reading);
        assert_eq!(app.lines.len(), 1);
        assert_eq!(app.content_height(), 23);
    }

    #[test]
    fn scrolling_is_clamped_to_the_document() {
        let mut app = make_test_app(&long_document());
        let max = app.lines.len() - app.content_height();

        app.scroll_down(10_000);
        assert_eq!(app.viewport.y_offset, max);
        app.scroll_up(10_000);
        assert_eq!(app.viewport.y_offset, 0);

        app.scroll_to_bottom();
        assert_eq!(app.viewport.y_offset, max);
        app.page_up();
        assert_eq!(app.viewport.y_offset, max - 11);
        app.scroll_to_top();
        assert_eq!(app.viewport.y_offset, 0);
    }

    #[test]
    fn horizontal_scroll_stops_at_the_widest_line() {
        let mut app = make_test_app("```\nshort\n```");
        app.scroll_right(5);
        assert_eq!(app.viewport.x_offset, 0);

        let wide = format!("```\n{}\n```", "x".repeat(120));
        let mut app = make_test_app(&wide);
        app.scroll_right(500);
        assert_eq!(app.viewport.x_offset, 122 - 80);
    }

    #[test]
    fn submitting_a_search_centers_the_first_match() {
        let mut app = make_test_app(&long_document());
        app.start_search();
        assert_eq!(app.mode, Mode::Searching);
        app.search_input = "needle".to_string();
        app.submit_search();

        assert_eq!(app.mode, Mode::SearchNav);
        assert_eq!(app.search.match_count(), 1);
        let line = app.search.current_match().map(|m| m.line).unwrap();
        assert_eq!(line, 140);
        assert_eq!(app.viewport.y_offset, line - app.content_height() / 2);
        assert!(app.lines[line].contains(&app.tokens.search_current));
    }

    #[test]
    fn empty_search_returns_to_reading() {
        let mut app = make_test_app("text");
        app.start_search();
        app.submit_search();
        assert_eq!(app.mode, Mode::Reading);
        assert!(!app.search.is_active());
    }

    #[test]
    fn match_navigation_wraps() {
        let mut app = make_test_app("foo\n\nbar foo\n\nfoo");
        app.search_input = "foo".to_string();
        app.submit_search();
        assert_eq!(app.search.current_index(), Some(0));
        app.next_match();
        app.next_match();
        assert_eq!(app.search.current_index(), Some(2));
        app.next_match();
        assert_eq!(app.search.current_index(), Some(0));
        app.prev_match();
        assert_eq!(app.search.current_index(), Some(2));
        assert_eq!(app.search.status_text(), "Match 3 of 3: foo");
    }

    #[test]
    fn clearing_search_removes_highlight() {
        let mut app = make_test_app("foo bar");
        app.search_input = "foo".to_string();
        app.submit_search();
        assert!(app.lines[0].contains(&app.tokens.search_current));

        app.clear_search();
        assert_eq!(app.mode, Mode::Reading);
        assert!(!app.lines[0].contains(&app.tokens.search_current));
    }

    #[test]
    fn help_returns_to_the_previous_mode() {
        let mut app = make_test_app("foo");
        app.search_input = "foo".to_string();
        app.submit_search();
        app.open_help();
        assert_eq!(app.mode, Mode::Help);
        assert_eq!(app.base_mode(), Mode::SearchNav);
        app.close_help();
        assert_eq!(app.mode, Mode::SearchNav);
    }

    #[test]
    fn search_chrome_shrinks_the_content_area() {
        let mut app = make_test_app("foo");
        app.start_search();
        assert_eq!(app.content_height(), 24 - 1 - SEARCH_BOX_HEIGHT);
        app.search_input = "foo".to_string();
        app.submit_search();
        assert_eq!(app.content_height(), 24 - 2);
    }

    #[test]
    fn hover_swaps_the_underline_color() {
        let mut app = make_test_app("[site](https://example.com)");
        let idle = app.tokens.links.underline.clone().unwrap();
        let hovered = app.tokens.links.hovered_underline.clone().unwrap();
        assert!(app.document().contains(&idle));

        app.links = vec![LinkSpan {
            url: "https://example.com".to_string(),
            text: "site".to_string(),
            x: 2,
            y: 0,
            width: 4,
        }];
        app.set_hover(3, 0);
        assert_eq!(app.hovered_url.as_deref(), Some("https://example.com"));
        assert!(app.document().contains(&hovered));

        app.set_hover(30, 0);
        assert_eq!(app.hovered_url, None);
        assert!(app.document().contains(&idle));
    }

    #[test]
    fn toggling_mouse_flags_a_capture_change() {
        let mut app = make_test_app("text");
        app.hovered_url = Some("https://x.y".to_string());
        app.toggle_mouse();
        assert!(!app.mouse_enabled);
        assert!(app.mouse_capture_changed);
        assert_eq!(app.hovered_url, None);
        assert!(app.toast_message.is_some());
    }

    #[test]
    fn resize_rewraps_the_document() {
        let text = "word ".repeat(40);
        let mut app = make_test_app(&text);
        let wide_lines = app.lines.len();
        app.resize(30, 24);
        assert!(app.lines.len() > wide_lines);
    }

    #[test]
    fn case_toggle_recomputes_matches() {
        let mut app = make_test_app("foo FOO Foo");
        app.search_input = "Foo".to_string();
        app.submit_search();
        assert_eq!(app.search.match_count(), 3);
        app.toggle_case();
        assert_eq!(app.search.match_count(), 1);
        assert_eq!(app.search.current_index(), Some(0));
    }
}
