//! Markdown to styled terminal text.
//!
//! Output is plain `String` lines carrying SGR fragments. Inline links are
//! kept as literal `[text](url)` markup so the hyperlink pass can turn them
//! into OSC 8 links once hover state is known.

pub mod badges;

use crate::ansi::sgr::paint;
use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use ratatui::style::{Color, Modifier, Style};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use tracing::debug;
use unicode_width::UnicodeWidthStr;

const MIN_WRAP_WIDTH: usize = 20;
const DEFAULT_CODE_THEME: &str = "base16-ocean.dark";

#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownStyles {
    pub heading: Style,
    pub heading_secondary: Style,
    pub link_text: Style,
    pub link_url: Style,
    pub inline_code: Style,
    pub blockquote: Style,
    pub list_marker: Style,
    pub rule: Style,
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self {
            heading: Style::default().fg(Color::Indexed(39)),
            heading_secondary: Style::default().fg(Color::Indexed(75)),
            link_text: Style::default().fg(Color::Indexed(81)),
            link_url: Style::default().fg(Color::Indexed(244)),
            inline_code: Style::default().fg(Color::Indexed(203)),
            blockquote: Style::default().fg(Color::Indexed(244)),
            list_marker: Style::default().fg(Color::Indexed(244)),
            rule: Style::default().fg(Color::Indexed(240)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub styles: MarkdownStyles,
    pub code_theme: String,
    pub left_margin: usize,
    pub badges: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            styles: MarkdownStyles::default(),
            code_theme: DEFAULT_CODE_THEME.to_string(),
            left_margin: 2,
            badges: true,
        }
    }
}

pub fn render(markdown: &str, width: usize, options: &RenderOptions) -> String {
    let source = if options.badges {
        badges::rewrite_badges(markdown)
    } else {
        markdown.to_string()
    };

    let mut parser_options = Options::empty();
    parser_options.insert(Options::ENABLE_STRIKETHROUGH);
    parser_options.insert(Options::ENABLE_TABLES);
    parser_options.insert(Options::ENABLE_FOOTNOTES);
    parser_options.insert(Options::ENABLE_TASKLISTS);

    let wrap_width = width
        .saturating_sub(options.left_margin * 2)
        .max(MIN_WRAP_WIDTH);
    let mut renderer = Renderer::new(options, wrap_width);

    for event in Parser::new_ext(&source, parser_options) {
        match event {
            Event::Start(tag) => renderer.start(tag),
            Event::End(tag) => renderer.end(tag),
            Event::Text(text) => renderer.text(&text),
            Event::Code(code) => renderer.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => renderer.html(&html),
            Event::FootnoteReference(name) => renderer.glued(&format!("[^{name}]"), Style::default()),
            Event::SoftBreak => renderer.break_word(),
            Event::HardBreak => renderer.flush_words(),
            Event::Rule => renderer.rule(),
            Event::TaskListMarker(done) => renderer.task_marker(done),
            _ => {}
        }
    }

    let lines = renderer.finish();
    debug!(lines = lines.len(), width, "markdown rendered");
    lines.join("\n")
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

fn code_theme(name: &str) -> Option<&'static Theme> {
    let themes = &theme_set().themes;
    themes
        .get(name)
        .or_else(|| themes.get(DEFAULT_CODE_THEME))
        .or_else(|| themes.values().next())
}

fn collapses_to_text(url: &str) -> bool {
    url.contains("://") || url.starts_with("mailto:")
}

// The hyperlink pass ends a URL at its first `)`.
fn escape_parens(url: &str) -> String {
    url.replace('(', "%28").replace(')', "%29")
}

#[derive(Debug, Clone, Default)]
struct Word {
    raw: String,
    width: usize,
    whitespace: usize,
}

impl Fragment for Word {
    fn width(&self) -> f64 {
        self.width as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

#[derive(Debug, Default)]
struct InlineState {
    emphasis: usize,
    strong: usize,
    strikethrough: usize,
}

#[derive(Debug)]
struct ListState {
    next_index: Option<u64>,
    marker_width: usize,
}

#[derive(Debug)]
struct LinkBuf {
    url: String,
    raw: String,
    width: usize,
    image: bool,
}

#[derive(Debug, Default)]
struct Cell {
    raw: String,
    width: usize,
}

#[derive(Debug, Default)]
struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    header: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
    row: Vec<Cell>,
    cell: Option<Cell>,
}

struct Renderer<'a> {
    options: &'a RenderOptions,
    wrap_width: usize,
    lines: Vec<String>,

    words: Vec<Word>,
    glue: bool,

    inline: InlineState,
    heading: Option<HeadingLevel>,
    links: Vec<LinkBuf>,
    quote_depth: usize,
    lists: Vec<ListState>,
    pending_marker: Option<String>,
    code_block: Option<(String, String)>,
    table: Option<TableState>,
}

impl<'a> Renderer<'a> {
    fn new(options: &'a RenderOptions, wrap_width: usize) -> Self {
        Self {
            options,
            wrap_width,
            lines: Vec::new(),
            words: Vec::new(),
            glue: false,
            inline: InlineState::default(),
            heading: None,
            links: Vec::new(),
            quote_depth: 0,
            lists: Vec::new(),
            pending_marker: None,
            code_block: None,
            table: None,
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush_words();
        while self.lines.last().is_some_and(|line| line.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    fn styles(&self) -> &MarkdownStyles {
        &self.options.styles
    }

    fn current_style(&self) -> Style {
        let mut style = match self.heading {
            Some(HeadingLevel::H1 | HeadingLevel::H2) => {
                self.styles().heading.add_modifier(Modifier::BOLD)
            }
            Some(_) => self.styles().heading_secondary.add_modifier(Modifier::BOLD),
            None => Style::default(),
        };
        if self.inline.emphasis > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.inline.strong > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.inline.strikethrough > 0 {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        if !self.links.is_empty() {
            style = style.patch(self.styles().link_text);
        }
        style
    }

    fn start(&mut self, tag: Tag<'_>) {
        if let Some(table) = self.table.as_mut() {
            match tag {
                Tag::TableHead => {
                    table.in_head = true;
                    return;
                }
                Tag::TableRow => {
                    table.row.clear();
                    return;
                }
                Tag::TableCell => {
                    table.cell = Some(Cell::default());
                    return;
                }
                _ => {}
            }
        }

        match tag {
            Tag::Paragraph => self.flush_words(),
            Tag::Heading { level, .. } => {
                self.flush_words();
                self.heading = Some(level);
                let marker = "#".repeat(heading_depth(level));
                self.glued(&marker, self.current_style());
                self.break_word();
            }
            Tag::BlockQuote(_) => {
                self.flush_words();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush_words();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some((lang, String::new()));
            }
            Tag::List(start) => {
                self.flush_words();
                self.lists.push(ListState {
                    next_index: start,
                    marker_width: 2,
                });
            }
            Tag::Item => {
                self.flush_words();
                let marker = match self.lists.last_mut() {
                    Some(list) => {
                        let marker = match list.next_index.as_mut() {
                            Some(index) => {
                                let marker = format!("{index}. ");
                                *index += 1;
                                marker
                            }
                            None => "• ".to_string(),
                        };
                        list.marker_width = marker.width();
                        marker
                    }
                    None => "• ".to_string(),
                };
                self.pending_marker = Some(marker);
            }
            Tag::FootnoteDefinition(label) => {
                self.flush_words();
                let marker = format!("[^{label}]:");
                self.glued(&marker, self.styles().list_marker);
                self.break_word();
            }
            Tag::Emphasis => self.inline.emphasis += 1,
            Tag::Strong => self.inline.strong += 1,
            Tag::Strikethrough => self.inline.strikethrough += 1,
            Tag::Link { dest_url, .. } => {
                self.links.push(LinkBuf {
                    url: dest_url.to_string(),
                    raw: String::new(),
                    width: 0,
                    image: false,
                });
            }
            Tag::Image { dest_url, .. } => {
                self.links.push(LinkBuf {
                    url: dest_url.to_string(),
                    raw: String::new(),
                    width: 0,
                    image: true,
                });
            }
            Tag::Table(alignments) => {
                self.flush_words();
                self.table = Some(TableState {
                    alignments,
                    ..TableState::default()
                });
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        if let Some(table) = self.table.as_mut() {
            match tag {
                TagEnd::TableCell => {
                    if let Some(cell) = table.cell.take() {
                        table.row.push(cell);
                    }
                    return;
                }
                TagEnd::TableHead => {
                    table.in_head = false;
                    table.header = std::mem::take(&mut table.row);
                    return;
                }
                TagEnd::TableRow => {
                    let row = std::mem::take(&mut table.row);
                    if table.in_head {
                        table.header = row;
                    } else {
                        table.rows.push(row);
                    }
                    return;
                }
                TagEnd::Table => {
                    if let Some(table) = self.table.take() {
                        self.render_table(table);
                    }
                    self.blank_line();
                    return;
                }
                _ => {}
            }
        }

        match tag {
            TagEnd::Paragraph => {
                self.flush_words();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_words();
                self.heading = None;
                self.blank_line();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_words();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                if let Some((lang, code)) = self.code_block.take() {
                    self.render_code_block(&lang, &code);
                }
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_words();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => self.flush_words(),
            TagEnd::FootnoteDefinition => {
                self.flush_words();
                self.blank_line();
            }
            TagEnd::Emphasis => self.inline.emphasis = self.inline.emphasis.saturating_sub(1),
            TagEnd::Strong => self.inline.strong = self.inline.strong.saturating_sub(1),
            TagEnd::Strikethrough => {
                self.inline.strikethrough = self.inline.strikethrough.saturating_sub(1);
            }
            TagEnd::Link | TagEnd::Image => self.close_link(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, code)) = self.code_block.as_mut() {
            code.push_str(text);
            return;
        }
        let style = self.current_style();
        self.styled_text(text, style);
    }

    fn html(&mut self, html: &str) {
        if self.code_block.is_some() {
            self.text(html);
            return;
        }
        for (i, line) in html.lines().enumerate() {
            if i > 0 {
                self.flush_words();
            }
            self.styled_text(line, Style::default());
        }
    }

    fn inline_code(&mut self, code: &str) {
        let style = self.current_style().patch(self.styles().inline_code);
        self.styled_text(code, style);
    }

    fn styled_text(&mut self, text: &str, style: Style) {
        if let Some(link) = self.links.last_mut() {
            link.raw.push_str(&paint(text, style));
            link.width += text.width();
            return;
        }
        if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.raw.push_str(&paint(text, style));
            cell.width += text.width();
            return;
        }

        for (i, piece) in text.split(' ').enumerate() {
            if i > 0 {
                self.break_word();
            }
            if !piece.is_empty() {
                self.append_word(&paint(piece, style), piece.width());
            }
        }
    }

    fn glued(&mut self, text: &str, style: Style) {
        if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.raw.push_str(&paint(text, style));
            cell.width += text.width();
            return;
        }
        self.append_word(&paint(text, style), text.width());
    }

    fn append_word(&mut self, raw: &str, width: usize) {
        match self.words.last_mut() {
            Some(word) if self.glue => {
                word.raw.push_str(raw);
                word.width += width;
            }
            _ => self.words.push(Word {
                raw: raw.to_string(),
                width,
                whitespace: 0,
            }),
        }
        self.glue = true;
    }

    fn break_word(&mut self) {
        if self.glue {
            if let Some(word) = self.words.last_mut() {
                word.whitespace = 1;
            }
        }
        self.glue = false;
    }

    fn close_link(&mut self) {
        let Some(link) = self.links.pop() else {
            return;
        };
        let styles = &self.options.styles;
        let (text_raw, text_width) = if link.image {
            let alt = if link.width == 0 {
                "image".to_string()
            } else {
                format!("image: {}", crate::ansi::strip(&link.raw))
            };
            (paint(&alt, styles.link_text), alt.width())
        } else if link.width == 0 {
            (paint(&link.url, styles.link_text), link.url.width())
        } else {
            (link.raw, link.width)
        };

        // An image inside a link shows as the link's text.
        if link.image
            && let Some(outer) = self.links.last_mut()
        {
            outer.raw.push_str(&text_raw);
            outer.width += text_width;
            return;
        }

        let url = escape_parens(&link.url);
        let url_raw = paint(&url, styles.link_url);
        let raw = format!("[{text_raw}]({url_raw})");
        let width = if collapses_to_text(&url) {
            text_width
        } else {
            text_width + url.width() + 4
        };

        if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.raw.push_str(&raw);
            cell.width += width;
            return;
        }
        self.append_word(&raw, width);
    }

    fn task_marker(&mut self, done: bool) {
        let marker = if done { "[x]" } else { "[ ]" };
        self.glued(marker, self.styles().list_marker);
        self.break_word();
    }

    fn rule(&mut self) {
        self.flush_words();
        let width = self.wrap_width.saturating_sub(self.prefix_width());
        let line = paint(&"─".repeat(width), self.styles().rule);
        self.push_line(line);
        self.blank_line();
    }

    fn prefix_width(&self) -> usize {
        self.quote_depth * 2 + self.lists.iter().map(|l| l.marker_width).sum::<usize>()
    }

    // The pending item marker is consumed by the first line of its item.
    fn line_prefix(&mut self) -> String {
        let mut prefix = " ".repeat(self.options.left_margin);
        for _ in 0..self.quote_depth {
            prefix.push_str(&paint("│ ", self.options.styles.blockquote));
        }
        let depth = self.lists.len();
        for (i, list) in self.lists.iter().enumerate() {
            if i + 1 == depth {
                match self.pending_marker.take() {
                    Some(marker) => prefix.push_str(&paint(&marker, self.options.styles.list_marker)),
                    None => prefix.push_str(&" ".repeat(list.marker_width)),
                }
            } else {
                prefix.push_str(&" ".repeat(list.marker_width));
            }
        }
        prefix
    }

    fn push_line(&mut self, content: String) {
        let prefix = self.line_prefix();
        self.lines.push(format!("{prefix}{content}"));
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_none_or(|line| line.is_empty()) {
            return;
        }
        self.lines.push(String::new());
    }

    fn flush_words(&mut self) {
        self.glue = false;
        if self.words.is_empty() {
            return;
        }
        let words = std::mem::take(&mut self.words);
        let available = self.wrap_width.saturating_sub(self.prefix_width()).max(1);

        for line_words in wrap_first_fit(&words, &[available as f64]) {
            let mut line = String::new();
            for (i, word) in line_words.iter().enumerate() {
                line.push_str(&word.raw);
                if i + 1 < line_words.len() && word.whitespace > 0 {
                    line.push(' ');
                }
            }
            self.push_line(line);
        }
    }

    fn render_code_block(&mut self, lang: &str, code: &str) {
        let syntaxes = syntax_set();
        let syntax = syntaxes
            .find_syntax_by_token(lang)
            .or_else(|| syntaxes.find_syntax_by_extension(lang))
            .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
        let mut highlighter = code_theme(&self.options.code_theme).map(|t| HighlightLines::new(syntax, t));

        for line in LinesWithEndings::from(code) {
            let clean = line.trim_end_matches(['\n', '\r']);
            let ranges = highlighter
                .as_mut()
                .and_then(|h| h.highlight_line(line, syntaxes).ok())
                .unwrap_or_default();

            let mut out = String::with_capacity(clean.len() * 2);
            if ranges.is_empty() {
                out.push_str(&paint(clean, self.options.styles.inline_code));
            } else {
                for (style, token) in ranges {
                    let token = token.trim_end_matches(['\n', '\r']);
                    if token.is_empty() {
                        continue;
                    }
                    let fg = style.foreground;
                    out.push_str(&paint(token, Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b))));
                }
            }
            self.push_line(out);
        }
    }

    fn render_table(&mut self, table: TableState) {
        let mut rows = Vec::with_capacity(table.rows.len() + 1);
        let has_header = !table.header.is_empty();
        if has_header {
            rows.push(table.header);
        }
        rows.extend(table.rows);

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let mut widths = vec![3usize; columns];
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width);
            }
        }

        let border = self.options.styles.rule;
        for (row_index, row) in rows.iter().enumerate() {
            let mut line = paint("│", border);
            for (i, width) in widths.iter().enumerate() {
                let (raw, cell_width) = row
                    .get(i)
                    .map(|c| (c.raw.as_str(), c.width))
                    .unwrap_or(("", 0));
                let pad = width.saturating_sub(cell_width);
                let align = table.alignments.get(i).copied().unwrap_or(Alignment::None);
                let (left, right) = match align {
                    Alignment::Right => (pad, 0),
                    Alignment::Center => (pad / 2, pad - pad / 2),
                    Alignment::Left | Alignment::None => (0, pad),
                };
                let raw = if has_header && row_index == 0 {
                    paint(&crate::ansi::strip(raw), self.options.styles.heading_secondary.add_modifier(Modifier::BOLD))
                } else {
                    raw.to_string()
                };
                line.push(' ');
                line.push_str(&" ".repeat(left));
                line.push_str(&raw);
                line.push_str(&" ".repeat(right));
                line.push(' ');
                line.push_str(&paint("│", border));
            }
            self.push_line(line);

            if has_header && row_index == 0 {
                let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
                let separator = paint(&format!("├{}┤", cells.join("┼")), border);
                self.push_line(separator);
            }
        }
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
