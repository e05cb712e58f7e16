pub mod color_parser;
pub mod components;
pub mod help;
pub mod theme;

use crate::ansi::sgr::{HYPERLINK_CLOSE, RESET};
use crate::ansi::{clip_line, composite, visible_len};
use crate::app::App;
use crate::keymap::Action;
use crate::links::{LinkSpan, extract_links};
use crate::models::Mode;
use components::{render_rows, search_box};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub rows: Vec<String>,
    pub links: Vec<LinkSpan>,
}

fn terminate(row: &mut String) {
    row.push_str(RESET);
    row.push_str(HYPERLINK_CLOSE);
}

pub fn compose(app: &App) -> Frame {
    let width = app.viewport.width;
    let height = app.viewport.height;
    let content_height = app.content_height();

    let mut rows: Vec<String> = app
        .lines
        .iter()
        .skip(app.viewport.y_offset)
        .take(content_height)
        .map(|line| {
            let mut row = clip_line(line, app.viewport.x_offset, width);
            terminate(&mut row);
            row
        })
        .collect();
    rows.resize(content_height, String::new());

    let links = if app.mode == Mode::Help {
        Vec::new()
    } else {
        extract_links(&rows.join("\n"))
    };

    if app.base_mode() == Mode::Searching {
        let hint = format!("{} case", app.keymap.first_key(Action::ToggleCase));
        rows.extend(search_box(
            &app.search_input,
            width as u16,
            app.tokens.search_border,
            &hint,
        ));
    }
    if app.search.is_active() {
        rows.push(search_status_row(app));
    }
    rows.push(status_bar_row(app));

    if app.mode == Mode::Help {
        let overlay: Vec<String> = help::help_box(
            &app.keymap,
            app.tokens.help_border,
            width as u16,
            height as u16,
        )
        .into_iter()
        .map(|row| format!("{HYPERLINK_CLOSE}{row}"))
        .collect();
        let overlay_width = overlay.first().map(|row| visible_len(row)).unwrap_or(0);
        let x = width.saturating_sub(overlay_width) / 2;
        let y = height.saturating_sub(overlay.len()) / 2;
        rows = composite(&rows, &overlay, x, y);
    }

    for row in rows.iter_mut() {
        if !row.ends_with(HYPERLINK_CLOSE) {
            terminate(row);
        }
    }
    rows.truncate(height);

    Frame { rows, links }
}

pub fn draw<W: Write>(out: &mut W, app: &mut App) -> io::Result<()> {
    let frame = compose(app);
    queue!(out, BeginSynchronizedUpdate)?;
    for (y, row) in frame.rows.iter().enumerate() {
        queue!(
            out,
            MoveTo(0, y as u16),
            Print(row),
            Clear(ClearType::UntilNewLine)
        )?;
    }
    queue!(out, EndSynchronizedUpdate)?;
    out.flush()?;
    app.links = frame.links;
    Ok(())
}

fn single_row(paragraph: Paragraph<'_>, width: usize) -> String {
    let width = width as u16;
    render_rows(paragraph, width, 1, Rect::new(0, 0, width, 1))
        .into_iter()
        .next()
        .unwrap_or_default()
}

fn search_status_row(app: &App) -> String {
    let line = Line::from(Span::styled(
        format!(" {}", app.search.status_text()),
        app.tokens.search_border.add_modifier(Modifier::BOLD),
    ));
    single_row(Paragraph::new(line), app.viewport.width)
}

pub fn mode_hints(app: &App) -> String {
    let key = |action| app.keymap.first_key(action);
    match app.mode {
        Mode::Reading => format!(
            "{}/{} scroll · {} search · {} help · {} quit",
            key(Action::ScrollDown),
            key(Action::ScrollUp),
            key(Action::StartSearch),
            key(Action::ShowHelp),
            key(Action::Quit),
        ),
        Mode::Searching => format!(
            "Enter search · Esc cancel · {} case",
            key(Action::ToggleCase)
        ),
        Mode::SearchNav => format!(
            "{}/{} next/prev · Esc done · {} case · {} help",
            key(Action::NextMatch),
            key(Action::PrevMatch),
            key(Action::ToggleCase),
            key(Action::ShowHelp),
        ),
        Mode::Help => "any key closes help".to_string(),
    }
}

pub fn scroll_position_label(app: &App) -> String {
    let total = app.lines.len();
    let visible = app.content_height();
    if total <= visible {
        return "All".to_string();
    }
    let max = total - visible;
    match app.viewport.y_offset {
        0 => "Top".to_string(),
        y if y >= max => "Bot".to_string(),
        y => format!("{}%", y * 100 / max),
    }
}

fn status_bar_row(app: &App) -> String {
    let width = app.viewport.width as u16;
    let tokens = &app.tokens;
    let area = Rect::new(0, 0, width, 1);

    let left = Line::from(vec![
        Span::styled(
            format!(" {} ", app.base_mode().label()),
            tokens.status_bar.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.source.title().to_string(), tokens.status_bar),
        Span::raw(format!("  {}", scroll_position_label(app))),
    ]);

    let (right_plain, right_span) = if let Some(toast) = app.toast_message.as_deref()
        && !toast.is_empty()
    {
        let text = format!("{toast} ");
        (text.clone(), Span::styled(text, tokens.status_bar.add_modifier(Modifier::BOLD)))
    } else if let Some(url) = app.hovered_url.as_deref() {
        let text = format!("🔗 {url} ");
        (text.clone(), Span::styled(text, tokens.hovered_link_url))
    } else {
        let text = format!("{} ", mode_hints(app));
        (text.clone(), Span::raw(text))
    };

    let min_left_width = 10u16;
    let right_width = (right_plain.width() as u16).min(width.saturating_sub(min_left_width));

    let mut buf = Buffer::empty(area);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width)])
        .split(area);

    Paragraph::new(left)
        .style(tokens.status_bar)
        .render(chunks[0], &mut buf);
    Paragraph::new(Line::from(right_span))
        .style(tokens.status_bar)
        .alignment(Alignment::Right)
        .render(chunks[1], &mut buf);

    components::buffer_to_ansi(&buf)
        .into_iter()
        .next()
        .unwrap_or_default()
}
