use crate::ansi::sgr::{RESET, style_on};
use ratatui::{
    buffer::{Buffer, Cell},
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const SEARCH_BOX_MAX_WIDTH: u16 = 60;

pub fn centered_column(area: Rect, desired_width: u16) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }

    let width = desired_width.max(1).min(area.width);
    let x = area.x + area.width.saturating_sub(width) / 2;

    Rect {
        x,
        y: area.y,
        width,
        height: area.height,
    }
}

fn cell_style(cell: &Cell) -> Style {
    let mut style = Style::default().add_modifier(cell.modifier);
    if cell.fg != Color::Reset {
        style = style.fg(cell.fg);
    }
    if cell.bg != Color::Reset {
        style = style.bg(cell.bg);
    }
    style
}

/// One ANSI string per row, each starting and ending with a full reset.
pub fn buffer_to_ansi(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    let mut rows = Vec::with_capacity(area.height as usize);

    for y in area.top()..area.bottom() {
        let mut row = String::with_capacity(area.width as usize + 16);
        row.push_str(RESET);
        let mut current = Style::default();
        let mut skip = 0usize;

        for x in area.left()..area.right() {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            let cell = &buf[(x, y)];
            let style = cell_style(cell);
            if style != current {
                row.push_str(RESET);
                row.push_str(&style_on(style));
                current = style;
            }
            let symbol = cell.symbol();
            row.push_str(symbol);
            skip = symbol.width().saturating_sub(1);
        }

        row.push_str(RESET);
        rows.push(row);
    }
    rows
}

pub fn render_rows<W: Widget>(widget: W, width: u16, height: u16, area: Rect) -> Vec<String> {
    let canvas = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(canvas);
    widget.render(area.intersection(canvas), &mut buf);
    buffer_to_ansi(&buf)
}

fn fit_tail(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (index, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = index;
    }
    &text[start..]
}

pub fn search_box(input: &str, width: u16, border: Style, hint: &str) -> Vec<String> {
    let canvas = Rect::new(0, 0, width, 3);
    let area = centered_column(canvas, SEARCH_BOX_MAX_WIDTH);

    let prompt = "Search: ";
    let inner = area.width.saturating_sub(2) as usize;
    let room = inner.saturating_sub(prompt.width() + 1);
    let visible_input = fit_tail(input, room);

    let line = Line::from(vec![
        Span::styled(prompt, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(visible_input.to_string()),
        Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(" Search ")
        .title_bottom(Line::from(format!(" {hint} ")).right_aligned());

    render_rows(Paragraph::new(line).block(block), width, 3, area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::{strip, visible_len};

    #[test]
    fn centered_column_keeps_height() {
        let area = Rect::new(0, 0, 100, 3);
        let column = centered_column(area, 60);
        assert_eq!(column, Rect::new(20, 0, 60, 3));
        assert_eq!(centered_column(Rect::new(0, 0, 40, 3), 60).width, 40);
    }

    #[test]
    fn buffer_rows_carry_styles_and_reset() {
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);
        buf.set_string(0, 0, "ab", Style::default().fg(Color::Indexed(39)));
        buf.set_string(2, 0, "cd", Style::default());

        let rows = buffer_to_ansi(&buf);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], "\x1b[0m\x1b[0m\x1b[38;5;39mab\x1b[0mcd  \x1b[0m");
        assert_eq!(strip(&rows[0]), "abcd  ");
    }

    #[test]
    fn wide_glyph_padding_is_skipped() {
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);
        buf.set_string(0, 0, "界x", Style::default());
        let rows = buffer_to_ansi(&buf);
        assert_eq!(strip(&rows[0]), "界x ");
    }

    #[test]
    fn search_box_is_centered_and_bordered() {
        let rows = search_box("needle", 100, Style::default(), "Enter search");
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(visible_len(row), 100);
        }
        let top = strip(&rows[0]);
        assert!(top[20..].starts_with('╭'));
        assert!(top.contains(" Search "));
        assert!(strip(&rows[1]).contains("Search: needle"));
        assert!(strip(&rows[2]).contains("Enter search"));
    }

    #[test]
    fn long_input_shows_its_tail() {
        let input = format!("{}END", "x".repeat(200));
        let rows = search_box(&input, 40, Style::default(), "");
        assert!(strip(&rows[1]).contains("xEND"));
    }
}
