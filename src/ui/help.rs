use crate::keymap::{Action, Keymap};
use crate::ui::components::render_rows;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

pub const HELP_WIDTH: u16 = 60;
const KEY_COLUMN: usize = 20;

const NAVIGATION: [Action; 8] = [
    Action::ScrollUp,
    Action::ScrollDown,
    Action::ScrollLeft,
    Action::ScrollRight,
    Action::PageUp,
    Action::PageDown,
    Action::GoToTop,
    Action::GoToBottom,
];

const SEARCH: [Action; 5] = [
    Action::StartSearch,
    Action::NextMatch,
    Action::PrevMatch,
    Action::ClearSearch,
    Action::ToggleCase,
];

const GENERAL: [Action; 3] = [Action::ShowHelp, Action::ToggleMouse, Action::Quit];

fn entry(keys: &str, description: &str, key_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{keys:<width$}", width = KEY_COLUMN), key_style),
        Span::raw(description.to_string()),
    ])
}

fn section(lines: &mut Vec<Line<'static>>, title: &str, heading: Style) {
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(title.to_string(), heading)));
}

pub fn help_lines(keymap: &Keymap, accent: Style) -> Vec<Line<'static>> {
    let heading = accent.add_modifier(Modifier::BOLD);
    let keys = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    section(&mut lines, "NAVIGATION", heading);
    for action in NAVIGATION {
        lines.push(entry(&keymap.keys_for(action), action.description(), keys));
    }
    lines.push(entry("mouse wheel", "Scroll", keys));

    section(&mut lines, "SEARCH", heading);
    for action in SEARCH {
        lines.push(entry(&keymap.keys_for(action), action.description(), keys));
    }
    lines.push(entry("Enter", "Submit the search term", keys));
    lines.push(entry("Esc", "Cancel search or leave matches", keys));

    section(&mut lines, "GENERAL", heading);
    for action in GENERAL {
        lines.push(entry(&keymap.keys_for(action), action.description(), keys));
    }
    lines.push(entry("click", "Open the link under the pointer", keys));

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().add_modifier(Modifier::DIM),
    )));
    lines
}

pub fn help_box(keymap: &Keymap, border: Style, width: u16, height: u16) -> Vec<String> {
    let lines = help_lines(keymap, border);
    let box_width = HELP_WIDTH.min(width);
    let box_height = (lines.len() as u16 + 2).min(height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .title(" Help ")
        .padding(Padding::horizontal(2));

    let area = Rect::new(0, 0, box_width, box_height);
    render_rows(
        Paragraph::new(lines).block(block),
        box_width,
        box_height,
        area,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::{strip, visible_len};
    use crate::config::KeyBindings;

    fn keymap() -> Keymap {
        Keymap::from_bindings(&KeyBindings::default())
    }

    #[test]
    fn lists_configured_keys_per_section() {
        let rows: Vec<String> = help_box(&keymap(), Style::default(), 80, 60)
            .iter()
            .map(|row| strip(row))
            .collect();
        let text = rows.join("\n");

        assert!(rows[0].contains(" Help "));
        assert!(text.contains("NAVIGATION"));
        assert!(text.contains("SEARCH"));
        assert!(text.contains("GENERAL"));
        assert!(text.contains("j, ↓"));
        assert!(text.contains("q, Ctrl+c"));
        assert!(text.contains("Press any key to close"));
    }

    #[test]
    fn box_is_capped_to_the_terminal() {
        let rows = help_box(&keymap(), Style::default(), 40, 10);
        assert_eq!(rows.len(), 10);
        for row in &rows {
            assert_eq!(visible_len(row), 40);
        }
    }

    #[test]
    fn rebound_keys_show_up() {
        let bindings = KeyBindings {
            quit: vec!["x".to_string()],
            ..KeyBindings::default()
        };
        let lines = help_lines(&Keymap::from_bindings(&bindings), Style::default());
        let quit = lines
            .iter()
            .map(|line| line.to_string())
            .find(|line| line.contains(Action::Quit.description()))
            .unwrap();
        assert!(quit.starts_with("x "));
    }
}
