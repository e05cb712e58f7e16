use crate::{app::App, keymap::Action};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_search_mode(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Char('c' | 'g') if ctrl => app.clear_search(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        _ if app.keymap.is_bound(&key, Action::ToggleCase) => app.toggle_case(),
        KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            app.search_input.push(ch);
        }
        _ => {}
    }
}
