use crate::{actions, app::App, keymap::Action, models::Mode};
use crossterm::event::{KeyCode, KeyEvent};

pub fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if app.mode == Mode::SearchNav && leaves_matches(app, &key) {
        app.clear_search();
        return;
    }
    if let Some(action) = app.keymap.lookup(&key) {
        actions::run(app, action);
    }
}

fn leaves_matches(app: &App, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('q') => !app.keymap.is_bound(key, Action::Quit),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::app::App;
    use crate::config::{Config, KeyBindings};
    use crate::input::tests::{make_test_app, press, type_text};
    use crate::models::{Mode, Source};
    use crossterm::event::{KeyCode, KeyModifiers};

    fn long_document() -> String {
        (0..80)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn vim_keys_scroll() {
        let mut app = make_test_app(&long_document());
        type_text(&mut app, "jjj");
        assert_eq!(app.viewport.y_offset, 3);
        type_text(&mut app, "k");
        assert_eq!(app.viewport.y_offset, 2);
        type_text(&mut app, "G");
        assert_eq!(app.viewport.y_offset, app.lines.len() - app.content_height());
        type_text(&mut app, "g");
        assert_eq!(app.viewport.y_offset, 0);
    }

    #[test]
    fn ctrl_d_pages_down_half_a_screen() {
        let mut app = make_test_app(&long_document());
        press(&mut app, KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(app.viewport.y_offset, app.content_height() / 2);
        press(&mut app, KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(app.viewport.y_offset, 0);
    }

    #[test]
    fn unbound_keys_do_nothing() {
        let mut app = make_test_app(&long_document());
        type_text(&mut app, "z");
        assert_eq!(app.viewport.y_offset, 0);
        assert!(!app.should_quit);
    }

    #[test]
    fn q_quits_from_reading() {
        let mut app = make_test_app("text");
        type_text(&mut app, "q");
        assert!(app.should_quit);
    }

    #[test]
    fn q_leaves_matches_when_rebound() {
        let bindings = KeyBindings {
            quit: vec!["ctrl+c".to_string()],
            ..KeyBindings::default()
        };
        let config = Config {
            keybindings: bindings,
            ..Config::default()
        };
        let mut app = App::new(config, Source::Stdin, "foo".to_string(), 80, 24);
        type_text(&mut app, "/foo");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.mode, Mode::SearchNav);
        type_text(&mut app, "q");
        assert_eq!(app.mode, Mode::Reading);
        assert!(!app.should_quit);
    }

    #[test]
    fn esc_in_reading_is_a_no_op() {
        let mut app = make_test_app("text");
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.should_quit);
    }
}
