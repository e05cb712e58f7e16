pub(crate) mod mouse;
pub(crate) mod navigate;
pub(crate) mod search;

use crate::{app::App, models::Mode};
use crossterm::event::{Event, KeyEventKind};

pub fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Resize(width, height) => app.resize(width, height),
        Event::Mouse(mouse_event) => mouse::handle_mouse(app, mouse_event),
        Event::Key(key) if key.kind == KeyEventKind::Press => match app.mode {
            Mode::Reading | Mode::SearchNav => navigate::handle_normal_mode(app, key),
            Mode::Searching => search::handle_search_mode(app, key),
            Mode::Help => app.close_help(),
        },
        _ => {}
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Source;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    pub(crate) fn make_test_app(markdown: &str) -> App {
        App::new(Config::default(), Source::Stdin, markdown.to_string(), 80, 24)
    }

    pub(crate) fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_event(
            app,
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            }),
        );
    }

    pub(crate) fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            let modifiers = if ch.is_ascii_uppercase() {
                KeyModifiers::SHIFT
            } else {
                KeyModifiers::NONE
            };
            press(app, KeyCode::Char(ch), modifiers);
        }
    }

    #[test]
    fn full_search_round_trip_through_keys() {
        let mut app = make_test_app("alpha\n\nbeta alpha\n\ngamma");
        type_text(&mut app, "/");
        assert_eq!(app.mode, Mode::Searching);

        type_text(&mut app, "alpha");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.mode, Mode::SearchNav);
        assert_eq!(app.search.match_count(), 2);
        assert_eq!(app.search.current_index(), Some(0));

        type_text(&mut app, "n");
        assert_eq!(app.search.current_index(), Some(1));
        type_text(&mut app, "N");
        assert_eq!(app.search.current_index(), Some(0));

        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.mode, Mode::Reading);
        assert!(!app.search.is_active());
    }

    #[test]
    fn any_key_closes_help() {
        let mut app = make_test_app("text");
        type_text(&mut app, "?");
        assert_eq!(app.mode, Mode::Help);
        type_text(&mut app, "x");
        assert_eq!(app.mode, Mode::Reading);
        assert!(!app.should_quit);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = make_test_app("text");
        handle_event(
            &mut app,
            Event::Key(KeyEvent {
                code: KeyCode::Char('q'),
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Release,
                state: KeyEventState::NONE,
            }),
        );
        assert!(!app.should_quit);
    }

    #[test]
    fn resize_updates_viewport() {
        let mut app = make_test_app("text");
        handle_event(&mut app, Event::Resize(100, 40));
        assert_eq!((app.viewport.width, app.viewport.height), (100, 40));
    }
}
