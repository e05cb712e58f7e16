use crate::{app::App, keymap::Action};
use tracing::debug;

pub fn run(app: &mut App, action: Action) {
    debug!(?action, mode = ?app.mode, "action");
    match action {
        Action::ScrollUp => app.scroll_up(1),
        Action::ScrollDown => app.scroll_down(1),
        Action::ScrollLeft => app.scroll_left(horizontal_step(app)),
        Action::ScrollRight => app.scroll_right(horizontal_step(app)),
        Action::PageUp => app.page_up(),
        Action::PageDown => app.page_down(),
        Action::GoToTop => app.scroll_to_top(),
        Action::GoToBottom => app.scroll_to_bottom(),
        Action::StartSearch => app.start_search(),
        Action::NextMatch => app.next_match(),
        Action::PrevMatch => app.prev_match(),
        Action::ClearSearch => app.clear_search(),
        Action::ToggleCase => app.toggle_case(),
        Action::ShowHelp => app.open_help(),
        Action::ToggleMouse => app.toggle_mouse(),
        Action::Quit => app.quit(),
    }
}

fn horizontal_step(app: &App) -> usize {
    (app.viewport.width / 4).max(1)
}
