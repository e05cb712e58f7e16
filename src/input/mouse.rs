use crate::app::{App, WHEEL_STEP};
use crate::models::Mode;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if !app.mouse_enabled {
        return;
    }
    let (x, y) = (mouse.column as usize, mouse.row as usize);
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_STEP),
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_STEP),
        MouseEventKind::ScrollLeft => app.scroll_left(WHEEL_STEP),
        MouseEventKind::ScrollRight => app.scroll_right(WHEEL_STEP),
        _ if app.mode == Mode::Help => {
            if matches!(mouse.kind, MouseEventKind::Down(_)) {
                app.close_help();
            }
        }
        MouseEventKind::Moved | MouseEventKind::Drag(_) => app.set_hover(x, y),
        MouseEventKind::Down(MouseButton::Left) => app.click(x, y),
        _ => {}
    }
}
