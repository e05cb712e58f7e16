use crate::app::App;
use chrono::Local;

pub fn tick(app: &mut App) {
    if let Some(expiry) = app.toast_expiry
        && Local::now() >= expiry
    {
        app.toast_expiry = None;
        app.toast_message = None;
    }
}
