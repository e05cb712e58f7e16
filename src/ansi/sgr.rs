//! Escape-sequence fragments emitted by the renderer and the overlays.
//!
//! Styles are written as paired on/off fragments rather than full resets so
//! that an enclosing attribute (a hyperlink underline, a highlight) is not
//! switched off by nested text.

use ratatui::style::{Color, Modifier, Style};

pub const RESET: &str = "\x1b[0m";
pub const UNDERLINE_ON: &str = "\x1b[4m";
pub const UNDERLINE_OFF: &str = "\x1b[24m";
pub const UNDERLINE_COLOR_RESET: &str = "\x1b[59m";
pub const HYPERLINK_CLOSE: &str = "\x1b]8;;\x1b\\";

#[derive(Clone, Copy)]
enum Layer {
    Fg,
    Bg,
    Underline,
}

fn ansi16_index(color: Color) -> Option<u8> {
    let index = match color {
        Color::Black => 0,
        Color::Red => 1,
        Color::Green => 2,
        Color::Yellow => 3,
        Color::Blue => 4,
        Color::Magenta => 5,
        Color::Cyan => 6,
        Color::Gray => 7,
        Color::DarkGray => 8,
        Color::LightRed => 9,
        Color::LightGreen => 10,
        Color::LightYellow => 11,
        Color::LightBlue => 12,
        Color::LightMagenta => 13,
        Color::LightCyan => 14,
        Color::White => 15,
        _ => return None,
    };
    Some(index)
}

fn color_params(color: Color, layer: Layer) -> String {
    let (extended, default) = match layer {
        Layer::Fg => (38, 39),
        Layer::Bg => (48, 49),
        Layer::Underline => (58, 59),
    };

    match color {
        Color::Reset => default.to_string(),
        Color::Rgb(r, g, b) => format!("{extended};2;{r};{g};{b}"),
        Color::Indexed(i) => format!("{extended};5;{i}"),
        named => {
            let index = ansi16_index(named).unwrap_or(7);
            match layer {
                Layer::Fg | Layer::Bg => {
                    let base = if matches!(layer, Layer::Fg) { 30 } else { 40 };
                    let code = if index < 8 {
                        base + index as u16
                    } else {
                        base + 60 + (index as u16 - 8)
                    };
                    code.to_string()
                }
                Layer::Underline => format!("{extended};5;{index}"),
            }
        }
    }
}

fn csi(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("\x1b[{}m", params.join(";"))
    }
}

pub fn style_on(style: Style) -> String {
    let mut params = Vec::new();
    let m = style.add_modifier;
    if m.contains(Modifier::BOLD) {
        params.push("1".to_string());
    }
    if m.contains(Modifier::DIM) {
        params.push("2".to_string());
    }
    if m.contains(Modifier::ITALIC) {
        params.push("3".to_string());
    }
    if m.contains(Modifier::UNDERLINED) {
        params.push("4".to_string());
    }
    if m.contains(Modifier::REVERSED) {
        params.push("7".to_string());
    }
    if m.contains(Modifier::CROSSED_OUT) {
        params.push("9".to_string());
    }
    if let Some(fg) = style.fg {
        params.push(color_params(fg, Layer::Fg));
    }
    if let Some(bg) = style.bg {
        params.push(color_params(bg, Layer::Bg));
    }
    csi(&params)
}

/// Fragment undoing exactly what [`style_on`] turned on.
pub fn style_off(style: Style) -> String {
    let mut params = Vec::new();
    let m = style.add_modifier;
    if m.intersects(Modifier::BOLD | Modifier::DIM) {
        params.push("22".to_string());
    }
    if m.contains(Modifier::ITALIC) {
        params.push("23".to_string());
    }
    if m.contains(Modifier::UNDERLINED) {
        params.push("24".to_string());
    }
    if m.contains(Modifier::REVERSED) {
        params.push("27".to_string());
    }
    if m.contains(Modifier::CROSSED_OUT) {
        params.push("29".to_string());
    }
    if style.fg.is_some() {
        params.push("39".to_string());
    }
    if style.bg.is_some() {
        params.push("49".to_string());
    }
    csi(&params)
}

pub fn paint(text: &str, style: Style) -> String {
    let on = style_on(style);
    if on.is_empty() {
        return text.to_string();
    }
    format!("{on}{text}{}", style_off(style))
}

pub fn underline_color(color: Color) -> String {
    format!("\x1b[{}m", color_params(color, Layer::Underline))
}

pub fn hyperlink_open(url: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\")
}
