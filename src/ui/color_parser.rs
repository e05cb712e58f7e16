use ratatui::style::Color;

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

pub fn parse_color(s: &str) -> Color {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "reset" | "default" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" => Color::Gray,
        "darkgray" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        _ => {
            if let Some(hex) = s.strip_prefix('#') {
                if let Some((r, g, b)) = parse_hex(hex) {
                    return Color::Indexed(nearest_palette_index(r, g, b));
                }
                return Color::Reset;
            }
            if let Ok(index) = s.parse::<u8>() {
                return Color::Indexed(index);
            }
            if s.contains(',') {
                let parts: Vec<&str> = s.split(',').collect();
                if parts.len() == 3 {
                    if let (Ok(r), Ok(g), Ok(b)) = (
                        parts[0].trim().parse(),
                        parts[1].trim().parse(),
                        parts[2].trim().parse(),
                    ) {
                        return Color::Rgb(r, g, b);
                    }
                }
            }
            Color::Reset
        }
    }
}

pub fn parse_optional_color(s: &str) -> Option<Color> {
    if s.trim().is_empty() {
        None
    } else {
        Some(parse_color(s))
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn nearest_level(value: u8) -> usize {
    CUBE_LEVELS
        .iter()
        .enumerate()
        .min_by_key(|(_, level)| (i32::from(**level) - i32::from(value)).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).pow(2);
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}

pub fn nearest_palette_index(r: u8, g: u8, b: u8) -> u8 {
    let (ri, gi, bi) = (nearest_level(r), nearest_level(g), nearest_level(b));
    let cube = (CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]);
    let cube_index = 16 + 36 * ri + 6 * gi + bi;

    let average = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
    let gray_step = (average.saturating_sub(8) / 10).min(23) as u8;
    let gray_value = 8 + 10 * gray_step;
    let gray_index = 232 + gray_step;

    if distance((r, g, b), (gray_value, gray_value, gray_value)) < distance((r, g, b), cube) {
        gray_index
    } else {
        cube_index as u8
    }
}
