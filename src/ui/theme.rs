use crate::ansi::sgr::{style_on, underline_color};
use crate::config::Colors;
use crate::links::LinkStyle;
use crate::markdown::MarkdownStyles;
use crate::ui::color_parser::parse_optional_color;
use ratatui::style::{Modifier, Style};

#[derive(Debug, Clone)]
pub struct ThemeTokens {
    pub markdown: MarkdownStyles,
    pub links: LinkStyle,
    pub hovered_link_url: Style,
    pub search_current: String,
    pub search_other: String,
    pub status_bar: Style,
    pub help_border: Style,
    pub search_border: Style,
}

fn fg(value: &str) -> Style {
    parse_optional_color(value)
        .map(|color| Style::default().fg(color))
        .unwrap_or_default()
}

fn highlight_fragment(fg_value: &str, bg_value: &str) -> String {
    let mut style = Style::default();
    if let Some(color) = parse_optional_color(fg_value) {
        style = style.fg(color);
    }
    if let Some(color) = parse_optional_color(bg_value) {
        style = style.bg(color);
    }
    if style.fg.is_none() && style.bg.is_none() {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style_on(style)
}

impl ThemeTokens {
    pub fn from_colors(colors: &Colors) -> Self {
        let markdown = MarkdownStyles {
            heading: fg(&colors.heading),
            heading_secondary: fg(&colors.heading_secondary),
            link_text: fg(&colors.link_text),
            link_url: fg(&colors.link_url),
            inline_code: fg(&colors.inline_code),
            blockquote: fg(&colors.blockquote),
            list_marker: fg(&colors.list_marker),
            rule: fg(&colors.rule),
        };

        let links = LinkStyle {
            underline: parse_optional_color(&colors.hyperlink_underline).map(underline_color),
            hovered_underline: parse_optional_color(&colors.hyperlink_hovered_underline)
                .map(underline_color),
        };

        let mut status_bar = fg(&colors.status_bar_text);
        if let Some(bg) = parse_optional_color(&colors.status_bar_bg) {
            status_bar = status_bar.bg(bg);
        }

        Self {
            markdown,
            links,
            hovered_link_url: fg(&colors.hovered_link_url),
            search_current: highlight_fragment(&colors.search_current_fg, &colors.search_current_bg),
            search_other: highlight_fragment(&colors.search_other_fg, &colors.search_other_bg),
            status_bar,
            help_border: fg(&colors.help_box_border),
            search_border: fg(&colors.search_box_border),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ThemeTokens;
    use crate::config::{Colors, ThemePreset};
    use ratatui::style::Color;

    #[test]
    fn maps_config_colors_to_tokens() {
        let tokens = ThemeTokens::from_colors(&Colors::default());
        assert_eq!(tokens.markdown.heading.fg, Some(Color::Indexed(39)));
        assert_eq!(tokens.links.underline.as_deref(), Some("\x1b[58;5;39m"));
        assert_eq!(tokens.links.hovered_underline.as_deref(), Some("\x1b[58;5;214m"));
        assert_eq!(tokens.search_current, "\x1b[38;5;16;48;5;214m");
        assert_eq!(tokens.status_bar.bg, Some(Color::Indexed(236)));
    }

    #[test]
    fn empty_colors_fall_back_to_terminal_defaults() {
        let colors = Colors {
            heading: String::new(),
            hyperlink_underline: String::new(),
            search_other_fg: String::new(),
            search_other_bg: String::new(),
            ..Colors::default()
        };
        let tokens = ThemeTokens::from_colors(&colors);
        assert_eq!(tokens.markdown.heading.fg, None);
        assert_eq!(tokens.links.underline, None);
        assert_eq!(tokens.search_other, "\x1b[7m");
    }

    #[test]
    fn presets_produce_distinct_hover_colors() {
        for preset in ThemePreset::all() {
            let tokens = ThemeTokens::from_colors(&preset.colors());
            assert_ne!(tokens.links.underline, tokens.links.hovered_underline);
        }
    }
}
