use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "mdlens", "mdlens")
}

fn default_data_dir() -> PathBuf {
    if let Some(dirs) = project_dirs() {
        return dirs.data_dir().to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".mdlens")
}

pub fn log_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os("MDLENS_LOG_FILE") {
        return PathBuf::from(path);
    }
    default_data_dir().join("mdlens.log")
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("MDLENS_CONFIG") {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.config_dir().join("config.toml");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".mdlens-config.toml")
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub colors: Colors,
    pub keybindings: KeyBindings,
    pub markdown: MarkdownConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ThemePreset {
    #[default]
    Default,
    #[value(name = "onedark")]
    OneDark,
}

impl ThemePreset {
    pub fn all() -> Vec<ThemePreset> {
        vec![ThemePreset::Default, ThemePreset::OneDark]
    }

    pub fn name(self) -> &'static str {
        match self {
            ThemePreset::Default => "default",
            ThemePreset::OneDark => "onedark",
        }
    }

    pub fn colors(self) -> Colors {
        match self {
            ThemePreset::Default => Colors::default(),
            ThemePreset::OneDark => Colors {
                heading: "#61afef".to_string(),
                heading_secondary: "#c678dd".to_string(),
                link_text: "#56b6c2".to_string(),
                link_url: "#5c6370".to_string(),
                inline_code: "#e06c75".to_string(),
                blockquote: "#5c6370".to_string(),
                list_marker: "#e5c07b".to_string(),
                rule: "#3e4451".to_string(),
                hyperlink_underline: "#61afef".to_string(),
                hyperlink_hovered_underline: "#e5c07b".to_string(),
                hovered_link_url: "#e5c07b".to_string(),
                search_current_fg: "#282c34".to_string(),
                search_current_bg: "#e5c07b".to_string(),
                search_other_fg: "#282c34".to_string(),
                search_other_bg: "#5c6370".to_string(),
                status_bar_text: "#abb2bf".to_string(),
                status_bar_bg: "#2c323c".to_string(),
                help_box_border: "#61afef".to_string(),
                search_box_border: "#98c379".to_string(),
            },
        }
    }
}

/// Color strings: `#rrggbb`, a ratatui color name, `r,g,b`, or a palette
/// index. An empty string leaves the terminal default in place.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Colors {
    pub heading: String,
    pub heading_secondary: String,
    pub link_text: String,
    pub link_url: String,
    pub inline_code: String,
    pub blockquote: String,
    pub list_marker: String,
    pub rule: String,
    pub hyperlink_underline: String,
    pub hyperlink_hovered_underline: String,
    pub hovered_link_url: String,
    pub search_current_fg: String,
    pub search_current_bg: String,
    pub search_other_fg: String,
    pub search_other_bg: String,
    pub status_bar_text: String,
    pub status_bar_bg: String,
    pub help_box_border: String,
    pub search_box_border: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            heading: "#00afff".to_string(),
            heading_secondary: "#5fafff".to_string(),
            link_text: "#5fd7ff".to_string(),
            link_url: "#808080".to_string(),
            inline_code: "#ff5f5f".to_string(),
            blockquote: "#808080".to_string(),
            list_marker: "#808080".to_string(),
            rule: "#585858".to_string(),
            hyperlink_underline: "#00afff".to_string(),
            hyperlink_hovered_underline: "#ffaf00".to_string(),
            hovered_link_url: "#ffaf00".to_string(),
            search_current_fg: "#000000".to_string(),
            search_current_bg: "#ffaf00".to_string(),
            search_other_fg: "#000000".to_string(),
            search_other_bg: "#8a8a8a".to_string(),
            status_bar_text: "#d0d0d0".to_string(),
            status_bar_bg: "#303030".to_string(),
            help_box_border: "#00afff".to_string(),
            search_box_border: "#ffaf00".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct KeyBindings {
    pub scroll_up: Vec<String>,
    pub scroll_down: Vec<String>,
    pub scroll_left: Vec<String>,
    pub scroll_right: Vec<String>,
    pub page_up: Vec<String>,
    pub page_down: Vec<String>,
    pub go_to_top: Vec<String>,
    pub go_to_bottom: Vec<String>,
    pub start_search: Vec<String>,
    pub next_match: Vec<String>,
    pub prev_match: Vec<String>,
    pub clear_search: Vec<String>,
    pub toggle_case: Vec<String>,
    pub show_help: Vec<String>,
    pub toggle_mouse: Vec<String>,
    pub quit: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            scroll_up: keys(&["k", "up"]),
            scroll_down: keys(&["j", "down"]),
            scroll_left: keys(&["h", "left"]),
            scroll_right: keys(&["l", "right"]),
            page_up: keys(&["pgup", "b", "ctrl+u"]),
            page_down: keys(&["pgdn", "space", "ctrl+d"]),
            go_to_top: keys(&["g", "home"]),
            go_to_bottom: keys(&["G", "end"]),
            start_search: keys(&["/"]),
            next_match: keys(&["n"]),
            prev_match: keys(&["N"]),
            clear_search: keys(&["ctrl+l"]),
            toggle_case: keys(&["ctrl+t"]),
            show_help: keys(&["?"]),
            toggle_mouse: keys(&["m"]),
            quit: keys(&["q", "ctrl+c"]),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MarkdownConfig {
    pub code_theme: String,
    pub badges: bool,
    pub left_margin: usize,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            code_theme: "base16-ocean.dark".to_string(),
            badges: true,
            left_margin: 2,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from_path(&config_path())
    }

    pub fn load_from_path(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Config::default();
        };
        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to parse config ({path:?}), using defaults: {e}");
                warn!(path = %path.display(), error = %e, "config parse failed");
                Config::default()
            }
        }
    }

    pub fn preset(preset: ThemePreset) -> Self {
        Self {
            colors: preset.colors(),
            ..Config::default()
        }
    }

    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, content)
    }
}

pub fn init_config(path: &Path, preset: ThemePreset) -> io::Result<()> {
    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", path.display()),
        ));
    }
    Config::preset(preset).save_to_path(path)
}
