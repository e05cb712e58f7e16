//! Key chords and the action table compiled from `[keybindings]`.

use crate::config::KeyBindings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    StartSearch,
    NextMatch,
    PrevMatch,
    ClearSearch,
    ToggleCase,
    ShowHelp,
    ToggleMouse,
    Quit,
}

impl Action {
    /// Declaration order. Earlier actions win binding conflicts.
    pub const ALL: [Action; 16] = [
        Action::ScrollUp,
        Action::ScrollDown,
        Action::ScrollLeft,
        Action::ScrollRight,
        Action::PageUp,
        Action::PageDown,
        Action::GoToTop,
        Action::GoToBottom,
        Action::StartSearch,
        Action::NextMatch,
        Action::PrevMatch,
        Action::ClearSearch,
        Action::ToggleCase,
        Action::ShowHelp,
        Action::ToggleMouse,
        Action::Quit,
    ];

    pub fn bindings(self, keys: &KeyBindings) -> &[String] {
        match self {
            Action::ScrollUp => &keys.scroll_up,
            Action::ScrollDown => &keys.scroll_down,
            Action::ScrollLeft => &keys.scroll_left,
            Action::ScrollRight => &keys.scroll_right,
            Action::PageUp => &keys.page_up,
            Action::PageDown => &keys.page_down,
            Action::GoToTop => &keys.go_to_top,
            Action::GoToBottom => &keys.go_to_bottom,
            Action::StartSearch => &keys.start_search,
            Action::NextMatch => &keys.next_match,
            Action::PrevMatch => &keys.prev_match,
            Action::ClearSearch => &keys.clear_search,
            Action::ToggleCase => &keys.toggle_case,
            Action::ShowHelp => &keys.show_help,
            Action::ToggleMouse => &keys.toggle_mouse,
            Action::Quit => &keys.quit,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Action::ScrollUp => "Scroll up",
            Action::ScrollDown => "Scroll down",
            Action::ScrollLeft => "Scroll left",
            Action::ScrollRight => "Scroll right",
            Action::PageUp => "Half page up",
            Action::PageDown => "Half page down",
            Action::GoToTop => "Go to top",
            Action::GoToBottom => "Go to bottom",
            Action::StartSearch => "Search",
            Action::NextMatch => "Next match",
            Action::PrevMatch => "Previous match",
            Action::ClearSearch => "Clear search",
            Action::ToggleCase => "Toggle case sensitivity",
            Action::ShowHelp => "Show this help",
            Action::ToggleMouse => "Toggle mouse / text selection",
            Action::Quit => "Quit",
        }
    }
}

/// A normalized key: shifted characters are folded into the character itself
/// so `G` and `shift+g` are the same chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let mut modifiers = modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT);
        let code = match code {
            KeyCode::Char(c) => {
                let shifted = modifiers.contains(KeyModifiers::SHIFT);
                modifiers.remove(KeyModifiers::SHIFT);
                if modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() {
                    KeyCode::Char(c.to_ascii_lowercase())
                } else if shifted && c.is_ascii_lowercase() {
                    KeyCode::Char(c.to_ascii_uppercase())
                } else {
                    KeyCode::Char(c)
                }
            }
            other => other,
        };
        Self { code, modifiers }
    }

    pub fn from_event(key: &KeyEvent) -> Self {
        Self::new(key.code, key.modifiers)
    }
}

pub fn parse_binding(binding: &str) -> Option<KeyChord> {
    if binding.chars().count() == 1 {
        let c = binding.chars().next()?;
        return Some(KeyChord::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    let (mut modifiers, key) = match binding.strip_prefix("C-") {
        Some(rest) => (KeyModifiers::CONTROL, rest),
        None => (KeyModifiers::NONE, binding),
    };

    let mut parts: Vec<&str> = key.split('+').collect();
    // `ctrl++` names the plus key itself.
    if key.ends_with("++") {
        parts.truncate(parts.len().saturating_sub(2));
        parts.push("+");
    }
    let name = parts.pop()?;
    for part in parts {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers.insert(KeyModifiers::CONTROL),
            "alt" | "opt" | "meta" => modifiers.insert(KeyModifiers::ALT),
            "shift" => modifiers.insert(KeyModifiers::SHIFT),
            _ => return None,
        }
    }

    if name.chars().count() == 1 {
        let c = name.chars().next()?;
        return Some(KeyChord::new(KeyCode::Char(c), modifiers));
    }

    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "up" | "arrowup" => KeyCode::Up,
        "down" | "arrowdown" => KeyCode::Down,
        "left" | "arrowleft" => KeyCode::Left,
        "right" | "arrowright" => KeyCode::Right,
        "pgup" | "pageup" => KeyCode::PageUp,
        "pgdn" | "pagedn" | "pagedown" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        f if f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
        _ => return None,
    };
    Some(KeyChord::new(code, modifiers))
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    actions: HashMap<KeyChord, Action>,
    labels: HashMap<Action, Vec<String>>,
}

impl Keymap {
    pub fn from_bindings(bindings: &KeyBindings) -> Self {
        let mut keymap = Keymap::default();
        for action in Action::ALL {
            for binding in action.bindings(bindings) {
                let Some(chord) = parse_binding(binding) else {
                    warn!(binding = %binding, ?action, "ignoring unrecognized key binding");
                    continue;
                };
                if let Some(existing) = keymap.actions.get(&chord) {
                    if *existing != action {
                        warn!(
                            binding = %binding,
                            kept = ?existing,
                            dropped = ?action,
                            "key bound to more than one action"
                        );
                    }
                    continue;
                }
                keymap.actions.insert(chord, action);
                keymap
                    .labels
                    .entry(action)
                    .or_default()
                    .push(display_binding(binding));
            }
        }
        keymap
    }

    pub fn lookup(&self, key: &KeyEvent) -> Option<Action> {
        self.actions.get(&KeyChord::from_event(key)).copied()
    }

    pub fn is_bound(&self, key: &KeyEvent, action: Action) -> bool {
        self.lookup(key) == Some(action)
    }

    pub fn first_key(&self, action: Action) -> String {
        self.labels
            .get(&action)
            .and_then(|labels| labels.first().cloned())
            .unwrap_or_else(|| "unbound".to_string())
    }

    pub fn keys_for(&self, action: Action) -> String {
        match self.labels.get(&action) {
            Some(labels) if !labels.is_empty() => labels.join(", "),
            _ => "unbound".to_string(),
        }
    }
}

fn display_binding(binding: &str) -> String {
    match binding.to_ascii_lowercase().as_str() {
        " " | "space" => "Space".to_string(),
        "up" | "arrowup" => "↑".to_string(),
        "down" | "arrowdown" => "↓".to_string(),
        "left" | "arrowleft" => "←".to_string(),
        "right" | "arrowright" => "→".to_string(),
        "pgup" | "pageup" => "PgUp".to_string(),
        "pgdn" | "pagedn" | "pagedown" => "PgDn".to_string(),
        "esc" | "escape" => "Esc".to_string(),
        "home" => "Home".to_string(),
        "end" => "End".to_string(),
        _ => {
            if let Some(rest) = binding.strip_prefix("C-") {
                return format!("Ctrl+{rest}");
            }
            if let Some(rest) = binding.to_ascii_lowercase().strip_prefix("ctrl+") {
                return format!("Ctrl+{rest}");
            }
            binding.to_string()
        }
    }
}
