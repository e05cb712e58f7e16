#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Reading,
    Searching,
    SearchNav,
    Help,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Reading => "READ",
            Mode::Searching => "SEARCH",
            Mode::SearchNav => "MATCHES",
            Mode::Help => "HELP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    pub x_offset: usize,
    pub y_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(String),
    Stdin,
}

impl Source {
    pub fn title(&self) -> &str {
        match self {
            Source::File(name) => name,
            Source::Stdin => "stdin",
        }
    }
}
