use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::{
    fs,
    io::{self, IsTerminal, Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod actions;
mod ansi;
mod app;
mod config;
mod input;
mod keymap;
mod links;
mod markdown;
mod models;
mod runtime;
mod search;
mod ui;

use crate::config::{Config, ThemePreset, config_path, init_config, log_file_path};
use app::App;
use models::Source;

/// View Markdown in the terminal with clickable links and search.
#[derive(Parser, Debug)]
#[command(name = "mdlens", version, about)]
struct Cli {
    /// Markdown file to view. Reads stdin when omitted.
    file: Option<PathBuf>,

    /// Write a starter config using THEME and exit
    #[arg(
        long,
        value_name = "THEME",
        num_args = 0..=1,
        default_missing_value = "default"
    )]
    init_config: Option<ThemePreset>,

    /// Print the config file location and exit
    #[arg(long)]
    config_path: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging();

    if cli.config_path {
        println!("{}", config_path().display());
        return Ok(());
    }

    if let Some(preset) = cli.init_config {
        let path = config_path();
        init_config(&path, preset)
            .with_context(|| format!("could not write config to {}", path.display()))?;
        println!("Wrote {} theme to {}", preset.name(), path.display());
        return Ok(());
    }

    let (source, markdown) = load_input(cli.file.as_deref())?;
    let config = Config::load();
    let (width, height) = terminal::size().context("could not read terminal size")?;

    let mut app = App::new(config, source, markdown, width, height);
    info!(source = app.source.title(), lines = app.lines.len(), "viewer started");

    run_terminal(&mut app).context("terminal error")
}

fn init_logging() -> Option<WorkerGuard> {
    let directive = std::env::var("MDLENS_LOG").ok()?;
    let path = log_file_path();
    let dir = path.parent()?;
    let file_name = path.file_name()?;
    fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn load_input(file: Option<&Path>) -> Result<(Source, String)> {
    if let Some(path) = file {
        let markdown = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok((Source::File(name), markdown));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("no input: pass a Markdown file or pipe Markdown into stdin (see --help)");
    }
    let mut markdown = String::new();
    stdin
        .lock()
        .read_to_string(&mut markdown)
        .context("could not read stdin")?;
    Ok((Source::Stdin, markdown))
}

fn run_terminal(app: &mut App) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;

    // Not every terminal supports the kitty protocol; the viewer works without it.
    let _ = execute!(
        stdout,
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
    );

    let res = run_app(&mut stdout, app);

    disable_raw_mode()?;
    let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture, Show)?;

    res
}

fn run_app<W: Write>(out: &mut W, app: &mut App) -> io::Result<()> {
    loop {
        runtime::tick(app);

        if app.mouse_capture_changed {
            app.mouse_capture_changed = false;
            if app.mouse_enabled {
                execute!(out, EnableMouseCapture)?;
            } else {
                execute!(out, DisableMouseCapture)?;
            }
        }

        ui::draw(out, app)?;

        if event::poll(Duration::from_millis(250))? {
            let event = event::read()?;
            input::handle_event(app, event);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
