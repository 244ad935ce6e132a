//! Fruitris: falling fruit pieces in the terminal. Line up three of a colour or fill a row.

mod app;
mod cascade;
mod collision;
mod game;
mod grid;
mod input;
mod logging;
mod matcher;
mod piece;
mod scheduler;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Engine settings taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Gravity and column-check interval.
    pub drop_interval_ms: u64,
    pub fast_interval_ms: u64,
    /// How many fruit colours spawn (2..=5).
    pub fruit_kinds: usize,
    /// Fixed RNG seed; random when unset.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            drop_interval_ms: 500,
            fast_interval_ms: 20,
            fruit_kinds: 5,
            seed: None,
        }
    }
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            drop_interval_ms: args.drop_interval_ms.max(1),
            fast_interval_ms: args.fast_interval_ms.max(1),
            fruit_kinds: args.fruit_kinds as usize,
            seed: args.seed,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        logging::init(path, args.log_level.into())?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme not loaded, using defaults: {e}");
        theme::Theme::for_palette(args.palette)
    });
    let config = GameConfig::from(&args);
    log::info!("starting with {config:?}");
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// Fruit Tetris in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "fruitris",
    version,
    about = "Falling fruit pieces in the terminal. Clear three of a colour in a line, or a full row.",
    long_about = "Fruitris is a falling-block puzzle where every cell is a fruit.\n\n\
        Three or more fruits of one colour in a straight line (horizontal or vertical) \
        disappear and the fruits above drop into the gap, which can set off further \
        matches. Full rows clear as well.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move         Up or k     Rotate CW    u  Rotate CCW\n  \
        Space              Cycle colours Down or j  Fast drop\n  \
        P                  Pause         R           Restart      Q / Esc  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Time between gravity steps (and column checks) in milliseconds.
    #[arg(long, default_value = "500", value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Time between steps while fast-dropping, in milliseconds.
    #[arg(long, default_value = "20", value_name = "MS")]
    pub fast_interval_ms: u64,

    /// Number of fruit colours in play (2 = grape and apple only).
    #[arg(long, default_value = "5", value_name = "N", value_parser = clap::value_parser!(u8).range(2..=5))]
    pub fruit_kinds: u8,

    /// RNG seed for a reproducible game.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the flash on cleared cells.
    #[arg(long)]
    pub no_animation: bool,

    /// Write log output to this file. Nothing is logged otherwise.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// Log level for --log-file.
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}
