//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use crate::grid::Fruit;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Fruit colours in `Fruit::ALL` order: grape, apple, banana, pear, orange.
    pub fruit: [Color; 5],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (counters).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (controls help).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const ONEDARK_FRUIT: [Color; 5] = [
    Color::Rgb(0xC6, 0x78, 0xDD), // net_box / magenta
    Color::Rgb(0xE0, 0x6C, 0x75), // cpu_end / red
    Color::Rgb(0xE5, 0xC0, 0x7B), // title / yellow
    Color::Rgb(0x98, 0xC3, 0x79), // mem_box / green
    Color::Rgb(0xD1, 0x9A, 0x66), // orange
];
const ONEDARK_BG: Color = Color::Rgb(0x31, 0x35, 0x3F);
const ONEDARK_DIV: Color = Color::Rgb(0x3F, 0x44, 0x4F);
const ONEDARK_FG: Color = Color::Rgb(0xAB, 0xB2, 0xBF);
const ONEDARK_TITLE: Color = Color::Rgb(0xE5, 0xC0, 0x7B);
const ONEDARK_INACTIVE: Color = Color::Rgb(0x5C, 0x63, 0x70);

/// Theme keys tried per fruit, first hit wins.
const FRUIT_KEYS: [&[&str]; 5] = [
    &["fruit_grape", "net_box"],
    &["fruit_apple", "cpu_end", "temp_end"],
    &["fruit_banana", "title", "cpu_mid"],
    &["fruit_pear", "mem_box", "cpu_start"],
    &["fruit_orange", "temp_mid", "used_mid"],
];

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            fruit: ONEDARK_FRUIT,
            bg: ONEDARK_BG,
            div_line: ONEDARK_DIV,
            main_fg: ONEDARK_FG,
            title: ONEDARK_TITLE,
            inactive_fg: ONEDARK_INACTIVE,
        }
    }

    /// One Dark with the palette's fruit colours.
    pub fn for_palette(palette: Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// No path means One Dark. Keys missing from the file keep their One Dark value.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let Some(path) = path else {
            return Ok(Self::for_palette(palette));
        };
        let s = std::fs::read_to_string(path)?;
        let mut theme = Self::from_map(&parse_theme_file(&s));
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override fruit colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.fruit = [
                    Color::Rgb(0xFF, 0x00, 0xFF), // magenta
                    Color::Rgb(0xFF, 0x00, 0x00), // red
                    Color::Rgb(0xFF, 0xFF, 0x00), // yellow
                    Color::Rgb(0x00, 0xFF, 0x00), // green
                    Color::Rgb(0xFF, 0x88, 0x00), // orange
                ];
            }
            Palette::Colorblind => {
                // Tol's vibrant scheme
                self.fruit = [
                    Color::Rgb(0x00, 0x77, 0xBB), // blue
                    Color::Rgb(0xCC, 0x33, 0x11), // red
                    Color::Rgb(0xBB, 0xBB, 0x00), // yellow
                    Color::Rgb(0x00, 0x99, 0x88), // teal
                    Color::Rgb(0xEE, 0x77, 0x33), // orange
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let first = |keys: &[&str], fallback: Color| {
            keys.iter().find_map(|&k| get(k)).unwrap_or(fallback)
        };
        let mut fruit = ONEDARK_FRUIT;
        for (color, keys) in fruit.iter_mut().zip(FRUIT_KEYS) {
            *color = first(keys, *color);
        }
        Self {
            fruit,
            bg: first(&["meter_bg"], ONEDARK_BG),
            div_line: first(&["div_line"], ONEDARK_DIV),
            main_fg: first(&["main_fg"], ONEDARK_FG),
            title: first(&["title"], ONEDARK_TITLE),
            inactive_fg: first(&["inactive_fg"], ONEDARK_INACTIVE),
        }
    }

    #[inline]
    pub fn fruit_color(&self, fruit: Fruit) -> Color {
        self.fruit[fruit.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, rest)) = stripped.split_once(']') else {
            continue;
        };
        let Some((_, value)) = rest.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    let (r, g, b) = match s.len() {
        6 if s.is_ascii() => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 if s.is_ascii() => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
