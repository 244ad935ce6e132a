//! Rendering: playfield, sidebar, pause and game-over overlays, clear flash.

use crate::app::Screen;
use crate::game::Engine;
use crate::grid::{BOARD_HEIGHT, BOARD_WIDTH, Fruit, Pos};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per grid cell, so cells look roughly square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 26;

/// Fade of flashed cells back to the background (TachyonFX), in ms.
const FLASH_FADE_MS: u32 = 350;
const FLASH_COLOR: Color = Color::White;

/// Playfield size in terminal cells, border included.
const fn playfield_outer_size() -> (u16, u16) {
    (BOARD_WIDTH as u16 * CELL_WIDTH + 2, BOARD_HEIGHT as u16 + 2)
}

/// Cells cleared recently, drawn white and faded out.
#[derive(Default)]
pub struct Flash {
    cells: HashSet<Pos>,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl Flash {
    pub fn add(&mut self, cells: impl IntoIterator<Item = Pos>) {
        self.cells.extend(cells);
        // new cells get a fresh fade
        self.effect = None;
    }

    pub fn is_active(&self) -> bool {
        !self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    /// Drops the flash once its fade has run out.
    pub fn finish_if_done(&mut self) {
        if self.effect.as_ref().is_some_and(|e| e.done()) {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Top-left buffer position of a grid cell, if it is on screen.
fn cell_origin(board: Rect, pos: Pos) -> Option<(u16, u16)> {
    let col = u16::try_from(pos.x).ok()?;
    let row = u16::try_from(BOARD_HEIGHT as i32 - 1 - pos.y).ok()?;
    let x = board.x + col * CELL_WIDTH;
    let y = board.y + row;
    (x + CELL_WIDTH <= board.right() && y < board.bottom()).then_some((x, y))
}

/// Draw the game screen plus whatever overlay the app state calls for.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    engine: &Engine,
    theme: &Theme,
    paused: bool,
    flash: &mut Flash,
    now: Instant,
) {
    let area = frame.area();
    let board = draw_game(frame, engine, theme, flash, area);
    if flash.is_active() {
        apply_clear_flash(frame, theme, board, flash, now);
    }
    match screen {
        Screen::GameOver => draw_game_over(frame, engine, theme, area),
        Screen::Playing if paused => draw_pause_overlay(frame, theme, area),
        Screen::Playing => {}
    }
}

/// Create or update the fade effect and process it.
fn apply_clear_flash(frame: &mut Frame, theme: &Theme, board: Rect, flash: &mut Flash, now: Instant) {
    let delta = flash
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    flash.last_process = Some(now);

    if flash.effect.is_none() {
        let positions: HashSet<(u16, u16)> = flash
            .cells
            .iter()
            .filter_map(|&p| cell_origin(board, p))
            .flat_map(|(x, y)| (0..CELL_WIDTH).map(move |dx| (x + dx, y)))
            .collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            positions.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_to(theme.bg, theme.bg, (FLASH_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        flash.effect = Some(effect);
    }

    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

/// Playfield + sidebar, centred. Returns the board rect (inside the border).
fn draw_game(frame: &mut Frame, engine: &Engine, theme: &Theme, flash: &Flash, area: Rect) -> Rect {
    let (pw, ph) = playfield_outer_size();
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz_chunks[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert_chunks[1]);

    let board = draw_playfield(frame, engine, theme, flash, inner[0]);
    draw_sidebar(frame, engine, theme, inner[1]);
    board
}

fn draw_playfield(
    frame: &mut Frame,
    engine: &Engine,
    theme: &Theme,
    flash: &Flash,
    area: Rect,
) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Fruitris ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let board = Rect {
        x: inner.x,
        y: inner.y,
        width: (BOARD_WIDTH as u16 * CELL_WIDTH).min(inner.width),
        height: (BOARD_HEIGHT as u16).min(inner.height),
    };

    let piece: HashMap<Pos, Fruit> = if engine.is_game_over() {
        HashMap::new()
    } else {
        engine.piece_cells().into_iter().collect()
    };

    let buf = frame.buffer_mut();
    for (y, row) in engine.grid().rows_top_down() {
        for (x, cell) in row.iter().enumerate() {
            let pos = Pos::new(x as i32, y);
            let Some((rx, ry)) = cell_origin(board, pos) else {
                continue;
            };
            let (symbol, fg) = if flash.contains(pos) {
                ("█", FLASH_COLOR)
            } else if let Some(&fruit) = piece.get(&pos) {
                ("▓", theme.fruit_color(fruit))
            } else if let Some(fruit) = cell.color() {
                ("█", theme.fruit_color(fruit))
            } else {
                (" ", theme.bg)
            };
            let style = Style::default().fg(fg).bg(theme.bg);
            for dx in 0..CELL_WIDTH {
                buf[(rx + dx, ry)].set_symbol(symbol).set_style(style);
            }
        }
    }
    board
}

fn fruit_name(fruit: Fruit) -> &'static str {
    match fruit {
        Fruit::Grape => "Grape",
        Fruit::Apple => "Apple",
        Fruit::Banana => "Banana",
        Fruit::Pear => "Pear",
        Fruit::Orange => "Orange",
    }
}

fn draw_sidebar(frame: &mut Frame, engine: &Engine, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let dim_style = Style::default().fg(theme.inactive_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stats
            Constraint::Length(1),
            Constraint::Length(7), // Fruits
            Constraint::Length(1),
            Constraint::Length(8), // Controls
        ])
        .split(area);

    let section = |title: &'static str| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(format!(" {title} "), title_style))
    };
    let stat = |label: &'static str, value: u32| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value.to_string(), fg_style),
        ])
    };

    let stats = vec![
        stat("Pieces: ", engine.pieces_placed),
        stat("Rows:   ", engine.rows_cleared),
        stat("Fruits: ", engine.fruits_cleared),
    ];
    Paragraph::new(Text::from(stats))
        .block(section("Stats"))
        .render(chunks[0], frame.buffer_mut());

    let kinds = engine.config().fruit_kinds;
    let fruits: Vec<Line> = Fruit::ALL
        .iter()
        .enumerate()
        .map(|(i, &fruit)| {
            let label_style = if i < kinds { fg_style } else { dim_style };
            Line::from(vec![
                Span::styled("██ ", Style::default().fg(theme.fruit_color(fruit))),
                Span::styled(fruit_name(fruit), label_style),
            ])
        })
        .collect();
    Paragraph::new(Text::from(fruits))
        .block(section("Fruits"))
        .render(chunks[2], frame.buffer_mut());

    let controls = [
        ("←→ h l ", "move"),
        ("↑ k / u", "rotate"),
        ("space  ", "colours"),
        ("↓ j    ", "fast drop"),
        ("p  r   ", "pause, restart"),
        ("q      ", "quit"),
    ]
    .map(|(keys, what)| {
        Line::from(vec![
            Span::styled(keys, fg_style),
            Span::styled(format!(" {what}"), dim_style),
        ])
    });
    Paragraph::new(Text::from(controls.to_vec()))
        .block(section("Controls"))
        .render(chunks[4], frame.buffer_mut());
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P Resume    Q Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, engine: &Engine, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 30, 10);
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Pieces: {} ", engine.pieces_placed), fg)),
        Line::from(Span::styled(format!(" Rows: {} ", engine.rows_cleared), fg)),
        Line::from(Span::styled(format!(" Fruits: {} ", engine.fruits_cleared), fg)),
        Line::from(""),
        Line::from(Span::styled(" R Restart    Q Quit ", fg)),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Fruitris ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::grid::Grid;
    use crate::piece::{Piece, ShapeKind};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn render(engine: &Engine, screen: Screen, paused: bool, flash: &mut Flash) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 26)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| draw(f, screen, engine, &theme, paused, flash, Instant::now()))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    fn engine_with(grid: Grid) -> Engine {
        let piece = Piece::new(ShapeKind::I, Pos::new(5, 15), [Fruit::Pear; 4]);
        let config = GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        };
        Engine::with_board(&config, grid, piece)
    }

    #[test]
    fn cell_origin_flips_rows() {
        let board = Rect::new(10, 5, 20, 20);
        assert_eq!(cell_origin(board, Pos::new(0, 0)), Some((10, 24)));
        assert_eq!(cell_origin(board, Pos::new(9, 19)), Some((28, 5)));
        assert_eq!(cell_origin(board, Pos::new(10, 0)), None);
        assert_eq!(cell_origin(board, Pos::new(0, 20)), None);
    }

    #[test]
    fn draws_fruit_and_piece_colours() {
        let mut grid = Grid::new();
        grid.set(Pos::new(0, 0), Fruit::Apple);
        let engine = engine_with(grid);
        let buf = render(&engine, Screen::Playing, false, &mut Flash::default());
        let theme = Theme::default();

        let (pw, ph) = playfield_outer_size();
        let left = (80 - (pw + SIDEBAR_WIDTH)) / 2 + 1;
        let top = (26 - ph) / 2 + 1;
        let board = Rect::new(left, top, BOARD_WIDTH as u16 * CELL_WIDTH, BOARD_HEIGHT as u16);

        let (x, y) = cell_origin(board, Pos::new(0, 0)).unwrap();
        assert_eq!(buf[(x, y)].fg, theme.fruit_color(Fruit::Apple));
        assert_eq!(buf[(x + 1, y)].symbol(), "█");
        let (x, y) = cell_origin(board, Pos::new(5, 15)).unwrap();
        assert_eq!(buf[(x, y)].fg, theme.fruit_color(Fruit::Pear));
        assert_eq!(buf[(x, y)].symbol(), "▓");
    }

    #[test]
    fn sidebar_and_overlays() {
        let engine = engine_with(Grid::new());
        let s = text(&render(&engine, Screen::Playing, false, &mut Flash::default()));
        assert!(s.contains("Fruitris"));
        assert!(s.contains("Pieces: 0"));
        assert!(s.contains("Orange"));
        assert!(!s.contains("Paused"));

        let s = text(&render(&engine, Screen::Playing, true, &mut Flash::default()));
        assert!(s.contains("Paused"));

        let s = text(&render(&engine, Screen::GameOver, false, &mut Flash::default()));
        assert!(s.contains("Game Over"));
    }

    #[test]
    fn flash_starts_effect_and_clears() {
        let engine = engine_with(Grid::new());
        let mut flash = Flash::default();
        flash.add([Pos::new(1, 0), Pos::new(2, 0)]);
        assert!(flash.is_active());
        render(&engine, Screen::Playing, false, &mut flash);
        assert!(flash.effect.is_some());
        flash.finish_if_done();
        assert!(flash.is_active());
        flash.clear();
        assert!(!flash.is_active());
        assert!(flash.effect.is_none());
    }
}
