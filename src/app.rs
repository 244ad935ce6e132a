//! App: terminal init, main loop, clock and key handling.

use crate::game::{Engine, GameEvent};
use crate::grid::{BOARD_WIDTH, Pos};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, Flash};
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Render/poll cadence, about 60 FPS.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

pub struct App {
    theme: Theme,
    engine: Engine,
    screen: Screen,
    paused: bool,
    no_animation: bool,
    last_frame: Instant,
    /// Wall time not yet handed to the engine (sub-millisecond remainder).
    carry: Duration,
    flash: Flash,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        Self {
            theme,
            engine: Engine::new(&config),
            screen: Screen::Playing,
            paused: false,
            no_animation: args.no_animation,
            last_frame: Instant::now(),
            carry: Duration::ZERO,
            flash: Flash::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        self.last_frame = Instant::now();
        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        info!(
            "quit after {} pieces, {} rows, {} fruits",
            self.engine.pieces_placed, self.engine.rows_cleared, self.engine.fruits_cleared
        );
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            self.advance_clock(now);
            self.drain_events();
            self.flash.finish_if_done();

            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &self.engine,
                    &self.theme,
                    self.paused,
                    &mut self.flash,
                    now,
                );
            })?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Hands elapsed wall time to the engine. Paused or finished games keep their clock.
    fn advance_clock(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        if self.screen != Screen::Playing || self.paused {
            return;
        }
        self.carry += elapsed;
        let ms = self.carry.as_millis() as u64;
        self.carry -= Duration::from_millis(ms);
        self.engine.advance(ms);
    }

    /// Returns false on quit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Restart => self.restart(),
            Action::Pause if self.screen == Screen::Playing => {
                self.paused = !self.paused;
                debug!("paused: {}", self.paused);
            }
            _ if self.screen != Screen::Playing || self.paused => {}
            Action::MoveLeft => {
                self.engine.move_left();
            }
            Action::MoveRight => {
                self.engine.move_right();
            }
            Action::RotateCw => {
                self.engine.rotate_cw();
            }
            Action::RotateCcw => {
                self.engine.rotate_ccw();
            }
            Action::RotateColors => self.engine.rotate_colors(),
            Action::FastDrop => {
                self.engine.fast_drop();
            }
            Action::Pause | Action::None => {}
        }
        self.drain_events();
        true
    }

    fn restart(&mut self) {
        self.engine.restart();
        self.screen = Screen::Playing;
        self.paused = false;
        self.carry = Duration::ZERO;
        self.flash.clear();
    }

    fn drain_events(&mut self) {
        for event in self.engine.take_events() {
            match event {
                GameEvent::RowsCleared(rows) => {
                    if !self.no_animation {
                        self.flash.add(rows.into_iter().flat_map(|y| {
                            (0..BOARD_WIDTH as i32).map(move |x| Pos::new(x, y))
                        }));
                    }
                }
                GameEvent::FruitsCleared(cells) => {
                    if !self.no_animation {
                        self.flash.add(cells);
                    }
                }
                GameEvent::GameOver => self.screen = Screen::GameOver,
                GameEvent::PieceLocked | GameEvent::Restarted => {}
            }
        }
    }
}
