//! Game state: grid, falling piece, pending cascade work and the tick protocol that
//! drives them.

use crate::GameConfig;
use crate::cascade::{Cascade, CommitReport};
use crate::collision::{self, Direction};
use crate::grid::{Fruit, Grid, Pos};
use crate::piece::{self, Piece};
use crate::scheduler::{Scheduler, TickKind};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Quarter turns for a clockwise rotation (three counter-clockwise ones).
const CW_TURNS: u32 = 3;

/// Notifications for the front-end. Drained with `take_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    PieceLocked,
    /// Rows removed by a commit, numbered as they were when removed.
    RowsCleared(Vec<i32>),
    FruitsCleared(Vec<Pos>),
    GameOver,
    Restarted,
}

/// Everything the simulation owns. All mutation goes through tick dispatch or the
/// player operations below.
#[derive(Debug)]
pub struct Engine {
    config: GameConfig,
    grid: Grid,
    piece: Piece,
    cascade: Cascade,
    scheduler: Scheduler,
    rng: StdRng,
    /// Fast drop requested for the current piece.
    fast_drop: bool,
    game_over: bool,
    pub pieces_placed: u32,
    pub rows_cleared: u32,
    pub fruits_cleared: u32,
    events: Vec<GameEvent>,
}

impl Engine {
    pub fn new(config: &GameConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut state = Self {
            config: config.clone(),
            grid: Grid::new(),
            piece: Piece::new(piece::ShapeKind::I, Pos::default(), [Fruit::Grape; 4]),
            cascade: Cascade::new(),
            scheduler: Scheduler::new(),
            rng,
            fast_drop: false,
            game_over: false,
            pieces_placed: 0,
            rows_cleared: 0,
            fruits_cleared: 0,
            events: Vec::new(),
        };
        state.spawn_next();
        state.scheduler.schedule(TickKind::Create, state.config.drop_interval_ms);
        state
    }

    /// Starts from a prepared board and piece.
    #[cfg(test)]
    pub fn with_board(config: &GameConfig, grid: Grid, piece: Piece) -> Self {
        let mut state = Self::new(config);
        state.grid = grid;
        state.piece = piece;
        state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    /// The falling piece's cells and colours, for drawing.
    pub fn piece_cells(&self) -> [(Pos, Fruit); 4] {
        self.piece.colored_cells()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[cfg(test)]
    pub fn is_fast_dropping(&self) -> bool {
        self.fast_drop
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[cfg(test)]
    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    /// Takes and clears all pending events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances the clock by `elapsed_ms`, firing every tick that comes due.
    pub fn advance(&mut self, elapsed_ms: u64) {
        let until = self.scheduler.now() + elapsed_ms;
        while let Some(kind) = self.scheduler.pop_due(until) {
            self.fire(kind);
        }
        self.scheduler.settle_clock(until);
    }

    /// Runs one tick. The whole pipeline for that tick completes before returning.
    pub fn fire(&mut self, kind: TickKind) {
        if self.game_over {
            return;
        }
        match kind {
            TickKind::Create | TickKind::Tick => self.drop_tick(),
            TickKind::TickFast => self.fast_tick(),
            TickKind::ColumnCheck => self.column_check(),
        }
    }

    fn drop_tick(&mut self) {
        let interval = self.config.drop_interval_ms;
        if collision::try_fall(&self.grid, &mut self.piece) {
            self.scheduler.schedule(TickKind::Tick, interval);
        } else {
            self.lock_piece();
            if !self.game_over {
                self.scheduler.schedule(TickKind::Create, interval);
            }
        }
    }

    fn fast_tick(&mut self) {
        if !self.fast_drop {
            return;
        }
        if collision::try_fall(&self.grid, &mut self.piece) {
            self.scheduler
                .schedule(TickKind::TickFast, self.config.fast_interval_ms);
        } else {
            // landed: hand back to one normal drop tick
            self.scheduler
                .schedule(TickKind::Tick, self.config.drop_interval_ms);
        }
    }

    fn column_check(&mut self) {
        let report = self.cascade.settle_pass(&mut self.grid, Some(&self.piece));
        if !report.fruits_cleared.is_empty() {
            self.fruits_cleared += report.fruits_cleared.len() as u32;
            self.events.push(GameEvent::FruitsCleared(report.fruits_cleared));
        }
        self.scheduler
            .schedule(TickKind::ColumnCheck, self.config.drop_interval_ms);
    }

    /// Commit, clear, spawn.
    fn lock_piece(&mut self) {
        self.fast_drop = false;
        self.scheduler.cancel(TickKind::TickFast);

        let CommitReport {
            rows_cleared,
            fruits_cleared,
        } = self.cascade.commit(&mut self.grid, &self.piece);
        self.pieces_placed += 1;
        debug!("piece {} locked at {:?}", self.pieces_placed, self.piece.cells());
        self.events.push(GameEvent::PieceLocked);
        if !rows_cleared.is_empty() {
            self.rows_cleared += rows_cleared.len() as u32;
            self.events.push(GameEvent::RowsCleared(rows_cleared));
        }
        if !fruits_cleared.is_empty() {
            self.fruits_cleared += fruits_cleared.len() as u32;
            self.events.push(GameEvent::FruitsCleared(fruits_cleared));
        }
        // a check already pending keeps its deadline
        if !self.scheduler.is_pending(TickKind::ColumnCheck) {
            self.scheduler
                .schedule(TickKind::ColumnCheck, self.config.drop_interval_ms);
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let (piece, fits) = piece::spawn(&self.grid, &mut self.rng, self.config.fruit_kinds);
        self.piece = piece;
        if !fits {
            info!(
                "game over after {} pieces, {} rows, {} fruits ({} ticks coalesced)",
                self.pieces_placed,
                self.rows_cleared,
                self.fruits_cleared,
                self.scheduler.coalesced()
            );
            self.game_over = true;
            self.fast_drop = false;
            self.scheduler.clear();
            self.events.push(GameEvent::GameOver);
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(Direction::Right)
    }

    fn shift(&mut self, dir: Direction) -> bool {
        !self.game_over && collision::try_move(&self.grid, &mut self.piece, dir)
    }

    /// Counter-clockwise quarter turns; rejected whole when blocked.
    pub fn rotate(&mut self, quarter_turns: u32) -> bool {
        !self.game_over && collision::try_rotate(&self.grid, &mut self.piece, quarter_turns)
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.rotate(CW_TURNS)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.rotate(1)
    }

    pub fn rotate_colors(&mut self) {
        if !self.game_over {
            self.piece.rotate_colors();
        }
    }

    /// Starts fast descent right away. Ignored while one is already running.
    pub fn fast_drop(&mut self) -> bool {
        if self.game_over || self.fast_drop {
            return false;
        }
        self.fast_drop = true;
        self.fast_tick();
        true
    }

    pub fn restart(&mut self) {
        self.grid.reset();
        self.cascade.reset();
        self.scheduler.clear();
        self.fast_drop = false;
        self.game_over = false;
        self.pieces_placed = 0;
        self.rows_cleared = 0;
        self.fruits_cleared = 0;
        self.events.clear();
        self.spawn_next();
        self.scheduler
            .schedule(TickKind::Create, self.config.drop_interval_ms);
        info!("game restarted");
        self.events.push(GameEvent::Restarted);
    }
}
