//! Collision and bounds resolution for the falling piece.

use crate::grid::{BOARD_HEIGHT, BOARD_WIDTH, Grid, Pos};
use crate::piece::Piece;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> Pos {
        match self {
            Self::Left => Pos::new(-1, 0),
            Self::Right => Pos::new(1, 0),
        }
    }
}

#[inline]
fn is_free(grid: &Grid, pos: Pos) -> bool {
    Grid::in_bounds(pos) && !grid.is_occupied(pos)
}

/// Translates `anchor` by the smallest amount per axis that brings every cell in bounds.
pub fn clamp_into_bounds(anchor: Pos, offsets: &[Pos; 4]) -> Pos {
    let cells = offsets.map(|o| anchor + o);
    let min_x = cells.iter().map(|c| c.x).min().unwrap_or(0);
    let max_x = cells.iter().map(|c| c.x).max().unwrap_or(0);
    let min_y = cells.iter().map(|c| c.y).min().unwrap_or(0);
    let max_y = cells.iter().map(|c| c.y).max().unwrap_or(0);
    let dx = (-min_x).max(0) - (max_x - (BOARD_WIDTH as i32 - 1)).max(0);
    let dy = (-min_y).max(0) - (max_y - (BOARD_HEIGHT as i32 - 1)).max(0);
    anchor + Pos::new(dx, dy)
}

/// Spawn/rotation placement. Rejects when any in-bounds candidate cell is occupied;
/// otherwise returns the anchor nudged so all cells are in bounds, provided the nudged
/// cells are free too.
pub fn nudge(grid: &Grid, anchor: Pos, offsets: &[Pos; 4]) -> Option<Pos> {
    let blocked = offsets
        .iter()
        .map(|&o| anchor + o)
        .any(|p| Grid::in_bounds(p) && grid.is_occupied(p));
    if blocked {
        return None;
    }
    let nudged = clamp_into_bounds(anchor, offsets);
    offsets
        .iter()
        .all(|&o| is_free(grid, nudged + o))
        .then_some(nudged)
}

/// True if every cell is in bounds and unoccupied.
pub fn fits(grid: &Grid, piece: &Piece) -> bool {
    piece.cells().into_iter().all(|c| is_free(grid, c))
}

/// True iff every cell one row lower is in bounds and free. Row 0 never falls.
pub fn can_fall(grid: &Grid, piece: &Piece) -> bool {
    piece.cells().into_iter().all(|c| is_free(grid, c.below()))
}

/// Left/right move. No nudging: any out-of-bounds or occupied target rejects.
pub fn try_move(grid: &Grid, piece: &mut Piece, dir: Direction) -> bool {
    let delta = dir.delta();
    if piece.cells().into_iter().all(|c| is_free(grid, c + delta)) {
        piece.anchor = piece.anchor + delta;
        true
    } else {
        false
    }
}

/// One row down, same rules as `try_move`.
pub fn try_fall(grid: &Grid, piece: &mut Piece) -> bool {
    if can_fall(grid, piece) {
        piece.anchor = piece.anchor.below();
        true
    } else {
        false
    }
}

/// Rotates by `quarter_turns` counter-clockwise turns, nudging back into bounds.
/// All or nothing: on rejection the piece is unchanged.
pub fn try_rotate(grid: &Grid, piece: &mut Piece, quarter_turns: u32) -> bool {
    let offsets = piece.rotated_offsets(quarter_turns);
    match nudge(grid, piece.anchor, &offsets) {
        Some(anchor) => {
            piece.anchor = anchor;
            piece.offsets = offsets;
            true
        }
        None => false,
    }
}
