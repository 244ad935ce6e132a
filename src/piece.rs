//! Piece model: shape offsets around an anchor, per-cell fruit colours, random spawn.

use crate::collision;
use crate::grid::{BOARD_HEIGHT, BOARD_WIDTH, Fruit, Grid, Pos};
use rand::Rng;

/// Shape kinds (I, S, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    I,
    S,
    L,
}

impl ShapeKind {
    pub const ALL: [Self; 3] = [Self::I, Self::S, Self::L];

    /// 4 cells relative to the anchor; each (dx, dy).
    pub fn offsets(self) -> [Pos; 4] {
        match self {
            Self::I => [Pos::new(-2, 0), Pos::new(-1, 0), Pos::new(0, 0), Pos::new(1, 0)],
            Self::S => [Pos::new(-1, -1), Pos::new(0, -1), Pos::new(0, 0), Pos::new(1, 0)],
            Self::L => [Pos::new(-1, -1), Pos::new(-1, 0), Pos::new(0, 0), Pos::new(1, 0)],
        }
    }
}

/// Quarter turn counter-clockwise about the anchor.
#[inline]
pub fn rotate_offset(p: Pos) -> Pos {
    Pos::new(-p.y, p.x)
}

/// The falling piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: ShapeKind,
    pub anchor: Pos,
    pub offsets: [Pos; 4],
    pub colors: [Fruit; 4],
}

impl Piece {
    /// Piece in its base orientation. No bounds handling.
    pub fn new(kind: ShapeKind, anchor: Pos, colors: [Fruit; 4]) -> Self {
        Self {
            kind,
            anchor,
            offsets: kind.offsets(),
            colors,
        }
    }

    /// Absolute cell positions.
    pub fn cells(&self) -> [Pos; 4] {
        self.offsets.map(|o| self.anchor + o)
    }

    /// Absolute cell positions paired with their colours.
    pub fn colored_cells(&self) -> [(Pos, Fruit); 4] {
        let cells = self.cells();
        [0, 1, 2, 3].map(|i| (cells[i], self.colors[i]))
    }

    pub fn occupies(&self, pos: Pos) -> bool {
        self.cells().contains(&pos)
    }

    /// Offsets after `quarter_turns` counter-clockwise quarter turns.
    pub fn rotated_offsets(&self, quarter_turns: u32) -> [Pos; 4] {
        let mut offsets = self.offsets;
        for _ in 0..quarter_turns % 4 {
            offsets = offsets.map(rotate_offset);
        }
        offsets
    }

    /// Cyclic shift: each cell takes the next cell's colour, the last takes the first's.
    pub fn rotate_colors(&mut self) {
        self.colors.rotate_left(1);
    }
}

/// Creates a random piece at the top of the board.
///
/// The colour pair is two independent draws from the first `fruit_kinds` fruits, and each
/// cell draws from the pair on its own, so single-colour pieces happen. Returns the piece
/// and whether it fits; a piece that does not fit means the stack reached the top.
pub fn spawn(grid: &Grid, rng: &mut impl Rng, fruit_kinds: usize) -> (Piece, bool) {
    let kinds = fruit_kinds.clamp(1, Fruit::ALL.len());
    let kind = ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())];
    let column = rng.gen_range(0..BOARD_WIDTH as i32);
    let pair = [
        Fruit::ALL[rng.gen_range(0..kinds)],
        Fruit::ALL[rng.gen_range(0..kinds)],
    ];
    let colors = [0; 4].map(|_| pair[rng.gen_range(0..2)]);
    let mut piece = Piece::new(kind, Pos::new(column, BOARD_HEIGHT as i32 - 1), colors);

    match collision::nudge(grid, piece.anchor, &piece.offsets) {
        Some(anchor) => piece.anchor = anchor,
        None => {
            piece.anchor = collision::clamp_into_bounds(piece.anchor, &piece.offsets);
            return (piece, false);
        }
    }
    let turns = rng.gen_range(0..=4);
    collision::try_rotate(grid, &mut piece, turns);
    let fits = collision::fits(grid, &piece);
    (piece, fits)
}
