//! Grid store: fixed 10×20 playfield of fruit cells. Origin is bottom-left, y grows upward.

use std::ops::Add;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// Fruit colours, in palette order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fruit {
    Grape,
    Apple,
    Banana,
    Pear,
    Orange,
}

impl Fruit {
    pub const ALL: [Self; 5] = [Self::Grape, Self::Apple, Self::Banana, Self::Pear, Self::Orange];

    /// Index into the theme's fruit palette.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Integer grid coordinate (also used for piece offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// One row lower.
    pub const fn below(self) -> Self {
        Self::new(self.x, self.y - 1)
    }

    /// One row higher.
    pub const fn above(self) -> Self {
        Self::new(self.x, self.y + 1)
    }
}

impl Add for Pos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Single cell: empty, or occupied by a fruit of one colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Fruit(Fruit),
}

impl Cell {
    #[inline]
    pub fn is_occupied(self) -> bool {
        matches!(self, Self::Fruit(_))
    }

    /// Colour of the cell; `None` is the free colour.
    #[inline]
    pub fn color(self) -> Option<Fruit> {
        match self {
            Self::Empty => None,
            Self::Fruit(f) => Some(f),
        }
    }
}

/// Playfield. cells[y * BOARD_WIDTH + x], row 0 is the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::Empty; BOARD_WIDTH * BOARD_HEIGHT],
        }
    }

    #[inline]
    pub fn in_bounds(pos: Pos) -> bool {
        pos.x >= 0 && pos.x < BOARD_WIDTH as i32 && pos.y >= 0 && pos.y < BOARD_HEIGHT as i32
    }

    /// Panics when `pos` is out of bounds; callers check `in_bounds` first.
    #[inline]
    fn index(pos: Pos) -> usize {
        assert!(Self::in_bounds(pos), "cell {pos:?} is outside the board");
        pos.y as usize * BOARD_WIDTH + pos.x as usize
    }

    /// Bounds-tolerant read.
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        Self::in_bounds(pos).then(|| self.cells[Self::index(pos)])
    }

    #[inline]
    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.cells[Self::index(pos)].is_occupied()
    }

    #[inline]
    pub fn color(&self, pos: Pos) -> Option<Fruit> {
        self.cells[Self::index(pos)].color()
    }

    /// Occupy `pos` with `fruit`.
    #[inline]
    pub fn set(&mut self, pos: Pos, fruit: Fruit) {
        self.cells[Self::index(pos)] = Cell::Fruit(fruit);
    }

    #[inline]
    pub fn clear_cell(&mut self, pos: Pos) {
        self.cells[Self::index(pos)] = Cell::Empty;
    }

    /// Moves the contents of `from` into `to` and frees `from`.
    pub fn move_cell(&mut self, from: Pos, to: Pos) {
        let cell = self.cells[Self::index(from)];
        self.cells[Self::index(to)] = cell;
        self.clear_cell(from);
    }

    pub fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
    }

    pub fn is_row_full(&self, y: i32) -> bool {
        (0..BOARD_WIDTH as i32).all(|x| self.is_occupied(Pos::new(x, y)))
    }

    /// Shifts every occupied cell above `hole` in its column down by one row, bottom to top.
    /// `hole` must be empty. Stops early at the first position `blocked` returns true for.
    /// Returns the positions that received a cell.
    pub fn collapse_column(&mut self, hole: Pos, mut blocked: impl FnMut(Pos) -> bool) -> Vec<Pos> {
        let mut filled = Vec::new();
        for y in hole.y..BOARD_HEIGHT as i32 - 1 {
            let to = Pos::new(hole.x, y);
            if blocked(to) {
                break;
            }
            let from = to.above();
            if self.is_occupied(from) {
                self.move_cell(from, to);
                filled.push(to);
            }
        }
        filled
    }

    #[cfg(test)]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Rows from the top of the board down, as the renderer draws them.
    pub fn rows_top_down(&self) -> impl Iterator<Item = (i32, &[Cell])> {
        self.cells
            .chunks(BOARD_WIDTH)
            .enumerate()
            .rev()
            .map(|(y, row)| (y as i32, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new();
        assert_eq!(grid.occupied_count(), 0);
        assert_eq!(grid.color(Pos::new(3, 7)), None);
    }

    #[test]
    fn clear_cell_frees_colour() {
        let mut grid = Grid::new();
        let p = Pos::new(4, 0);
        grid.set(p, Fruit::Pear);
        assert!(grid.is_occupied(p));
        assert_eq!(grid.color(p), Some(Fruit::Pear));
        grid.clear_cell(p);
        assert!(!grid.is_occupied(p));
        assert_eq!(grid.color(p), None);
    }

    #[test]
    fn get_tolerates_out_of_bounds() {
        let grid = Grid::new();
        assert_eq!(grid.get(Pos::new(-1, 0)), None);
        assert_eq!(grid.get(Pos::new(0, BOARD_HEIGHT as i32)), None);
        assert_eq!(grid.get(Pos::new(0, 0)), Some(Cell::Empty));
    }

    #[test]
    #[should_panic(expected = "outside the board")]
    fn out_of_bounds_access_panics() {
        let grid = Grid::new();
        let _ = grid.is_occupied(Pos::new(BOARD_WIDTH as i32, 0));
    }

    #[test]
    fn reset_clears_everything() {
        let mut grid = Grid::new();
        grid.set(Pos::new(0, 0), Fruit::Apple);
        grid.set(Pos::new(9, 19), Fruit::Grape);
        grid.reset();
        assert_eq!(grid, Grid::new());
    }

    #[test]
    fn collapse_column_shifts_stack_over_gap() {
        let mut grid = Grid::new();
        // column 2: y=1 apple, y=2 empty, y=3 banana
        grid.set(Pos::new(2, 1), Fruit::Apple);
        grid.set(Pos::new(2, 3), Fruit::Banana);
        let filled = grid.collapse_column(Pos::new(2, 0), |_| false);
        assert_eq!(filled, vec![Pos::new(2, 0), Pos::new(2, 2)]);
        assert_eq!(grid.color(Pos::new(2, 0)), Some(Fruit::Apple));
        assert_eq!(grid.color(Pos::new(2, 1)), None);
        assert_eq!(grid.color(Pos::new(2, 2)), Some(Fruit::Banana));
        assert_eq!(grid.color(Pos::new(2, 3)), None);
    }

    #[test]
    fn rows_top_down_starts_at_top() {
        let mut grid = Grid::new();
        grid.set(Pos::new(0, 0), Fruit::Orange);
        let rows: Vec<_> = grid.rows_top_down().collect();
        assert_eq!(rows.len(), BOARD_HEIGHT);
        assert_eq!(rows[0].0, BOARD_HEIGHT as i32 - 1);
        assert_eq!(rows.last().map(|(y, r)| (*y, r[0])), Some((0, Cell::Fruit(Fruit::Orange))));
    }
}
