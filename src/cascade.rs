//! Clear and cascade: commit, full-row clears, three-of-a-colour clears, and the
//! step-by-step column settle that follows a fruit clear.

use crate::grid::{BOARD_WIDTH, Grid, Pos};
use crate::matcher::find_runs;
use crate::piece::Piece;
use log::debug;

/// Cells removed by one fruit clear. Longer runs lose only this many per clear.
pub const FRUIT_GROUP: usize = 3;

/// What a commit removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Cleared rows, as they were numbered when each was removed.
    pub rows_cleared: Vec<i32>,
    pub fruits_cleared: Vec<Pos>,
}

/// What one settle pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettleReport {
    pub fruits_cleared: Vec<Pos>,
    pub cells_moved: usize,
}

/// Pending gravity work left behind by fruit clears.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    /// Cleared positions whose columns still have to drop.
    holes: Vec<Pos>,
    /// Cells that landed on a supported column and get match-checked next pass.
    recheck: Vec<Pos>,
}

impl Cascade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.holes.clear();
        self.recheck.clear();
    }

    #[cfg(test)]
    pub fn holes(&self) -> &[Pos] {
        &self.holes
    }

    #[cfg(test)]
    pub fn pending_rechecks(&self) -> &[Pos] {
        &self.recheck
    }

    /// Nothing left for settle passes to do.
    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.holes.is_empty() && self.recheck.is_empty()
    }

    /// Writes the piece into the grid, then runs the row pass and the fruit pass.
    pub fn commit(&mut self, grid: &mut Grid, piece: &Piece) -> CommitReport {
        for (pos, fruit) in piece.colored_cells() {
            grid.set(pos, fruit);
        }
        let mut cells = piece.cells();
        cells.sort_by_key(|c| c.y);

        let mut report = CommitReport::default();
        // Removed rows by their pre-shift number; everything above each moved down by one.
        let mut removed_rows: Vec<i32> = Vec::new();
        let mut survivors: Vec<Pos> = Vec::with_capacity(4);
        for cell in cells {
            if removed_rows.contains(&cell.y) {
                continue;
            }
            let row_offset = removed_rows.iter().filter(|&&r| r < cell.y).count() as i32;
            let row = cell.y - row_offset;
            if grid.is_row_full(row) {
                self.clear_row(grid, row);
                report.rows_cleared.push(row);
                removed_rows.push(cell.y);
            } else {
                survivors.push(Pos::new(cell.x, row));
            }
        }

        // A horizontal run clears on the spot. Vertical runs only get looked at when no
        // cell matched horizontally and the last one fails too; then every committed
        // cell is re-checked.
        let last = survivors.len().saturating_sub(1);
        let mut matched = false;
        for (i, &cell) in survivors.iter().enumerate() {
            if find_runs(grid, cell).horizontal.len() >= FRUIT_GROUP {
                report.fruits_cleared.extend(self.clear_group(grid, cell));
                matched = true;
            } else if i == last && !matched {
                for &c in &survivors {
                    report.fruits_cleared.extend(self.clear_group(grid, c));
                }
            }
        }

        if !report.rows_cleared.is_empty() || !report.fruits_cleared.is_empty() {
            debug!(
                "commit cleared rows {:?} and {} fruits",
                report.rows_cleared,
                report.fruits_cleared.len()
            );
        }
        report
    }

    /// Clears `row` and drops every column above it by one, in a single upward pass.
    /// Pending holes and rechecks move with the cells.
    pub fn clear_row(&mut self, grid: &mut Grid, row: i32) {
        for x in 0..BOARD_WIDTH as i32 {
            let p = Pos::new(x, row);
            grid.clear_cell(p);
            grid.collapse_column(p, |_| false);
        }
        for list in [&mut self.holes, &mut self.recheck] {
            list.retain(|p| p.y != row);
            for p in list.iter_mut().filter(|p| p.y > row) {
                p.y -= 1;
            }
        }
    }

    /// Clears the fruit group through `origin`: the horizontal run when it has at least
    /// three cells, else the vertical run when that does. Only the first three cells in
    /// walk order go; they are recorded as holes. Returns the cleared cells.
    pub fn clear_group(&mut self, grid: &mut Grid, origin: Pos) -> Vec<Pos> {
        let runs = find_runs(grid, origin);
        let group = if runs.horizontal.len() >= FRUIT_GROUP {
            runs.horizontal
        } else {
            runs.vertical
        };
        if group.len() < FRUIT_GROUP {
            return Vec::new();
        }
        let removed: Vec<Pos> = group.into_iter().take(FRUIT_GROUP).collect();
        for &p in &removed {
            grid.clear_cell(p);
        }
        debug!("cleared fruit group {removed:?}");
        self.holes.extend_from_slice(&removed);
        removed
    }

    /// One settle step. Re-checks the cells queued last pass, then drops each column
    /// with a hole by one row, highest hole first and one hole per column. Cells landing
    /// on a supported column are queued for the next pass. `piece` cells are never
    /// filled.
    pub fn settle_pass(&mut self, grid: &mut Grid, piece: Option<&Piece>) -> SettleReport {
        let mut report = SettleReport::default();
        for pos in std::mem::take(&mut self.recheck) {
            report.fruits_cleared.extend(self.clear_group(grid, pos));
        }
        if self.holes.is_empty() {
            return report;
        }

        self.holes.sort_by(|a, b| b.y.cmp(&a.y));
        let holes = std::mem::take(&mut self.holes);
        let in_piece = |p: Pos| piece.is_some_and(|pc| pc.occupies(p));
        let mut column_done = [false; BOARD_WIDTH];
        for &hole in &holes {
            let column = &mut column_done[hole.x as usize];
            if *column {
                self.holes.push(hole);
                continue;
            }
            *column = true;
            if grid.is_occupied(hole) {
                // refilled since it was cleared
                continue;
            }
            if in_piece(hole) {
                self.holes.push(hole);
                continue;
            }
            let base = hole.below();
            let supported = !Grid::in_bounds(base) || grid.is_occupied(base) || holes.contains(&base);
            let filled = grid.collapse_column(hole, in_piece);
            report.cells_moved += filled.len();
            if supported {
                self.recheck.extend(filled);
            }
        }
        if report.cells_moved > 0 || !report.fruits_cleared.is_empty() {
            debug!(
                "settle moved {} cells, cleared {} fruits, {} holes left",
                report.cells_moved,
                report.fruits_cleared.len(),
                self.holes.len()
            );
        }
        report
    }
}
