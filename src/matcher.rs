//! Straight-line same-colour runs through a cell.
//!
//! Only horizontal and vertical lines count. An L- or T-shaped group of one colour is
//! two separate runs, never one region.

use crate::grid::{Cell, Grid, Pos};

/// Runs through an origin. Both start with the origin itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runs {
    pub horizontal: Vec<Pos>,
    pub vertical: Vec<Pos>,
}

const RIGHT: Pos = Pos::new(1, 0);
const LEFT: Pos = Pos::new(-1, 0);
const DOWN: Pos = Pos::new(0, -1);
const UP: Pos = Pos::new(0, 1);

/// Walk order: horizontal goes right then left, vertical goes down then up.
pub fn find_runs(grid: &Grid, origin: Pos) -> Runs {
    let mut horizontal = vec![origin];
    let mut vertical = vec![origin];
    walk(grid, origin, RIGHT, &mut horizontal);
    walk(grid, origin, LEFT, &mut horizontal);
    walk(grid, origin, DOWN, &mut vertical);
    walk(grid, origin, UP, &mut vertical);
    Runs {
        horizontal,
        vertical,
    }
}

fn walk(grid: &Grid, origin: Pos, step: Pos, out: &mut Vec<Pos>) {
    let Some(color) = grid.get(origin).and_then(Cell::color) else {
        return;
    };
    let mut p = origin + step;
    while Grid::in_bounds(p) && grid.color(p) == Some(color) {
        out.push(p);
        p = p + step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Fruit;

    #[test]
    fn horizontal_i_piece_runs() {
        let mut grid = Grid::new();
        for x in 3..7 {
            grid.set(Pos::new(x, 0), Fruit::Banana);
        }
        for x in 3..7 {
            let runs = find_runs(&grid, Pos::new(x, 0));
            assert_eq!(runs.horizontal.len(), 4);
            assert_eq!(runs.vertical.len(), 1);
            assert_eq!(runs.horizontal[0], Pos::new(x, 0));
        }
    }

    #[test]
    fn traversal_order_is_right_then_left() {
        let mut grid = Grid::new();
        for x in 1..5 {
            grid.set(Pos::new(x, 2), Fruit::Apple);
        }
        let runs = find_runs(&grid, Pos::new(2, 2));
        assert_eq!(
            runs.horizontal,
            vec![Pos::new(2, 2), Pos::new(3, 2), Pos::new(4, 2), Pos::new(1, 2)]
        );
    }

    #[test]
    fn vertical_order_is_down_then_up() {
        let mut grid = Grid::new();
        for y in 0..3 {
            grid.set(Pos::new(0, y), Fruit::Pear);
        }
        let runs = find_runs(&grid, Pos::new(0, 1));
        assert_eq!(runs.vertical, vec![Pos::new(0, 1), Pos::new(0, 0), Pos::new(0, 2)]);
        assert_eq!(runs.horizontal, vec![Pos::new(0, 1)]);
    }

    #[test]
    fn different_colour_stops_run() {
        let mut grid = Grid::new();
        grid.set(Pos::new(0, 0), Fruit::Grape);
        grid.set(Pos::new(1, 0), Fruit::Grape);
        grid.set(Pos::new(2, 0), Fruit::Orange);
        grid.set(Pos::new(3, 0), Fruit::Grape);
        let runs = find_runs(&grid, Pos::new(0, 0));
        assert_eq!(runs.horizontal.len(), 2);
    }

    #[test]
    fn l_shape_is_not_one_region() {
        let mut grid = Grid::new();
        grid.set(Pos::new(0, 0), Fruit::Grape);
        grid.set(Pos::new(1, 0), Fruit::Grape);
        grid.set(Pos::new(0, 1), Fruit::Grape);
        let runs = find_runs(&grid, Pos::new(1, 0));
        assert_eq!(runs.horizontal.len(), 2);
        assert_eq!(runs.vertical.len(), 1);
    }

    #[test]
    fn empty_origin_has_single_cell_runs() {
        let mut grid = Grid::new();
        grid.set(Pos::new(1, 0), Fruit::Grape);
        let runs = find_runs(&grid, Pos::new(0, 0));
        assert_eq!(runs.horizontal, vec![Pos::new(0, 0)]);
        assert_eq!(runs.vertical, vec![Pos::new(0, 0)]);
    }
}
