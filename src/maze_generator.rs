//! Spanning tree carving and imperfection injection

use std::collections::HashMap;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::debug;

use crate::config::{Algorithm, MazeConfig};
use crate::error::GenerationError;
use crate::grid::{Direction, Grid, Point};

/// Share of valid cells that may get an extra opening in imperfect mazes
const IMPERFECTION_RATIO: f64 = 0.2;

/// Carves passages into a walled grid.
///
/// All randomness comes from a single generator, so a seeded generator
/// reproduces the same maze when its methods are called in the same order.
#[derive(Debug)]
pub struct MazeGenerator {
    random: StdRng,
}

/// Progress of the depth-first carver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DfsState {
    Carving,
    Backtracking,
    Done,
}

impl MazeGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            random: if let Some(state) = seed {
                StdRng::seed_from_u64(state)
            } else {
                StdRng::from_entropy()
            },
        }
    }

    /// Carve `grid` into a spanning tree rooted at `config.entry()`, then
    /// open extra walls if the maze is not perfect.
    ///
    /// Returns the number of extra walls opened.
    pub fn generate(
        &mut self,
        grid: &mut Grid,
        config: &MazeConfig,
    ) -> Result<usize, GenerationError> {
        let entry = config.entry();
        match config.algorithm() {
            Algorithm::Dfs => self.carve_dfs(grid, entry)?,
            Algorithm::Wilson => self.carve_wilson(grid, entry)?,
        }
        if config.is_perfect() {
            Ok(0)
        } else {
            Ok(self.add_imperfections(grid))
        }
    }

    /// Iterative depth-first backtracking
    pub fn carve_dfs(&mut self, grid: &mut Grid, entry: Point) -> Result<(), GenerationError> {
        check_structure(grid, entry)?;
        debug!(?entry, "carving with depth-first backtracking");

        let mut remaining = grid.valid_cell_count() - 1;
        let mut stack = Vec::new();
        let mut current = entry;
        grid.mark_visited(current);

        let mut state = DfsState::Carving;
        while state != DfsState::Done {
            if remaining == 0 {
                state = DfsState::Done;
                continue;
            }
            let candidates: Vec<(Direction, Point)> = grid
                .free_neighbors(current)
                .filter(|(_, p)| !grid.is_visited(*p))
                .collect();

            if let Some(&(direction, next)) = candidates.choose(&mut self.random) {
                grid.open_wall(current, direction);
                stack.push(current);
                current = next;
                grid.mark_visited(current);
                remaining -= 1;
                state = DfsState::Carving;
            } else if let Some(previous) = stack.pop() {
                current = previous;
                state = DfsState::Backtracking;
            } else {
                state = DfsState::Done;
            }
        }
        debug!(unvisited = remaining, "depth-first carving finished");
        Ok(())
    }

    /// Wilson's algorithm: loop-erased random walks joined onto a tree that
    /// starts as the single entry cell. Produces a uniform spanning tree.
    pub fn carve_wilson(&mut self, grid: &mut Grid, entry: Point) -> Result<(), GenerationError> {
        check_structure(grid, entry)?;
        debug!(?entry, "carving with Wilson's algorithm");

        grid.mark_visited(entry);
        let mut unvisited =
            UnvisitedCells::new(grid.valid_points().into_iter().filter(|p| *p != entry));
        let mut walks = 0usize;

        while !unvisited.is_empty() {
            let start = unvisited.get(self.random.gen_range(0..unvisited.len()));

            // Later visits overwrite the exit direction, erasing loops
            let mut exits: HashMap<Point, Direction> = HashMap::new();
            let mut current = start;
            while !grid.is_visited(current) {
                let neighbors: Vec<(Direction, Point)> = grid.free_neighbors(current).collect();
                let &(direction, next) = neighbors
                    .choose(&mut self.random)
                    .ok_or(GenerationError::EnclosedCell(current))?;
                exits.insert(current, direction);
                current = next;
            }

            let mut current = start;
            while !grid.is_visited(current) {
                let Some(&direction) = exits.get(&current) else {
                    break;
                };
                grid.mark_visited(current);
                unvisited.remove(current);
                grid.open_wall(current, direction);
                match grid.neighbor(current, direction) {
                    Some(next) => current = next,
                    None => break,
                }
            }

            walks += 1;
        }
        debug!(walks, "Wilson carving finished");
        Ok(())
    }

    /// Open up to `floor(0.2 × valid cells)` extra walls between non-blocked
    /// cells, introducing loops. Returns how many were opened.
    pub fn add_imperfections(&mut self, grid: &mut Grid) -> usize {
        let max_removable = (grid.valid_cell_count() as f64 * IMPERFECTION_RATIO).floor() as usize;
        let mut cells = grid.valid_points();
        cells.shuffle(&mut self.random);

        let mut removed = 0;
        for cell in cells {
            if removed >= max_removable {
                break;
            }
            let walled: Vec<Direction> = grid
                .free_neighbors(cell)
                .filter(|(direction, _)| grid.has_wall(cell, *direction))
                .map(|(direction, _)| direction)
                .collect();
            if let Some(&direction) = walled.choose(&mut self.random) {
                grid.open_wall(cell, direction);
                removed += 1;
            }
        }
        debug!(removed, max_removable, "added imperfections");
        removed
    }
}

/// Cells not yet joined to the tree, with constant time removal.
///
/// Removal swaps the last cell into the freed slot, so the order only
/// depends on the sequence of removals.
#[derive(Debug, Default)]
struct UnvisitedCells {
    cells: Vec<Point>,
    slots: HashMap<Point, usize>,
}

impl UnvisitedCells {
    fn new(points: impl IntoIterator<Item = Point>) -> Self {
        let cells: Vec<Point> = points.into_iter().collect();
        let slots = cells.iter().enumerate().map(|(idx, p)| (*p, idx)).collect();
        Self { cells, slots }
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn get(&self, idx: usize) -> Point {
        self.cells[idx]
    }

    fn remove(&mut self, point: Point) -> bool {
        let Some(idx) = self.slots.remove(&point) else {
            return false;
        };
        self.cells.swap_remove(idx);
        if let Some(&moved) = self.cells.get(idx) {
            self.slots.insert(moved, idx);
        }
        true
    }
}

/// Reject grids in which the non-blocked cells do not form one connected
/// region around `entry`, before any random draw is made.
fn check_structure(grid: &Grid, entry: Point) -> Result<(), GenerationError> {
    let valid = grid.valid_points();
    if valid.len() > 1 {
        if let Some(enclosed) = valid
            .iter()
            .find(|p| grid.free_neighbors(**p).next().is_none())
        {
            return Err(GenerationError::EnclosedCell(*enclosed));
        }
    }
    let reachable = grid.region_size(entry);
    if reachable == 0 {
        return Err(GenerationError::EnclosedCell(entry));
    }
    if reachable < valid.len() {
        return Err(GenerationError::Disconnected {
            entry,
            unreachable: valid.len() - reachable,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MazeGenerator, UnvisitedCells};
    use crate::blocked::BlockedZone;
    use crate::codec;
    use crate::config::MazeConfig;
    use crate::error::GenerationError;
    use crate::grid::{Direction, Grid, Point};

    type Carve = fn(&mut MazeGenerator, &mut Grid, Point) -> Result<(), GenerationError>;

    const CARVERS: [Carve; 2] = [MazeGenerator::carve_dfs, MazeGenerator::carve_wilson];

    fn glyph_grid(cols: usize, rows: usize) -> Grid {
        Grid::with_blocked(cols, rows, BlockedZone::compute(cols, rows).coordinates())
    }

    fn assert_spanning_tree(grid: &Grid, entry: Point) {
        let valid = grid.valid_cell_count();
        assert_eq!(grid.reachable_from(entry), valid);
        assert_eq!(grid.passage_count(), valid - 1);
        assert!(grid.cells().filter(|c| !c.is_blocked()).all(|c| c.is_visited()));
    }

    fn assert_blocked_untouched(grid: &Grid) {
        for cell in grid.cells().filter(|c| c.is_blocked()) {
            assert_eq!(cell.walls(), 0b1111, "blocked cell {} was carved", cell.pos());
        }
    }

    #[test]
    fn dfs_spans_every_valid_cell() {
        for (cols, rows, seed) in [(20, 10, 42), (9, 7, 1), (5, 5, 2), (1, 8, 3), (31, 17, 4)] {
            let mut grid = glyph_grid(cols, rows);
            MazeGenerator::new(Some(seed))
                .carve_dfs(&mut grid, Point::new(0, 0))
                .unwrap();
            assert_spanning_tree(&grid, Point::new(0, 0));
            assert_blocked_untouched(&grid);
        }
    }

    #[test]
    fn wilson_spans_every_valid_cell() {
        for (cols, rows, seed) in [(20, 10, 42), (9, 7, 1), (5, 5, 2), (8, 1, 3), (31, 17, 4)] {
            let mut grid = glyph_grid(cols, rows);
            let entry = Point::new(cols / 3, rows - 1);
            MazeGenerator::new(Some(seed))
                .carve_wilson(&mut grid, entry)
                .unwrap();
            assert_spanning_tree(&grid, entry);
            assert_blocked_untouched(&grid);
        }
    }

    #[test]
    fn same_seed_same_maze() {
        for carve in CARVERS {
            let mut first = glyph_grid(20, 10);
            let mut second = glyph_grid(20, 10);
            carve(&mut MazeGenerator::new(Some(99)), &mut first, Point::new(0, 0)).unwrap();
            carve(&mut MazeGenerator::new(Some(99)), &mut second, Point::new(0, 0)).unwrap();
            assert_eq!(codec::encode(&first), codec::encode(&second));
        }
    }

    #[test]
    fn imperfections_are_bounded() {
        let mut grid = glyph_grid(20, 10);
        let mut generator = MazeGenerator::new(Some(5));
        generator.carve_dfs(&mut grid, Point::new(0, 0)).unwrap();
        let tree_passages = grid.passage_count();

        let removed = generator.add_imperfections(&mut grid);
        // 200 cells, 18 of them blocked
        assert_eq!(removed, 182 / 5);
        assert_eq!(grid.passage_count(), tree_passages + removed);
        assert_blocked_untouched(&grid);
    }

    #[test]
    fn imperfections_stop_when_nothing_is_left() {
        // Every inner wall of a corridor is open once carved
        let mut grid = Grid::new(5, 1);
        let mut generator = MazeGenerator::new(Some(0));
        generator.carve_dfs(&mut grid, Point::new(0, 0)).unwrap();
        assert_eq!(generator.add_imperfections(&mut grid), 0);
    }

    #[test]
    fn generate_respects_perfect_flag() {
        let config = MazeConfig::resolve([("PERFECT", "false"), ("SEED", "11")]).config;
        let mut grid = glyph_grid(20, 10);
        let extra = MazeGenerator::new(config.seed())
            .generate(&mut grid, &config)
            .unwrap();
        assert!(extra > 0);
        assert_eq!(grid.passage_count(), grid.valid_cell_count() - 1 + extra);
    }

    #[test]
    fn enclosed_cell_is_fatal() {
        // (0, 0) is walled in by blocked cells on both in-bounds sides
        let blocked = [Point::new(1, 0), Point::new(0, 1)];
        for carve in CARVERS {
            let mut grid = Grid::with_blocked(4, 4, &blocked);
            let mut generator = MazeGenerator::new(Some(1));
            let err = carve(&mut generator, &mut grid, Point::new(3, 3)).unwrap_err();
            assert!(matches!(err, GenerationError::EnclosedCell(p) if p == Point::new(0, 0)));
        }
    }

    #[test]
    fn disconnected_region_is_fatal() {
        // A full blocked column splits the grid in two
        let blocked: Vec<Point> = (0..4).map(|y| Point::new(2, y)).collect();
        for carve in CARVERS {
            let mut grid = Grid::with_blocked(5, 4, &blocked);
            let mut generator = MazeGenerator::new(Some(1));
            let err = carve(&mut generator, &mut grid, Point::new(0, 0)).unwrap_err();
            assert!(matches!(
                err,
                GenerationError::Disconnected { unreachable: 8, .. }
            ));
            assert_eq!(grid.passage_count(), 0);
        }
    }

    #[test]
    fn single_cell_grid_needs_no_carving() {
        let mut grid = Grid::new(1, 1);
        MazeGenerator::new(Some(0))
            .carve_wilson(&mut grid, Point::new(0, 0))
            .unwrap();
        assert!(grid.cell_at(0, 0).unwrap().has_wall(Direction::East));
    }

    #[test]
    fn unvisited_cells_remove_in_place() {
        let points: Vec<Point> = (0..4).map(|x| Point::new(x, 0)).collect();
        let mut unvisited = UnvisitedCells::new(points.iter().copied());
        assert_eq!(unvisited.len(), 4);

        assert!(unvisited.remove(Point::new(1, 0)));
        assert!(!unvisited.remove(Point::new(1, 0)));
        // Last cell fills the hole
        assert_eq!(unvisited.get(1), Point::new(3, 0));

        assert!(unvisited.remove(Point::new(3, 0)));
        assert!(unvisited.remove(Point::new(2, 0)));
        assert_eq!(unvisited.len(), 1);
        assert_eq!(unvisited.get(0), Point::new(0, 0));
        assert!(unvisited.remove(Point::new(0, 0)));
        assert!(unvisited.is_empty());
    }

    #[test]
    fn wilson_handles_large_grids() {
        let mut grid = glyph_grid(150, 120);
        MazeGenerator::new(Some(3))
            .carve_wilson(&mut grid, Point::new(0, 0))
            .unwrap();
        assert_spanning_tree(&grid, Point::new(0, 0));
    }
}
