//! Cell and grid model

use std::collections::VecDeque;
use std::fmt;

/// Location in the maze, `x` is the column and `y` the row
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four sides of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Neighbor lookup order. Random choices index into lists built in this
    /// order, so changing it changes every seeded maze.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Wall bit in the encoded nibble: West is the most significant bit,
    /// then South, East, and North as the least significant.
    pub const fn bit(self) -> u8 {
        match self {
            Direction::North => 0b0001,
            Direction::East => 0b0010,
            Direction::South => 0b0100,
            Direction::West => 0b1000,
        }
    }

    fn step(self, from: Point) -> Option<Point> {
        let Point { x, y } = from;
        match self {
            Direction::North => y.checked_sub(1).map(|y| Point::new(x, y)),
            Direction::South => Some(Point::new(x, y + 1)),
            Direction::East => Some(Point::new(x + 1, y)),
            Direction::West => x.checked_sub(1).map(|x| Point::new(x, y)),
        }
    }
}

/// Single grid unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pos: Point,
    walls: u8,
    blocked: bool,
    visited: bool,
}

impl Cell {
    pub const ALL_WALLS: u8 = 0b1111;

    fn new(pos: Point) -> Self {
        Self {
            pos,
            walls: Self::ALL_WALLS,
            blocked: false,
            visited: false,
        }
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Wall nibble, `1` bits are closed walls
    pub fn walls(&self) -> u8 {
        self.walls
    }

    pub fn has_wall(&self, direction: Direction) -> bool {
        self.walls & direction.bit() != 0
    }

    /// Blocked cells belong to the decorative glyph and are never carved
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Whether the cell has joined the spanning tree
    pub fn is_visited(&self) -> bool {
        self.visited
    }
}

/// Rectangular grid of cells, stored row by row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a fully walled grid with no blocked cells
    pub fn new(cols: usize, rows: usize) -> Self {
        let cells = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| Cell::new(Point::new(x, y))))
            .collect();
        Self { cols, rows, cells }
    }

    /// Create a fully walled grid and block the given cells.
    ///
    /// Points outside the grid are ignored.
    pub fn with_blocked<'a, I>(cols: usize, rows: usize, blocked: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut grid = Self::new(cols, rows);
        for point in blocked {
            if let Some(idx) = grid.index(*point) {
                grid.cells[idx].blocked = true;
            }
        }
        grid
    }

    /// Rebuild a grid from per-cell wall nibbles in row-major order.
    ///
    /// Returns `None` if the number of nibbles does not match the size.
    pub(crate) fn from_walls(cols: usize, rows: usize, walls: Vec<u8>) -> Option<Self> {
        if walls.len() != cols * rows {
            return None;
        }
        let mut grid = Self::new(cols, rows);
        for (cell, nibble) in grid.cells.iter_mut().zip(walls) {
            cell.walls = nibble & Cell::ALL_WALLS;
        }
        Some(grid)
    }

    /// Grid size as `(cols, rows)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.cols && point.y < self.rows
    }

    fn index(&self, point: Point) -> Option<usize> {
        self.contains(point)
            .then(|| point.y * self.cols + point.x)
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        self.index(Point::new(x, y)).map(|idx| &self.cells[idx])
    }

    pub fn cell(&self, point: Point) -> Option<&Cell> {
        self.index(point).map(|idx| &self.cells[idx])
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Cells of row `y`, left to right
    pub fn row(&self, y: usize) -> &[Cell] {
        let start = (y * self.cols).min(self.cells.len());
        let end = (start + self.cols).min(self.cells.len());
        &self.cells[start..end]
    }

    pub fn is_blocked(&self, point: Point) -> bool {
        self.cell(point).is_some_and(Cell::is_blocked)
    }

    pub fn is_visited(&self, point: Point) -> bool {
        self.cell(point).is_some_and(Cell::is_visited)
    }

    pub(crate) fn mark_visited(&mut self, point: Point) {
        if let Some(idx) = self.index(point) {
            self.cells[idx].visited = true;
        }
    }

    /// In-bounds neighbor of `point` in `direction`, blocked or not
    pub fn neighbor(&self, point: Point, direction: Direction) -> Option<Point> {
        direction.step(point).filter(|p| self.contains(*p))
    }

    /// Non-blocked in-bounds neighbors of `point`, in [`Direction::ALL`] order
    pub fn free_neighbors(&self, point: Point) -> impl Iterator<Item = (Direction, Point)> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            self.neighbor(point, direction)
                .filter(|p| !self.is_blocked(*p))
                .map(|p| (direction, p))
        })
    }

    /// Whether `point` has its wall in `direction` closed. Out-of-bounds
    /// points report `true`.
    pub fn has_wall(&self, point: Point, direction: Direction) -> bool {
        self.cell(point).map_or(true, |c| c.has_wall(direction))
    }

    /// Open the wall between `point` and its neighbor in `direction` on both
    /// sides. Returns `false` and changes nothing if the neighbor is outside
    /// the grid.
    pub fn open_wall(&mut self, point: Point, direction: Direction) -> bool {
        let (Some(here), Some(there)) = (
            self.index(point),
            self.neighbor(point, direction).and_then(|p| self.index(p)),
        ) else {
            return false;
        };
        self.cells[here].walls &= !direction.bit();
        self.cells[there].walls &= !direction.opposite().bit();
        true
    }

    /// Number of non-blocked cells
    pub fn valid_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.blocked).count()
    }

    /// Coordinates of all non-blocked cells in row-major order
    pub fn valid_points(&self) -> Vec<Point> {
        self.cells
            .iter()
            .filter(|c| !c.blocked)
            .map(Cell::pos)
            .collect()
    }

    /// Number of open walls between adjacent cells, each pair counted once
    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| {
                [Direction::East, Direction::South]
                    .into_iter()
                    .filter(|d| !c.has_wall(*d) && self.neighbor(c.pos, *d).is_some())
                    .count()
            })
            .sum()
    }

    /// Number of cells reachable from `start` through open walls, `start`
    /// included
    pub fn reachable_from(&self, start: Point) -> usize {
        self.flood(start, |grid, from, direction, _| !grid.has_wall(from, direction))
    }

    /// Number of non-blocked cells reachable from `start` when walls are
    /// ignored
    pub(crate) fn region_size(&self, start: Point) -> usize {
        if self.is_blocked(start) {
            return 0;
        }
        self.flood(start, |grid, _, _, to| !grid.is_blocked(to))
    }

    fn flood<F>(&self, start: Point, passable: F) -> usize
    where
        F: Fn(&Self, Point, Direction, Point) -> bool,
    {
        let Some(start_idx) = self.index(start) else {
            return 0;
        };
        let mut seen = vec![false; self.cells.len()];
        seen[start_idx] = true;
        let mut queue = VecDeque::from([start]);
        let mut count = 0;
        while let Some(current) = queue.pop_front() {
            count += 1;
            for direction in Direction::ALL {
                let Some(next) = self.neighbor(current, direction) else {
                    continue;
                };
                let idx = next.y * self.cols + next.x;
                if !seen[idx] && passable(self, current, direction, next) {
                    seen[idx] = true;
                    queue.push_back(next);
                }
            }
        }
        count
    }
}
