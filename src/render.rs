//! Plain text drawing of a maze

use itertools::Itertools;

use crate::grid::{Cell, Direction};
use crate::Maze;

const ENTRY: char = 'S';
const EXIT: char = 'E';
const BLOCKED: char = '#';

/// Draw `maze` with `+---+` boxes, three characters per cell.
///
/// Entry and exit are marked with `S` and `E`, blocked cells with `#`.
pub(crate) fn ascii(maze: &Maze) -> String {
    let (cols, rows) = maze.dimensions();
    let grid = maze.grid();

    let mut lines = Vec::with_capacity(rows * 2 + 1);
    lines.push(format!("+{}", "---+".repeat(cols)));

    for y in 0..rows {
        let cells = grid.row(y);
        let mut walls = String::from("|");
        let mut floor = String::from("+");
        for cell in cells {
            walls.push(' ');
            walls.push(marker(maze, cell));
            walls.push(' ');
            walls.push(if cell.has_wall(Direction::East) { '|' } else { ' ' });
            floor.push_str(if cell.has_wall(Direction::South) {
                "---+"
            } else {
                "   +"
            });
        }
        lines.push(walls);
        lines.push(floor);
    }
    lines.iter().join("\n") + "\n"
}

fn marker(maze: &Maze, cell: &Cell) -> char {
    if cell.pos() == maze.entry() {
        ENTRY
    } else if cell.pos() == maze.exit() {
        EXIT
    } else if cell.is_blocked() {
        BLOCKED
    } else {
        ' '
    }
}
