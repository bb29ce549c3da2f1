//! Hex wall encoding
//!
//! Every cell becomes one uppercase hex digit whose bits are, from most to
//! least significant, the West, South, East and North walls (`1` = closed).
//! Rows are written top to bottom, each terminated by a newline.
//!
//! ```
//! use a_maze_ing::{codec, Direction, Grid, Point};
//!
//! let mut grid = Grid::new(2, 1);
//! grid.open_wall(Point::new(0, 0), Direction::East);
//! assert_eq!(codec::encode(&grid), "D7\n");
//!
//! let decoded = codec::decode("D7\n").unwrap();
//! assert_eq!(decoded, grid);
//! ```

use itertools::Itertools;

use crate::error::DecodeError;
use crate::grid::{Cell, Grid};

/// Hex digit of a single cell
pub fn encode_cell(cell: &Cell) -> char {
    char::from_digit(u32::from(cell.walls()), 16)
        .map_or('F', |c| c.to_ascii_uppercase())
}

/// Encode the whole grid, trailing newline included
pub fn encode(grid: &Grid) -> String {
    let (_, rows) = grid.dimensions();
    let mut text = (0..rows)
        .map(|y| grid.row(y).iter().map(encode_cell).collect::<String>())
        .join("\n");
    if rows > 0 {
        text.push('\n');
    }
    text
}

/// Parse hex maze text back into a grid.
///
/// Blank trailing lines are ignored and both upper and lower case digits are
/// accepted. Blocked and visited flags are not part of the format and come
/// back cleared.
pub fn decode(text: &str) -> Result<Grid, DecodeError> {
    let mut lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let cols = lines.first().map_or(0, |line| line.chars().count());
    if cols == 0 {
        return Err(DecodeError::Empty);
    }

    let mut walls = Vec::with_capacity(cols * lines.len());
    for (y, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != cols {
            return Err(DecodeError::RaggedRow {
                line: y + 1,
                found,
                expected: cols,
            });
        }
        for (x, ch) in line.chars().enumerate() {
            let nibble = ch.to_digit(16).ok_or(DecodeError::InvalidDigit {
                ch,
                line: y + 1,
                column: x + 1,
            })?;
            walls.push(nibble as u8);
        }
    }

    Grid::from_walls(cols, lines.len(), walls).ok_or(DecodeError::Empty)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, encode_cell};
    use crate::error::DecodeError;
    use crate::grid::{Direction, Grid, Point};

    #[test]
    fn closed_cell_is_f() {
        let grid = Grid::new(3, 2);
        assert_eq!(encode(&grid), "FFF\nFFF\n");
    }

    #[test]
    fn bit_order_is_west_south_east_north() {
        let mut grid = Grid::new(3, 3);
        let center = Point::new(1, 1);

        grid.open_wall(center, Direction::North);
        assert_eq!(encode_cell(grid.cell(center).unwrap()), 'E');
        grid.open_wall(center, Direction::East);
        assert_eq!(encode_cell(grid.cell(center).unwrap()), 'C');
        grid.open_wall(center, Direction::South);
        assert_eq!(encode_cell(grid.cell(center).unwrap()), '8');
        grid.open_wall(center, Direction::West);
        assert_eq!(encode_cell(grid.cell(center).unwrap()), '0');

        // Neighbors lost the mirrored wall
        assert_eq!(encode(&grid), "FBF\nD07\nFEF\n");
    }

    #[test]
    fn decode_restores_walls() {
        let grid = decode("9515\nAC3A\n").unwrap();
        assert_eq!(grid.dimensions(), (4, 2));
        let cell = grid.cell_at(0, 0).unwrap();
        assert!(cell.has_wall(Direction::West));
        assert!(cell.has_wall(Direction::North));
        assert!(!cell.has_wall(Direction::South));
        assert!(!cell.has_wall(Direction::East));
        assert_eq!(encode(&grid), "9515\nAC3A\n");
    }

    #[test]
    fn decode_accepts_lowercase_and_missing_newline() {
        let grid = decode("fa\n5f").unwrap();
        assert_eq!(encode(&grid), "FA\n5F\n");
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert_eq!(decode("\n\n"), Err(DecodeError::Empty));
        assert_eq!(
            decode("FF\nFG\n"),
            Err(DecodeError::InvalidDigit {
                ch: 'G',
                line: 2,
                column: 2
            })
        );
        assert_eq!(
            decode("FFF\nFF\n"),
            Err(DecodeError::RaggedRow {
                line: 2,
                found: 2,
                expected: 3
            })
        );
    }
}
