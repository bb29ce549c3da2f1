//! The "42" glyph drawn with blocked cells in the middle of the maze

use crate::grid::Point;

/// Smallest grid that can hold the glyph
pub const MIN_COLS: usize = 9;
pub const MIN_ROWS: usize = 7;

/// Offsets of the "4", relative to the glyph center
const FOUR: [(isize, isize); 7] = [
    (-1, 0),
    (-2, 0),
    (-3, 0),
    (-1, 1),
    (-1, 2),
    (-3, -1),
    (-3, -2),
];

/// Offsets of the "2", relative to the glyph center.
///
/// `(3, -2)` is listed twice; the output format depends on this exact list.
const TWO: [(isize, isize); 12] = [
    (1, 0),
    (2, 0),
    (3, 0),
    (1, 1),
    (1, 2),
    (3, -1),
    (3, -2),
    (1, -2),
    (2, -2),
    (3, -2),
    (2, 2),
    (3, 2),
];

/// Blocked glyph coordinates for a `cols` × `rows` grid
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockedZone {
    coords: Vec<Point>,
}

impl BlockedZone {
    /// Compute the glyph for the given grid size.
    ///
    /// The zone is empty when the grid is smaller than
    /// [`MIN_COLS`] × [`MIN_ROWS`]. Offsets falling outside the grid are
    /// dropped.
    ///
    /// # Examples
    /// ```
    /// use a_maze_ing::{BlockedZone, Point};
    ///
    /// assert!(BlockedZone::compute(8, 10).is_empty());
    ///
    /// let zone = BlockedZone::compute(20, 10);
    /// assert_eq!(zone.coordinates().len(), 19);
    /// assert!(zone.contains(Point::new(8, 4)));
    /// ```
    pub fn compute(cols: usize, rows: usize) -> Self {
        if cols < MIN_COLS || rows < MIN_ROWS {
            return Self::default();
        }
        let cx = center(cols);
        let cy = center(rows);

        let coords = FOUR
            .iter()
            .chain(TWO.iter())
            .filter_map(|(dx, dy)| {
                let x = cx.checked_add_signed(*dx)?;
                let y = cy.checked_add_signed(*dy)?;
                (x < cols && y < rows).then_some(Point::new(x, y))
            })
            .collect();
        Self { coords }
    }

    /// Glyph coordinates in glyph order, duplicates included
    pub fn coordinates(&self) -> &[Point] {
        &self.coords
    }

    pub fn contains(&self, point: Point) -> bool {
        self.coords.contains(&point)
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Number of distinct blocked cells
    pub fn distinct_count(&self) -> usize {
        let mut coords = self.coords.clone();
        coords.sort_unstable();
        coords.dedup();
        coords.len()
    }
}

fn center(len: usize) -> usize {
    if len % 2 == 0 {
        (len - 1) / 2
    } else {
        len / 2
    }
}

#[cfg(test)]
mod tests {
    use super::BlockedZone;
    use crate::grid::Point;

    #[test]
    fn too_small_grids_have_no_glyph() {
        for (cols, rows) in [(0, 0), (5, 5), (8, 7), (9, 6), (100, 6), (8, 100)] {
            assert!(BlockedZone::compute(cols, rows).is_empty(), "{cols}x{rows}");
        }
        assert!(!BlockedZone::compute(9, 7).is_empty());
    }

    #[test]
    fn glyph_for_default_size() {
        // cx = 19 / 2 = 9, cy = 9 / 2 = 4
        let zone = BlockedZone::compute(20, 10);
        let expected: Vec<Point> = [
            (8, 4),
            (7, 4),
            (6, 4),
            (8, 5),
            (8, 6),
            (6, 3),
            (6, 2),
            (10, 4),
            (11, 4),
            (12, 4),
            (10, 5),
            (10, 6),
            (12, 3),
            (12, 2),
            (10, 2),
            (11, 2),
            (12, 2),
            (11, 6),
            (12, 6),
        ]
        .into_iter()
        .map(|(x, y)| Point::new(x, y))
        .collect();
        assert_eq!(zone.coordinates(), expected.as_slice());
        assert_eq!(zone.distinct_count(), 18);
    }

    #[test]
    fn odd_sizes_use_the_middle_cell() {
        // cx = 4, cy = 3
        let zone = BlockedZone::compute(9, 7);
        assert!(zone.contains(Point::new(1, 1)));
        assert!(zone.contains(Point::new(7, 5)));
        assert!(!zone.contains(Point::new(4, 3)));
    }

    #[test]
    fn glyph_always_fits_inside_the_grid() {
        for cols in 9..40 {
            for rows in 7..30 {
                let zone = BlockedZone::compute(cols, rows);
                assert_eq!(zone.coordinates().len(), 19);
                assert!(zone
                    .coordinates()
                    .iter()
                    .all(|p| p.x < cols && p.y < rows));
                assert!(!zone.contains(Point::new(0, 0)));
                assert!(!zone.contains(Point::new(cols - 1, rows - 1)));
            }
        }
    }
}
