//! Generate rectilinear mazes and export them as hex wall codes
//!
//! A maze is carved from a fully walled grid into a spanning tree, either
//! with depth-first backtracking or with Wilson's algorithm. Grids of at
//! least 9×7 cells carry a "42" glyph of blocked cells in the middle that is
//! never carved. Imperfect mazes get extra openings after carving.
//!
//! # Examples
//! ## Reproducible maze
//! ```
//! use a_maze_ing::{Maze, MazeConfig};
//!
//! let config = MazeConfig::resolve([("WIDTH", "12"), ("HEIGHT", "8"), ("SEED", "42")]).config;
//! let maze = Maze::generate(config.clone()).unwrap();
//! let again = Maze::generate(config).unwrap();
//! assert_eq!(maze.to_hex(), again.to_hex());
//!
//! // One hex digit per cell, one line per row
//! assert_eq!(maze.to_hex().lines().count(), 8);
//! assert!(maze.to_hex().lines().all(|row| row.len() == 12));
//! ```
//!
//! ## Imperfect maze with Wilson's algorithm
//! ```
//! use a_maze_ing::{Maze, MazeConfig};
//!
//! let config = MazeConfig::resolve([
//!     ("PERFECT", "False"),
//!     ("ALGORITHM", "WILSON"),
//!     ("SEED", "7"),
//! ])
//! .config;
//! let maze = Maze::generate(config).unwrap();
//! let grid = maze.grid();
//! assert_eq!(
//!     grid.passage_count(),
//!     grid.valid_cell_count() - 1 + maze.extra_openings()
//! );
//! println!("{}", maze.render_ascii());
//! ```

pub mod blocked;
pub mod codec;
pub mod config;
pub mod error;
pub mod grid;
pub mod maze_generator;
mod render;

use std::fs;

use tracing::{debug, info};

pub use blocked::BlockedZone;
pub use config::{parse_config_text, Algorithm, ConfigKey, Diagnostic, MazeConfig, Resolution};
pub use error::{DecodeError, GenerationError, ParseAlgorithmError, UnknownKeyError};
pub use grid::{Cell, Direction, Grid, Point};
pub use maze_generator::MazeGenerator;

/// A generated maze together with the settings that produced it
#[derive(Debug, Clone)]
pub struct Maze {
    config: MazeConfig,
    blocked: BlockedZone,
    grid: Grid,
    extra_openings: usize,
}

impl Maze {
    /// Run the whole pipeline for `config`: lay out the blocked glyph, carve
    /// a spanning tree and, for imperfect mazes, open extra walls.
    ///
    /// The random generator is seeded from `config.seed()` right before
    /// carving, so equal configs with a seed give identical mazes.
    ///
    /// Fails only if the non-blocked cells are not one connected region.
    pub fn generate(config: MazeConfig) -> Result<Self, GenerationError> {
        let (cols, rows) = config.dimensions();
        let blocked = BlockedZone::compute(cols, rows);
        let mut grid = Grid::with_blocked(cols, rows, blocked.coordinates());

        debug!(
            cols,
            rows,
            algorithm = %config.algorithm(),
            seed = ?config.seed(),
            "generating maze"
        );
        let mut generator = MazeGenerator::new(config.seed());
        let extra_openings = generator.generate(&mut grid, &config)?;

        Ok(Self {
            config,
            blocked,
            grid,
            extra_openings,
        })
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn blocked(&self) -> &BlockedZone {
        &self.blocked
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        self.grid.cell_at(x, y)
    }

    /// Maze size as `(cols, rows)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dimensions()
    }

    pub fn entry(&self) -> Point {
        self.config.entry()
    }

    pub fn exit(&self) -> Point {
        self.config.exit()
    }

    /// Walls opened on top of the spanning tree, zero for perfect mazes
    pub fn extra_openings(&self) -> usize {
        self.extra_openings
    }

    /// Hex wall encoding, see [`codec`]
    pub fn to_hex(&self) -> String {
        codec::encode(&self.grid)
    }

    /// Write [`Self::to_hex`] to the configured output path.
    ///
    /// The maze itself stays usable if writing fails.
    pub fn save(&self) -> Result<(), GenerationError> {
        let path = self.config.output_path();
        fs::write(path, self.to_hex()).map_err(|source| GenerationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Maze written to {}", path.display());
        Ok(())
    }

    /// Box drawing of the maze for terminals
    pub fn render_ascii(&self) -> String {
        render::ascii(self)
    }
}
