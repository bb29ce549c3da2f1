//! Error types

use std::io;
use std::path::PathBuf;

use crate::grid::Point;

/// Failure to produce or persist a maze
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// A non-blocked cell has no non-blocked neighbor, so no passage can
    /// ever reach it.
    #[error("cell {0} is enclosed by blocked cells and grid edges")]
    EnclosedCell(Point),

    /// Some non-blocked cells cannot be reached from the entry at all.
    #[error("{unreachable} cells cannot be reached from the entry at {entry}")]
    Disconnected { entry: Point, unreachable: usize },

    #[error("failed to write maze to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Malformed hex maze text
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("maze text is empty")]
    Empty,

    #[error("unexpected character `{ch}` at line {line}, column {column}")]
    InvalidDigit {
        ch: char,
        line: usize,
        column: usize,
    },

    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        found: usize,
        expected: usize,
    },
}

/// Key that is not one of the recognised configuration keys
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown configuration key `{0}`")]
pub struct UnknownKeyError(pub String);

/// Algorithm name other than `DFS` or `WILSON`
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown algorithm `{0}`, expected `DFS` or `WILSON`")]
pub struct ParseAlgorithmError(pub String);
