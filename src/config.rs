//! Maze settings and fail-soft resolution of user overrides
//!
//! User input never aborts resolution. A value that cannot be parsed or
//! validated is replaced by its default and reported as a [`Diagnostic`].
//!
//! ```
//! use a_maze_ing::{Algorithm, MazeConfig, Point};
//!
//! let resolution = MazeConfig::resolve([
//!     ("WIDTH", "12"),
//!     ("ENTRY", "3,3"),
//!     ("EXIT", "3,3"),
//!     ("ALGORITHM", "wilson"),
//! ]);
//! let config = resolution.config;
//! assert_eq!(config.dimensions(), (12, 10));
//! assert_eq!(config.entry(), Point::new(0, 0));
//! assert_eq!(config.exit(), Point::new(3, 3));
//! assert_eq!(config.algorithm(), Algorithm::Wilson);
//! assert_eq!(resolution.diagnostics.len(), 1);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;

use crate::blocked::BlockedZone;
use crate::error::{ParseAlgorithmError, UnknownKeyError};
use crate::grid::Point;

pub const DEFAULT_COLS: usize = 20;
pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_OUTPUT_FILE: &str = "maze.txt";

/// Recognised configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    Width,
    Height,
    Entry,
    Exit,
    Perfect,
    Seed,
    OutputFile,
    Algorithm,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::Width,
        ConfigKey::Height,
        ConfigKey::Entry,
        ConfigKey::Exit,
        ConfigKey::Perfect,
        ConfigKey::Seed,
        ConfigKey::OutputFile,
        ConfigKey::Algorithm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Width => "WIDTH",
            ConfigKey::Height => "HEIGHT",
            ConfigKey::Entry => "ENTRY",
            ConfigKey::Exit => "EXIT",
            ConfigKey::Perfect => "PERFECT",
            ConfigKey::Seed => "SEED",
            ConfigKey::OutputFile => "OUTPUT_FILE",
            ConfigKey::Algorithm => "ALGORITHM",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = UnknownKeyError;

    /// Case-insensitive lookup, surrounding whitespace ignored
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(key))
            .ok_or_else(|| UnknownKeyError(key.to_owned()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spanning tree algorithm used for carving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Algorithm {
    /// Iterative depth-first backtracking
    #[default]
    Dfs,
    /// Wilson's loop-erased random walk, uniform over spanning trees
    Wilson,
}

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        match value.to_ascii_uppercase().as_str() {
            "DFS" => Ok(Algorithm::Dfs),
            "WILSON" => Ok(Algorithm::Wilson),
            _ => Err(ParseAlgorithmError(value.to_owned())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Dfs => f.write_str("DFS"),
            Algorithm::Wilson => f.write_str("WILSON"),
        }
    }
}

/// Non-fatal configuration problem. The affected setting fell back to its
/// default.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("config file is empty, using default settings")]
    EmptyConfig,

    #[error("line {line}: expected `KEY=value`, got `{text}`")]
    MalformedLine { line: usize, text: String },

    #[error("unknown key `{0}` ignored")]
    UnknownKey(String),

    #[error("invalid {key} `{value}`: {reason}, using default")]
    InvalidValue {
        key: ConfigKey,
        value: String,
        reason: &'static str,
    },

    #[error("a {cols}x{rows} maze cannot hold distinct entry and exit, using default size")]
    GridTooSmall { cols: usize, rows: usize },

    #[error("{key} ({x}, {y}) is outside the {cols}x{rows} maze, using default")]
    OutOfBounds {
        key: ConfigKey,
        x: i64,
        y: i64,
        cols: usize,
        rows: usize,
    },

    #[error("{key} {point} is inside the blocked glyph, using default")]
    InsideBlockedZone { key: ConfigKey, point: Point },

    #[error("entry and exit are both {point}, resetting {reset} to default")]
    EntryEqualsExit { point: Point, reset: ConfigKey },
}

/// Resolved, validated maze settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeConfig {
    cols: usize,
    rows: usize,
    entry: Point,
    exit: Point,
    perfect: bool,
    algorithm: Algorithm,
    seed: Option<u64>,
    output_path: PathBuf,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            entry: Point::new(0, 0),
            exit: Point::new(DEFAULT_COLS - 1, DEFAULT_ROWS - 1),
            perfect: true,
            algorithm: Algorithm::Dfs,
            seed: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl MazeConfig {
    /// Apply `overrides` onto the defaults.
    ///
    /// Keys are matched case-insensitively. Later duplicates win.
    pub fn resolve<I, K, V>(overrides: I) -> Resolution
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut resolver = ConfigResolver::default();
        for (key, value) in overrides {
            resolver.apply(key.as_ref(), value.as_ref());
        }
        resolver.finish()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Grid size as `(cols, rows)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn entry(&self) -> Point {
        self.entry
    }

    pub fn exit(&self) -> Point {
        self.exit
    }

    pub fn is_perfect(&self) -> bool {
        self.perfect
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Outcome of [`MazeConfig::resolve`]
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: MazeConfig,
    /// Every fallback taken, in the order it happened
    pub diagnostics: Vec<Diagnostic>,
    customized: BTreeSet<ConfigKey>,
}

impl Resolution {
    /// Whether `key` kept a user-supplied value
    pub fn is_customized(&self, key: ConfigKey) -> bool {
        self.customized.contains(&key)
    }
}

impl fmt::Display for Resolution {
    /// One line per setting, defaults marked
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = &self.config;
        for key in ConfigKey::ALL {
            let value = match key {
                ConfigKey::Width => config.cols.to_string(),
                ConfigKey::Height => config.rows.to_string(),
                ConfigKey::Entry => config.entry.to_string(),
                ConfigKey::Exit => config.exit.to_string(),
                ConfigKey::Perfect => config.perfect.to_string(),
                ConfigKey::Seed => config
                    .seed
                    .map_or_else(|| "random".to_owned(), |s| s.to_string()),
                ConfigKey::OutputFile => config.output_path.display().to_string(),
                ConfigKey::Algorithm => config.algorithm.to_string(),
            };
            let marker = if self.is_customized(key) {
                ""
            } else {
                " (default)"
            };
            writeln!(f, "  {key}: {value}{marker}")?;
        }
        Ok(())
    }
}

/// Key/value pairs read from a config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigText {
    pub pairs: Vec<(String, String)>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Split `KEY=value` lines.
///
/// Blank lines and lines starting with `#` are skipped. Keys are trimmed and
/// upper-cased, values trimmed. Lines without `=` are reported and skipped.
pub fn parse_config_text(text: &str) -> ConfigText {
    let mut parsed = ConfigText::default();
    if text.trim().is_empty() {
        report(&mut parsed.diagnostics, Diagnostic::EmptyConfig);
        return parsed;
    }
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => parsed
                .pairs
                .push((key.trim().to_ascii_uppercase(), value.trim().to_owned())),
            None => report(
                &mut parsed.diagnostics,
                Diagnostic::MalformedLine {
                    line: idx + 1,
                    text: line.to_owned(),
                },
            ),
        }
    }
    parsed
}

fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!("{diagnostic}");
    diagnostics.push(diagnostic);
}

/// Raw overrides collected before cross-field validation
#[derive(Debug, Default)]
struct ConfigResolver {
    cols: Option<usize>,
    rows: Option<usize>,
    entry: Option<(i64, i64)>,
    exit: Option<(i64, i64)>,
    perfect: Option<bool>,
    seed: Option<u64>,
    algorithm: Option<Algorithm>,
    output_path: Option<PathBuf>,
    diagnostics: Vec<Diagnostic>,
    customized: BTreeSet<ConfigKey>,
}

impl ConfigResolver {
    fn apply(&mut self, key: &str, value: &str) {
        let config_key = match key.parse::<ConfigKey>() {
            Ok(config_key) => config_key,
            Err(UnknownKeyError(key)) => {
                report(&mut self.diagnostics, Diagnostic::UnknownKey(key));
                return;
            }
        };
        let parsed = match config_key {
            ConfigKey::Width => parse_dimension(value).map(|v| self.cols = Some(v)),
            ConfigKey::Height => parse_dimension(value).map(|v| self.rows = Some(v)),
            ConfigKey::Entry => parse_coordinate(value).map(|v| self.entry = Some(v)),
            ConfigKey::Exit => parse_coordinate(value).map(|v| self.exit = Some(v)),
            ConfigKey::Perfect => parse_bool(value).map(|v| self.perfect = Some(v)),
            ConfigKey::Seed => value
                .trim()
                .parse::<u64>()
                .map(|v| self.seed = Some(v))
                .map_err(|_| "expected an unsigned integer"),
            ConfigKey::Algorithm => value
                .parse::<Algorithm>()
                .map(|v| self.algorithm = Some(v))
                .map_err(|_| "expected `DFS` or `WILSON`"),
            ConfigKey::OutputFile => match value.trim() {
                "" => Err("must not be empty"),
                path => {
                    self.output_path = Some(PathBuf::from(path));
                    Ok(())
                }
            },
        };
        match parsed {
            Ok(()) => {
                self.customized.insert(config_key);
            }
            Err(reason) => {
                self.clear(config_key);
                report(
                    &mut self.diagnostics,
                    Diagnostic::InvalidValue {
                        key: config_key,
                        value: value.to_owned(),
                        reason,
                    },
                );
            }
        }
    }

    /// Forget any earlier value of `key`
    fn clear(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Width => self.cols = None,
            ConfigKey::Height => self.rows = None,
            ConfigKey::Entry => self.entry = None,
            ConfigKey::Exit => self.exit = None,
            ConfigKey::Perfect => self.perfect = None,
            ConfigKey::Seed => self.seed = None,
            ConfigKey::OutputFile => self.output_path = None,
            ConfigKey::Algorithm => self.algorithm = None,
        }
        self.customized.remove(&key);
    }

    fn finish(mut self) -> Resolution {
        let mut cols = self.cols.unwrap_or(DEFAULT_COLS);
        let mut rows = self.rows.unwrap_or(DEFAULT_ROWS);
        if cols == 1 && rows == 1 {
            report(&mut self.diagnostics, Diagnostic::GridTooSmall { cols, rows });
            self.clear(ConfigKey::Width);
            self.clear(ConfigKey::Height);
            cols = DEFAULT_COLS;
            rows = DEFAULT_ROWS;
        }

        // Default exit always follows the final bounds
        let default_entry = Point::new(0, 0);
        let default_exit = Point::new(cols - 1, rows - 1);

        let mut entry = self.bounded(ConfigKey::Entry, self.entry, default_entry, cols, rows);
        let mut exit = self.bounded(ConfigKey::Exit, self.exit, default_exit, cols, rows);

        let blocked = BlockedZone::compute(cols, rows);
        if blocked.contains(entry) {
            self.reset(
                ConfigKey::Entry,
                Diagnostic::InsideBlockedZone {
                    key: ConfigKey::Entry,
                    point: entry,
                },
            );
            entry = default_entry;
        }
        if blocked.contains(exit) {
            self.reset(
                ConfigKey::Exit,
                Diagnostic::InsideBlockedZone {
                    key: ConfigKey::Exit,
                    point: exit,
                },
            );
            exit = default_exit;
        }

        if entry == exit && entry != default_entry {
            self.reset(
                ConfigKey::Entry,
                Diagnostic::EntryEqualsExit {
                    point: entry,
                    reset: ConfigKey::Entry,
                },
            );
            entry = default_entry;
        }
        if entry == exit {
            self.reset(
                ConfigKey::Exit,
                Diagnostic::EntryEqualsExit {
                    point: exit,
                    reset: ConfigKey::Exit,
                },
            );
            exit = default_exit;
        }

        let config = MazeConfig {
            cols,
            rows,
            entry,
            exit,
            perfect: self.perfect.unwrap_or(true),
            algorithm: self.algorithm.unwrap_or_default(),
            seed: self.seed,
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        };
        Resolution {
            config,
            diagnostics: self.diagnostics,
            customized: self.customized,
        }
    }

    /// Bounds-check a raw coordinate, falling back to `default`
    fn bounded(
        &mut self,
        key: ConfigKey,
        raw: Option<(i64, i64)>,
        default: Point,
        cols: usize,
        rows: usize,
    ) -> Point {
        let Some((x, y)) = raw else {
            return default;
        };
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(px), Ok(py)) if px < cols && py < rows => Point::new(px, py),
            _ => {
                self.reset(
                    key,
                    Diagnostic::OutOfBounds {
                        key,
                        x,
                        y,
                        cols,
                        rows,
                    },
                );
                default
            }
        }
    }

    fn reset(&mut self, key: ConfigKey, diagnostic: Diagnostic) {
        self.customized.remove(&key);
        report(&mut self.diagnostics, diagnostic);
    }
}

fn parse_dimension(value: &str) -> Result<usize, &'static str> {
    let parsed: i64 = value.trim().parse().map_err(|_| "expected an integer")?;
    match usize::try_from(parsed) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be positive"),
    }
}

fn parse_coordinate(value: &str) -> Result<(i64, i64), &'static str> {
    const REASON: &str = "expected two integers `x,y`";
    let (x, y) = value.split_once(',').ok_or(REASON)?;
    let x = x.trim().parse().map_err(|_| REASON)?;
    let y = y.trim().parse().map_err(|_| REASON)?;
    Ok((x, y))
}

fn parse_bool(value: &str) -> Result<bool, &'static str> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err("expected `True` or `False`"),
    }
}
