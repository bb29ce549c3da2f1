//! CLI for maze generation

use std::{fs, path::PathBuf};

use a_maze_ing::{parse_config_text, Algorithm, Maze, MazeConfig};
use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Generate a maze and write it as one hex digit per cell
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file with `KEY=value` lines. Defaults are used if omitted.
    config: Option<PathBuf>,

    /// Random seed, overrides SEED from the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Carving algorithm, overrides ALGORITHM from the config file
    #[arg(long, value_enum)]
    algorithm: Option<Algorithm>,

    /// Draw the maze on the terminal
    #[arg(short, long)]
    print: bool,

    /// Write the hex maze to stdout instead of the output file
    #[arg(long)]
    stdout: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut pairs = match &args.config {
        Some(path) => {
            info!("Loading settings from {}", path.display());
            match fs::read_to_string(path) {
                Ok(text) => parse_config_text(&text).pairs,
                Err(err) => {
                    warn!("Cannot read {}: {err}, using default settings", path.display());
                    Vec::new()
                }
            }
        }
        None => {
            info!("No config file, using default settings");
            Vec::new()
        }
    };
    if let Some(seed) = args.seed {
        pairs.push(("SEED".to_owned(), seed.to_string()));
    }
    if let Some(algorithm) = args.algorithm {
        pairs.push(("ALGORITHM".to_owned(), algorithm.to_string()));
    }

    let resolution = MazeConfig::resolve(pairs);
    eprintln!("Maze configuration:\n{resolution}");

    let maze = Maze::generate(resolution.config).context("Maze generation failed")?;

    if args.stdout {
        print!("{}", maze.to_hex());
    } else if let Err(err) = maze.save() {
        error!("{err}");
    }
    if args.print {
        print!("{}", maze.render_ascii());
    }
    Ok(())
}
