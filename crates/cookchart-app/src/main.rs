//! `cookchart` command-line entry point.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Cooking chart documents: normalize, render and manage saved recipes
#[derive(Parser, Debug)]
#[command(name = "cookchart")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Board configuration (JSON, unspecified fields use defaults)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a chart (current or legacy shape) and print it in the current shape
    Normalize {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
    /// Render a chart to SVG
    Svg {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
        /// Render the whole board instead of cropping to the content
        #[arg(long)]
        full: bool,
    },
    /// Print the padded export bounds of a chart as JSON
    Bounds {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Manage a directory of saved recipes
    Store {
        /// Store directory (defaults to the user data directory)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum StoreAction {
    /// List recipe names in display order
    List,
    /// Save a chart file as a new recipe; a taken name gets a " (n)" suffix
    Import {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Write a recipe's chart as JSON
    Export {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
    /// Rename a recipe; fails if the new name is taken
    Rename {
        #[arg(value_name = "OLD")]
        old: String,
        #[arg(value_name = "NEW")]
        new: String,
    },
    /// Delete a recipe
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Move the given recipes to the front of the display order
    Order {
        #[arg(value_name = "NAME", required = true)]
        names: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match commands::run(args) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output.trim_end());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("cookchart: {}", e);
            ExitCode::FAILURE
        }
    }
}
