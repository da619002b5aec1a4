//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Template encoder and backend compiler for pattern libraries
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: tpl-compile.toml)
    #[arg(short = 'C', long, default_value = "tpl-compile.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Encode template tags so the pattern generator leaves them alone.
    ///
    /// Source files are replaced by `.mustache` siblings. This is a one-way
    /// migration: the originals are deleted.
    Encode {
        /// Template dialect of the source files
        #[arg(default_value = "hbs")]
        dialect: String,

        /// Extension identifying the source files, e.g. `hbs` or `.hbs`
        #[arg(short, long)]
        ext: Option<String>,
    },

    /// Format generated patterns and write them into the backend
    Compile,
}

#[allow(unused)]
impl Cli {
    pub const fn is_encode(&self) -> bool {
        matches!(self.command, Commands::Encode { .. })
    }
    pub const fn is_compile(&self) -> bool {
        matches!(self.command, Commands::Compile)
    }
}
