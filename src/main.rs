//! tpl-compile - Hide template tags from a pattern generator, then compile its
//! output into backend templates.

mod cli;
mod compile;
mod config;
mod encode;
mod format;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use compile::compile;
use config::{Layout, ProjectConfig};
use encode::{EncodeOptions, encode};
use utils::path::rel_display;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ProjectConfig::load(&cli)?;
    let layout = config.layout();

    match &cli.command {
        Commands::Encode { dialect, ext } => encode_all(dialect, ext.clone(), &layout),
        Commands::Compile => compile_all(&layout),
    }
}

/// Encode source templates and report what was done.
fn encode_all(dialect: &str, ext: Option<String>, layout: &Layout) -> Result<()> {
    let options = EncodeOptions { extension: ext };
    let report = encode(dialect, &options, layout)?;

    if report.files.is_empty() {
        log!(
            "encode";
            "no matching files under {}",
            rel_display(&layout.patterns, &layout.root)
        );
    } else {
        log!("encode"; "done, {} file(s) encoded", report.files.len());
    }
    Ok(())
}

/// Compile generated patterns into the backend.
fn compile_all(layout: &Layout) -> Result<()> {
    let report = compile(layout)?;

    log!(
        "compile";
        "done, {} compiled, {} skipped, {} failed",
        report.compiled.len(),
        report.skipped,
        report.failed
    );
    Ok(())
}
