//! Compilation of generated patterns into backend templates.
//!
//! # Flow
//!
//! ```text
//! compile()
//!     │
//!     ├── FormatterOptions::resolve()      (once per run)
//!     │
//!     └── for each descriptor (sorted):
//!             descriptor::load() ──► Route
//!                 │
//!                 ├── read <public>/<id>/<id>.markup-only.html
//!                 ├── whitespace::protect()
//!                 ├── format::beautify()
//!                 ├── whitespace::restore()
//!                 └── write <backend>/<dir>/<name><ext>
//! ```
//!
//! A descriptor that cannot be stat'ed, read or parsed, or whose generated
//! markup is missing, is logged and skipped. Failing to write output stops
//! the run.

pub mod descriptor;
mod error;
pub mod whitespace;

pub use error::DescriptorError;

use crate::{
    config::Layout,
    format::{FormatterOptions, OptionsSource, beautify},
    log,
    utils::path::rel_display,
};
use anyhow::{Context, Result};
use descriptor::Route;
use std::{fs, path::PathBuf};

/// Outcome of a compile run.
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Destination files written, in descriptor order.
    pub compiled: Vec<PathBuf>,
    /// Entries that were not regular files or had no routing fields.
    pub skipped: usize,
    /// Descriptors that failed and were logged.
    pub failed: usize,
}

/// Compile every routed descriptor under `layout.templates`.
pub fn compile(layout: &Layout) -> Result<CompileReport> {
    let (options, source) = FormatterOptions::resolve(&layout.rc_file)?;
    if let OptionsSource::Project(path) = &source {
        log!("compile"; "formatter options from {}", rel_display(path, &layout.root));
    }

    let mut report = CompileReport::default();
    for path in descriptor::discover(layout) {
        let route = match descriptor::load(&path, layout) {
            Ok(Some(route)) => route,
            Ok(None) => {
                report.skipped += 1;
                continue;
            }
            Err(err) => {
                log!("error"; "{:#}", anyhow::Error::new(err));
                report.failed += 1;
                continue;
            }
        };

        let content = match render(&route, &options) {
            Ok(content) => content,
            Err(err) => {
                log!("error"; "{:#}", anyhow::Error::new(err));
                report.failed += 1;
                continue;
            }
        };

        write_output(&route, &content)?;
        log!("compile"; "Template {} compiled.", rel_display(&route.destination, &layout.root));
        report.compiled.push(route.destination);
    }

    Ok(report)
}

/// Read and format the generated markup of one route.
fn render(route: &Route, options: &FormatterOptions) -> Result<String, DescriptorError> {
    let markup = fs::read_to_string(&route.markup)
        .map_err(|err| DescriptorError::MissingArtifact(route.markup.clone(), err))?;

    let protected = whitespace::protect(&markup);
    let formatted = beautify(&protected, options);
    Ok(whitespace::restore(&formatted))
}

fn write_output(route: &Route, content: &str) -> Result<()> {
    if let Some(parent) = route.destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(&route.destination, content)
        .with_context(|| format!("Failed to write {}", route.destination.display()))
}

// ============================================================================
// Tests
// ============================================================================
