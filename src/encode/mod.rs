//! Template tag encoding.
//!
//! Rewrites dialect templates under the source-patterns root into `.mustache`
//! files the pattern generator can render without touching their tags.
//!
//! # Flow
//!
//! ```text
//! encode()
//!     │
//!     ├── resolve dialect + extension   (ConfigurationError, no writes)
//!     ├── DataMapping::load()           (failures tolerated)
//!     │
//!     ├── for each <name><ext>:
//!     │       write <name>.mustache → write <name>.json → log → delete source
//!     │
//!     └── DataMapping::apply()          (once, only if a file was encoded)
//! ```

pub mod data;
pub mod dialect;
mod error;
pub mod hbs;
pub mod sidecar;

pub use error::EncodeError;

use crate::{
    config::Layout,
    log,
    utils::path::{collect_files_with_suffix, normalize_ext, rel_display, replace_suffix},
};
use data::DataMapping;
use dialect::DialectCodec;
use sidecar::{SIDECAR_EXT, write_sidecar};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Extension given to every encoded template.
pub const ENCODED_EXT: &str = ".mustache";

/// Caller options for one encode run.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Extension identifying source templates, with or without leading `.`.
    pub extension: Option<String>,
}

/// One source template turned into its encoded siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    pub source: PathBuf,
    pub encoded: PathBuf,
    pub sidecar: PathBuf,
}

/// Outcome of an encode run.
#[derive(Debug, Default)]
pub struct EncodeReport {
    pub files: Vec<EncodedFile>,
    /// Keys appended to the Global Data Mapping.
    pub keys_added: Vec<&'static str>,
}

/// Encode every template under `layout.patterns` matching the extension.
pub fn encode(
    dialect: &str,
    options: &EncodeOptions,
    layout: &Layout,
) -> Result<EncodeReport, EncodeError> {
    let codec = dialect::lookup(dialect).ok_or_else(|| {
        EncodeError::Configuration(format!(
            "unknown dialect `{dialect}`, expected one of: {}",
            dialect::known_tags().join(", ")
        ))
    })?;
    let ext = resolve_extension(options)?;

    let mut mapping = DataMapping::load(&layout.data_file);
    let pending = mapping.missing_keys(codec.hidden_pairs());

    let mut report = EncodeReport::default();
    let mut failure = None;
    for source in collect_files_with_suffix(&layout.patterns, &ext) {
        match encode_file(codec, &source, &ext, &layout.root) {
            Ok(file) => report.files.push(file),
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }

    // Files already encoded have lost their sources, so their keys are
    // written even when a later file stopped the run.
    if !report.files.is_empty() {
        match mapping.apply(&pending) {
            Ok(keys) => report.keys_added = keys,
            Err(err) if failure.is_none() => return Err(err.into()),
            Err(err) => log!("error"; "{:#}", anyhow::Error::new(err)),
        }
        if !report.keys_added.is_empty() {
            log!(
                "data";
                "added {} to {}",
                report.keys_added.join(", "),
                rel_display(&layout.data_file, &layout.root)
            );
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(report),
    }
}

/// Validate and normalize the extension option.
fn resolve_extension(options: &EncodeOptions) -> Result<String, EncodeError> {
    let ext = options
        .extension
        .as_deref()
        .and_then(normalize_ext)
        .ok_or_else(|| {
            EncodeError::Configuration(
                "need an `-e` argument to identify your source files by extension".into(),
            )
        })?;

    if ext == ENCODED_EXT || ext == SIDECAR_EXT {
        return Err(EncodeError::Configuration(format!(
            "`{ext}` is reserved for encoder output and cannot identify source files"
        )));
    }
    Ok(ext)
}

/// Encode one source template and remove it.
fn encode_file(
    codec: &dyn DialectCodec,
    source: &Path,
    ext: &str,
    root: &Path,
) -> Result<EncodedFile, EncodeError> {
    let content =
        fs::read_to_string(source).map_err(|err| EncodeError::Io(source.to_path_buf(), err))?;

    let encoded = replace_suffix(source, ext, ENCODED_EXT);
    let sidecar = replace_suffix(source, ext, SIDECAR_EXT);

    let output = codec.encode(&content);
    if codec.decode(&output) != content {
        log!(
            "warn";
            "{} contains literal escape markers, the generator will not restore it exactly",
            rel_display(source, root)
        );
    }

    fs::write(&encoded, output).map_err(|err| EncodeError::Io(encoded.clone(), err))?;
    write_sidecar(&sidecar, codec).map_err(|err| EncodeError::Io(sidecar.clone(), err))?;

    log!(
        "encode";
        "{} encoded to {}.",
        rel_display(source, root),
        rel_display(&encoded, root)
    );

    fs::remove_file(source).map_err(|err| EncodeError::Io(source.to_path_buf(), err))?;

    Ok(EncodedFile {
        source: source.to_path_buf(),
        encoded,
        sidecar,
    })
}

// ============================================================================
// Tests
// ============================================================================
