//! `[paths]` section configuration.
//!
//! Mirrors the pattern-library layout the upstream generator works with.
//! Every path is relative to the project root unless given absolute.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[paths]` section in tpl-compile.toml.
///
/// # Example
/// ```toml
/// [paths]
/// patterns = "source/_patterns"
/// templates = "source/_patterns/03-templates"
/// data = "source/_data"
/// public = "public/patterns"
/// backend = "backend"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::paths::root")]
    #[educe(Default = defaults::paths::root())]
    pub root: Option<PathBuf>,

    /// Source-patterns root: template sources and descriptors.
    #[serde(default = "defaults::paths::patterns")]
    #[educe(Default = defaults::paths::patterns())]
    pub patterns: PathBuf,

    /// Where descriptors are searched. Falls back to `patterns`.
    #[serde(default = "defaults::paths::templates")]
    #[educe(Default = defaults::paths::templates())]
    pub templates: Option<PathBuf>,

    /// Data directory holding `_data.json`.
    #[serde(default = "defaults::paths::data")]
    #[educe(Default = defaults::paths::data())]
    pub data: PathBuf,

    /// Public-patterns root written by the upstream generator.
    #[serde(default = "defaults::paths::public")]
    #[educe(Default = defaults::paths::public())]
    pub public: PathBuf,

    /// Backend root receiving compiled templates.
    #[serde(default = "defaults::paths::backend")]
    #[educe(Default = defaults::paths::backend())]
    pub backend: PathBuf,
}
