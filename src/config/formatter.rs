//! `[formatter]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[formatter]` section in tpl-compile.toml.
///
/// # Example
/// ```toml
/// [formatter]
/// rc = ".jsbeautifyrc"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct FormatterConfig {
    /// Name of the project-level formatter rc file, looked up in the root only.
    #[serde(default = "defaults::formatter::rc")]
    #[educe(Default = defaults::formatter::rc())]
    pub rc: String,
}
