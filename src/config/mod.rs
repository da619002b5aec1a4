//! Project configuration management for `tpl-compile.toml`.
//!
//! # Sections
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `[paths]`     | Pattern, data, public and backend directories    |
//! | `[formatter]` | Formatter rc file lookup                         |
//!
//! # Example
//!
//! ```toml
//! [paths]
//! patterns = "source/_patterns"
//! backend = "backend"
//!
//! [formatter]
//! rc = ".jsbeautifyrc"
//! ```
//!
//! The file is optional. Without it every field takes its default, which
//! matches the usual pattern-library layout.

pub mod defaults;
mod error;
mod formatter;
mod paths;

pub use error::ConfigError;
use formatter::FormatterConfig;
use paths::PathsConfig;

use crate::cli::Cli;
use anyhow::Result;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File name of the Global Data Mapping inside the data directory.
pub const DATA_FILE_NAME: &str = "_data.json";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing tpl-compile.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Formatter settings
    #[serde(default)]
    pub formatter: FormatterConfig,
}

impl ProjectConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ProjectConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut config = Self::from_str(&content)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Load configuration for a CLI invocation.
    ///
    /// A missing config file is not an error: defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.paths.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        if let Some(root) = &cli.root {
            self.paths.root = Some(root.clone());
        }
    }

    /// Validate configuration state
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("paths.patterns", &self.paths.patterns),
            ("paths.data", &self.paths.data),
            ("paths.public", &self.paths.public),
            ("paths.backend", &self.paths.backend),
        ];
        for (name, path) in required {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("`{name}` must not be empty")));
            }
        }
        // Pattern ids are derived relative to the patterns root.
        if let Some(templates) = &self.paths.templates {
            let root = self.get_root();
            if !root.join(templates).starts_with(root.join(&self.paths.patterns)) {
                return Err(ConfigError::Validation(format!(
                    "`paths.templates` ({}) must be inside `paths.patterns` ({})",
                    templates.display(),
                    self.paths.patterns.display()
                )));
            }
        }
        if self.formatter.rc.trim().is_empty() {
            return Err(ConfigError::Validation("`formatter.rc` must not be empty".into()));
        }
        Ok(())
    }

    /// Resolve every configured directory against the project root.
    pub fn layout(&self) -> Layout {
        let root = self.get_root().to_path_buf();
        let patterns = root.join(&self.paths.patterns);
        let templates = self
            .paths
            .templates
            .as_ref()
            .map_or_else(|| patterns.clone(), |t| root.join(t));
        Layout {
            data_file: root.join(&self.paths.data).join(DATA_FILE_NAME),
            public: root.join(&self.paths.public),
            backend: root.join(&self.paths.backend),
            rc_file: root.join(&self.formatter.rc),
            templates,
            patterns,
            root,
        }
    }
}

// ============================================================================
// Resolved Layout
// ============================================================================

/// Directory layout with every path joined onto the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    /// Source-patterns root
    pub patterns: PathBuf,
    /// Descriptor search root
    pub templates: PathBuf,
    /// Global Data Mapping file
    pub data_file: PathBuf,
    /// Public-patterns root
    pub public: PathBuf,
    /// Backend root
    pub backend: PathBuf,
    /// Project-level formatter rc file (may not exist)
    pub rc_file: PathBuf,
}

#[cfg(test)]
impl Layout {
    /// Default layout rooted at `root`.
    pub fn with_root(root: &Path) -> Self {
        let mut config = ProjectConfig::default();
        config.paths.root = Some(root.to_path_buf());
        config.layout()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.paths.patterns, PathBuf::from("source/_patterns"));
        assert_eq!(config.paths.data, PathBuf::from("source/_data"));
        assert_eq!(config.paths.public, PathBuf::from("public/patterns"));
        assert_eq!(config.paths.backend, PathBuf::from("backend"));
        assert!(config.paths.templates.is_none());
        assert_eq!(config.formatter.rc, ".jsbeautifyrc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = ProjectConfig::from_str(
            r#"
            [paths]
            templates = "source/_patterns/03-templates"
            backend = "app/views"
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.backend, PathBuf::from("app/views"));
        assert_eq!(config.paths.patterns, PathBuf::from("source/_patterns"));
        assert_eq!(
            config.paths.templates,
            Some(PathBuf::from("source/_patterns/03-templates"))
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ProjectConfig::from_str("[paths]\nunknown = 1\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_validate_empty_backend() {
        let config = ProjectConfig::from_str("[paths]\nbackend = \"\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("paths.backend"));
    }

    #[test]
    fn test_validate_templates_inside_patterns() {
        let inside = ProjectConfig::from_str(
            "[paths]\ntemplates = \"source/_patterns/03-templates\"\n",
        )
        .unwrap();
        assert!(inside.validate().is_ok());

        let outside = ProjectConfig::from_str("[paths]\ntemplates = \"templates\"\n").unwrap();
        let err = outside.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(format!("{err}").contains("paths.templates"));

        // Shared name prefix is not containment.
        let sibling =
            ProjectConfig::from_str("[paths]\ntemplates = \"source/_patterns-old\"\n").unwrap();
        assert!(sibling.validate().is_err());
    }

    #[test]
    fn test_layout_resolution() {
        let mut config = ProjectConfig::default();
        config.paths.root = Some(PathBuf::from("/project"));
        let layout = config.layout();

        assert_eq!(layout.patterns, PathBuf::from("/project/source/_patterns"));
        assert_eq!(layout.templates, layout.patterns);
        assert_eq!(layout.data_file, PathBuf::from("/project/source/_data/_data.json"));
        assert_eq!(layout.public, PathBuf::from("/project/public/patterns"));
        assert_eq!(layout.backend, PathBuf::from("/project/backend"));
        assert_eq!(layout.rc_file, PathBuf::from("/project/.jsbeautifyrc"));
    }

    #[test]
    fn test_layout_templates_override() {
        let mut config = ProjectConfig::default();
        config.paths.root = Some(PathBuf::from("/project"));
        config.paths.templates = Some(PathBuf::from("source/_patterns/03-templates"));
        assert_eq!(
            config.layout().templates,
            PathBuf::from("/project/source/_patterns/03-templates")
        );
    }

    #[test]
    fn test_from_path_records_location() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tpl-compile.toml");
        fs::write(&path, "[formatter]\nrc = \".htmlrc\"\n").unwrap();

        let config = ProjectConfig::from_path(&path).unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.formatter.rc, ".htmlrc");
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = ProjectConfig::from_path(Path::new("/nonexistent/tpl-compile.toml"));
        assert!(matches!(result, Err(ConfigError::Io(..))));
    }
}
