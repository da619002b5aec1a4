//! Descriptor loading and output routing.
//!
//! A descriptor is a YAML file sitting next to a pattern that tells the
//! compiler where the pattern's generated markup should land:
//!
//! ```yaml
//! tpl_compile_dir: views/home
//! tpl_compile_ext: tpl.php
//! ```
//!
//! # Path Mapping Examples
//!
//! For `source/_patterns/03-templates/00-homepage.yml` with the descriptor
//! above:
//!
//! | Item        | Path                                                         |
//! |-------------|--------------------------------------------------------------|
//! | pattern id  | `03-templates-00-homepage`                                   |
//! | markup      | `public/patterns/03-templates-00-homepage/03-templates-00-homepage.markup-only.html` |
//! | destination | `backend/views/home/00-homepage.tpl.php`                      |

use super::error::DescriptorError;
use crate::{
    config::Layout,
    utils::path::{collect_entries_with_suffixes, normalize_ext},
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Descriptor file name suffixes.
pub const DESCRIPTOR_EXTS: &[&str] = &[".yml", ".yaml"];

/// Suffix of the generator's markup-only output for a pattern.
const MARKUP_SUFFIX: &str = ".markup-only.html";

/// Characters flattened to `-` when deriving a pattern id.
const ID_SEPARATORS: &[char] = &['/', '\\', '~'];

/// Routing fields of a descriptor. Any other keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub tpl_compile_dir: Option<String>,
    #[serde(default)]
    pub tpl_compile_ext: Option<String>,
}

impl Descriptor {
    /// Parse descriptor YAML. An empty document is an inert descriptor.
    pub fn parse(content: &str, path: &Path) -> Result<Self, DescriptorError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|err| DescriptorError::Parse(path.to_path_buf(), err))
    }

    /// Trimmed destination directory and normalized extension.
    ///
    /// `None` when either field is missing or blank.
    pub fn routing(&self) -> Option<(&str, String)> {
        let dir = self
            .tpl_compile_dir
            .as_deref()
            .map(|d| d.trim().trim_start_matches(['/', '\\']))
            .filter(|d| !d.is_empty())?;
        let ext = self.tpl_compile_ext.as_deref().and_then(normalize_ext)?;
        Some((dir, ext))
    }
}

/// Where one descriptor's pattern is read from and written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub descriptor: PathBuf,
    pub pattern_id: String,
    /// Generated markup-only HTML
    pub markup: PathBuf,
    /// Compiled output file
    pub destination: PathBuf,
}

/// Every descriptor candidate under the descriptor root, sorted.
///
/// Entries are returned whatever their type; [`load`] stats them.
pub fn discover(layout: &Layout) -> Vec<PathBuf> {
    collect_entries_with_suffixes(&layout.templates, DESCRIPTOR_EXTS)
}

/// Load one descriptor and compute its route.
///
/// Returns `Ok(None)` for entries that are not regular files and for
/// descriptors without routing fields.
pub fn load(path: &Path, layout: &Layout) -> Result<Option<Route>, DescriptorError> {
    let meta = fs::metadata(path).map_err(|err| DescriptorError::Stat(path.to_path_buf(), err))?;
    if !meta.is_file() {
        return Ok(None);
    }

    let content =
        fs::read_to_string(path).map_err(|err| DescriptorError::Read(path.to_path_buf(), err))?;
    let descriptor = Descriptor::parse(&content, path)?;

    let Some((dir, ext)) = descriptor.routing() else {
        return Ok(None);
    };

    let pattern_id = pattern_id(path, &layout.patterns);
    Ok(Some(Route {
        descriptor: path.to_path_buf(),
        markup: markup_path(&layout.public, &pattern_id),
        destination: destination(&layout.backend, dir, path, &ext),
        pattern_id,
    }))
}

/// Strip the descriptor suffix from a file name.
fn descriptor_stem(name: &str) -> &str {
    DESCRIPTOR_EXTS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// Flatten a descriptor path into the generator's pattern id.
///
/// The path relative to `patterns_root`, without descriptor suffix, with
/// every separator and `~` replaced by `-`.
pub fn pattern_id(descriptor: &Path, patterns_root: &Path) -> String {
    let rel = descriptor.strip_prefix(patterns_root).unwrap_or(descriptor);
    let rel = rel.to_string_lossy();
    let rel = rel.trim_start_matches(['/', '\\']);
    descriptor_stem(rel).replace(ID_SEPARATORS, "-")
}

/// `<public>/<id>/<id>.markup-only.html`
pub fn markup_path(public: &Path, pattern_id: &str) -> PathBuf {
    public
        .join(pattern_id)
        .join(format!("{pattern_id}{MARKUP_SUFFIX}"))
}

/// `<backend>/<dir>/<descriptor stem><ext>`
pub fn destination(backend: &Path, dir: &str, descriptor: &Path, ext: &str) -> PathBuf {
    let name = descriptor
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    backend
        .join(dir)
        .join(format!("{}{ext}", descriptor_stem(&name)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pattern_id() {
        let root = Path::new("/p/source/_patterns");
        assert_eq!(
            pattern_id(Path::new("/p/source/_patterns/03-templates/00-homepage.yml"), root),
            "03-templates-00-homepage"
        );
        assert_eq!(
            pattern_id(Path::new("/p/source/_patterns/03-templates/page~variant.yml"), root),
            "03-templates-page-variant"
        );
        assert_eq!(
            pattern_id(Path::new("/p/source/_patterns/a/b/c.yaml"), root),
            "a-b-c"
        );
    }

    #[test]
    fn test_markup_path() {
        assert_eq!(
            markup_path(Path::new("/p/public/patterns"), "03-templates-00-homepage"),
            PathBuf::from(
                "/p/public/patterns/03-templates-00-homepage/03-templates-00-homepage.markup-only.html"
            )
        );
    }

    #[test]
    fn test_destination() {
        assert_eq!(
            destination(
                Path::new("/p/backend"),
                "views/home",
                Path::new("/p/source/_patterns/03-templates/00-homepage.yml"),
                ".tpl.php",
            ),
            PathBuf::from("/p/backend/views/home/00-homepage.tpl.php")
        );
    }

    #[test]
    fn test_routing_normalizes_fields() {
        let d = Descriptor::parse(
            "tpl_compile_dir: '  /views/home  '\ntpl_compile_ext: tpl.php\ntitle: Home\n",
            Path::new("a.yml"),
        )
        .unwrap();
        assert_eq!(d.routing(), Some(("views/home", ".tpl.php".to_string())));
    }

    #[test]
    fn test_routing_requires_both_fields() {
        let path = Path::new("a.yml");
        let no_ext = Descriptor::parse("tpl_compile_dir: views\n", path).unwrap();
        assert_eq!(no_ext.routing(), None);

        let no_dir = Descriptor::parse("tpl_compile_ext: .twig\n", path).unwrap();
        assert_eq!(no_dir.routing(), None);

        let blank = Descriptor::parse("tpl_compile_dir: ' '\ntpl_compile_ext: .twig\n", path).unwrap();
        assert_eq!(blank.routing(), None);

        let empty = Descriptor::parse("", path).unwrap();
        assert_eq!(empty.routing(), None);
    }

    #[test]
    fn test_parse_error() {
        let result = Descriptor::parse("tpl_compile_dir: [unclosed\n", Path::new("bad.yml"));
        assert!(matches!(result, Err(DescriptorError::Parse(..))));

        let result = Descriptor::parse("just a sentence\n", Path::new("scalar.yml"));
        assert!(matches!(result, Err(DescriptorError::Parse(..))));
    }

    #[test]
    fn test_load_route() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::with_root(dir.path());
        let templates = layout.patterns.join("03-templates");
        fs::create_dir_all(&templates).unwrap();
        let path = templates.join("00-homepage.yml");
        fs::write(&path, "tpl_compile_dir: views\ntpl_compile_ext: .hbs\n").unwrap();

        let route = load(&path, &layout).unwrap().unwrap();
        assert_eq!(route.pattern_id, "03-templates-00-homepage");
        assert_eq!(route.destination, layout.backend.join("views/00-homepage.hbs"));
        assert_eq!(
            route.markup,
            layout
                .public
                .join("03-templates-00-homepage/03-templates-00-homepage.markup-only.html")
        );
    }

    #[test]
    fn test_load_skips_directories() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::with_root(dir.path());
        let odd = layout.patterns.join("odd.yml");
        fs::create_dir_all(&odd).unwrap();

        assert_eq!(load(&odd, &layout).unwrap(), None);
    }

    #[test]
    fn test_load_stat_error() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::with_root(dir.path());
        let result = load(&layout.patterns.join("gone.yml"), &layout);
        assert!(matches!(result, Err(DescriptorError::Stat(..))));
    }

    #[test]
    fn test_discover_sorted() {
        let dir = TempDir::new().unwrap();
        let layout = Layout::with_root(dir.path());
        fs::create_dir_all(layout.patterns.join("b")).unwrap();
        fs::write(layout.patterns.join("b/z.yml"), "").unwrap();
        fs::write(layout.patterns.join("a.yaml"), "").unwrap();
        fs::write(layout.patterns.join("a.mustache"), "").unwrap();

        assert_eq!(
            discover(&layout),
            vec![layout.patterns.join("a.yaml"), layout.patterns.join("b/z.yml")]
        );
    }
}
