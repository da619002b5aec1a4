//! HTML formatting of generated patterns.
//!
//! Options use js-beautify's rc file keys so an existing `.jsbeautifyrc`
//! keeps working. Lookup is layered:
//!
//! ```text
//! <root>/.jsbeautifyrc   exists? ──yes──► load (cached per absolute path)
//!          │
//!          no
//!          ▼
//! bundled default (assets/jsbeautifyrc.json, compiled in)
//! ```

mod html;

pub use html::beautify;

use educe::Educe;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};
use thiserror::Error;

/// Default rc shipped with the binary.
const BUNDLED_RC: &str = include_str!("../../assets/jsbeautifyrc.json");

/// Phrasing elements kept on the surrounding line.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i",
    "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
    "strong", "sub", "sup", "time", "u", "var", "wbr",
];

/// Elements whose content is never reformatted.
const UNFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea"];

/// Elements whose content keeps its own layout but is re-indented.
const CONTENT_UNFORMATTED_ELEMENTS: &[&str] = &["script", "style"];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Formatter options in `{0}` are invalid")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// Formatter options, named after js-beautify's html options.
///
/// Unknown keys are ignored: rc files commonly carry js and css settings too.
#[derive(Debug, Clone, PartialEq, Eq, Educe, Deserialize)]
#[educe(Default)]
#[serde(default)]
pub struct FormatterOptions {
    #[educe(Default = 4)]
    pub indent_size: usize,

    #[educe(Default = String::from(" "))]
    pub indent_char: String,

    #[educe(Default = false)]
    pub indent_with_tabs: bool,

    #[educe(Default = String::from("\n"))]
    pub eol: String,

    #[educe(Default = true)]
    pub end_with_newline: bool,

    /// Keep blank lines between blocks.
    #[educe(Default = true)]
    pub preserve_newlines: bool,

    /// Line breaks kept from one whitespace run; blank lines are one fewer.
    #[educe(Default = 10)]
    pub max_preserve_newlines: usize,

    /// Indent `<head>` and `<body>` under `<html>`.
    #[educe(Default = false)]
    pub indent_inner_html: bool,

    /// Treat `{{#…}}`/`{{/…}}` as blocks.
    #[educe(Default = true)]
    pub indent_handlebars: bool,

    #[educe(Default = to_strings(INLINE_ELEMENTS))]
    pub inline: Vec<String>,

    #[educe(Default = to_strings(UNFORMATTED_ELEMENTS))]
    pub unformatted: Vec<String>,

    #[educe(Default = to_strings(CONTENT_UNFORMATTED_ELEMENTS))]
    pub content_unformatted: Vec<String>,
}

/// Where resolved options came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsSource {
    Project(PathBuf),
    Bundled,
}

/// Options loaded from rc files, keyed by absolute path.
static RC_CACHE: LazyLock<Mutex<HashMap<PathBuf, Arc<FormatterOptions>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

static BUNDLED: LazyLock<Arc<FormatterOptions>> = LazyLock::new(|| {
    Arc::new(FormatterOptions::from_json(BUNDLED_RC, Path::new("<bundled>")).unwrap_or_default())
});

impl FormatterOptions {
    /// Parse rc JSON. Keys of an `"html"` section override top-level keys.
    pub fn from_json(content: &str, path: &Path) -> Result<Self, FormatError> {
        let json_err = |err| FormatError::Json(path.to_path_buf(), err);
        let mut value: Value = serde_json::from_str(content).map_err(json_err)?;

        if let Value::Object(map) = &mut value
            && let Some(Value::Object(html)) = map.remove("html")
        {
            map.extend(html);
        }
        serde_json::from_value(value).map_err(json_err)
    }

    /// Load an rc file, reusing an earlier load of the same file.
    pub fn load_cached(path: &Path) -> Result<Arc<Self>, FormatError> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if let Some(options) = RC_CACHE.lock().get(&key) {
            return Ok(Arc::clone(options));
        }

        let content =
            fs::read_to_string(&key).map_err(|err| FormatError::Io(path.to_path_buf(), err))?;
        let options = Arc::new(Self::from_json(&content, path)?);
        RC_CACHE.lock().insert(key, Arc::clone(&options));
        Ok(options)
    }

    /// Project rc file when present, bundled default otherwise.
    pub fn resolve(rc_file: &Path) -> Result<(Arc<Self>, OptionsSource), FormatError> {
        if rc_file.is_file() {
            let options = Self::load_cached(rc_file)?;
            Ok((options, OptionsSource::Project(rc_file.to_path_buf())))
        } else {
            Ok((Self::bundled(), OptionsSource::Bundled))
        }
    }

    pub fn bundled() -> Arc<Self> {
        Arc::clone(&BUNDLED)
    }

    /// One level of indentation.
    pub fn indent_unit(&self) -> String {
        if self.indent_with_tabs {
            "\t".to_owned()
        } else {
            self.indent_char.repeat(self.indent_size)
        }
    }

    pub fn is_inline(&self, name: &str) -> bool {
        self.inline.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn is_unformatted(&self, name: &str) -> bool {
        self.unformatted.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn is_content_unformatted(&self, name: &str) -> bool {
        self.content_unformatted
            .iter()
            .any(|n| n.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Tests
// ============================================================================
