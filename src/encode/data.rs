//! Global Data Mapping (`_data.json`) patching.
//!
//! The encoder needs the escape markers hidden in every generator view other
//! than templates. It does that by making sure `_data.json` maps each marker
//! to a comment delimiter.
//!
//! The mapping is read once per run. Missing keys are gathered into a
//! [`KeySet`] and written in a single [`DataMapping::apply`] after all files
//! are encoded. New pairs are spliced in as text before the closing `}`, so
//! every byte the author wrote stays as it was. A file that could not be
//! parsed is never touched.

use crate::log;
use serde_json::{Map, Value};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Failures reading or writing the Global Data Mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("`{0}` is not valid JSON")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("`{0}` does not hold a JSON object")]
    NotObject(PathBuf),
}

/// State of the mapping file as found at load time.
#[derive(Debug)]
enum Source {
    /// No file yet; applying keys creates it.
    Missing,
    /// Parsed JSON object, with the text it was parsed from.
    Loaded(String),
    /// Present but unusable; left untouched.
    Unusable(MappingError),
}

/// In-memory view of `_data.json` for one encode run.
#[derive(Debug)]
pub struct DataMapping {
    path: PathBuf,
    entries: Map<String, Value>,
    source: Source,
}

/// Append-only, duplicate-free set of key/value pairs to add.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeySet {
    pairs: Vec<(&'static str, &'static str)>,
}

impl KeySet {
    /// Add a pair. Returns `false` when the key is already queued.
    pub fn insert(&mut self, key: &'static str, value: &'static str) -> bool {
        if self.pairs.iter().any(|(k, _)| *k == key) {
            return false;
        }
        self.pairs.push((key, value));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.pairs.iter().map(|(k, _)| *k).collect()
    }
}

impl DataMapping {
    /// Load the mapping, treating any failure as an empty mapping.
    pub fn load(path: &Path) -> Self {
        let loaded = fs::read_to_string(path)
            .map_err(|err| MappingError::Io(path.to_path_buf(), err))
            .and_then(|content| Ok((parse_object(&content, path)?, content)));
        let (entries, source) = match loaded {
            Ok((entries, content)) => (entries, Source::Loaded(content)),
            Err(MappingError::Io(_, err)) if err.kind() == io::ErrorKind::NotFound => {
                (Map::new(), Source::Missing)
            }
            Err(err) => (Map::new(), Source::Unusable(err)),
        };
        Self {
            path: path.to_path_buf(),
            entries,
            source,
        }
    }

    /// Read and parse the mapping file.
    pub fn try_load(path: &Path) -> Result<Map<String, Value>, MappingError> {
        let content =
            fs::read_to_string(path).map_err(|err| MappingError::Io(path.to_path_buf(), err))?;
        parse_object(&content, path)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Pairs from `pairs` whose key the mapping lacks.
    pub fn missing_keys(&self, pairs: &[(&'static str, &'static str)]) -> KeySet {
        let mut missing = KeySet::default();
        for &(key, value) in pairs {
            if !self.contains(key) {
                missing.insert(key, value);
            }
        }
        missing
    }

    /// Append `keys` and write the file once.
    ///
    /// Returns the keys actually added. Nothing is written when `keys` is
    /// empty or when the file on disk could not be parsed.
    pub fn apply(&mut self, keys: &KeySet) -> Result<Vec<&'static str>, MappingError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        if let Source::Unusable(err) = &self.source {
            log!("warn"; "{err}, not adding {}", keys.keys().join(", "));
            return Ok(Vec::new());
        }

        let had_entries = !self.entries.is_empty();
        let mut added = Vec::new();
        for &(key, value) in &keys.pairs {
            if !self.entries.contains_key(key) {
                self.entries.insert(key.to_owned(), Value::String(value.to_owned()));
                added.push((key, value));
            }
        }
        if added.is_empty() {
            return Ok(Vec::new());
        }

        let original = match &self.source {
            Source::Loaded(content) => content.as_str(),
            _ => EMPTY_OBJECT,
        };
        let content = splice_pairs(original, &added, had_entries)
            .ok_or_else(|| MappingError::NotObject(self.path.clone()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| MappingError::Io(parent.to_path_buf(), err))?;
        }
        fs::write(&self.path, &content).map_err(|err| MappingError::Io(self.path.clone(), err))?;
        self.source = Source::Loaded(content);
        Ok(added.into_iter().map(|(key, _)| key).collect())
    }
}

/// Content a missing mapping file starts from.
const EMPTY_OBJECT: &str = "{}\n";

fn parse_object(content: &str, path: &Path) -> Result<Map<String, Value>, MappingError> {
    match serde_json::from_str(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(MappingError::NotObject(path.to_path_buf())),
        Err(err) => Err(MappingError::Json(path.to_path_buf(), err)),
    }
}

/// Insert `pairs` as `"key": "value"` lines before the object's closing `}`.
///
/// Text before the insertion point is kept byte for byte, minus trailing
/// whitespace; text from the `}` on is kept as is.
fn splice_pairs(content: &str, pairs: &[(&str, &str)], had_entries: bool) -> Option<String> {
    let close = content.rfind('}')?;
    let mut out = content[..close].trim_end().to_owned();

    for (i, (key, value)) in pairs.iter().enumerate() {
        if had_entries || i > 0 {
            out.push(',');
        }
        let key = Value::String((*key).to_owned());
        let value = Value::String((*value).to_owned());
        out.push_str(&format!("\n  {key}: {value}"));
    }
    out.push('\n');
    out.push_str(&content[close..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HIDDEN: &[(&str, &str)] = &[("<%", "<!--"), ("%>", "-->")];

    #[test]
    fn test_key_set_rejects_duplicates() {
        let mut set = KeySet::default();
        assert!(set.insert("<%", "<!--"));
        assert!(!set.insert("<%", "other"));
        assert!(set.insert("%>", "-->"));
        assert_eq!(set.keys(), vec!["<%", "%>"]);
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data/_data.json");

        let mut mapping = DataMapping::load(&path);
        let missing = mapping.missing_keys(HIDDEN);
        assert_eq!(mapping.apply(&missing).unwrap(), vec!["<%", "%>"]);

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"<%\": \"<!--\",\n  \"%>\": \"-->\"\n}\n");
    }

    #[test]
    fn test_existing_keys_preserved_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data.json");
        fs::write(&path, r#"{"title": "Fepper", "<%": "<!--", "count": 3}"#).unwrap();

        let mut mapping = DataMapping::load(&path);
        let missing = mapping.missing_keys(HIDDEN);
        assert_eq!(missing.keys(), vec!["%>"]);
        mapping.apply(&missing).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let title = written.find("\"title\"").unwrap();
        let count = written.find("\"count\"").unwrap();
        let close = written.find("\"%>\"").unwrap();
        assert!(title < count && count < close);
    }

    #[test]
    fn test_existing_bytes_kept_as_prefix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data.json");
        let head = "{\n    \"price\": 1.50,\n    \"name\": \"caf\\u00e9\",\n    \"big\": 1e2";
        fs::write(&path, format!("{head}\n}}\n")).unwrap();

        let mut mapping = DataMapping::load(&path);
        let missing = mapping.missing_keys(HIDDEN);
        mapping.apply(&missing).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            format!("{head},\n  \"<%\": \"<!--\",\n  \"%>\": \"-->\"\n}}\n")
        );
        let parsed = DataMapping::try_load(&path).unwrap();
        assert_eq!(parsed["name"], "caf\u{e9}");
        assert_eq!(parsed["%>"], "-->");
    }

    #[test]
    fn test_empty_object_gets_pairs_without_leading_comma() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data.json");
        fs::write(&path, "{}").unwrap();

        let mut mapping = DataMapping::load(&path);
        let missing = mapping.missing_keys(HIDDEN);
        mapping.apply(&missing).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"<%\": \"<!--\",\n  \"%>\": \"-->\"\n}"
        );
    }

    #[test]
    fn test_complete_mapping_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data.json");
        let original = "{\n    \"<%\": \"<!--\",\n    \"%>\": \"-->\"\n}";
        fs::write(&path, original).unwrap();

        for _ in 0..2 {
            let mut mapping = DataMapping::load(&path);
            let missing = mapping.missing_keys(HIDDEN);
            assert!(missing.is_empty());
            assert!(mapping.apply(&missing).unwrap().is_empty());
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_malformed_mapping_is_not_clobbered() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data.json");
        fs::write(&path, "{ not json").unwrap();

        let mut mapping = DataMapping::load(&path);
        assert!(!mapping.contains("<%"));
        let missing = mapping.missing_keys(HIDDEN);
        assert_eq!(missing.keys().len(), 2);
        assert!(mapping.apply(&missing).unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_try_load_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_data.json");

        assert!(matches!(DataMapping::try_load(&path), Err(MappingError::Io(..))));
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(DataMapping::try_load(&path), Err(MappingError::NotObject(_))));
        fs::write(&path, "{").unwrap();
        assert!(matches!(DataMapping::try_load(&path), Err(MappingError::Json(..))));
    }
}
