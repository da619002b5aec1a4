//! Per-template sidecar key pair files.

use super::dialect::DialectCodec;
use serde_json::{Map, Value};
use std::{fs, io, path::Path};

/// Sidecar file extension.
pub const SIDECAR_EXT: &str = ".json";

/// Render the sidecar mapping for `codec`.
///
/// Key order follows [`DialectCodec::sidecar_pairs`], so the output is
/// byte-identical on every run.
pub fn sidecar_content(codec: &dyn DialectCodec) -> String {
    let map: Map<String, Value> = codec
        .sidecar_pairs()
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
        .collect();
    format!("{:#}\n", Value::Object(map))
}

/// Write (or overwrite) the sidecar for an encoded template.
pub fn write_sidecar(path: &Path, codec: &dyn DialectCodec) -> io::Result<()> {
    fs::write(path, sidecar_content(codec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::hbs::Handlebars;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_content_hbs() {
        assert_eq!(
            sidecar_content(&Handlebars),
            "{\n  \"<%\": \"{{\",\n  \"%>\": \"}}\"\n}\n"
        );
    }

    #[test]
    fn test_write_sidecar_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("button.json");

        write_sidecar(&path, &Handlebars).unwrap();
        let first = fs::read(&path).unwrap();
        write_sidecar(&path, &Handlebars).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_write_sidecar_overwrites_stale_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("button.json");
        fs::write(&path, "{\"title\": \"Button\"}").unwrap();

        write_sidecar(&path, &Handlebars).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), sidecar_content(&Handlebars));
    }
}
