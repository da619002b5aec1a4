//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [paths] Section Defaults
// ============================================================================

pub mod paths {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn patterns() -> PathBuf {
        "source/_patterns".into()
    }

    pub fn templates() -> Option<PathBuf> {
        None
    }

    pub fn data() -> PathBuf {
        "source/_data".into()
    }

    pub fn public() -> PathBuf {
        "public/patterns".into()
    }

    pub fn backend() -> PathBuf {
        "backend".into()
    }
}

// ============================================================================
// [formatter] Section Defaults
// ============================================================================

pub mod formatter {
    pub fn rc() -> String {
        ".jsbeautifyrc".into()
    }
}
