//! Dialect registry.
//!
//! Each template dialect is a [`DialectCodec`] looked up by its tag, so adding
//! a dialect means adding one entry to [`DIALECTS`].

use super::hbs::Handlebars;

/// Encode/decode strategy for one template dialect.
pub trait DialectCodec: Sync {
    /// Tag selecting this dialect on the command line (e.g. `hbs`).
    fn tag(&self) -> &'static str;

    /// Rewrite dialect tags into the generator-safe escaped form.
    fn encode(&self, content: &str) -> String;

    /// Reverse [`encode`](Self::encode), as the generator does when it
    /// substitutes the sidecar values back in.
    fn decode(&self, content: &str) -> String;

    /// Pairs written to every sidecar file: escape marker → dialect delimiter.
    fn sidecar_pairs(&self) -> &'static [(&'static str, &'static str)];

    /// Pairs merged into the Global Data Mapping: escape marker → text that
    /// hides the marker in views other than templates.
    fn hidden_pairs(&self) -> &'static [(&'static str, &'static str)];
}

/// Every registered dialect.
static DIALECTS: &[&dyn DialectCodec] = &[&Handlebars];

/// Find the codec for `tag` (case-insensitive).
pub fn lookup(tag: &str) -> Option<&'static dyn DialectCodec> {
    let tag = tag.trim();
    DIALECTS
        .iter()
        .copied()
        .find(|codec| codec.tag().eq_ignore_ascii_case(tag))
}

/// Tags of every registered dialect, for error messages.
pub fn known_tags() -> Vec<&'static str> {
    DIALECTS.iter().map(|codec| codec.tag()).collect()
}
