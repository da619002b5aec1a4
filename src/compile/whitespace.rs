//! Whitespace protection around Handlebars block-control tags.
//!
//! Authors sometimes write `{{#  each items}}` with space between the control
//! character (`#`, `^`, `/`) and the helper name. The HTML formatter only
//! recognizes blocks when the name follows the control character directly, so
//! before formatting the name is pulled forward and the space is parked at
//! the end of the tag, followed by a U+00A0 marker:
//!
//! ```text
//! {{#  each items}}  ──protect──►  {{#each  \u{A0} items}}
//!                    ◄─restore───
//! ```
//!
//! U+00A0 cannot be typed on a keyboard, so it never shows up in authored
//! templates and is safe to use as the marker.

use regex::Regex;
use std::sync::LazyLock;

/// Marker recording where moved whitespace came from.
pub const MARKER: char = '\u{A0}';

static RE_PROTECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\{\{[#^/])(\s+)([^\s}]+)").unwrap());

static RE_RESTORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\{\{[#^/])([^\s}]+)([\s&&[^\x{A0}]]+)\x{A0}").unwrap());

/// Move block helper names next to their control character.
pub fn protect(content: &str) -> String {
    RE_PROTECT
        .replace_all(content, format!("${{1}}${{3}}${{2}}{MARKER}").as_str())
        .into_owned()
}

/// Undo [`protect`], dropping the markers.
pub fn restore(content: &str) -> String {
    RE_RESTORE.replace_all(content, "${1}${3}${2}").into_owned()
}
