//! Handlebars tag encoding.
//!
//! The pattern generator reads `{{ }}` as its own syntax, so Handlebars tags
//! are rewritten into triple-stash lookups of two marker keys:
//!
//! ```text
//! {{label}}   ──encode──►   {{{<%}}}label{{{%>}}}
//! ```
//!
//! With the sidecar mapping `"<%": "{{"` and `"%>": "}}"` the generator
//! renders the original tag back. With the global mapping `"<%": "<!--"` and
//! `"%>": "-->"` every other view renders it as an HTML comment.
//!
//! # Brace runs
//!
//! The encoding works on maximal runs of one brace character:
//!
//! | Run          | Output                                         |
//! |--------------|------------------------------------------------|
//! | `{` × k      | `{{{<%}}}` per pair, then `{` if k is odd       |
//! | `}` × n      | `}{{{%>}}}` per 3 braces while ≥ 3 remain, then |
//! |              | `{{{%>}}}` for a pair or `}` for a single brace |
//!
//! This is the same output as rewriting `{{` → `{{{<%`, then `(})?}}` →
//! `$1%>}}}`, then completing every `{{{<%` with `}}}` and every `%>}}}`
//! with a leading `{{{`, done in one pass.

use super::dialect::DialectCodec;

/// Escape marker standing in for the opening delimiter.
pub const OPEN_MARKER: &str = "<%";
/// Escape marker standing in for the closing delimiter.
pub const CLOSE_MARKER: &str = "%>";

const ESCAPED_OPEN: &str = "{{{<%}}}";
const ESCAPED_CLOSE: &str = "{{{%>}}}";

/// Handlebars (`hbs`) dialect.
pub struct Handlebars;

impl DialectCodec for Handlebars {
    fn tag(&self) -> &'static str {
        "hbs"
    }

    fn encode(&self, content: &str) -> String {
        encode(content)
    }

    fn decode(&self, content: &str) -> String {
        decode(content)
    }

    fn sidecar_pairs(&self) -> &'static [(&'static str, &'static str)] {
        &[(OPEN_MARKER, "{{"), (CLOSE_MARKER, "}}")]
    }

    fn hidden_pairs(&self) -> &'static [(&'static str, &'static str)] {
        &[(OPEN_MARKER, "<!--"), (CLOSE_MARKER, "-->")]
    }
}

/// Encode every Handlebars delimiter in `content`.
pub fn encode(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + content.len() / 4);
    let mut rest = content;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let brace = rest.as_bytes()[pos];
        let run = rest[pos..].bytes().take_while(|&b| b == brace).count();
        if brace == b'{' {
            push_open_run(&mut out, run);
        } else {
            push_close_run(&mut out, run);
        }
        rest = &rest[pos + run..];
    }
    out.push_str(rest);
    out
}

fn push_open_run(out: &mut String, run: usize) {
    for _ in 0..run / 2 {
        out.push_str(ESCAPED_OPEN);
    }
    if run % 2 == 1 {
        out.push('{');
    }
}

fn push_close_run(out: &mut String, mut run: usize) {
    while run >= 3 {
        out.push('}');
        out.push_str(ESCAPED_CLOSE);
        run -= 3;
    }
    match run {
        2 => out.push_str(ESCAPED_CLOSE),
        1 => out.push('}'),
        _ => {}
    }
}

/// Substitute the sidecar values back into encoded `content`.
///
/// Lossless for sources that contain no literal `<%` or `%>`.
pub fn decode(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(pos) = rest.find("{{{") {
        let (head, tail) = rest.split_at(pos);
        out.push_str(head);
        if let Some(after) = tail.strip_prefix(ESCAPED_OPEN) {
            out.push_str("{{");
            rest = after;
        } else if let Some(after) = tail.strip_prefix(ESCAPED_CLOSE) {
            out.push_str("}}");
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use regex::Regex;

    /// The four ordered rewrites the single-pass scanner must agree with.
    fn encode_by_rules(content: &str) -> String {
        let rules = [
            (r"\{\{", "{{{<%"),
            (r"(\})?\}\}", "${1}%>}}}"),
            (r"(\{\{\{<%)", "${1}}}}"),
            (r"(%>\}\}\})", "{{{${1}"),
        ];
        rules.iter().fold(content.to_owned(), |acc, (pattern, rep)| {
            Regex::new(pattern).unwrap().replace_all(&acc, *rep).into_owned()
        })
    }

    #[test]
    fn test_encode_variable() {
        assert_eq!(
            encode("<button>{{label}}</button>"),
            "<button>{{{<%}}}label{{{%>}}}</button>"
        );
    }

    #[test]
    fn test_encode_triple_stash() {
        assert_eq!(encode("{{{html}}}"), "{{{<%}}}{html}{{{%>}}}");
    }

    #[test]
    fn test_encode_block() {
        assert_eq!(
            encode("{{#each items}}<li>{{this}}</li>{{/each}}"),
            "{{{<%}}}#each items{{{%>}}}<li>{{{<%}}}this{{{%>}}}</li>{{{<%}}}/each{{{%>}}}"
        );
    }

    #[test]
    fn test_encode_lone_braces_untouched() {
        assert_eq!(encode("a { b } c"), "a { b } c");
        assert_eq!(encode(".btn{color:red}"), ".btn{color:red}");
    }

    #[test]
    fn test_encode_without_tags() {
        assert_eq!(encode(""), "");
        assert_eq!(encode("<p>plain</p>"), "<p>plain</p>");
    }

    #[test]
    fn test_encode_matches_rules_on_fixed_cases() {
        let cases = [
            "{{label}}",
            "{{{raw}}}",
            "{{{{raw}}}}",
            "{{> partial}}",
            "{{!-- note --}}",
            "}}}}}",
            "{{{{{",
            "{}}",
            "{{}",
            "a}}b{{c",
            "{{^if}}x{{/if}}",
            "<%}}}",
            "%>}}}",
            "{{{<%",
            "{{ a }}{{ b }}",
        ];
        for case in cases {
            assert_eq!(encode(case), encode_by_rules(case), "input: {case:?}");
        }
    }

    #[test]
    fn test_decode_restores_tags() {
        let source = "<ul>{{#each items}}<li>{{{this}}}</li>{{/each}}</ul>";
        assert_eq!(decode(&encode(source)), source);
    }

    #[test]
    fn test_decode_keeps_unrelated_braces() {
        assert_eq!(decode("{{{other}}}"), "{{{other}}}");
        assert_eq!(decode("{ {{{<%}}}x{{{%>}}} }"), "{ {{x}} }");
    }

    #[test]
    fn test_codec_pairs() {
        let codec = Handlebars;
        assert_eq!(codec.sidecar_pairs(), &[("<%", "{{"), ("%>", "}}")]);
        assert_eq!(codec.hidden_pairs(), &[("<%", "<!--"), ("%>", "-->")]);
    }

    proptest! {
        #[test]
        fn encode_agrees_with_rule_chain(input in "[a-z{}<>%# /]{0,48}") {
            prop_assert_eq!(encode(&input), encode_by_rules(&input));
        }

        #[test]
        fn decode_inverts_encode(input in "[a-z{} #/^!>\n]{0,48}") {
            prop_assert_eq!(decode(&encode(&input)), input);
        }
    }
}
