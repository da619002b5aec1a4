//! HTML pretty-printer aware of Handlebars tags.
//!
//! # Output Rules
//!
//! | Token                               | Placement                          |
//! |-------------------------------------|------------------------------------|
//! | block element, comment, doctype     | own line at nesting depth          |
//! | block element with inline content   | one line: `<li>{{name}}</li>`      |
//! | inline element, text, `{{value}}`   | flows on the current line          |
//! | `{{#…}}` / `{{^…}}` … `{{/…}}`      | own line, indents its body         |
//! | `{{else}}`, `{{^}}`                 | own line, one level out            |
//! | `pre`, `textarea`                   | content kept verbatim              |
//! | `script`, `style`                   | body dedented, one level in        |
//!
//! Mustache tags are never split or re-spaced, and only ASCII whitespace is
//! collapsed, so U+00A0 markers survive formatting.

use super::FormatterOptions;

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mustache {
    BlockOpen,
    BlockClose,
    Else,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    /// Comments, doctypes and processing instructions
    Comment(&'a str),
    Open { name: String, raw: &'a str },
    Close { name: String, raw: &'a str },
    Void { name: String, raw: &'a str },
    /// Verbatim content of an unformatted element
    Raw(&'a str),
    Mustache(Mustache, &'a str),
}

// ============================================================================
// Tokenizer
// ============================================================================

fn tokenize<'a>(src: &'a str, opts: &FormatterOptions) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut text_start = 0;

    while let Some(offset) = src[pos..].find(['<', '{']) {
        pos += offset;
        let Some((token, len)) = read_token(&src[pos..]) else {
            pos += 1;
            continue;
        };

        if text_start < pos {
            tokens.push(Token::Text(&src[text_start..pos]));
        }
        pos += len;

        let raw_until = match &token {
            Token::Open { name, .. }
                if opts.is_unformatted(name) || opts.is_content_unformatted(name) =>
            {
                Some(find_close_tag(&src[pos..], name).map_or(src.len(), |end| pos + end))
            }
            _ => None,
        };
        tokens.push(token);

        if let Some(end) = raw_until {
            if pos < end {
                tokens.push(Token::Raw(&src[pos..end]));
            }
            pos = end;
        }
        text_start = pos;
    }

    if text_start < src.len() {
        tokens.push(Token::Text(&src[text_start..]));
    }
    tokens
}

/// Read the token starting at `s[0]`, returning it with its byte length.
fn read_token(s: &str) -> Option<(Token<'_>, usize)> {
    if s.starts_with("{{") {
        return read_mustache(s);
    }
    if !s.starts_with('<') {
        return None;
    }
    if s.starts_with("<!--") {
        let len = s.find("-->").map_or(s.len(), |end| end + 3);
        return Some((Token::Comment(&s[..len]), len));
    }
    if s.starts_with("<!") || s.starts_with("<?") {
        let len = s.find('>')? + 1;
        return Some((Token::Comment(&s[..len]), len));
    }

    let closing = s.starts_with("</");
    let name_start = if closing { 2 } else { 1 };
    let name: String = s[name_start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let len = tag_end(s)?;
    let raw = &s[..len];
    let name = name.to_ascii_lowercase();
    let token = if closing {
        Token::Close { name, raw }
    } else if VOID_ELEMENTS.contains(&name.as_str()) || raw.ends_with("/>") {
        Token::Void { name, raw }
    } else {
        Token::Open { name, raw }
    };
    Some((token, len))
}

/// Byte index just past the `>` closing the tag that starts `s`.
///
/// Quoted attribute values and embedded `{{…}}` tags may contain `>`.
fn tag_end(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut quote = None;
    let mut i = 1;

    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                b'"' | b'\'' => quote = Some(c),
                b'>' => return Some(i + 1),
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    if let Some(end) = s[i..].find("}}") {
                        i += end + 2;
                        continue;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

fn read_mustache(s: &str) -> Option<(Token<'_>, usize)> {
    let len = if s.starts_with("{{!--") {
        s.find("--}}")? + 4
    } else if s.starts_with("{{{") {
        s.find("}}}")? + 3
    } else {
        s.find("}}")? + 2
    };
    let raw = &s[..len];
    Some((Token::Mustache(classify_mustache(raw), raw), len))
}

fn classify_mustache(raw: &str) -> Mustache {
    if raw.starts_with("{{{") || raw.starts_with("{{!") {
        return Mustache::Inline;
    }
    let inner = raw[2..raw.len() - 2].trim_start_matches('~');
    let inner = inner.strip_suffix('~').unwrap_or(inner);

    match inner.chars().next() {
        Some('#') => Mustache::BlockOpen,
        Some('/') => Mustache::BlockClose,
        Some('^') if inner[1..].trim().is_empty() => Mustache::Else,
        Some('^') => Mustache::BlockOpen,
        _ => {
            let word = inner.trim_start();
            let is_else = word
                .strip_prefix("else")
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace()));
            if is_else { Mustache::Else } else { Mustache::Inline }
        }
    }
}

/// Offset of the `</name` that closes an unformatted element.
fn find_close_tag(s: &str, name: &str) -> Option<usize> {
    let needle = format!("</{name}");
    let lower = s.to_ascii_lowercase();
    lower.find(&needle)
}

// ============================================================================
// Printer
// ============================================================================

struct Printer<'o> {
    opts: &'o FormatterOptions,
    unit: String,
    lines: Vec<String>,
    line: String,
    depth: usize,
    blank: usize,
}

impl<'o> Printer<'o> {
    fn new(opts: &'o FormatterOptions) -> Self {
        Self {
            opts,
            unit: opts.indent_unit(),
            lines: Vec::new(),
            line: String::new(),
            depth: 0,
            blank: 0,
        }
    }

    fn emit(&mut self, depth: usize, content: &str) {
        if !self.lines.is_empty() {
            for _ in 0..self.blank {
                self.lines.push(String::new());
            }
        }
        self.blank = 0;
        self.lines.push(format!("{}{content}", self.unit.repeat(depth)));
    }

    fn flush_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        let content = line.trim_matches(|c: char| c.is_ascii_whitespace());
        if !content.is_empty() {
            self.emit(self.depth, content);
        }
    }

    fn block(&mut self, content: &str) {
        self.flush_line();
        self.emit(self.depth, content);
    }

    fn inline(&mut self, content: &str) {
        self.line.push_str(content);
    }

    fn text(&mut self, text: &str) {
        if text.bytes().all(|b| b.is_ascii_whitespace()) {
            let newlines = text.matches('\n').count();
            if self.opts.preserve_newlines && newlines >= 2 {
                self.flush_line();
                self.blank = newlines.min(self.opts.max_preserve_newlines).saturating_sub(1);
            } else if !self.line.is_empty() {
                self.line.push(' ');
            }
            return;
        }
        self.line.push_str(&collapse_whitespace(text));
    }

    fn is_inline(&self, token: &Token<'_>) -> bool {
        match token {
            Token::Text(_) => true,
            Token::Open { name, .. } | Token::Close { name, .. } | Token::Void { name, .. } => {
                self.opts.is_inline(name)
            }
            Token::Mustache(kind, _) => *kind == Mustache::Inline || !self.opts.indent_handlebars,
            Token::Comment(_) | Token::Raw(_) => false,
        }
    }

    /// Index of the close tag when everything up to it is inline.
    fn inline_body_end(&self, tokens: &[Token<'_>], open: usize, name: &str) -> Option<usize> {
        for (i, token) in tokens.iter().enumerate().skip(open + 1) {
            match token {
                Token::Close { name: n, .. } if n == name => return Some(i),
                Token::Text(t) if t.matches('\n').count() >= 2 && self.opts.preserve_newlines => {
                    return None;
                }
                t if self.is_inline(t) => {}
                _ => return None,
            }
        }
        None
    }

    fn indents(&self, name: &str) -> bool {
        self.opts.indent_inner_html || name != "html"
    }

    fn print(mut self, tokens: &[Token<'_>]) -> Vec<String> {
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Text(text) => self.text(text),
                Token::Comment(raw) => self.block(raw),
                Token::Raw(raw) => self.inline(raw),
                Token::Mustache(kind, raw) if self.opts.indent_handlebars => match kind {
                    Mustache::BlockOpen => {
                        self.block(raw);
                        self.depth += 1;
                    }
                    Mustache::BlockClose => {
                        self.flush_line();
                        self.depth = self.depth.saturating_sub(1);
                        self.block(raw);
                    }
                    Mustache::Else => {
                        self.flush_line();
                        self.emit(self.depth.saturating_sub(1), raw);
                    }
                    Mustache::Inline => self.inline(raw),
                },
                Token::Mustache(_, raw) => self.inline(raw),
                token if self.is_inline(token) => {
                    if let Token::Open { raw, .. } | Token::Close { raw, .. } | Token::Void { raw, .. } =
                        token
                    {
                        self.inline(raw);
                    }
                }
                Token::Open { name, raw } if self.opts.is_unformatted(name) => {
                    self.flush_line();
                    let mut verbatim = (*raw).to_owned();
                    while let Some(Token::Raw(body) | Token::Close { raw: body, .. }) =
                        tokens.get(i + 1)
                    {
                        let is_close = matches!(tokens[i + 1], Token::Close { .. });
                        verbatim.push_str(body);
                        i += 1;
                        if is_close {
                            break;
                        }
                    }
                    self.emit(self.depth, &verbatim);
                }
                Token::Open { name, raw } if self.opts.is_content_unformatted(name) => {
                    self.flush_line();
                    let mut body = "";
                    if let Some(Token::Raw(raw_body)) = tokens.get(i + 1) {
                        body = *raw_body;
                        i += 1;
                    }
                    let mut close = "";
                    if let Some(Token::Close { name: n, raw: raw_close }) = tokens.get(i + 1)
                        && n == name
                    {
                        close = *raw_close;
                        i += 1;
                    }

                    if body.trim().is_empty() {
                        self.emit(self.depth, &format!("{raw}{close}"));
                    } else {
                        self.emit(self.depth, raw);
                        for line in dedent(body) {
                            if line.is_empty() {
                                self.lines.push(String::new());
                            } else {
                                self.emit(self.depth + 1, line);
                            }
                        }
                        if !close.is_empty() {
                            self.emit(self.depth, close);
                        }
                    }
                }
                Token::Open { name, raw } => {
                    if let Some(end) = self.inline_body_end(tokens, i, name) {
                        self.flush_line();
                        let mut line = (*raw).to_owned();
                        for token in &tokens[i + 1..=end] {
                            match token {
                                Token::Text(t) => line.push_str(&collapse_whitespace(t)),
                                Token::Open { raw, .. }
                                | Token::Close { raw, .. }
                                | Token::Void { raw, .. }
                                | Token::Mustache(_, raw) => line.push_str(raw),
                                Token::Comment(_) | Token::Raw(_) => {}
                            }
                        }
                        self.emit(self.depth, &line);
                        i = end;
                    } else {
                        self.block(raw);
                        if self.indents(name) {
                            self.depth += 1;
                        }
                    }
                }
                Token::Close { name, raw } => {
                    self.flush_line();
                    if self.indents(name) {
                        self.depth = self.depth.saturating_sub(1);
                    }
                    self.block(raw);
                }
                Token::Void { raw, .. } => self.block(raw),
            }
            i += 1;
        }
        self.flush_line();
        self.lines
    }
}

/// Collapse runs of ASCII whitespace to one space.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Lines of a script or style body, outer blank lines dropped and the
/// common indentation removed.
fn dedent(body: &str) -> Vec<&str> {
    let lines: Vec<&str> = body.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    let lines = &lines[start..end];

    let indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches(|c: char| c.is_ascii_whitespace()).len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|&l| if l.is_empty() { l } else { &l[indent..] })
        .collect()
}

/// Pretty-print `source` according to `opts`.
pub fn beautify(source: &str, opts: &FormatterOptions) -> String {
    let tokens = tokenize(source, opts);
    let lines = Printer::new(opts).print(&tokens);
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join(&opts.eol);
    if opts.end_with_newline {
        out.push_str(&opts.eol);
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
