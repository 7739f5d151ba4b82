//! Declaration Splitter
//!
//! Partitions CDS source text into the ordered `entity` / `type`
//! declarations it contains. Views, projections and enumerations are
//! dropped since they carry no structure of their own.

use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use super::lexer::{balanced_body, strip_comments, tokenize, Token, TokenKind};
use crate::model::EntityKind;

/// One top-level declaration cut out of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: EntityKind,
    pub name: String,
    /// Complete declaration text, trimmed
    pub text: String,
}

impl Fragment {
    /// Text between the outer braces, if the declaration has a body
    pub fn body(&self) -> Option<&str> {
        balanced_body(&self.text).map(|(start, end)| &self.text[start..end])
    }

    /// Declaration text before its body
    fn head(&self) -> &str {
        self.text.find('{').map_or(self.text.as_str(), |brace| &self.text[..brace])
    }
}

/// An `entity` / `type` keyword and the name after it
#[derive(Debug, Clone)]
struct Header {
    kind: EntityKind,
    name: String,
    /// Byte offset of the keyword
    start: usize,
    /// Token index of the name
    name_token: usize,
}

/// Splits source text into declaration fragments
#[derive(Debug, Clone)]
pub struct Splitter {
    excluded: Regex,
    namespace: Regex,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Splitter {
    pub fn new() -> Self {
        Self {
            excluded: Regex::new(r"(?i)\bas\s*\(?\s*(?:projection|select)\b|\benum\b").unwrap(),
            namespace: Regex::new(r"(?m)^[ \t]*namespace[ \t]+([\w.]+)").unwrap(),
        }
    }

    /// Split `source` into declaration fragments in source order
    pub fn split(&self, source: &str) -> Vec<Fragment> {
        let text = strip_comments(source);
        let tokens = tokenize(&text);
        let headers = headers(&tokens);
        let mut fragments = Vec::with_capacity(headers.len());
        let mut consumed = 0;

        for (idx, header) in headers.iter().enumerate() {
            // Nested inside the previous declaration
            if header.start < consumed {
                continue;
            }

            let limit = headers
                .get(idx + 1)
                .map(|next| next.start)
                .filter(|&start| start > header.start)
                .unwrap_or(text.len());
            let end = declaration_end(&tokens[header.name_token + 1..], limit).unwrap_or(text.len());
            consumed = end;

            let fragment = Fragment {
                kind: header.kind,
                name: header.name.clone(),
                text: text[header.start..end].trim().to_string(),
            };
            if self.excluded.is_match(fragment.head()) {
                debug!(name = %fragment.name, "skipping view or enumeration");
                continue;
            }

            fragments.push(fragment);
        }

        fragments
    }

    /// Names of every `entity` / `type` declared in `source`, including
    /// views and enumerations the split drops
    pub fn declared_names(&self, source: &str) -> HashSet<String> {
        let text = strip_comments(source);
        headers(&tokenize(&text)).into_iter().map(|h| h.name).collect()
    }

    /// Declared `namespace` of a source file, if any
    pub fn namespace_of(&self, source: &str) -> Option<String> {
        let text = strip_comments(source);
        self.namespace
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// Declaration headers in token order.
///
/// A header is `entity` or `type` followed by a name, at the start of the
/// text, of a line, or after a `;` / `}`. Annotations (with any value),
/// whitespace and `define` may sit between that boundary and the keyword.
fn headers(tokens: &[Token<'_>]) -> Vec<Header> {
    let mut headers = Vec::new();
    let mut boundary = true;

    for (idx, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Space => boundary |= token.is_line_break(),
            TokenKind::Comment | TokenKind::Annotation => {}
            TokenKind::Punct => boundary = token.is_punct(';') || token.is_punct('}'),
            TokenKind::Str => boundary = false,
            TokenKind::Word if boundary && token.is_word("define") => {}
            TokenKind::Word => {
                let kind = if boundary {
                    EntityKind::from_keyword(&token.text.to_ascii_lowercase())
                } else {
                    None
                };
                boundary = false;

                let Some(kind) = kind else { continue };
                let Some((offset, name)) = tokens[idx + 1..]
                    .iter()
                    .enumerate()
                    .find(|(_, t)| t.kind != TokenKind::Space)
                    .filter(|(offset, t)| *offset > 0 && t.kind == TokenKind::Word)
                else {
                    continue;
                };

                let name = name.text.rsplit('.').next().unwrap_or(name.text);
                headers.push(Header {
                    kind,
                    name: name.to_string(),
                    start: token.start,
                    name_token: idx + 1 + offset,
                });
            }
        }
    }

    headers
}

/// End offset of the declaration whose header is followed by `tokens`.
///
/// The declaration ends after the `}` closing its first body, or after a
/// `;` at nesting depth zero, whichever comes first. A declaration that
/// never terminates runs until `limit`, the start of the next header, or
/// to the end of the text (`None`).
fn declaration_end(tokens: &[Token<'_>], limit: usize) -> Option<usize> {
    let mut depth = 0usize;

    for token in tokens {
        if token.start >= limit && depth == 0 {
            return Some(limit);
        }
        if token.is_punct('{') {
            depth += 1;
        } else if token.is_punct('}') && depth > 0 {
            depth -= 1;
            if depth == 0 {
                return Some(token.end());
            }
        } else if token.is_punct(';') && depth == 0 {
            return Some(token.end());
        }
    }

    None
}
