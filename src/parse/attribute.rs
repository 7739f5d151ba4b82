//! Attribute line parsing
//!
//! Turns one logical line of an entity body into a `(name, raw type)`
//! pair by walking its tokens. Annotations, comments and structural
//! keywords are dropped on the way; what cannot be used is reported
//! rather than failing the entity.

use super::lexer::{tokenize, Token, TokenKind};

/// Words stripped from the element name
const NAME_KEYWORDS: [&str; 4] = ["key", "virtual", "masked", "element"];

/// Words that mark a relationship clause
const RELATIONSHIP_KEYWORDS: [&str; 3] = ["Composition", "Association", "many"];

/// Outcome of parsing one body line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// A usable `name : type` element
    Element { name: String, raw_type: String },
    /// Plain text without `:`, to be echoed unchanged
    Verbatim(String),
    /// Nothing to render
    Skip(SkipReason),
}

/// Why a line produced no output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty, whitespace or lone punctuation
    Blank,
    /// Only annotations and/or comments
    Annotation,
    /// Had structure but yielded no usable name or type
    Unusable,
}

/// Parses entity body lines
#[derive(Debug, Clone, Default)]
pub struct AttributeParser;

impl AttributeParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one logical line of the body of `owner`
    pub fn parse(&self, line: &str, owner: &str) -> ParsedLine {
        let tokens = tokenize(line);
        let had_structure = tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Annotation | TokenKind::Comment));
        let code: Vec<Token<'_>> = tokens
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Annotation | TokenKind::Comment))
            .filter(|t| !t.is_punct(';'))
            .collect();

        if code.iter().all(|t| t.kind == TokenKind::Space) {
            return if had_structure {
                ParsedLine::Skip(SkipReason::Annotation)
            } else {
                ParsedLine::Skip(SkipReason::Blank)
            };
        }

        let Some(colon) = top_level_colon(&code) else {
            if had_structure || has_relationship_keyword(&code) {
                tracing::debug!(owner, line = line.trim(), "line without ':' has structure, skipping");
                return ParsedLine::Skip(SkipReason::Unusable);
            }
            if code.iter().all(is_filler) {
                return ParsedLine::Skip(SkipReason::Blank);
            }
            return ParsedLine::Verbatim(line.trim_end().to_string());
        };

        let name = element_name(&code[..colon]);
        let raw_type = element_type(&code[colon + 1..]);

        if name.is_empty() || raw_type.is_empty() {
            tracing::debug!(owner, line = line.trim(), "unusable element line");
            return ParsedLine::Skip(SkipReason::Unusable);
        }

        ParsedLine::Element { name, raw_type }
    }
}

/// Index of the first `:` outside brackets
fn top_level_colon(tokens: &[Token<'_>]) -> Option<usize> {
    let mut depth = 0isize;
    for (idx, token) in tokens.iter().enumerate() {
        if depth == 0 && token.is_punct(':') {
            return Some(idx);
        }
        depth = (depth + token.nesting()).max(0);
    }
    None
}

fn has_relationship_keyword(tokens: &[Token<'_>]) -> bool {
    let words: Vec<&Token<'_>> = tokens.iter().filter(|t| t.kind == TokenKind::Word).collect();
    words.iter().enumerate().any(|(idx, word)| {
        RELATIONSHIP_KEYWORDS.iter().any(|k| word.is_word(k))
            || (word.is_word("array") && words.get(idx + 1).is_some_and(|next| next.is_word("of")))
    })
}

/// Whitespace, braces, parentheses and commas
fn is_filler(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Space
        || (token.kind == TokenKind::Punct && matches!(token.text, "{" | "}" | "," | "(" | ")"))
}

/// Letters of the name side, keywords removed as whole words
fn element_name(tokens: &[Token<'_>]) -> String {
    tokens
        .iter()
        .filter(|t| !NAME_KEYWORDS.iter().any(|k| t.is_word(k)))
        .flat_map(|t| t.text.chars())
        .filter(|c| c.is_ascii_alphabetic())
        .collect()
}

/// Type side without `localized`, `not null` / `null`, a `default` clause
/// or a calculated `= expr` value. An `=` belongs to the type when the
/// clause has an `on` condition.
fn element_type(tokens: &[Token<'_>]) -> String {
    let has_condition = tokens.iter().any(|t| t.is_word("on"));
    let mut out = String::new();
    let mut depth = 0isize;

    for (idx, token) in tokens.iter().enumerate() {
        if depth == 0 && (token.is_word("default") || (!has_condition && token.is_punct('='))) {
            break;
        }
        if token.is_word("localized") || token.is_word("null") {
            continue;
        }
        if token.is_word("not")
            && tokens[idx + 1..]
                .iter()
                .find(|t| t.kind != TokenKind::Space)
                .is_some_and(|t| t.is_word("null"))
        {
            continue;
        }

        depth = (depth + token.nesting()).max(0);
        if token.kind == TokenKind::Space {
            out.push(' ');
        } else {
            out.push_str(token.text);
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
