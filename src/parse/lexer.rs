//! Low-level scanning over CDS source text
//!
//! A `winnow` tokenizer that understands just enough of the grammar to be
//! precise: `'...'` string literals, `//` and `/* */` comments, `@`
//! annotations with their values, and bracket nesting. Everything else in
//! the parse stage works on its token stream.

use winnow::{
    ascii::{multispace0, multispace1, till_line_ending},
    combinator::{alt, opt, preceded, repeat},
    error::ModalResult,
    token::{any, one_of, rest, take_till, take_until, take_while},
    Parser as _,
};

type Input<'a> = &'a str;

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Whitespace run, newlines included
    Space,
    /// `// ...` or `/* ... */`
    Comment,
    /// `@name`, `@name: value` or `@( ... )`
    Annotation,
    /// `'...'` literal
    Str,
    /// Identifier, keyword, number or dotted path
    Word,
    /// Any other single character
    Punct,
}

/// A token and where it sits in the tokenized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the first character
    pub start: usize,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.starts_with(c)
    }

    /// Keywords are case-insensitive
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_line_break(&self) -> bool {
        self.kind == TokenKind::Space && self.text.contains('\n')
    }

    /// Whitespace, comments and annotations
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Space | TokenKind::Comment | TokenKind::Annotation
        )
    }

    /// Bracket nesting change: `+1` on `(`/`[`/`{`, `-1` on the closers
    pub fn nesting(&self) -> isize {
        if self.kind != TokenKind::Punct {
            return 0;
        }
        match self.text {
            "(" | "[" | "{" => 1,
            ")" | "]" | "}" => -1,
            _ => 0,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '$' | '#')
}

fn line_comment<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    ("//", till_line_ending).take().parse_next(input)
}

fn block_comment<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    alt((
        ("/*", take_until(0.., "*/"), "*/").take(),
        // Unterminated comments run to the end of the text
        ("/*", rest).take(),
    ))
    .parse_next(input)
}

/// `'...'`; an unterminated literal runs to the end of the text
fn string_literal<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    ('\'', take_till(0.., '\''), opt('\'')).take().parse_next(input)
}

fn word<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    take_while(1.., is_word_char).parse_next(input)
}

/// Balanced `( )`, `[ ]` or `{ }` group, strings inside included
fn group<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (
        one_of(['(', '[', '{']),
        repeat::<_, _, (), _, _>(
            0..,
            alt((
                string_literal.void(),
                group.void(),
                take_while(1.., |c: char| {
                    !matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '\'')
                })
                .void(),
            )),
        ),
        opt(one_of([')', ']', '}'])),
    )
        .take()
        .parse_next(input)
}

/// `: value` after an annotation name: a string, a group or a bare word
fn annotation_value<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    preceded(
        (multispace0, ':', multispace0),
        alt((
            string_literal,
            group,
            take_while(1.., |c: char| !c.is_whitespace() && c != ';'),
        )),
    )
    .parse_next(input)
}

fn annotation<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    (
        '@',
        alt((
            group.void(),
            (take_while(0.., is_word_char), opt(annotation_value)).void(),
        )),
    )
        .take()
        .parse_next(input)
}

fn token<'a>(input: &mut Input<'a>) -> ModalResult<(TokenKind, &'a str)> {
    alt((
        multispace1.map(|text| (TokenKind::Space, text)),
        alt((line_comment, block_comment)).map(|text| (TokenKind::Comment, text)),
        annotation.map(|text| (TokenKind::Annotation, text)),
        string_literal.map(|text| (TokenKind::Str, text)),
        word.map(|text| (TokenKind::Word, text)),
        any.take().map(|text| (TokenKind::Punct, text)),
    ))
    .parse_next(input)
}

/// Tokenize `text` completely. Concatenating the token texts gives back
/// the input.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut input = text;
    let mut tokens = Vec::new();

    while !input.is_empty() {
        let start = text.len() - input.len();
        match token(&mut input) {
            Ok((kind, slice)) => tokens.push(Token {
                kind,
                text: slice,
                start,
            }),
            Err(_) => break,
        }
    }

    tokens
}

/// Remove `//` and `/* */` comments, keeping line structure intact.
///
/// Block comments keep their newlines so that line-oriented consumers see
/// the same line count. Comment markers inside string literals are ignored.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokenize(text) {
        if token.kind == TokenKind::Comment {
            out.extend(token.text.matches('\n'));
        } else {
            out.push_str(token.text);
        }
    }
    out
}

/// Result of stripping annotations and comments from one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    pub text: String,
    pub had_annotation: bool,
    pub had_comment: bool,
}

impl Stripped {
    /// Whether any structural token was removed
    pub fn had_structure(&self) -> bool {
        self.had_annotation || self.had_comment
    }
}

/// Strip `@annotation` tokens (with optional `: value` or `(...)`) and
/// comments from a line.
pub fn strip_annotations(line: &str) -> Stripped {
    let mut out = String::with_capacity(line.len());
    let mut had_annotation = false;
    let mut had_comment = false;

    for token in tokenize(line) {
        match token.kind {
            TokenKind::Annotation => {
                had_annotation = true;
                out.push(' ');
            }
            TokenKind::Comment => had_comment = true,
            _ => out.push_str(token.text),
        }
    }

    Stripped {
        text: out,
        had_annotation,
        had_comment,
    }
}

/// Byte range of the text between the first `{` and its matching `}`.
///
/// Returns `None` when the text has no braces or they never balance.
pub fn balanced_body(text: &str) -> Option<(usize, usize)> {
    let mut depth = 0usize;
    let mut open = None;

    for token in tokenize(text) {
        if token.is_punct('{') {
            if depth == 0 {
                open.get_or_insert(token.end());
            }
            depth += 1;
        } else if token.is_punct('}') && depth > 0 {
            depth -= 1;
            if depth == 0 {
                return open.map(|start| (start, token.start));
            }
        }
    }
    None
}

/// Split a declaration body into logical lines.
///
/// A statement ends at a `;` outside brackets. A line break ends it early
/// only when the statement has no `:` yet or the next line opens a new
/// `name : type` element; otherwise the lines are joined with a space.
/// Line breaks inside brackets are always joined, so inline structures
/// stay a single element. Statements keep their leading indentation and
/// drop the terminator.
pub fn logical_lines(body: &str) -> Vec<String> {
    let tokens = tokenize(body);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut has_colon = false;
    let mut depth = 0isize;

    for (idx, token) in tokens.iter().enumerate() {
        if depth == 0 && token.is_punct(';') {
            finish_statement(&mut lines, &mut current);
            has_colon = false;
            continue;
        }

        if token.is_line_break() {
            if depth > 0 || (has_colon && continues_element(&tokens[idx + 1..])) {
                current.push(' ');
            } else {
                finish_statement(&mut lines, &mut current);
                has_colon = false;
                current.push_str(indentation(token.text));
            }
            continue;
        }

        if depth == 0 && token.is_punct(':') {
            has_colon = true;
        }
        depth = (depth + token.nesting()).max(0);
        current.push_str(token.text);
    }

    finish_statement(&mut lines, &mut current);
    lines
}

fn finish_statement(lines: &mut Vec<String>, current: &mut String) {
    let statement = std::mem::take(current);
    if !statement.trim().is_empty() {
        lines.push(statement);
    }
}

/// Text after the last newline of a whitespace run
fn indentation(space: &str) -> &str {
    space.rsplit_once('\n').map_or(space, |(_, tail)| tail)
}

/// Whether the tokens after a line break carry on the current element.
///
/// A line of up to three words followed by `:` starts a new element;
/// anything else (an `on` condition, a relationship target) continues.
fn continues_element(rest: &[Token<'_>]) -> bool {
    let mut words = 0;
    for token in rest.iter().filter(|t| !t.is_trivia()) {
        if token.kind == TokenKind::Word && words < 3 {
            words += 1;
            continue;
        }
        return !token.is_punct(':');
    }
    words > 0
}
