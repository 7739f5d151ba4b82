//! CDS source parsing
//!
//! Source text flows through three stages:
//! - [`lexer`]: the `winnow` tokenizer and the line scanning built on it
//! - [`splitter`]: cutting a file into `entity` / `type` fragments
//! - [`attribute`]: reducing body lines to `(name, raw type)` pairs

pub mod attribute;
pub mod lexer;
pub mod splitter;

pub use attribute::{AttributeParser, ParsedLine, SkipReason};
pub use lexer::{logical_lines, strip_annotations, strip_comments, tokenize, Token, TokenKind};
pub use splitter::{Fragment, Splitter};
