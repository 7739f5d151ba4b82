//! Reference resolution
//!
//! [`TypeResolver`] works inside a single file; [`NamespaceResolver`]
//! reaches into other files for qualified names the current file does
//! not declare.

pub mod namespace;
pub mod types;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::parse::Splitter;

pub use namespace::{namespace_matches, NamespaceResolver, ResolvedFragment};
pub use types::{RelationTarget, Resolution, TypeResolver};

/// A source file as parsing context
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    path: Option<PathBuf>,
    text: String,
    declared: HashSet<String>,
}

impl FileContext {
    pub fn new(path: Option<PathBuf>, text: String, splitter: &Splitter) -> Self {
        let declared = splitter.declared_names(&text);
        Self { path, text, declared }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this file declares an `entity` or `type` called `name`
    pub fn declares(&self, name: &str) -> bool {
        self.declared.contains(name)
    }
}
