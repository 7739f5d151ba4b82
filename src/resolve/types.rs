//! Type Resolution
//!
//! Reduces the raw type text of an element to the label shown in the
//! diagram. Relationship clauses yield their target; qualified names that
//! the current file does not declare become pending cross-file lookups.
//! Resolution never fails: unknown names come back as opaque labels.

use regex::Regex;

use super::FileContext;
use crate::model::{EdgeKind, PendingReference};
use crate::types::TypeTables;

/// Label used for anonymous inline structures
pub const INLINE_STRUCT: &str = "struct";

/// Target of a relationship clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTarget {
    pub kind: EdgeKind,
    /// Bare entity name (final segment of a dotted reference)
    pub entity: String,
}

/// Result of resolving one raw type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Type label to render
    pub label: String,
    /// Set when the element connects to another entity
    pub relation: Option<RelationTarget>,
    /// Set when the type must be looked up in another file
    pub pending: Option<PendingReference>,
}

impl Resolution {
    fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            relation: None,
            pending: None,
        }
    }

    /// The resolved type was not found in any table or in `file`
    pub fn is_opaque(&self, tables: &TypeTables, file: &FileContext) -> bool {
        let base = self.label.trim_end_matches("[]");
        self.relation.is_none()
            && self.pending.is_none()
            && base != INLINE_STRUCT
            && tables.lookup(base).is_none()
            && !file.declares(base)
    }
}

/// Resolves raw element types against the type tables and the current file
#[derive(Debug, Clone)]
pub struct TypeResolver {
    tables: TypeTables,
    on_clause: Regex,
    managed: Regex,
    array: Regex,
    params: Regex,
}

impl TypeResolver {
    pub fn new(tables: TypeTables) -> Self {
        Self {
            tables,
            on_clause: Regex::new(r"\s+\bon\b.*$").unwrap(),
            managed: Regex::new(
                r"^(Composition|Association)\b(?:\s*\[[^\]]*\])?\s*(?:(?:of|to)\b\s*)?(?:(?:one|many)\b\s*)?(.*)$",
            )
            .unwrap(),
            array: Regex::new(r"^(?:array\s+of|many)\b\s*(.*)$").unwrap(),
            params: Regex::new(r"\([^)]*\)").unwrap(),
        }
    }

    pub fn tables(&self) -> &TypeTables {
        &self.tables
    }

    /// Resolve `raw_type` as written inside `file`
    pub fn resolve(&self, raw_type: &str, file: &FileContext) -> Resolution {
        let raw = self.on_clause.replace(raw_type.trim(), "");
        let raw = raw.trim();

        if let Some(caps) = self.managed.captures(raw) {
            let kind = if &caps[1] == "Composition" {
                EdgeKind::Composition
            } else {
                EdgeKind::Association
            };
            let target = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            return self.resolve_relation(kind, target, file, false);
        }

        if let Some(caps) = self.array.captures(raw) {
            let element = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            return self.resolve_relation(EdgeKind::ArrayDerived, element, file, true);
        }

        if raw.starts_with('{') {
            return Resolution::plain(INLINE_STRUCT);
        }

        let (label, pending) = self.resolve_name(raw, file);
        Resolution {
            label,
            relation: None,
            pending,
        }
    }

    fn resolve_relation(
        &self,
        kind: EdgeKind,
        target: &str,
        file: &FileContext,
        is_array: bool,
    ) -> Resolution {
        let suffix = if is_array { "[]" } else { "" };

        if target.is_empty() || target.starts_with('{') {
            return Resolution::plain(format!("{}{}", INLINE_STRUCT, suffix));
        }

        let token = target.split_whitespace().next().unwrap_or(target);
        let token = self.params.replace_all(token, "");

        // Arrays of built-in types are plain typed attributes
        if kind == EdgeKind::ArrayDerived {
            if let Some(label) = self.tables.primitive(&token) {
                return Resolution::plain(format!("{}{}", label, suffix));
            }
        }

        let (entity, pending) = self.resolve_name(&token, file);
        Resolution {
            label: format!("{}{}", entity, suffix),
            relation: Some(RelationTarget { kind, entity }),
            pending,
        }
    }

    /// Resolve a single type name, returning its label and an optional
    /// cross-file request
    fn resolve_name(&self, token: &str, file: &FileContext) -> (String, Option<PendingReference>) {
        let base = self.params.replace_all(token, "");
        let base = base.trim();

        if let Some(label) = self.tables.lookup(base) {
            return (label.to_string(), None);
        }

        match PendingReference::from_qualified(base) {
            Some(pending) if !file.declares(&pending.type_name) => {
                let label = pending.type_name.clone();
                (label, Some(pending))
            }
            Some(pending) => (pending.type_name, None),
            None => (base.to_string(), None),
        }
    }
}
