//! Schema model types
//!
//! Everything here lives for one rendering run only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of a top-level declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// `entity Name { ... }`
    Entity,
    /// `type Name : Base;` or `type Name { ... }`
    TypeAlias,
}

impl EntityKind {
    /// The declaration keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            EntityKind::Entity => "entity",
            EntityKind::TypeAlias => "type",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "entity" => Some(EntityKind::Entity),
            "type" => Some(EntityKind::TypeAlias),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A parsed entity or type declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntity {
    pub name: String,
    pub kind: EntityKind,
    /// Body members in source order
    pub members: Vec<Member>,
    /// File the declaration was read from, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
}

impl SchemaEntity {
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.members.iter().filter_map(|m| match m {
            Member::Attribute(attr) => Some(attr),
            Member::Verbatim { .. } => None,
        })
    }
}

/// One rendered line of an entity body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    Attribute(Attribute),
    /// Unrecognized line echoed as-is
    Verbatim { line: String },
}

/// A named, typed element of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Letters-only element name
    pub name: String,
    /// Type text as written, after stripping annotations and keywords
    pub raw_type: String,
    /// Canonical label used in the diagram
    pub resolved_type: String,
    pub is_relationship: bool,
}

/// How two entities are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Composition,
    Association,
    /// `array of X` / `many X` with a non-primitive `X`
    ArrayDerived,
}

impl EdgeKind {
    /// Mermaid arrow for this connection style
    pub fn arrow(&self) -> &'static str {
        match self {
            EdgeKind::Composition => "*--",
            EdgeKind::Association | EdgeKind::ArrayDerived => "-->",
        }
    }

    /// Base connection label
    pub fn label(&self) -> &'static str {
        match self {
            EdgeKind::Composition => "composes",
            EdgeKind::Association => "associates to",
            EdgeKind::ArrayDerived => "relates to",
        }
    }
}

/// Endpoint multiplicities of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// `of many`: one primary owns many secondaries
    OneToMany,
    /// `to many`: direction swapped
    ManyToOne,
    /// `of one`
    OneToOptional,
    /// Anything else
    OptionalToOne,
}

impl Cardinality {
    /// Derive the cardinality from the phrases of a declaration line
    pub fn from_phrase(line: &str) -> Self {
        let normalized = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.contains("of many") {
            Cardinality::OneToMany
        } else if normalized.contains("to many") {
            Cardinality::ManyToOne
        } else if normalized.contains("of one") {
            Cardinality::OneToOptional
        } else {
            Cardinality::OptionalToOne
        }
    }

    /// `(primary, secondary)` multiplicity labels
    pub fn ends(&self) -> (&'static str, &'static str) {
        match self {
            Cardinality::OneToMany => ("1", "0..N"),
            Cardinality::ManyToOne => ("0..N", "1"),
            Cardinality::OneToOptional => ("1", "0..1"),
            Cardinality::OptionalToOne => ("0..1", "1"),
        }
    }

    /// Mermaid connector text, e.g. `"1" *-- "0..N"`
    pub fn connector(&self, kind: EdgeKind) -> String {
        let (left, right) = self.ends();
        format!("\"{}\" {} \"{}\"", left, kind.arrow(), right)
    }
}

/// A deduplicated connection between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub primary: String,
    pub secondary: String,
    pub kind: EdgeKind,
    pub cardinality: Cardinality,
    pub connection_label: String,
}

impl RelationshipEdge {
    /// Diagram line for this edge, without indentation
    pub fn to_mermaid(&self) -> String {
        format!(
            "{} {} {} : {}",
            self.primary,
            self.cardinality.connector(self.kind),
            self.secondary,
            self.connection_label
        )
    }
}

/// Lifecycle of a deferred cross-file reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingState {
    Pending,
    Resolved,
    Drained,
}

/// A qualified type that could not be resolved in its own file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReference {
    pub type_name: String,
    pub namespace: String,
    pub state: PendingState,
}

impl PendingReference {
    pub fn new(namespace: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            namespace: namespace.into(),
            state: PendingState::Pending,
        }
    }

    /// Split `com.acme.catalog.Product` into namespace and type name.
    /// Returns `None` for unqualified names.
    pub fn from_qualified(qualified: &str) -> Option<Self> {
        let (namespace, type_name) = qualified.rsplit_once('.')?;
        if namespace.is_empty() || type_name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_phrases() {
        assert_eq!(Cardinality::from_phrase("Composition of many Items"), Cardinality::OneToMany);
        assert_eq!(Cardinality::from_phrase("Association to  many Items"), Cardinality::ManyToOne);
        assert_eq!(Cardinality::from_phrase("Composition of one Detail"), Cardinality::OneToOptional);
        assert_eq!(Cardinality::from_phrase("Association to one Author"), Cardinality::OptionalToOne);
        assert_eq!(Cardinality::from_phrase("array of Tag"), Cardinality::OptionalToOne);
    }

    #[test]
    fn test_edge_line() {
        let edge = RelationshipEdge {
            primary: "Orders".to_string(),
            secondary: "Items".to_string(),
            kind: EdgeKind::Composition,
            cardinality: Cardinality::OneToMany,
            connection_label: "composes many".to_string(),
        };
        assert_eq!(edge.to_mermaid(), "Orders \"1\" *-- \"0..N\" Items : composes many");
    }

    #[test]
    fn test_pending_from_qualified() {
        let pending = PendingReference::from_qualified("com.acme.catalog.Product").unwrap();
        assert_eq!(pending.namespace, "com.acme.catalog");
        assert_eq!(pending.type_name, "Product");
        assert_eq!(pending.state, PendingState::Pending);

        assert!(PendingReference::from_qualified("Product").is_none());
        assert!(PendingReference::from_qualified(".Product").is_none());
    }
}
