//! Relationship Registry
//!
//! Deduplicated entity-pair edges. Edges live in a petgraph `DiGraph`
//! keyed by the ordered pair `(primary, secondary)`; the first
//! registration for a pair is authoritative and later ones are no-ops.
//! Edge indices follow insertion order, which is the emission order.

use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use crate::model::{Cardinality, EdgeKind, RelationshipEdge};

/// Registry of relationship edges for one run
#[derive(Debug, Clone)]
pub struct RelationshipRegistry {
    graph: DiGraph<String, RelationshipEdge>,
    nodes: HashMap<String, NodeIndex>,
    many: Regex,
    one: Regex,
}

impl Default for RelationshipRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipRegistry {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            many: Regex::new(r"\bmany\b").unwrap(),
            one: Regex::new(r"\bone\b").unwrap(),
        }
    }

    /// Register the edge declared by `line` from `owner` to `target`.
    ///
    /// Returns `None` for self-references. Otherwise returns the edge for
    /// the pair, which is the stored one if the pair was seen before.
    pub fn register(
        &mut self,
        line: &str,
        owner: &str,
        target: &str,
        kind: EdgeKind,
    ) -> Option<&RelationshipEdge> {
        if owner == target {
            debug!(owner, "self-referencing relationship suppressed");
            return None;
        }

        let from = self.node(owner);
        let to = self.node(target);

        let edge = match self.graph.find_edge(from, to) {
            Some(existing) => existing,
            None => {
                let edge = RelationshipEdge {
                    primary: owner.to_string(),
                    secondary: target.to_string(),
                    kind,
                    cardinality: Cardinality::from_phrase(line),
                    connection_label: self.connection_label(line, kind),
                };
                debug!(primary = owner, secondary = target, label = %edge.connection_label, "registered relationship");
                self.graph.add_edge(from, to, edge)
            }
        };

        self.graph.edge_weight(edge)
    }

    /// Stored edge for the ordered pair, if any
    pub fn get(&self, primary: &str, secondary: &str) -> Option<&RelationshipEdge> {
        let from = *self.nodes.get(primary)?;
        let to = *self.nodes.get(secondary)?;
        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    /// Edges in first-registration order
    pub fn edges(&self) -> impl Iterator<Item = &RelationshipEdge> {
        self.graph.edge_weights()
    }

    pub fn len(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    fn connection_label(&self, line: &str, kind: EdgeKind) -> String {
        let mut label = kind.label().to_string();
        if self.many.is_match(line) {
            label.push_str(" many");
        } else if self.one.is_match(line) {
            label.push_str(" one");
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_edge_suppressed() {
        let mut registry = RelationshipRegistry::new();
        assert!(registry
            .register("parent : Association to Category", "Category", "Category", EdgeKind::Association)
            .is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = RelationshipRegistry::new();
        let first = registry
            .register("items : Composition of many Items", "Orders", "Items", EdgeKind::Composition)
            .cloned()
            .unwrap();
        assert_eq!(first.cardinality, Cardinality::OneToMany);
        assert_eq!(first.connection_label, "composes many");

        let second = registry
            .register("item : Association to one Items", "Orders", "Items", EdgeKind::Association)
            .cloned()
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_reverse_pair_is_distinct() {
        let mut registry = RelationshipRegistry::new();
        registry.register("b : Association to one B", "A", "B", EdgeKind::Association);
        registry.register("a : Association to many A", "B", "A", EdgeKind::Association);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("B", "A").unwrap().cardinality, Cardinality::ManyToOne);
        assert!(registry.get("A", "C").is_none());
    }

    #[test]
    fn test_labels_and_order() {
        let mut registry = RelationshipRegistry::new();
        registry.register("author : Association to one Authors", "Books", "Authors", EdgeKind::Association);
        registry.register("tags : array of Tag", "Books", "Tag", EdgeKind::ArrayDerived);
        registry.register("phone : Association to Phones", "Books", "Phones", EdgeKind::Association);

        let lines: Vec<String> = registry.edges().map(|e| e.to_mermaid()).collect();
        assert_eq!(
            lines,
            vec![
                "Books \"0..1\" --> \"1\" Authors : associates to one",
                "Books \"0..1\" --> \"1\" Tag : relates to",
                "Books \"0..1\" --> \"1\" Phones : associates to",
            ]
        );
    }
}
