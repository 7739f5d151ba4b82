//! Diagram Rendering
//!
//! Drives one rendering run: split the input into declarations, render
//! each into the entity cache while registering relationships, drain the
//! cross-file references discovered on the way, and serialize the result.
//!
//! All run state lives in a [`RenderContext`] created per run and passed
//! by reference through every step; nothing is shared between runs.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::cache::{EntityCache, PendingSet};
use super::diagnostics::{DiagnosticCode, Diagnostics};
use super::document;
use super::relationship::RelationshipRegistry;
use crate::config::DiagramConfig;
use crate::model::{Attribute, Member, PendingState, RelationshipEdge, SchemaEntity};
use crate::parse::{
    logical_lines, strip_annotations, AttributeParser, Fragment, ParsedLine, SkipReason, Splitter,
};
use crate::resolve::{FileContext, NamespaceResolver, TypeResolver};
use crate::source::SourceProvider;
use crate::types::TypeTables;

/// Mutable state of a single rendering run
#[derive(Debug, Default)]
pub struct RenderContext {
    pub cache: EntityCache,
    pub registry: RelationshipRegistry,
    pub pending: PendingSet,
    pub diagnostics: Diagnostics,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Outcome of a rendering run
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    /// The complete fenced document
    pub document: String,
    /// Rendered entities in emission order
    pub entities: Vec<SchemaEntity>,
    /// Emitted edges in first-registration order
    pub edges: Vec<RelationshipEdge>,
    pub diagnostics: Diagnostics,
}

impl RenderReport {
    pub fn entity(&self, name: &str) -> Option<&SchemaEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn edge(&self, primary: &str, secondary: &str) -> Option<&RelationshipEdge> {
        self.edges
            .iter()
            .find(|e| e.primary == primary && e.secondary == secondary)
    }
}

/// Translates CDS sources into Mermaid class diagrams
pub struct DiagramRenderer<'a> {
    source: &'a dyn SourceProvider,
    config: DiagramConfig,
    splitter: Splitter,
    parser: AttributeParser,
    resolver: TypeResolver,
    namespaces: NamespaceResolver,
}

impl<'a> DiagramRenderer<'a> {
    pub fn new(source: &'a dyn SourceProvider, config: DiagramConfig) -> Self {
        let splitter = Splitter::new();
        let tables = TypeTables::with_config(&config.types);
        Self {
            source,
            config,
            parser: AttributeParser::new(),
            resolver: TypeResolver::new(tables),
            namespaces: NamespaceResolver::new(splitter.clone()),
            splitter,
        }
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    /// Render the file at `input`, searching its configured directory for
    /// cross-file references. An unreadable input renders an empty document.
    pub fn render_file(&self, input: &Path) -> RenderReport {
        let mut ctx = RenderContext::new();
        let text = match self.source.read(input) {
            Some(text) => text,
            None => {
                ctx.diagnostics.push(
                    DiagnosticCode::UnreadableSource,
                    None,
                    format!("cannot read {}, rendering empty diagram", input.display()),
                );
                String::new()
            }
        };

        let search_dir = self.config.search_dir_for(input);
        let candidates = self.source.list_files(&search_dir);
        debug!(input = %input.display(), candidates = candidates.len(), "rendering file");

        let title = if self.config.render.title {
            document::title_for(input)
        } else {
            None
        };
        self.run(ctx, Some(input.to_path_buf()), text, &candidates, title.as_deref())
    }

    /// Render every schema file of `dir`, one independent run per file
    pub fn render_directory(&self, dir: &Path) -> Vec<(PathBuf, RenderReport)> {
        self.source
            .list_files(dir)
            .into_iter()
            .map(|path| {
                let report = self.render_file(&path);
                (path, report)
            })
            .collect()
    }

    /// Render source text that did not come from a file
    pub fn render_text(&self, text: &str, candidates: &[PathBuf], title: Option<&str>) -> RenderReport {
        self.run(RenderContext::new(), None, text.to_string(), candidates, title)
    }

    fn run(
        &self,
        mut ctx: RenderContext,
        path: Option<PathBuf>,
        text: String,
        candidates: &[PathBuf],
        title: Option<&str>,
    ) -> RenderReport {
        let file = FileContext::new(path, text, &self.splitter);

        for fragment in self.splitter.split(file.text()) {
            self.render_fragment(&fragment, &file, &mut ctx);
            self.drain(candidates, &mut ctx);
        }
        self.drain(candidates, &mut ctx);

        let report = self.serialize(ctx, title);
        info!(
            entities = report.entities.len(),
            edges = report.edges.len(),
            diagnostics = report.diagnostics.len(),
            "diagram rendered"
        );
        report
    }

    /// Render one declaration into the cache unless it is already there
    fn render_fragment(&self, fragment: &Fragment, file: &FileContext, ctx: &mut RenderContext) {
        if ctx.cache.contains(&fragment.name) {
            debug!(entity = %fragment.name, "already rendered, reusing cached block");
            return;
        }

        let owner = fragment.name.as_str();
        let mut members = Vec::new();

        for line in fragment.body().map(logical_lines).unwrap_or_default() {
            match self.parser.parse(&line, owner) {
                ParsedLine::Element { name, raw_type } => {
                    let attribute = self.render_element(&line, owner, name, raw_type, file, ctx);
                    members.push(Member::Attribute(attribute));
                }
                ParsedLine::Verbatim(text) => members.push(Member::Verbatim { line: text }),
                ParsedLine::Skip(SkipReason::Unusable) => {
                    ctx.diagnostics.push(
                        DiagnosticCode::UnparsableLine,
                        Some(owner),
                        format!("skipped unusable line '{}'", line.trim()),
                    );
                }
                ParsedLine::Skip(_) => {}
            }
        }

        let entity = SchemaEntity {
            name: fragment.name.clone(),
            kind: fragment.kind,
            members,
            source_file: file.path().map(Path::to_path_buf),
        };
        let text = document::entity_block(&entity);
        debug!(entity = %entity.name, kind = %entity.kind, "rendered entity");
        ctx.cache.insert(entity, text);
    }

    fn render_element(
        &self,
        line: &str,
        owner: &str,
        name: String,
        raw_type: String,
        file: &FileContext,
        ctx: &mut RenderContext,
    ) -> Attribute {
        let resolution = self.resolver.resolve(&raw_type, file);

        if let Some(pending) = resolution.pending.clone() {
            if ctx.pending.add(pending) {
                debug!(entity = owner, type_name = %resolution.label, "queued cross-file reference");
            }
        } else if resolution.is_opaque(self.resolver.tables(), file) {
            ctx.diagnostics.push(
                DiagnosticCode::UnresolvedType,
                Some(owner),
                format!("type '{}' of '{}' is not a known type", resolution.label, name),
            );
        }

        let is_relationship = match &resolution.relation {
            Some(relation) => {
                let clause = strip_annotations(line).text;
                ctx.registry
                    .register(&clause, owner, &relation.entity, relation.kind)
                    .is_some()
            }
            None => false,
        };

        Attribute {
            name,
            raw_type,
            resolved_type: resolution.label,
            is_relationship,
        }
    }

    /// Resolve queued cross-file references until none is left undrained.
    /// Each referenced declaration renders against its own file.
    fn drain(&self, candidates: &[PathBuf], ctx: &mut RenderContext) {
        while let Some(reference) = ctx.pending.next_undrained() {
            let type_name = reference.type_name.as_str();

            if !ctx.cache.contains(type_name) {
                match self
                    .namespaces
                    .resolve(&reference.namespace, type_name, candidates, self.source)
                {
                    Some(found) => {
                        ctx.pending.mark(type_name, PendingState::Resolved);
                        debug!(type_name, file = %found.file.display(), "resolved cross-file reference");
                        let file = FileContext::new(Some(found.file), found.file_text, &self.splitter);
                        self.render_fragment(&found.fragment, &file, ctx);
                    }
                    None => {
                        ctx.diagnostics.push(
                            DiagnosticCode::UnresolvedType,
                            None,
                            format!(
                                "'{}.{}' not found in {} candidate file(s)",
                                reference.namespace,
                                type_name,
                                candidates.len()
                            ),
                        );
                    }
                }
            }

            ctx.pending.mark(type_name, PendingState::Drained);
        }
    }

    /// Assemble the document; edges to entities that never rendered are dropped
    fn serialize(&self, mut ctx: RenderContext, title: Option<&str>) -> RenderReport {
        let mut out = document::header(&self.config.render, title);
        for cached in ctx.cache.iter() {
            out.push_str(&cached.text);
        }

        let mut edges = Vec::with_capacity(ctx.registry.len());
        for edge in ctx.registry.edges() {
            if ctx.cache.contains(&edge.secondary) {
                out.push_str("  ");
                out.push_str(&edge.to_mermaid());
                out.push('\n');
                edges.push(edge.clone());
            } else {
                ctx.diagnostics.push(
                    DiagnosticCode::OrphanRelationship,
                    Some(edge.primary.as_str()),
                    format!("dropped edge to unrendered '{}'", edge.secondary),
                );
            }
        }
        out.push_str(document::FENCE_CLOSE);

        RenderReport {
            document: out,
            entities: ctx.cache.iter().map(|c| c.entity.clone()).collect(),
            edges,
            diagnostics: ctx.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::model::EntityKind;
    use crate::source::MemorySource;

    const BOOKSHOP: &str = "namespace bookshop;

entity Books {
  key ID : UUID;
  title  : String(111);
  author : Association to Authors;
}

entity Authors {
  key ID : UUID;
  books  : Association to many Books on books.author = $self;
}
";

    const SALES: &str = "namespace com.acme.sales;

entity Orders {
  key ID   : UUID;
  product  : Association to one com.acme.catalog.Product;
  customer : Association to Customers;
}

entity Customers {
  name : String(80);
}
";

    const CATALOG: &str = "namespace com.acme.catalog;

entity Product {
  key ID : UUID;
  price  : Decimal(9, 2);
  orders : Association to many com.acme.sales.Orders;
}
";

    fn untitled() -> DiagramConfig {
        let mut config = DiagramConfig::default();
        config.render.title = false;
        config
    }

    #[test]
    fn test_single_file_document() {
        let source = MemorySource::new();
        let renderer = DiagramRenderer::new(&source, untitled());
        let report = renderer.render_text(BOOKSHOP, &[], None);

        let expected = "```mermaid
---
config:
  look: neo
  layout: elk
  theme: dark
---
classDiagram
class Books {
  ID : UUID
  title : String
  author : Authors
}
class Authors {
  ID : UUID
  books : Books
}
  Books \"0..1\" --> \"1\" Authors : associates to
  Authors \"0..N\" --> \"1\" Books : associates to many
```
";
        assert_eq!(report.document, expected);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_cross_file_reference_is_drained() {
        let mut source = MemorySource::new();
        source.insert("db/sales.cds", SALES);
        source.insert("db/catalog.cds", CATALOG);

        let renderer = DiagramRenderer::new(&source, DiagramConfig::default());
        let report = renderer.render_file(Path::new("db/sales.cds"));

        let names: Vec<_> = report.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Orders", "Product", "Customers"]);
        assert_eq!(
            report.entity("Product").unwrap().source_file.as_deref(),
            Some(Path::new("db/catalog.cds"))
        );

        let lines: Vec<String> = report.edges.iter().map(|e| e.to_mermaid()).collect();
        assert_eq!(
            lines,
            vec![
                "Orders \"0..1\" --> \"1\" Product : associates to one",
                "Orders \"0..1\" --> \"1\" Customers : associates to",
                "Product \"0..N\" --> \"1\" Orders : associates to many",
            ]
        );
        assert!(report.document.contains("title: sales\n"));
        assert!(report.document.contains("class Product {\n  ID : UUID\n  price : Decimal\n  orders : Orders\n}\n"));
        // The cyclic reference back to Orders renders it only once
        assert_eq!(report.document.matches("class Orders {").count(), 1);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_minimal_cross_file_pair() {
        let mut source = MemorySource::new();
        source.insert(
            "f1.cds",
            "namespace com.acme.sales; entity Orders { product: Association to one com.acme.catalog.Product; }",
        );
        source.insert("f2.cds", "namespace com.acme.catalog; entity Product { id: Integer; }");

        let renderer = DiagramRenderer::new(&source, untitled());
        let candidates = vec![PathBuf::from("f1.cds"), PathBuf::from("f2.cds")];
        let text = source.read(Path::new("f1.cds")).unwrap();
        let report = renderer.render_text(&text, &candidates, None);

        assert_eq!(report.document.matches("class Orders {").count(), 1);
        assert_eq!(report.document.matches("class Product {\n  id : Integer\n}").count(), 1);
        assert_eq!(report.edges.len(), 1);
        assert_eq!(report.edges[0].to_mermaid(), "Orders \"0..1\" --> \"1\" Product : associates to one");
        assert_eq!(report.diagnostics.count(DiagnosticCode::OrphanRelationship), 0);
    }

    #[test]
    fn test_unresolved_reference_drops_edge() {
        let source = MemorySource::new();
        let renderer = DiagramRenderer::new(&source, untitled());
        let report = renderer.render_text(
            "namespace shop;\nentity Orders {\n  product : Association to com.missing.Product;\n}\n",
            &[],
            None,
        );

        assert!(report.document.contains("class Orders {\n  product : Product\n}\n"));
        assert!(report.edges.is_empty());
        assert!(!report.document.contains("-->"));
        assert_eq!(report.diagnostics.count(DiagnosticCode::UnresolvedType), 1);
        assert_eq!(report.diagnostics.count(DiagnosticCode::OrphanRelationship), 1);
    }

    #[test]
    fn test_unreadable_input_renders_empty_document() {
        let source = MemorySource::new();
        let renderer = DiagramRenderer::new(&source, DiagramConfig::default());
        let report = renderer.render_file(Path::new("db/missing.cds"));

        let expected = format!(
            "{}{}",
            document::header(&RenderConfig::default(), Some("missing")),
            document::FENCE_CLOSE
        );
        assert_eq!(report.document, expected);
        assert!(report.entities.is_empty());
        assert_eq!(report.diagnostics.count(DiagnosticCode::UnreadableSource), 1);
    }

    #[test]
    fn test_self_reference_has_no_edge() {
        let source = MemorySource::new();
        let renderer = DiagramRenderer::new(&source, untitled());
        let report = renderer.render_text(
            "entity Category {\n  name : String;\n  parent : Association to Category;\n}\n",
            &[],
            None,
        );

        assert!(report.edges.is_empty());
        let category = report.entity("Category").unwrap();
        let parent = category.attributes().find(|a| a.name == "parent").unwrap();
        assert_eq!(parent.resolved_type, "Category");
        assert!(!parent.is_relationship);
    }

    #[test]
    fn test_type_alias_and_unusable_line() {
        let source = MemorySource::new();
        let renderer = DiagramRenderer::new(&source, untitled());
        let report = renderer.render_text(
            "type Price : Decimal(9, 2);\nentity Books {\n  price : Price;\n  : String;\n}\n",
            &[],
            None,
        );

        assert_eq!(report.entity("Price").unwrap().kind, EntityKind::TypeAlias);
        assert!(report.document.contains("class Price {\n  <<type>>\n}\n"));
        assert!(report.document.contains("class Books {\n  price : Price\n}\n"));
        assert_eq!(report.diagnostics.count(DiagnosticCode::UnresolvedType), 0);
        assert_eq!(report.diagnostics.count(DiagnosticCode::UnparsableLine), 1);
    }

    #[test]
    fn test_multi_line_elements() {
        let source = MemorySource::new();
        let renderer = DiagramRenderer::new(&source, untitled());
        let report = renderer.render_text(
            "entity Books {\n  key ID : UUID;\n  author : Association to\n    Authors;\n}\n\nentity Authors {\n  key ID : UUID;\n  books  : Association to many Books\n           on books.author = $self;\n}\n",
            &[],
            None,
        );

        assert!(report.document.contains("class Books {\n  ID : UUID\n  author : Authors\n}\n"));
        assert!(report.document.contains("class Authors {\n  ID : UUID\n  books : Books\n}\n"));
        assert!(report.edge("Books", "Authors").is_some());
        let edge = report.edge("Authors", "Books").unwrap();
        assert_eq!(edge.connection_label, "associates to many");
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    }

    #[test]
    fn test_annotated_headers_and_views() {
        let source = MemorySource::new();
        let renderer = DiagramRenderer::new(&source, untitled());
        let report = renderer.render_text(
            "@title: 'Books' entity Books {\n  key ID : UUID;\n  author : Association to Authors;\n}\n@(restrict: [{ grant: 'READ', where: (x = 1) }]) entity Authors {\n  key ID : UUID;\n}\nentity V as SELECT from Books { ID, title };\n",
            &[],
            None,
        );

        let names: Vec<_> = report.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Authors"]);
        assert!(report.document.contains("class Authors {\n  ID : UUID\n}\n"));
        assert!(!report.document.contains("class V"));
        assert!(report.edge("Books", "Authors").is_some());
    }

    #[test]
    fn test_runs_are_independent() {
        let mut source = MemorySource::new();
        source.insert("db/sales.cds", SALES);
        source.insert("db/catalog.cds", CATALOG);
        let renderer = DiagramRenderer::new(&source, DiagramConfig::default());

        let first = renderer.render_file(Path::new("db/sales.cds"));
        let second = renderer.render_file(Path::new("db/sales.cds"));
        assert_eq!(first.document, second.document);

        let reports = renderer.render_directory(Path::new("db"));
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].0, PathBuf::from("db/catalog.cds"));
        let catalog = &reports[0].1;
        assert!(catalog.document.contains("title: catalog\n"));
        assert_eq!(catalog.entity("Orders").unwrap().source_file.as_deref(), Some(Path::new("db/sales.cds")));
    }
}
