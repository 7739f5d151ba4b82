//! CDS Diagrams
//!
//! Translates CDS-style schema definitions into Mermaid class diagrams:
//! one class block per entity or type alias, one edge per related pair of
//! entities, with qualified references followed into sibling files.
//!
//! ## Pipeline
//!
//! ```text
//! source file
//!   └─ Splitter ──────────── entity / type fragments
//!        └─ AttributeParser ─ (name, raw type) per body line
//!             └─ TypeResolver ─ label, relation, pending lookup
//!                  ├─ RelationshipRegistry ─ deduplicated edges
//!                  └─ NamespaceResolver ──── declarations in other files
//!   └─ document ─────────── fenced `classDiagram`
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use cds_diagrams::{DiagramConfig, DiagramRenderer, FsSource};
//!
//! let config = DiagramConfig::load()?;
//! let source = FsSource::new(config.source.convention);
//! let renderer = DiagramRenderer::new(&source, config);
//! let report = renderer.render_file(Path::new("db/schema.cds"));
//! println!("{}", report.document);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod diagram;
pub mod error;
pub mod model;
pub mod parse;
pub mod resolve;
pub mod source;
pub mod types;

pub use config::{DiagramConfig, FileConvention};
pub use diagram::{DiagnosticCode, Diagnostics, DiagramRenderer, RenderReport};
pub use error::{DiagramError, Result};
pub use model::{Attribute, Cardinality, EdgeKind, EntityKind, RelationshipEdge, SchemaEntity};
pub use source::{FsSource, MemorySource, SourceProvider};
pub use types::TypeTables;
