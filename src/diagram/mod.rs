//! Mermaid Class Diagram Generation
//!
//! One rendering run owns its entity cache, relationship registry, pending
//! work-list and diagnostics (see [`render::RenderContext`]). Runs share no
//! state, so a renderer can be reused for any number of inputs.

pub mod cache;
pub mod diagnostics;
pub mod document;
pub mod relationship;
pub mod render;

pub use cache::{CachedEntity, EntityCache, PendingSet};
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use document::{entity_block, header, title_for, write_document};
pub use relationship::RelationshipRegistry;
pub use render::{DiagramRenderer, RenderContext, RenderReport};
