//! Mermaid document assembly
//!
//! The output is a fenced Markdown block: front-matter with layout and
//! theme options, a `classDiagram` declaration, entity blocks and edges.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::model::{EntityKind, Member, SchemaEntity};

pub const FENCE_OPEN: &str = "```mermaid\n";
pub const FENCE_CLOSE: &str = "```\n";

/// Opening fence, front-matter and diagram declaration
pub fn header(config: &RenderConfig, title: Option<&str>) -> String {
    let mut out = String::from(FENCE_OPEN);
    out.push_str("---\n");
    if let Some(title) = title {
        out.push_str(&format!("title: {}\n", title));
    }
    out.push_str("config:\n");
    out.push_str(&format!("  look: {}\n", config.look));
    out.push_str(&format!("  layout: {}\n", config.layout));
    out.push_str(&format!("  theme: {}\n", config.theme));
    out.push_str("---\n");
    out.push_str("classDiagram\n");
    out
}

/// Title for a document rendered from `input`: the file name without `.cds`
pub fn title_for(input: &Path) -> Option<String> {
    let name = input.file_name()?.to_string_lossy();
    let stem = name.strip_suffix(".cds").unwrap_or(&name);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Class block for one entity
pub fn entity_block(entity: &SchemaEntity) -> String {
    let mut out = format!("class {} {{\n", entity.name);
    if entity.kind == EntityKind::TypeAlias {
        out.push_str("  <<type>>\n");
    }
    for member in &entity.members {
        match member {
            Member::Attribute(attr) => {
                out.push_str(&format!("  {} : {}\n", attr.name, attr.resolved_type));
            }
            Member::Verbatim { line } => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out.push_str("}\n");
    out
}

/// Create or truncate `path`, then write `document` into it
pub fn write_document(path: &Path, document: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(document.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    #[test]
    fn test_header_with_title() {
        let text = header(&RenderConfig::default(), Some("orders"));
        assert_eq!(
            text,
            "```mermaid\n---\ntitle: orders\nconfig:\n  look: neo\n  layout: elk\n  theme: dark\n---\nclassDiagram\n"
        );
        assert!(!header(&RenderConfig::default(), None).contains("title:"));
    }

    #[test]
    fn test_title_from_file_name() {
        assert_eq!(title_for(Path::new("db/sales-schema.cds")).as_deref(), Some("sales-schema"));
        assert_eq!(title_for(Path::new("model")).as_deref(), Some("model"));
        assert_eq!(title_for(Path::new("/")), None);
    }

    #[test]
    fn test_entity_blocks() {
        let entity = SchemaEntity {
            name: "Books".to_string(),
            kind: EntityKind::Entity,
            members: vec![
                Member::Attribute(Attribute {
                    name: "ID".to_string(),
                    raw_type: "UUID".to_string(),
                    resolved_type: "UUID".to_string(),
                    is_relationship: false,
                }),
                Member::Verbatim {
                    line: "    free text".to_string(),
                },
            ],
            source_file: None,
        };
        assert_eq!(entity_block(&entity), "class Books {\n  ID : UUID\n    free text\n}\n");

        let alias = SchemaEntity {
            name: "Price".to_string(),
            kind: EntityKind::TypeAlias,
            members: Vec::new(),
            source_file: None,
        };
        assert_eq!(entity_block(&alias), "class Price {\n  <<type>>\n}\n");
    }

    #[test]
    fn test_write_document_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        std::fs::write(&path, "stale content from an earlier run that is longer").unwrap();
        write_document(&path, "```mermaid\n```\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "```mermaid\n```\n");
    }
}
