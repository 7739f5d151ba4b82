//! Type tables
//!
//! Fixed lookup tables mapping CDS built-in type keywords and project
//! reuse types to the labels shown in diagrams.

use std::collections::HashMap;

use crate::config::TypeConfig;

/// Built-in CDS types and their canonical labels
const PRIMITIVES: &[(&str, &str)] = &[
    ("UUID", "UUID"),
    ("Boolean", "Boolean"),
    ("Integer", "Integer"),
    ("Int16", "Int16"),
    ("Int32", "Int32"),
    ("Int64", "Int64"),
    ("UInt8", "UInt8"),
    ("Integer64", "Int64"),
    ("Decimal", "Decimal"),
    ("DecimalFloat", "Decimal"),
    ("Double", "Double"),
    ("Date", "Date"),
    ("Time", "Time"),
    ("DateTime", "DateTime"),
    ("Timestamp", "Timestamp"),
    ("String", "String"),
    ("LargeString", "LargeString"),
    ("Binary", "Binary"),
    ("LargeBinary", "LargeBinary"),
    ("Vector", "Vector"),
    ("Map", "Map"),
];

/// Reuse types shipped with the common model
const PROJECT_TYPES: &[(&str, &str)] = &[
    ("Currency", "Currency"),
    ("Country", "Country"),
    ("Language", "Language"),
    ("Timezone", "Timezone"),
    ("User", "User"),
];

/// Lookup tables for primitive and project type names
#[derive(Debug, Clone)]
pub struct TypeTables {
    primitives: HashMap<String, String>,
    project: HashMap<String, String>,
}

impl Default for TypeTables {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTables {
    /// Built-in tables
    pub fn new() -> Self {
        let mut primitives = HashMap::with_capacity(PRIMITIVES.len() * 2);
        for (name, label) in PRIMITIVES {
            primitives.insert(name.to_string(), label.to_string());
            primitives.insert(format!("cds.{}", name), label.to_string());
        }

        let project = PROJECT_TYPES
            .iter()
            .map(|(name, label)| (name.to_string(), label.to_string()))
            .collect();

        Self { primitives, project }
    }

    /// Built-in tables extended with configured project types
    pub fn with_config(config: &TypeConfig) -> Self {
        let mut tables = Self::new();
        for (name, label) in &config.project {
            tables.project.insert(name.clone(), label.clone());
        }
        tables
    }

    /// Canonical label of a primitive type keyword
    pub fn primitive(&self, name: &str) -> Option<&str> {
        self.primitives.get(name).map(String::as_str)
    }

    /// Label of a project/domain type name
    pub fn project(&self, name: &str) -> Option<&str> {
        self.project.get(name).map(String::as_str)
    }

    /// Primitive first, then project
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.primitive(name).or_else(|| self.project(name))
    }

    pub fn is_primitive(&self, name: &str) -> bool {
        self.primitives.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_lookup() {
        let tables = TypeTables::new();
        assert_eq!(tables.primitive("String"), Some("String"));
        assert_eq!(tables.primitive("cds.Integer"), Some("Integer"));
        assert_eq!(tables.primitive("Integer64"), Some("Int64"));
        assert_eq!(tables.primitive("Strings"), None);
        assert_eq!(tables.primitive("string"), None);
    }

    #[test]
    fn test_project_lookup_after_primitives() {
        let tables = TypeTables::new();
        assert_eq!(tables.lookup("Currency"), Some("Currency"));
        assert!(!tables.is_primitive("Currency"));
        assert_eq!(tables.lookup("Orders"), None);
    }

    #[test]
    fn test_configured_project_types() {
        let mut config = TypeConfig::default();
        config.project.insert("Taxonomy".to_string(), "CategoryTaxonomy".to_string());
        let tables = TypeTables::with_config(&config);
        assert_eq!(tables.project("Taxonomy"), Some("CategoryTaxonomy"));
        assert_eq!(tables.project("Currency"), Some("Currency"));
    }
}
