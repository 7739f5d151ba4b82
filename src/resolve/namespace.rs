//! Cross-file Namespace Resolution
//!
//! Finds the declaration of `namespace.Type` among a list of candidate
//! files. Files are read one at a time, in order; the first matching
//! declaration wins.

use std::path::PathBuf;

use tracing::debug;

use crate::parse::{Fragment, Splitter};
use crate::source::SourceProvider;

/// A declaration found in another file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFragment {
    pub fragment: Fragment,
    pub file: PathBuf,
    /// Full text of `file`, the parsing context for the fragment
    pub file_text: String,
}

/// Searches candidate files for namespace-qualified declarations
#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
    splitter: Splitter,
}

impl NamespaceResolver {
    pub fn new(splitter: Splitter) -> Self {
        Self { splitter }
    }

    /// Look up `type_name` declared under `namespace`.
    ///
    /// A file is accepted when its declared namespace ends with the
    /// requested one on a segment boundary, so `acme.catalog` matches a
    /// file declaring `com.acme.catalog`. Returns `None` when no accepted
    /// file declares the type.
    pub fn resolve(
        &self,
        namespace: &str,
        type_name: &str,
        candidates: &[PathBuf],
        source: &dyn SourceProvider,
    ) -> Option<ResolvedFragment> {
        for path in candidates {
            let Some(text) = source.read(path) else {
                continue;
            };
            let Some(declared) = self.splitter.namespace_of(&text) else {
                continue;
            };
            if !namespace_matches(&declared, namespace) {
                continue;
            }

            debug!(file = %path.display(), namespace, type_name, "searching candidate file");
            if let Some(fragment) = self
                .splitter
                .split(&text)
                .into_iter()
                .find(|fragment| fragment.name == type_name)
            {
                return Some(ResolvedFragment {
                    fragment,
                    file: path.clone(),
                    file_text: text,
                });
            }
        }

        None
    }
}

/// Whether a file declaring `declared` satisfies a request for `requested`
pub fn namespace_matches(declared: &str, requested: &str) -> bool {
    if requested.is_empty() {
        return false;
    }
    declared == requested
        || declared
            .strip_suffix(requested)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    const CATALOG: &str = "namespace com.acme.catalog;\nentity Product { id : Integer; }\ntype Sku : String(20);";
    const CATALOG_EXTRA: &str = "namespace com.acme.catalog;\nentity Supplier { name : String; }";
    const SALES: &str = "namespace com.acme.sales;\nentity Product { legacy : Boolean; }";

    fn source() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert("db/sales.cds", SALES);
        source.insert("db/catalog.cds", CATALOG);
        source.insert("db/catalog-extra.cds", CATALOG_EXTRA);
        source
    }

    fn candidates() -> Vec<PathBuf> {
        ["db/sales.cds", "db/catalog.cds", "db/catalog-extra.cds"]
            .iter()
            .map(PathBuf::from)
            .collect()
    }

    #[test]
    fn test_namespace_suffix_matching() {
        assert!(namespace_matches("com.acme.catalog", "com.acme.catalog"));
        assert!(namespace_matches("com.acme.catalog", "acme.catalog"));
        assert!(!namespace_matches("com.acme.catalog", "me.catalog"));
        assert!(!namespace_matches("com.acme.catalog", "com.acme"));
        assert!(!namespace_matches("com.acme.catalog", ""));
    }

    #[test]
    fn test_resolves_in_matching_namespace_only() {
        let resolver = NamespaceResolver::default();
        let found = resolver
            .resolve("com.acme.catalog", "Product", &candidates(), &source())
            .unwrap();
        assert_eq!(found.file, PathBuf::from("db/catalog.cds"));
        assert!(found.fragment.text.contains("id : Integer"));
        assert_eq!(found.file_text, CATALOG);
    }

    #[test]
    fn test_resolves_type_alias_and_shorter_request() {
        let resolver = NamespaceResolver::default();
        let found = resolver
            .resolve("acme.catalog", "Sku", &candidates(), &source())
            .unwrap();
        assert_eq!(found.fragment.name, "Sku");
    }

    #[test]
    fn test_search_continues_to_later_files_of_namespace() {
        let resolver = NamespaceResolver::default();
        let found = resolver
            .resolve("com.acme.catalog", "Supplier", &candidates(), &source())
            .unwrap();
        assert_eq!(found.file, PathBuf::from("db/catalog-extra.cds"));
    }

    #[test]
    fn test_unresolved_is_none() {
        let resolver = NamespaceResolver::default();
        assert!(resolver
            .resolve("com.acme.catalog", "Missing", &candidates(), &source())
            .is_none());
        assert!(resolver
            .resolve("com.other", "Product", &candidates(), &source())
            .is_none());
        // Unreadable candidates are skipped
        let missing = vec![PathBuf::from("db/nowhere.cds")];
        assert!(resolver
            .resolve("com.acme.catalog", "Product", &missing, &source())
            .is_none());
    }
}
