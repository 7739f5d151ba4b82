//! Diagnostics
//!
//! Advisory findings collected during a rendering run. None of them stop
//! the run; each is logged when recorded and returned with the report.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A source file could not be read; treated as empty
    UnreadableSource,
    /// A body line could not be reduced to an element; skipped
    UnparsableLine,
    /// A type matched no table and no declaration; rendered as written
    UnresolvedType,
    /// A relationship target was never rendered; edge dropped
    OrphanRelationship,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnreadableSource => "W001",
            Self::UnparsableLine => "W002",
            Self::OrphanRelationship => "W003",
            Self::UnresolvedType => "I001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnreadableSource | Self::UnparsableLine | Self::OrphanRelationship => {
                Severity::Warning
            }
            Self::UnresolvedType => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    /// Entity being rendered when the finding was made
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entity {
            Some(entity) => write!(
                f,
                "{}[{}] {}: {}",
                self.code.severity(),
                self.code,
                entity,
                self.message
            ),
            None => write!(f, "{}[{}] {}", self.code.severity(), self.code, self.message),
        }
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Ordered collection of diagnostics for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a finding
    pub fn push(&mut self, code: DiagnosticCode, entity: Option<&str>, message: impl Into<String>) {
        let item = Diagnostic {
            code,
            entity: entity.map(str::to_string),
            message: message.into(),
        };
        match code.severity() {
            Severity::Warning => warn!(code = code.as_str(), entity = ?item.entity, "{}", item.message),
            Severity::Info => info!(code = code.as_str(), entity = ?item.entity, "{}", item.message),
        }
        self.items.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.items.iter().filter(|d| d.code == code).count()
    }

    pub fn has_warnings(&self) -> bool {
        self.items
            .iter()
            .any(|d| d.code.severity() == Severity::Warning)
    }
}
