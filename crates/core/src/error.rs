//! Error types for the import engine: per-node mapping and store failures
//! roll up into [`CoreError`].

use crate::associations::AssociationKind;
use crate::types::{NaturalKey, RecordType};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Mapping failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("Dangling reference: no {kind} node registered for {key}")]
    DanglingReference {
        kind: AssociationKind,
        key: NaturalKey,
    },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Fragment render failed: {0}")]
    Render(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Malformed export document: {0}")]
    FatalStructure(String),
}

impl CoreError {
    /// Short machine-readable name used in run reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::DanglingReference { .. } => "dangling_reference",
            Self::Persistence(_) => "persistence",
            Self::Render(_) => "render",
            Self::Validation(_) => "validation",
            Self::FatalStructure(_) => "fatal_structure",
        }
    }
}

/// Failures turning a node's fields into target attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("unrecognized status label '{0}'")]
    UnknownStatus(String),

    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{field}' is not an integer: '{value}'")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field '{field}' is not an RFC 2822 date: '{value}'")]
    InvalidDate { field: &'static str, value: String },
}

/// Failures reported by a persistence or identity collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{record_type} is missing attribute '{attribute}'")]
    MissingAttribute {
        record_type: RecordType,
        attribute: String,
    },

    #[error("{record_type} rejected: {reason}")]
    Rejected {
        record_type: RecordType,
        reason: String,
    },

    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_error_display() {
        let err = CoreError::from(MappingError::UnknownStatus("pending".to_string()));
        assert_eq!(
            err.to_string(),
            "Mapping failed: unrecognized status label 'pending'"
        );
        assert_eq!(err.kind(), "mapping");
    }

    #[test]
    fn dangling_reference_display() {
        let err = CoreError::DanglingReference {
            kind: AssociationKind::Tag,
            key: NaturalKey::new("foo", "Foo"),
        };
        assert_eq!(
            err.to_string(),
            "Dangling reference: no tag node registered for foo/Foo"
        );
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::MissingAttribute {
            record_type: RecordType::Tag,
            attribute: "slug".to_string(),
        };
        assert_eq!(err.to_string(), "tag is missing attribute 'slug'");
    }
}
