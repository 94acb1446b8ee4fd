//! Error types for the document model

use crate::document::DocumentKind;

/// Errors while decoding or encoding documents
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Content is not a valid document of the expected kind
    #[error("invalid {kind} JSON: {source}")]
    Deserialize {
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    /// Document could not be encoded
    #[error("failed to serialize {kind}: {source}")]
    Serialize {
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    /// Unrecognised document kind name
    #[error("invalid object type: {0}")]
    UnknownKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_display() {
        let err = ModelError::UnknownKind("slo".to_string());
        assert_eq!(err.to_string(), "invalid object type: slo");
    }

    #[test]
    fn deserialize_error_names_kind() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ModelError::Deserialize {
            kind: DocumentKind::Monitor,
            source,
        };
        assert!(err.to_string().starts_with("invalid monitor JSON"));
    }
}
