/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for parser construction and reference resolution.

use thiserror::Error;

/// Boxed error returned by getters and post-parsers.
pub type GetterError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building a parser or resolving references.
#[derive(Debug, Error)]
pub enum PropRefError {
    /// Invalid options (missing getter, bad syntax, regex that does not compile).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The getter failed for a resolved key.
    #[error("Failed to resolve reference '{key}': {source}")]
    Resolution {
        key: String,
        #[source]
        source: GetterError,
    },

    /// A key was referenced again while it was still being resolved.
    #[error("Cyclic reference detected for '{key}' (chain: {})", .chain.join(" -> "))]
    CyclicReference { key: String, chain: Vec<String> },

    /// The chain of nested references grew deeper than allowed.
    #[error("Reference chain too deep (depth > {max_depth}) while resolving '{key}'")]
    DepthExceeded { key: String, max_depth: usize },

    /// The post-parser failed on a fully substituted string.
    #[error("Post-parser failed at '{context}': {source}")]
    PostParse {
        context: String,
        #[source]
        source: GetterError,
    },
}

impl PropRefError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        PropRefError::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for property reference operations.
pub type PropRefResult<T> = Result<T, PropRefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_message_lists_chain() {
        let err = PropRefError::CyclicReference {
            key: "a".to_string(),
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Cyclic reference detected for 'a' (chain: a -> b -> a)"
        );
    }

    #[test]
    fn test_resolution_keeps_source() {
        let err = PropRefError::Resolution {
            key: "db.host".to_string(),
            source: "connection refused".into(),
        };
        assert!(err.to_string().contains("db.host"));
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()),
            Some("connection refused".to_string())
        );
    }
}
