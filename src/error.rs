//! Error type shared by every structure in this crate
//!
//! All variants describe a violated caller precondition. None of them are
//! transient, so nothing here is retried internally: the structure is left
//! exactly as it was before the failing call and the error is handed back.

use thiserror::Error;

/// Error returned by structure operations and by [`Animated::apply`](crate::Animated::apply)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    /// The key is already stored in the tree
    #[error("key {0} is already present")]
    DuplicateKey(String),

    /// The key is not stored in the tree
    #[error("key {0} is not present")]
    KeyNotFound(String),

    /// Root access on a heap with no elements
    #[error("heap is empty")]
    EmptyHeap,

    /// A vertex named by the caller does not exist
    #[error("vertex {0} is not in the graph")]
    VertexNotFound(String),

    /// Dijkstra reached an edge with a negative weight
    #[error("edge {from} -> {to} has negative weight {weight}")]
    NegativeWeight {
        /// Source vertex of the offending edge
        from: String,
        /// Target vertex of the offending edge
        to: String,
        /// The weight, rendered with `Debug`
        weight: String,
    },

    /// Bellman-Ford found a negative cycle reachable from the source
    #[error("negative cycle reachable through vertex {0}")]
    NegativeCycle(String),

    /// A path cost does not fit in the weight type
    #[error("path cost overflows on edge {from} -> {to}")]
    CostOverflow {
        /// Source vertex of the edge being relaxed
        from: String,
        /// Target vertex of the edge being relaxed
        to: String,
    },

    /// `apply` was called with a name the structure does not understand
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// `apply` arguments could not be decoded for the named operation
    #[error("invalid arguments for `{operation}`: {reason}")]
    InvalidArguments {
        /// Operation name as passed to `apply`
        operation: String,
        /// Decoder message
        reason: String,
    },
}

impl StructureError {
    pub(crate) fn duplicate_key<K: std::fmt::Debug>(key: &K) -> Self {
        StructureError::DuplicateKey(format!("{key:?}"))
    }

    pub(crate) fn key_not_found<K: std::fmt::Debug>(key: &K) -> Self {
        StructureError::KeyNotFound(format!("{key:?}"))
    }

    pub(crate) fn vertex_not_found<V: std::fmt::Debug>(id: &V) -> Self {
        StructureError::VertexNotFound(format!("{id:?}"))
    }
}

/// Convenience alias used throughout the crate
pub type Result<T, E = StructureError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_render_debug_form() {
        assert_eq!(
            StructureError::duplicate_key(&7).to_string(),
            "key 7 is already present"
        );
        assert_eq!(
            StructureError::vertex_not_found(&"A").to_string(),
            "vertex \"A\" is not in the graph"
        );
        assert_eq!(StructureError::EmptyHeap.to_string(), "heap is empty");
    }
}
