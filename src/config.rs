//! Construction-time configuration
//!
//! A [`VisualizerConfig`] is normally deserialized from the JSON the
//! presentation layer sends when a session starts. Every field has a default,
//! so `{}` is a valid configuration.
//!
//! ```rust
//! use algoviz_core::config::{GraphKind, HeapOrder, VisualizerConfig};
//!
//! let config = VisualizerConfig::from_json_str(r#"{ "heap_order": "max" }"#).unwrap();
//! assert_eq!(config.heap_order, HeapOrder::Max);
//! assert_eq!(config.graph_kind, GraphKind::Undirected);
//! assert!(config.capture_snapshots);
//! ```

use serde::{Deserialize, Serialize};

/// Ordering mode of a [`BinaryHeap`](crate::binary_heap::BinaryHeap)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeapOrder {
    /// Smallest value at the root
    #[default]
    Min,
    /// Largest value at the root
    Max,
}

/// Edge semantics of a [`Graph`](crate::graph::Graph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    /// `add_edge(u, v)` also inserts `v -> u`
    #[default]
    Undirected,
    /// Edges are one-way
    Directed,
}

/// Settings shared by all structures of one visualization session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualizerConfig {
    /// Mode for heaps built with `with_config`
    pub heap_order: HeapOrder,
    /// Kind for graphs built with `with_config`
    pub graph_kind: GraphKind,
    /// Attach before/after snapshots to steps. Turning this off keeps the
    /// step sequence but drops the per-step copies.
    pub capture_snapshots: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            heap_order: HeapOrder::Min,
            graph_kind: GraphKind::Undirected,
            capture_snapshots: true,
        }
    }
}

impl VisualizerConfig {
    /// Parses a configuration from JSON
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
