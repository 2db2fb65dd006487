//! Data-structure core for an algorithm visualizer
//!
//! This crate provides the structures an algorithm visualizer animates. Every
//! operation returns the ordered [`Step`]s it took so a presentation layer can
//! render one frame per step.
//!
//! # Structures
//!
//! - **AVL tree** ([`AvlTree`]): O(log n) insert, delete and search; all four rotation cases
//! - **Binary heap** ([`BinaryHeap`]): O(log n) insert and extract-root, MIN or MAX ordering
//! - **Graph** ([`Graph`]): adjacency lists, lazy BFS/DFS, Dijkstra and Bellman-Ford with unreachable vertices at infinity
//!
//! All three implement [`Animated`], which drives a structure by operation
//! name with JSON arguments.
//!
//! # Example
//!
//! ```rust
//! use algoviz_core::{AvlTree, StepKind};
//!
//! let mut tree = AvlTree::new();
//! tree.insert(10).unwrap();
//! tree.insert(20).unwrap();
//! let steps = tree.insert(30).unwrap();
//!
//! assert_eq!(tree.root(), Some(&20));
//! assert!(steps.iter().any(|s| matches!(s.kind, StepKind::Rotate { .. })));
//! ```

pub mod avl;
pub mod binary_heap;
pub mod config;
pub mod error;
pub mod graph;
pub mod step;
pub mod traits;

// Re-export the main types for convenience
pub use avl::{AvlTree, TreeSnapshot};
pub use binary_heap::BinaryHeap;
pub use config::{GraphKind, HeapOrder, VisualizerConfig};
pub use error::{Result, StructureError};
pub use graph::{Distance, Graph, PathResult, ShortestPaths};
pub use step::{Imbalance, Side, Step, StepKind, StepLog};
pub use traits::{Animated, Applied};
