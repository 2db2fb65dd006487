//! AVL tree with step recording
//!
//! Nodes live in a [`slotmap`] arena and refer to their children by
//! [`NodeId`] handle, so rotations and deletions only rewrite handles. Insert,
//! delete, search and in-order traversal are all iterative: the descent path
//! is kept in an owned `Vec` and retraced bottom-up, never through recursion.
//!
//! # Heights
//!
//! The height of an empty subtree is -1 and a leaf has height 0. Heights are
//! recomputed bottom-up along the retraced path after every structural
//! change, including inside each rotation.
//!
//! # Rebalancing
//!
//! A node whose balance factor leaves [-1, 1] is repaired by comparing it with
//! the balance factor of its heavier child:
//!
//! | node | heavier child | case | rotations |
//! |------|---------------|------|-----------|
//! | > 1  | >= 0          | LL   | right |
//! | > 1  | < 0           | LR   | left on child, right on node |
//! | < -1 | <= 0          | RR   | left |
//! | < -1 | > 0           | RL   | right on child, left on node |
//!
//! # Example
//!
//! ```rust
//! use algoviz_core::avl::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key).unwrap();
//! }
//! assert_eq!(tree.root(), Some(&20));
//! assert_eq!(tree.in_order().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
//! ```

use crate::config::VisualizerConfig;
use crate::error::{Result, StructureError};
use crate::step::{Imbalance, Side, Step, StepKind, StepLog};
use crate::traits::{Animated, Applied};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use tracing::{debug, trace};

new_key_type! {
    /// Arena handle of a tree node
    pub struct NodeId;
}

/// Step type recorded by [`AvlTree`]
pub type AvlStep<K> = Step<K, TreeSnapshot<K>>;

#[derive(Debug, Clone)]
struct Node<K> {
    key: K,
    height: i32,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<K> Node<K> {
    fn leaf(key: K) -> Self {
        Node {
            key,
            height: 0,
            left: None,
            right: None,
        }
    }
}

type Arena<K> = SlotMap<NodeId, Node<K>>;

/// A link to rewrite: the root (`None`) or one child slot of a node
type Slot = Option<(NodeId, Side)>;

fn height_of<K>(nodes: &Arena<K>, id: Option<NodeId>) -> i32 {
    id.map_or(-1, |id| nodes[id].height)
}

fn balance_of<K>(nodes: &Arena<K>, id: NodeId) -> i32 {
    let node = &nodes[id];
    height_of(nodes, node.left) - height_of(nodes, node.right)
}

/// One node of a [`TreeSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotNode<K> {
    /// Stored key
    pub key: K,
    /// Height, leaf = 0
    pub height: i32,
    /// height(left) - height(right)
    pub balance: i32,
    /// Index of the left child in [`TreeSnapshot::nodes`]
    pub left: Option<usize>,
    /// Index of the right child in [`TreeSnapshot::nodes`]
    pub right: Option<usize>,
}

/// Flat pre-order copy of a (sub)tree, root at index 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeSnapshot<K> {
    /// Nodes in pre-order
    pub nodes: Vec<SnapshotNode<K>>,
}

impl<K> TreeSnapshot<K> {
    /// Snapshot of an empty subtree
    pub fn empty() -> Self {
        TreeSnapshot { nodes: Vec::new() }
    }

    /// The subtree root, if any
    pub fn root(&self) -> Option<&SnapshotNode<K>> {
        self.nodes.first()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for an empty subtree
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn snapshot_subtree<K: Clone>(nodes: &Arena<K>, root: Option<NodeId>) -> TreeSnapshot<K> {
    let mut out: Vec<SnapshotNode<K>> = Vec::new();
    // (node, parent index in `out` and the side it hangs from)
    let mut stack: Vec<(NodeId, Option<(usize, Side)>)> =
        root.into_iter().map(|id| (id, None)).collect();

    while let Some((id, parent)) = stack.pop() {
        let node = &nodes[id];
        let index = out.len();
        out.push(SnapshotNode {
            key: node.key.clone(),
            height: node.height,
            balance: balance_of(nodes, id),
            left: None,
            right: None,
        });
        match parent {
            Some((p, Side::Left)) => out[p].left = Some(index),
            Some((p, Side::Right)) => out[p].right = Some(index),
            None => {}
        }
        // right first so the left subtree comes out first
        if let Some(right) = node.right {
            stack.push((right, Some((index, Side::Right))));
        }
        if let Some(left) = node.left {
            stack.push((left, Some((index, Side::Left))));
        }
    }

    TreeSnapshot { nodes: out }
}

/// Summary counters, as shown next to the rendered tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Number of stored keys
    pub nodes: usize,
    /// Height of the tree, -1 when empty
    pub height: i32,
    /// Successful inserts and deletes since construction or reset
    pub operations: u64,
}

/// Self-balancing binary search tree that records its steps
///
/// Keys are unique: inserting a key that is already present fails with
/// [`StructureError::DuplicateKey`].
#[derive(Clone)]
pub struct AvlTree<K> {
    nodes: Arena<K>,
    root: Option<NodeId>,
    log: StepLog<K, TreeSnapshot<K>>,
    operations: u64,
}

impl<K> AvlTree<K> {
    /// Creates an empty tree that captures step snapshots
    pub fn new() -> Self {
        Self::with_config(&VisualizerConfig::default())
    }

    /// Creates an empty tree using `config.capture_snapshots`
    pub fn with_config(config: &VisualizerConfig) -> Self {
        AvlTree {
            nodes: SlotMap::with_key(),
            root: None,
            log: StepLog::new(config.capture_snapshots),
            operations: 0,
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no key is stored
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree: -1 when empty, 0 for a single node
    pub fn height(&self) -> i32 {
        height_of(&self.nodes, self.root)
    }

    /// Key at the root
    pub fn root(&self) -> Option<&K> {
        self.root.map(|id| &self.nodes[id].key)
    }

    /// Smallest key
    pub fn min(&self) -> Option<&K> {
        let mut id = self.root?;
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        Some(&self.nodes[id].key)
    }

    /// Largest key
    pub fn max(&self) -> Option<&K> {
        let mut id = self.root?;
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        Some(&self.nodes[id].key)
    }

    /// Keys in ascending order
    pub fn in_order(&self) -> InOrder<'_, K> {
        InOrder {
            nodes: &self.nodes,
            stack: Vec::new(),
            cursor: self.root,
        }
    }

    /// Node count, height and operation counter
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            nodes: self.len(),
            height: self.height(),
            operations: self.operations,
        }
    }

    /// Every step recorded since construction or the last reset
    pub fn steps(&self) -> &[AvlStep<K>] {
        self.log.steps()
    }

    /// Removes every key and clears the step log
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.log.clear();
        self.operations = 0;
    }

    fn update_height(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let height = 1 + height_of(&self.nodes, node.left).max(height_of(&self.nodes, node.right));
        self.nodes[id].height = height;
    }

    fn attach(&mut self, slot: Slot, child: Option<NodeId>) {
        match slot {
            None => self.root = child,
            Some((parent, Side::Left)) => self.nodes[parent].left = child,
            Some((parent, Side::Right)) => self.nodes[parent].right = child,
        }
    }
}

impl<K: Ord> AvlTree<K> {
    /// True if `key` is stored
    pub fn contains(&self, key: &K) -> bool {
        self.search(key).any(|hop| hop.is_match())
    }

    /// Lazily walks from the root toward `key`
    ///
    /// Yields one [`Comparison`] per visited node and stops after the node holding
    /// `key` (whose comparison has [`Ordering::Equal`]) or when the next child is
    /// empty. Each call starts a fresh walk and the tree is not modified.
    pub fn search<'a>(&'a self, key: &'a K) -> SearchPath<'a, K> {
        SearchPath {
            nodes: &self.nodes,
            cursor: self.root,
            target: key,
        }
    }
}

impl<K: Ord + Clone + fmt::Debug> AvlTree<K> {
    /// Inserts `key`, rebalancing on the way back up
    ///
    /// Returns one `Descend` step per comparison, a `CreateNode` step, one
    /// `CheckBalance` step per ancestor, and one `Rotate` step per rotation.
    ///
    /// # Errors
    /// [`StructureError::DuplicateKey`] if `key` is already stored. The tree
    /// and its log are left untouched.
    pub fn insert(&mut self, key: K) -> Result<Vec<AvlStep<K>>> {
        let mark = self.log.mark();
        let mut path: Vec<(NodeId, Side)> = Vec::new();
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let node = &self.nodes[id];
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    self.log.rollback(mark);
                    debug!(key = ?key, "insert rejected: duplicate key");
                    return Err(StructureError::duplicate_key(&key));
                }
            };
            self.log
                .note(StepKind::Descend { side }, [node.key.clone(), key.clone()]);
            path.push((id, side));
            cursor = match side {
                Side::Left => node.left,
                Side::Right => node.right,
            };
        }

        let id = self.nodes.insert(Node::leaf(key.clone()));
        self.attach(path.last().copied(), Some(id));
        let after = self.log.capture(|| snapshot_subtree(&self.nodes, Some(id)));
        self.log.push(StepKind::CreateNode, [key], None, after);

        self.retrace(&path);
        self.operations += 1;
        debug!(len = self.len(), height = self.height(), "insert complete");
        Ok(self.log.since(mark))
    }

    /// Removes `key`, rebalancing on the way back up
    ///
    /// A leaf is dropped, a node with one child is replaced by that child, and
    /// a node with two children takes the key of its in-order successor,
    /// whose node is then unlinked.
    ///
    /// # Errors
    /// [`StructureError::KeyNotFound`] if `key` is absent. The tree and its
    /// log are left untouched.
    pub fn delete(&mut self, key: &K) -> Result<Vec<AvlStep<K>>> {
        let mark = self.log.mark();
        let mut path: Vec<(NodeId, Side)> = Vec::new();
        let mut cursor = self.root;

        let target = loop {
            let Some(id) = cursor else {
                self.log.rollback(mark);
                debug!(key = ?key, "delete rejected: key not found");
                return Err(StructureError::key_not_found(key));
            };
            let node = &self.nodes[id];
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    self.log.note(StepKind::Found, [node.key.clone()]);
                    break id;
                }
            };
            self.log
                .note(StepKind::Descend { side }, [node.key.clone(), key.clone()]);
            path.push((id, side));
            cursor = match side {
                Side::Left => node.left,
                Side::Right => node.right,
            };
        };

        let before = self.log.capture(|| snapshot_subtree(&self.nodes, Some(target)));
        let node = &self.nodes[target];
        match (node.left, node.right) {
            (Some(_), Some(right)) => {
                path.push((target, Side::Right));
                let mut successor = right;
                while let Some(left) = self.nodes[successor].left {
                    path.push((successor, Side::Left));
                    successor = left;
                }
                let successor_right = self.nodes[successor].right;
                self.attach(path.last().copied(), successor_right);
                if let Some(removed) = self.nodes.remove(successor) {
                    let new_key = removed.key.clone();
                    let old_key = std::mem::replace(&mut self.nodes[target].key, removed.key);
                    let after = self.log.capture(|| snapshot_subtree(&self.nodes, Some(target)));
                    self.log.push(
                        StepKind::ReplaceWithSuccessor,
                        [old_key, new_key],
                        before,
                        after,
                    );
                }
            }
            (child, None) | (None, child) => {
                let kind = if child.is_some() {
                    StepKind::Splice
                } else {
                    StepKind::RemoveLeaf
                };
                self.attach(path.last().copied(), child);
                if let Some(removed) = self.nodes.remove(target) {
                    let after = self.log.capture(|| snapshot_subtree(&self.nodes, child));
                    let mut affected = vec![removed.key];
                    if let Some(child) = child {
                        affected.push(self.nodes[child].key.clone());
                    }
                    self.log.push(kind, affected, before, after);
                }
            }
        }

        self.retrace(&path);
        self.operations += 1;
        debug!(len = self.len(), height = self.height(), "delete complete");
        Ok(self.log.since(mark))
    }

    /// Recomputes heights and repairs balance from the deepest path entry up
    /// to the root, relinking any subtree whose root changed. Each ancestor
    /// gets a `CheckBalance` step before any rotation at it.
    fn retrace(&mut self, path: &[(NodeId, Side)]) {
        for i in (0..path.len()).rev() {
            let (id, _) = path[i];
            self.update_height(id);
            let balance = balance_of(&self.nodes, id);
            self.log
                .note(StepKind::CheckBalance { balance }, [self.nodes[id].key.clone()]);
            let new_root = self.rebalance(id);
            if new_root != id {
                let slot = if i == 0 { None } else { Some(path[i - 1]) };
                self.attach(slot, Some(new_root));
            }
        }
    }

    fn rebalance(&mut self, id: NodeId) -> NodeId {
        let balance = balance_of(&self.nodes, id);
        if balance > 1 {
            let Some(left) = self.nodes[id].left else {
                return id;
            };
            if balance_of(&self.nodes, left) >= 0 {
                self.rotate(id, Side::Right, Imbalance::LeftLeft)
            } else {
                let new_left = self.rotate(left, Side::Left, Imbalance::LeftRight);
                self.nodes[id].left = Some(new_left);
                self.rotate(id, Side::Right, Imbalance::LeftRight)
            }
        } else if balance < -1 {
            let Some(right) = self.nodes[id].right else {
                return id;
            };
            if balance_of(&self.nodes, right) <= 0 {
                self.rotate(id, Side::Left, Imbalance::RightRight)
            } else {
                let new_right = self.rotate(right, Side::Right, Imbalance::RightLeft);
                self.nodes[id].right = Some(new_right);
                self.rotate(id, Side::Left, Imbalance::RightLeft)
            }
        } else {
            id
        }
    }

    /// Rotates the subtree at `pivot` and returns its new root. The caller
    /// relinks the new root into the parent slot.
    fn rotate(&mut self, pivot: NodeId, direction: Side, case: Imbalance) -> NodeId {
        let before = self.log.capture(|| snapshot_subtree(&self.nodes, Some(pivot)));
        let new_root = match direction {
            Side::Right => {
                let Some(x) = self.nodes[pivot].left else {
                    return pivot;
                };
                let inner = self.nodes[x].right;
                self.nodes[pivot].left = inner;
                self.nodes[x].right = Some(pivot);
                x
            }
            Side::Left => {
                let Some(y) = self.nodes[pivot].right else {
                    return pivot;
                };
                let inner = self.nodes[y].left;
                self.nodes[pivot].right = inner;
                self.nodes[y].left = Some(pivot);
                y
            }
        };
        self.update_height(pivot);
        self.update_height(new_root);

        let after = self.log.capture(|| snapshot_subtree(&self.nodes, Some(new_root)));
        let pivot_key = self.nodes[pivot].key.clone();
        let root_key = self.nodes[new_root].key.clone();
        trace!(pivot = ?pivot_key, new_root = ?root_key, ?direction, ?case, "rotate");
        self.log.push(
            StepKind::Rotate { direction, case },
            [pivot_key, root_key],
            before,
            after,
        );
        new_root
    }
}

impl<K: Clone> AvlTree<K> {
    /// Flat copy of the whole tree for rendering
    pub fn snapshot(&self) -> TreeSnapshot<K> {
        snapshot_subtree(&self.nodes, self.root)
    }
}

impl<K> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for AvlTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("keys", &self.in_order().collect::<Vec<_>>())
            .field("height", &self.height())
            .field("steps", &self.log.len())
            .finish()
    }
}

/// One node visited by [`AvlTree::search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison<'a, K> {
    /// Key stored at the visited node
    pub key: &'a K,
    /// Target compared with `key`
    pub ordering: Ordering,
}

impl<K> Comparison<'_, K> {
    /// True when this node holds the target
    pub fn is_match(&self) -> bool {
        self.ordering == Ordering::Equal
    }
}

/// Iterator returned by [`AvlTree::search`]
pub struct SearchPath<'a, K> {
    nodes: &'a Arena<K>,
    cursor: Option<NodeId>,
    target: &'a K,
}

impl<'a, K: Ord> Iterator for SearchPath<'a, K> {
    type Item = Comparison<'a, K>;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        let node = &nodes[self.cursor?];
        let ordering = self.target.cmp(&node.key);
        self.cursor = match ordering {
            Ordering::Less => node.left,
            Ordering::Greater => node.right,
            Ordering::Equal => None,
        };
        Some(Comparison {
            key: &node.key,
            ordering,
        })
    }
}

impl<K: Ord> FusedIterator for SearchPath<'_, K> {}

/// Iterator returned by [`AvlTree::in_order`]
pub struct InOrder<'a, K> {
    nodes: &'a Arena<K>,
    stack: Vec<NodeId>,
    cursor: Option<NodeId>,
}

impl<'a, K> Iterator for InOrder<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        while let Some(id) = self.cursor {
            self.stack.push(id);
            self.cursor = nodes[id].left;
        }
        let id = self.stack.pop()?;
        self.cursor = nodes[id].right;
        Some(&nodes[id].key)
    }
}

impl<K> FusedIterator for InOrder<'_, K> {}

/// Operations accepted by [`AvlTree::perform`](Animated::perform)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum AvlOperation<K> {
    /// Insert a key
    Insert(K),
    /// Delete a key
    Delete(K),
    /// Look a key up
    Search(K),
    /// List keys in order
    InOrder,
}

/// Output of [`AvlTree::perform`](Animated::perform)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AvlOutput<K> {
    /// Insert or delete succeeded
    Updated,
    /// Search result
    Search {
        /// Whether the key is stored
        found: bool,
    },
    /// In-order key listing
    Keys(Vec<K>),
}

impl<K> Animated for AvlTree<K>
where
    K: Ord + Clone + fmt::Debug + Serialize + DeserializeOwned,
{
    type Operation = AvlOperation<K>;
    type Output = AvlOutput<K>;
    type Id = K;
    type Snapshot = TreeSnapshot<K>;

    const OPERATIONS: &'static [&'static str] = &["insert", "delete", "search", "in_order"];

    fn perform(&mut self, op: AvlOperation<K>) -> Result<Applied<AvlOutput<K>, K, TreeSnapshot<K>>> {
        match op {
            AvlOperation::Insert(key) => Ok((AvlOutput::Updated, self.insert(key)?)),
            AvlOperation::Delete(key) => Ok((AvlOutput::Updated, self.delete(&key)?)),
            AvlOperation::Search(key) => {
                let mark = self.log.mark();
                let mut found = false;
                let mut visited = Vec::new();
                for hop in self.search(&key) {
                    found = hop.is_match();
                    visited.push((hop.key.clone(), hop.ordering));
                }
                for (node_key, ordering) in visited {
                    match ordering {
                        Ordering::Less => self.log.note(
                            StepKind::Descend { side: Side::Left },
                            [node_key, key.clone()],
                        ),
                        Ordering::Greater => self.log.note(
                            StepKind::Descend { side: Side::Right },
                            [node_key, key.clone()],
                        ),
                        Ordering::Equal => self.log.note(StepKind::Found, [node_key]),
                    };
                }
                if !found {
                    self.log.note(StepKind::NotFound, [key]);
                }
                Ok((AvlOutput::Search { found }, self.log.since(mark)))
            }
            AvlOperation::InOrder => {
                let mark = self.log.mark();
                let keys: Vec<K> = self.in_order().cloned().collect();
                for key in &keys {
                    self.log.note(StepKind::Emit, [key.clone()]);
                }
                Ok((AvlOutput::Keys(keys), self.log.since(mark)))
            }
        }
    }

    fn step_log(&self) -> &StepLog<K, TreeSnapshot<K>> {
        &self.log
    }

    fn step_log_mut(&mut self) -> &mut StepLog<K, TreeSnapshot<K>> {
        &mut self.log
    }

    fn reset(&mut self) {
        AvlTree::reset(self);
    }
}
