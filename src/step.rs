//! Step records emitted for animation
//!
//! Every structure owns a [`StepLog`]. Operations append one [`Step`] per
//! elementary action (a comparison, a rotation, a swap, a vertex visit) and
//! return the slice they appended. The presentation layer renders one frame
//! per step.
//!
//! The log is append-only: steps are never edited after they are pushed. The
//! only way entries disappear is [`StepLog::clear`] (on structure reset),
//! [`StepLog::drain`], or the rollback a structure performs when an
//! operation fails before mutating anything.
//!
//! A presentation layer that plays frames one at a time reads the log through
//! [`StepLog::next_step`], which advances a cursor over the held steps.

use serde::Serialize;
use smallvec::SmallVec;

/// Which child of a node a step refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left child / left rotation
    Left,
    /// Right child / right rotation
    Right,
}

/// The four AVL imbalance cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Imbalance {
    /// Left-heavy node with a left-leaning (or even) left child
    LeftLeft,
    /// Right-heavy node with a right-leaning (or even) right child
    RightRight,
    /// Left-heavy node with a right-leaning left child
    LeftRight,
    /// Right-heavy node with a left-leaning right child
    RightLeft,
}

/// What a step did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum StepKind {
    /// Compared against a tree node and moved to one of its children
    Descend {
        /// Child taken
        side: Side,
    },
    /// Allocated a new tree node
    CreateNode,
    /// Recomputed a node's height on the way back up
    CheckBalance {
        /// height(left) - height(right) before any rotation
        balance: i32,
    },
    /// Comparison hit the target key
    Found,
    /// Descent ran off the tree
    NotFound,
    /// Removed a childless node
    RemoveLeaf,
    /// Replaced a node by its only child
    Splice,
    /// Copied the in-order successor's key into a two-child node
    ReplaceWithSuccessor,
    /// Rotated a subtree
    Rotate {
        /// Direction of the rotation
        direction: Side,
        /// Imbalance being repaired
        case: Imbalance,
    },
    /// Produced a key during an in-order walk
    Emit,
    /// Pushed a value onto the end of the heap
    Append,
    /// Swapped a value with its parent
    SiftUp,
    /// Swapped a value with one of its children
    SiftDown,
    /// Moved the last heap slot to the root
    MoveLastToRoot,
    /// Removed the root value
    Extract,
    /// Added a vertex
    AddVertex,
    /// Added an edge (and its reverse for undirected graphs)
    AddEdge,
    /// Traversal reached a vertex
    Visit,
    /// Dijkstra finalized a vertex distance
    Settle,
    /// Dijkstra improved a tentative distance
    Relax,
}

/// One animation frame
///
/// `affected` holds the ids (tree keys, heap values, vertex ids) the step
/// touched, most relevant first. `before`/`after` hold snapshots of the
/// substructure that changed, when the log captures snapshots and the step
/// has something to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step<K, S> {
    /// Position in the owning log since its last reset
    pub seq: u64,
    /// What happened
    pub kind: StepKind,
    /// Ids involved
    pub affected: SmallVec<[K; 2]>,
    /// Relevant substructure before the step
    pub before: Option<S>,
    /// Relevant substructure after the step
    pub after: Option<S>,
}

/// Append-only per-structure step log
#[derive(Debug, Clone)]
pub struct StepLog<K, S> {
    steps: Vec<Step<K, S>>,
    next_seq: u64,
    cursor: usize,
    capture_snapshots: bool,
}

impl<K, S> StepLog<K, S> {
    /// Creates an empty log
    pub fn new(capture_snapshots: bool) -> Self {
        Self {
            steps: Vec::new(),
            next_seq: 0,
            cursor: 0,
            capture_snapshots,
        }
    }

    /// Whether steps carry before/after snapshots
    pub fn captures_snapshots(&self) -> bool {
        self.capture_snapshots
    }

    /// Runs `f` only when snapshots are being captured
    #[inline]
    pub fn capture(&self, f: impl FnOnce() -> S) -> Option<S> {
        if self.capture_snapshots {
            Some(f())
        } else {
            None
        }
    }

    /// Appends a step and returns its sequence number
    pub fn push(
        &mut self,
        kind: StepKind,
        affected: impl IntoIterator<Item = K>,
        before: Option<S>,
        after: Option<S>,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.steps.push(Step {
            seq,
            kind,
            affected: affected.into_iter().collect(),
            before,
            after,
        });
        seq
    }

    /// Appends a step with no snapshots
    pub fn note(&mut self, kind: StepKind, affected: impl IntoIterator<Item = K>) -> u64 {
        self.push(kind, affected, None, None)
    }

    /// Position to pass to [`since`](Self::since) or [`rollback`](Self::rollback)
    pub fn mark(&self) -> usize {
        self.steps.len()
    }

    /// Drops every step recorded after `mark`, rewinding sequence numbers
    pub fn rollback(&mut self, mark: usize) {
        if mark < self.steps.len() {
            self.next_seq = self.steps[mark].seq;
            self.steps.truncate(mark);
            self.cursor = self.cursor.min(mark);
        }
    }

    /// Every step currently held
    pub fn steps(&self) -> &[Step<K, S>] {
        &self.steps
    }

    /// Iterates over held steps in order
    pub fn iter(&self) -> std::slice::Iter<'_, Step<K, S>> {
        self.steps.iter()
    }

    /// Number of held steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when no step is held
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Next step not yet handed out by this method, oldest first
    pub fn next_step(&mut self) -> Option<&Step<K, S>> {
        let step = self.steps.get(self.cursor)?;
        self.cursor += 1;
        Some(step)
    }

    /// Steps not yet handed out by [`next_step`](Self::next_step)
    pub fn unread(&self) -> &[Step<K, S>] {
        &self.steps[self.cursor..]
    }

    /// Restarts [`next_step`](Self::next_step) from the oldest held step
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Removes every step and restarts sequence numbering
    pub fn clear(&mut self) {
        self.steps.clear();
        self.next_seq = 0;
        self.cursor = 0;
    }

    /// Appends every step of `other`, renumbering them to follow this log
    pub fn absorb(&mut self, other: StepLog<K, S>) {
        for step in other.steps {
            self.push(step.kind, step.affected, step.before, step.after);
        }
    }

    /// Hands all held steps to the caller. Sequence numbering continues, so
    /// steps drained in batches can still be ordered.
    pub fn drain(&mut self) -> Vec<Step<K, S>> {
        self.cursor = 0;
        std::mem::take(&mut self.steps)
    }
}

impl<K: Clone, S: Clone> StepLog<K, S> {
    /// Copies of the steps recorded after `mark`
    pub fn since(&self, mark: usize) -> Vec<Step<K, S>> {
        self.steps[mark.min(self.steps.len())..].to_vec()
    }
}

impl<K, S> Default for StepLog<K, S> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<'a, K, S> IntoIterator for &'a StepLog<K, S> {
    type Item = &'a Step<K, S>;
    type IntoIter = std::slice::Iter<'a, Step<K, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers_and_since() {
        let mut log: StepLog<i32, ()> = StepLog::new(false);
        assert_eq!(log.note(StepKind::Append, [1]), 0);
        let mark = log.mark();
        assert_eq!(log.note(StepKind::SiftUp, [1, 2]), 1);
        assert_eq!(log.note(StepKind::SiftUp, [1, 3]), 2);

        let tail = log.since(mark);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].seq, 1);
        assert_eq!(tail[0].affected.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_rollback_rewinds_sequence() {
        let mut log: StepLog<i32, ()> = StepLog::new(false);
        log.note(StepKind::Append, [1]);
        let mark = log.mark();
        log.note(StepKind::Descend { side: Side::Left }, [5]);
        log.note(StepKind::NotFound, [5]);
        log.rollback(mark);
        assert_eq!(log.len(), 1);
        assert_eq!(log.note(StepKind::Append, [2]), 1);
    }

    #[test]
    fn test_capture_respects_flag() {
        let on: StepLog<i32, Vec<i32>> = StepLog::new(true);
        let off: StepLog<i32, Vec<i32>> = StepLog::new(false);
        assert_eq!(on.capture(|| vec![1]), Some(vec![1]));
        assert_eq!(off.capture(|| vec![1]), None);
    }

    #[test]
    fn test_absorb_renumbers() {
        let mut log: StepLog<i32, ()> = StepLog::new(false);
        log.note(StepKind::AddVertex, [1]);
        let mut scratch: StepLog<i32, ()> = StepLog::new(false);
        scratch.note(StepKind::Visit, [1]);
        scratch.note(StepKind::Visit, [2]);
        log.absorb(scratch);
        let seqs: Vec<u64> = log.iter().map(|s| s.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(log.steps()[2].affected.as_slice(), &[2]);
    }

    #[test]
    fn test_clear_and_drain() {
        let mut log: StepLog<i32, ()> = StepLog::default();
        log.note(StepKind::Visit, [1]);
        log.note(StepKind::Visit, [2]);
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
        assert_eq!(log.note(StepKind::Visit, [3]), 2);

        log.clear();
        assert_eq!(log.note(StepKind::Visit, [4]), 0);
    }

    #[test]
    fn test_next_step_walks_the_log_once() {
        let mut log: StepLog<i32, ()> = StepLog::new(false);
        log.note(StepKind::Append, [1]);
        log.note(StepKind::SiftUp, [1, 2]);

        assert_eq!(log.next_step().map(|s| s.seq), Some(0));
        assert_eq!(log.unread().len(), 1);
        assert_eq!(log.next_step().map(|s| s.kind), Some(StepKind::SiftUp));
        assert!(log.next_step().is_none());

        // steps pushed later are still picked up
        log.note(StepKind::Append, [3]);
        assert_eq!(log.next_step().map(|s| s.seq), Some(2));

        log.rewind();
        assert_eq!(log.unread().len(), 3);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_rollback_pulls_cursor_back() {
        let mut log: StepLog<i32, ()> = StepLog::new(false);
        log.note(StepKind::Append, [1]);
        let mark = log.mark();
        log.note(StepKind::Descend { side: Side::Right }, [1, 2]);
        log.next_step();
        log.next_step();
        log.rollback(mark);
        assert!(log.unread().is_empty());
        log.note(StepKind::CreateNode, [2]);
        assert_eq!(log.next_step().map(|s| s.kind), Some(StepKind::CreateNode));
    }

    #[test]
    fn test_step_serializes_with_tagged_kind() {
        let mut log: StepLog<i32, ()> = StepLog::new(false);
        log.note(
            StepKind::Rotate {
                direction: Side::Left,
                case: Imbalance::RightRight,
            },
            [10, 20],
        );
        let json = serde_json::to_value(&log.steps()[0]).unwrap();
        assert_eq!(json["kind"]["op"], "rotate");
        assert_eq!(json["kind"]["direction"], "left");
        assert_eq!(json["kind"]["case"], "right_right");
        assert_eq!(json["affected"], serde_json::json!([10, 20]));
    }
}
