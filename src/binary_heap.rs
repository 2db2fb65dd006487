//! Array-backed binary heap with a fixed MIN or MAX ordering
//!
//! Values live in a dense `Vec` indexed from 0; the children of slot `i` are
//! `2i + 1` and `2i + 2`. The ordering mode is chosen at construction and
//! never changes.
//!
//! Two families of mutators are provided:
//!
//! - [`insert`](BinaryHeap::insert) / [`extract_root`](BinaryHeap::extract_root)
//!   record one step per move and return them for animation
//! - [`push`](BinaryHeap::push) / [`pop`](BinaryHeap::pop) do the same work
//!   silently, for internal users such as the Dijkstra frontier
//!
//! # Time Complexity
//!
//! | Operation      | Complexity |
//! |----------------|------------|
//! | `insert`/`push`| O(log n)   |
//! | `extract_root`/`pop` | O(log n) |
//! | `peek`         | O(1)       |
//! | `from_values`  | O(n)       |
//!
//! # Example
//!
//! ```rust
//! use algoviz_core::binary_heap::BinaryHeap;
//!
//! let mut heap = BinaryHeap::min();
//! for value in [5, 3, 8, 1] {
//!     heap.insert(value);
//! }
//!
//! assert_eq!(heap.peek(), Ok(&1));
//! assert_eq!(heap.extract_root().map(|(v, _)| v), Ok(1));
//! assert_eq!(heap.extract_root().map(|(v, _)| v), Ok(3));
//! assert_eq!(heap.extract_root().map(|(v, _)| v), Ok(5));
//! ```

use crate::config::{HeapOrder, VisualizerConfig};
use crate::error::{Result, StructureError};
use crate::step::{Step, StepKind, StepLog};
use crate::traits::{Animated, Applied};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Touched slots as `(index, value)` pairs
pub type HeapSlots<T> = Vec<(usize, T)>;

/// Step type recorded by [`BinaryHeap`]
pub type HeapStep<T> = Step<T, HeapSlots<T>>;

/// A binary heap ordered by [`HeapOrder`]
#[derive(Debug, Clone)]
pub struct BinaryHeap<T> {
    data: Vec<T>,
    order: HeapOrder,
    log: StepLog<T, HeapSlots<T>>,
}

impl<T> BinaryHeap<T> {
    /// Creates an empty heap with the given ordering
    pub fn new(order: HeapOrder) -> Self {
        BinaryHeap {
            data: Vec::new(),
            order,
            log: StepLog::new(true),
        }
    }

    /// Creates an empty min-heap
    pub fn min() -> Self {
        Self::new(HeapOrder::Min)
    }

    /// Creates an empty max-heap
    pub fn max() -> Self {
        Self::new(HeapOrder::Max)
    }

    /// Creates an empty heap from `config.heap_order` and `config.capture_snapshots`
    pub fn with_config(config: &VisualizerConfig) -> Self {
        BinaryHeap {
            data: Vec::new(),
            order: config.heap_order,
            log: StepLog::new(config.capture_snapshots),
        }
    }

    /// Ordering mode
    pub fn order(&self) -> HeapOrder {
        self.order
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no value is held
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Backing array in slot order
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Root value
    ///
    /// # Errors
    /// [`StructureError::EmptyHeap`] if the heap is empty.
    pub fn peek(&self) -> Result<&T> {
        self.data.first().ok_or(StructureError::EmptyHeap)
    }

    /// Every step recorded since construction or the last reset
    pub fn steps(&self) -> &[HeapStep<T>] {
        self.log.steps()
    }

    /// Removes every value and clears the step log
    pub fn reset(&mut self) {
        self.data.clear();
        self.log.clear();
    }
}

impl<T: Ord> BinaryHeap<T> {
    /// True when `a` belongs strictly above `b`
    #[inline]
    fn above(&self, a: &T, b: &T) -> bool {
        match self.order {
            HeapOrder::Min => a < b,
            HeapOrder::Max => a > b,
        }
    }

    /// Child of `index` that most strongly violates order, ties to the lower index
    fn preferred_child(&self, index: usize) -> Option<usize> {
        let left = 2 * index + 1;
        let right = left + 1;
        if left >= self.data.len() {
            return None;
        }
        if right < self.data.len() && self.above(&self.data[right], &self.data[left]) {
            Some(right)
        } else {
            Some(left)
        }
    }

    /// True if every parent is ordered against both children
    pub fn is_valid(&self) -> bool {
        (1..self.data.len()).all(|i| !self.above(&self.data[i], &self.data[(i - 1) / 2]))
    }
}

impl<T: Ord + Clone + fmt::Debug> BinaryHeap<T> {
    /// Builds a heap from arbitrary values with bottom-up heapify. No steps are recorded.
    pub fn from_values(order: HeapOrder, values: impl IntoIterator<Item = T>) -> Self {
        let mut heap = Self::new(order);
        heap.data = values.into_iter().collect();
        for index in (0..heap.data.len() / 2).rev() {
            heap.sift_down(index, false);
        }
        heap
    }

    /// Appends `value` and sifts it toward the root
    ///
    /// Returns an `Append` step followed by one `SiftUp` step per swap.
    pub fn insert(&mut self, value: T) -> Vec<HeapStep<T>> {
        let mark = self.log.mark();
        let index = self.data.len();
        self.data.push(value.clone());
        let after = self.log.capture(|| vec![(index, value.clone())]);
        self.log.push(StepKind::Append, [value], None, after);

        self.sift_up(index, true);
        debug!(len = self.len(), "insert complete");
        self.log.since(mark)
    }

    /// Removes the root
    ///
    /// The root is swapped with the last slot, the array shrinks by one, and
    /// the new root sifts down toward whichever child violates order more
    /// strongly (the smaller child for MIN, the larger for MAX, ties going to
    /// the lower index).
    ///
    /// # Errors
    /// [`StructureError::EmptyHeap`] if the heap is empty.
    pub fn extract_root(&mut self) -> Result<(T, Vec<HeapStep<T>>)> {
        if self.data.is_empty() {
            debug!("extract_root rejected: heap is empty");
            return Err(StructureError::EmptyHeap);
        }

        let mark = self.log.mark();
        let last = self.data.len() - 1;
        if last > 0 {
            self.swap(0, last, StepKind::MoveLastToRoot, true);
        }
        let root = self.data.pop().ok_or(StructureError::EmptyHeap)?;
        let before = self.log.capture(|| vec![(last, root.clone())]);
        self.log.push(StepKind::Extract, [root.clone()], before, None);

        self.sift_down(0, true);
        debug!(len = self.len(), "extract_root complete");
        Ok((root, self.log.since(mark)))
    }

    /// Inserts without recording steps
    pub fn push(&mut self, value: T) {
        self.data.push(value);
        self.sift_up(self.data.len() - 1, false);
    }

    /// Removes the root without recording steps
    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }

        let last_idx = self.data.len() - 1;
        self.data.swap(0, last_idx);
        let result = self.data.pop();

        if !self.data.is_empty() {
            self.sift_down(0, false);
        }

        result
    }

    /// Consumes the heap, returning its values in extraction order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.data.len());
        while let Some(value) = self.pop() {
            out.push(value);
        }
        out
    }

    /// Move element at index up to maintain heap property
    fn sift_up(&mut self, mut index: usize, record: bool) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.above(&self.data[index], &self.data[parent]) {
                self.swap(index, parent, StepKind::SiftUp, record);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at index down to maintain heap property
    fn sift_down(&mut self, mut index: usize, record: bool) {
        while let Some(child) = self.preferred_child(index) {
            if self.above(&self.data[child], &self.data[index]) {
                self.swap(child, index, StepKind::SiftDown, record);
                index = child;
            } else {
                break;
            }
        }
    }

    /// Swaps two slots. `moving` is listed first in the step's affected ids.
    fn swap(&mut self, moving: usize, other: usize, kind: StepKind, record: bool) {
        if !record {
            self.data.swap(moving, other);
            return;
        }
        let before = self.log.capture(|| {
            vec![
                (moving, self.data[moving].clone()),
                (other, self.data[other].clone()),
            ]
        });
        let affected = [self.data[moving].clone(), self.data[other].clone()];
        self.data.swap(moving, other);
        let after = self.log.capture(|| {
            vec![
                (moving, self.data[moving].clone()),
                (other, self.data[other].clone()),
            ]
        });
        trace!(from = moving, to = other, ?kind, "swap");
        self.log.push(kind, affected, before, after);
    }
}

impl<T> Default for BinaryHeap<T> {
    fn default() -> Self {
        Self::min()
    }
}

/// Operations accepted by [`BinaryHeap::perform`](Animated::perform)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum HeapOperation<T> {
    /// Insert a value
    Insert(T),
    /// Remove the root
    ExtractRoot,
    /// Read the root
    Peek,
}

/// Output of [`BinaryHeap::perform`](Animated::perform)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HeapOutput<T> {
    /// Insert succeeded
    Inserted,
    /// The root value (removed for `extract_root`)
    Value(T),
}

impl<T> Animated for BinaryHeap<T>
where
    T: Ord + Clone + fmt::Debug + Serialize + DeserializeOwned,
{
    type Operation = HeapOperation<T>;
    type Output = HeapOutput<T>;
    type Id = T;
    type Snapshot = HeapSlots<T>;

    const OPERATIONS: &'static [&'static str] = &["insert", "extract_root", "peek"];

    fn perform(&mut self, op: HeapOperation<T>) -> Result<Applied<HeapOutput<T>, T, HeapSlots<T>>> {
        match op {
            HeapOperation::Insert(value) => Ok((HeapOutput::Inserted, self.insert(value))),
            HeapOperation::ExtractRoot => {
                let (value, steps) = self.extract_root()?;
                Ok((HeapOutput::Value(value), steps))
            }
            HeapOperation::Peek => Ok((HeapOutput::Value(self.peek()?.clone()), Vec::new())),
        }
    }

    fn step_log(&self) -> &StepLog<T, HeapSlots<T>> {
        &self.log
    }

    fn step_log_mut(&mut self) -> &mut StepLog<T, HeapSlots<T>> {
        &mut self.log
    }

    fn reset(&mut self) {
        BinaryHeap::reset(self);
    }
}
