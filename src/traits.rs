//! The uniform driving contract for visualized structures
//!
//! The presentation layer drives every structure the same way: it names an
//! operation, passes its arguments as JSON, and receives the operation's
//! result together with the steps taken.
//!
//! - [`Animated::perform`]: typed entry point taking the structure's operation enum
//! - [`Animated::apply`]: string/JSON entry point built on top of `perform`
//! - [`Animated::next_step`]: hands recorded steps out one frame at a time
//!
//! # Example
//!
//! ```rust
//! use algoviz_core::{Animated, AvlTree};
//! use serde_json::json;
//!
//! let mut tree: AvlTree<i32> = AvlTree::new();
//! for key in [10, 20, 30] {
//!     tree.apply("insert", json!(key)).unwrap();
//! }
//! let (found, steps) = tree.apply("search", json!(30)).unwrap();
//! assert_eq!(serde_json::to_value(&found).unwrap(), json!({ "found": true }));
//! assert_eq!(steps.len(), 2); // 20 -> right, 30 found
//! ```

use crate::error::{Result, StructureError};
use crate::step::{Step, StepLog};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Result of one driven operation: its output and the steps it took
pub type Applied<O, K, S> = (O, Vec<Step<K, S>>);

/// A structure that can be driven one named operation at a time
pub trait Animated {
    /// Typed operation enum, decodable from `{"op": name, "args": ...}`
    type Operation: DeserializeOwned;

    /// What operations hand back besides their steps
    type Output: Serialize;

    /// Id type recorded in [`Step::affected`]
    type Id;

    /// Snapshot type recorded in steps
    type Snapshot;

    /// Operation names accepted by [`apply`](Self::apply)
    const OPERATIONS: &'static [&'static str];

    /// Runs one typed operation
    ///
    /// On error the structure and its log are unchanged.
    fn perform(
        &mut self,
        op: Self::Operation,
    ) -> Result<Applied<Self::Output, Self::Id, Self::Snapshot>>;

    /// The structure's step log
    fn step_log(&self) -> &StepLog<Self::Id, Self::Snapshot>;

    /// Mutable access to the step log, for frame-by-frame playback
    fn step_log_mut(&mut self) -> &mut StepLog<Self::Id, Self::Snapshot>;

    /// Empties the structure and clears its log
    fn reset(&mut self);

    /// Runs one operation named by a string with JSON arguments
    ///
    /// # Errors
    /// - [`StructureError::UnknownOperation`] if `name` is not in [`OPERATIONS`](Self::OPERATIONS)
    /// - [`StructureError::InvalidArguments`] if `args` do not decode
    /// - whatever the operation itself fails with
    fn apply(
        &mut self,
        name: &str,
        args: Value,
    ) -> Result<Applied<Self::Output, Self::Id, Self::Snapshot>> {
        let op = decode_operation::<Self::Operation>(Self::OPERATIONS, name, args)?;
        self.perform(op)
    }

    /// Next recorded step not yet played, `None` once playback has caught up
    fn next_step(&mut self) -> Option<&Step<Self::Id, Self::Snapshot>> {
        self.step_log_mut().next_step()
    }

    /// Removes and returns every recorded step. Sequence numbers keep counting.
    fn take_steps(&mut self) -> Vec<Step<Self::Id, Self::Snapshot>> {
        self.step_log_mut().drain()
    }
}

/// Decodes an adjacently tagged operation enum from a name and arguments.
/// A `null` argument is treated as "no arguments" for unit operations.
pub(crate) fn decode_operation<O: DeserializeOwned>(
    known: &[&str],
    name: &str,
    args: Value,
) -> Result<O> {
    if !known.contains(&name) {
        return Err(StructureError::UnknownOperation(name.to_owned()));
    }

    let mut tagged = Map::new();
    tagged.insert("op".to_owned(), Value::String(name.to_owned()));
    if !args.is_null() {
        tagged.insert("args".to_owned(), args);
    }

    serde_json::from_value(Value::Object(tagged)).map_err(|e| StructureError::InvalidArguments {
        operation: name.to_owned(),
        reason: e.to_string(),
    })
}
