//! Content-addressed task identity and layered DAG construction for strata.
//!
//! This crate turns a flat list of task nodes into a layered dependency
//! graph: tasks without dependencies form layer 0, and every other task
//! lands one layer below its deepest producer. Layers can then execute as
//! strictly ordered parallel waves.
//!
//! # Key Types
//!
//! - [`TaskIdentifier`] / [`TaskHash`]: content-addressed identity; every
//!   identity comparison in the system routes through the SHA-256 digest
//! - [`TaskGraph`]: the layered graph and its builder
//! - [`TaskNode`]: trait task types implement to be layered
//!
//! # Example
//!
//! ```ignore
//! use strata_task_graph::{TaskGraph, TaskIdentifier, TaskNode};
//!
//! let graph = TaskGraph::from_tasks(tasks)?;
//! for layer in graph.layers() {
//!     for task in layer {
//!         // every dependency of `task` lives at a shallower depth
//!     }
//! }
//! ```

mod error;
mod graph;
mod identity;
mod traversal;
mod validation;

pub use error::{Error, Result};
pub use graph::{Layer, TaskGraph};
pub use identity::{TaskHash, TaskIdentifier};
pub use traversal::{Layers, TasksAt};
pub use validation::{ValidationResult, validate_tasks};

/// Trait for task data that can be layered into a [`TaskGraph`].
pub trait TaskNode: Clone {
    /// The identity of this task.
    fn identity(&self) -> &TaskIdentifier;

    /// The identities of the tasks this task depends on.
    fn dependencies(&self) -> impl Iterator<Item = &TaskIdentifier>;

    /// Whether this task has no dependencies and belongs in layer 0.
    fn is_root(&self) -> bool {
        self.dependencies().next().is_none()
    }
}
