//! Task model, resource pool, and layered parallel executor for strata.
//!
//! This crate ties the workspace together: it defines [`Task`]s whose
//! arguments may reference the outputs of other tasks, layers them with
//! [`strata_task_graph`], and executes each layer in parallel across
//! isolated workers while streaming progress through [`strata_events`].
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use strata_core::{Status, Task, TaskArg, TaskExecutor, TaskIdentifier};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let seed = TaskIdentifier::new(1, "seed");
//! let tasks = vec![
//!     Task::new(seed.clone(), vec![], |_messenger, _args| {
//!         (Some(json!(21)), Status::success())
//!     }),
//!     Task::new(
//!         TaskIdentifier::new(2, "double"),
//!         vec![TaskArg::output_from(seed)],
//!         |_messenger, args| {
//!             let value = args[0].as_i64().unwrap_or_default();
//!             (Some(json!(value * 2)), Status::success())
//!         },
//!     ),
//! ];
//!
//! let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
//! let report = executor.execute(4).await.unwrap();
//! assert!(report.is_success());
//! # }
//! ```

pub mod errors;
pub mod partition;
pub mod resources;
pub mod status;
pub mod tasks;

pub use errors::{Error, Result};
pub use partition::partition;
pub use resources::ResourcePool;
pub use status::{Status, StatusKind};
pub use tasks::{
    ActionResult, ExecutionReport, Messenger, Task, TaskArg, TaskExecutor, TaskGroup, TaskOutcome,
};

// The identity and graph types are part of this crate's public surface.
pub use strata_task_graph::{TaskGraph, TaskHash, TaskIdentifier, TaskNode};
