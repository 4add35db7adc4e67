//! Error types for task graph operations.

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or validating a task graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input list contained no task free of dependencies, so no layer 0
    /// could be seeded.
    #[error("no root nodes in task list")]
    NoRootNodes,

    /// More placed producers matched a task's dependency set than the task
    /// declared. Indicates duplicate identifiers in the input.
    #[error("excess dependencies found for task '{task}'")]
    ExcessDependencies {
        /// Display identity of the task whose dependencies over-matched.
        task: String,
    },

    /// Layering converged without placing every task. The unplaced tasks
    /// either form a cycle or name a producer absent from the input.
    #[error("circular or missing dependency; unplaced tasks: {unplaced:?}")]
    CircularOrMissingDependency {
        /// Display identities of the tasks that could not be placed.
        unplaced: Vec<String>,
    },

    /// Two tasks in the input share one identity hash.
    #[error("duplicate task identifier '{identifier}'")]
    DuplicateIdentifier {
        /// Display identity of the duplicated identifier.
        identifier: String,
    },

    /// A task depends on a producer that is not part of the input list.
    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency {
        /// Display identity of the dependent task.
        task: String,
        /// Display identity of the missing producer.
        dependency: String,
    },

    /// A task lists itself in its own dependency set.
    #[error("task '{task}' depends on itself")]
    SelfDependency {
        /// Display identity of the self-referential task.
        task: String,
    },
}
