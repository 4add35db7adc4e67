//! The task model: actions, arguments, and output forwarding.
//!
//! A [`Task`] pairs a content-addressed identity with an action and an
//! argument vector. Arguments are either literals or [`TaskArg::OutputFrom`]
//! placeholders naming a producer task; placeholders both declare a data
//! dependency and instruct the executor to substitute the producer's
//! committed output at execution time.

pub mod executor;
pub mod messenger;

pub use executor::{ExecutionReport, TaskExecutor, TaskOutcome};
pub use messenger::Messenger;

use crate::resources::ResourcePool;
use crate::status::Status;
use serde_json::Value;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use strata_task_graph::{TaskHash, TaskIdentifier, TaskNode};

/// What an action returns: an optional output to commit, and a status.
///
/// The output is recorded into the task's write-once slot only when the
/// status is successful.
pub type ActionResult = (Option<Value>, Status);

type ActionFn = dyn Fn(&Messenger, &[Value]) -> ActionResult + Send + Sync;

/// One positional argument of a task.
///
/// `OutputFrom` is the typed form of the "wire this producer's output
/// here" marker: its presence in the argument vector adds the producer to
/// the task's dependency set, and resolution substitutes the producer's
/// committed output in place.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskArg {
    /// A plain value passed through unchanged.
    Literal(Value),
    /// Placeholder for the named producer's output.
    OutputFrom(TaskIdentifier),
}

impl TaskArg {
    /// A literal argument.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// A placeholder for `producer`'s output.
    pub fn output_from(producer: impl Into<TaskIdentifier>) -> Self {
        Self::OutputFrom(producer.into())
    }
}

impl From<Value> for TaskArg {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

/// An executable unit of work.
///
/// Immutable after construction except for the write-once `outputs` slot,
/// which the first successful execution fills. Tasks are cheap to clone:
/// the action is shared behind an [`Arc`], and clones are how workers take
/// ownership of a task across the spawn boundary.
#[derive(Clone)]
pub struct Task {
    action: Arc<ActionFn>,
    identifier: TaskIdentifier,
    args: Vec<TaskArg>,
    dependencies: HashSet<TaskIdentifier>,
    outputs: Option<Value>,
}

impl Task {
    /// Create a task.
    ///
    /// Every `OutputFrom` placeholder in `args` is added to the dependency
    /// set. Dependencies without a matching placeholder (pure ordering
    /// constraints) can be added with [`with_dependencies`](Self::with_dependencies).
    pub fn new<A>(identifier: impl Into<TaskIdentifier>, args: Vec<TaskArg>, action: A) -> Self
    where
        A: Fn(&Messenger, &[Value]) -> ActionResult + Send + Sync + 'static,
    {
        let mut dependencies = HashSet::new();
        for arg in &args {
            if let TaskArg::OutputFrom(producer) = arg {
                dependencies.insert(producer.clone());
            }
        }
        Self {
            action: Arc::new(action),
            identifier: identifier.into(),
            args,
            dependencies,
            outputs: None,
        }
    }

    /// Union explicitly declared dependencies into the auto-resolved set.
    #[must_use]
    pub fn with_dependencies(
        mut self,
        dependencies: impl IntoIterator<Item = TaskIdentifier>,
    ) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    /// The task's identity.
    #[must_use]
    pub fn identifier(&self) -> &TaskIdentifier {
        &self.identifier
    }

    /// The task's content hash.
    #[must_use]
    pub fn hash(&self) -> TaskHash {
        self.identifier.hash()
    }

    /// The positional arguments, placeholders included.
    #[must_use]
    pub fn args(&self) -> &[TaskArg] {
        &self.args
    }

    /// The identities this task depends on.
    #[must_use]
    pub fn depends_on(&self) -> &HashSet<TaskIdentifier> {
        &self.dependencies
    }

    /// The committed output, if the task has succeeded with one.
    #[must_use]
    pub fn outputs(&self) -> Option<&Value> {
        self.outputs.as_ref()
    }

    /// Fill the write-once output slot. Later writes are ignored.
    pub(crate) fn record_output(&mut self, output: Value) {
        if self.outputs.is_none() {
            self.outputs = Some(output);
        }
    }

    /// Run the task against a snapshot of the resource pool.
    ///
    /// Resolution failures cancel the task before the action runs. A
    /// panicking action is caught and reported as a FAIL status carrying
    /// the task's display identity; it never unwinds into the caller.
    pub fn execute(&mut self, messenger: &Messenger, resources: &ResourcePool) -> Status {
        let resolved = match self.resolve_arguments(resources) {
            Ok(resolved) => resolved,
            Err(status) => return status,
        };

        let action = Arc::clone(&self.action);
        match catch_unwind(AssertUnwindSafe(|| action(messenger, &resolved))) {
            Ok((output, status)) => {
                if status.is_success()
                    && let Some(output) = output
                {
                    self.record_output(output);
                }
                status
            }
            Err(payload) => Status::fail(format!(
                "failed to execute task \"{}\": {}",
                self.identifier,
                panic_message(payload.as_ref())
            )),
        }
    }

    /// Substitute every `OutputFrom` placeholder with the producer's
    /// committed output.
    fn resolve_arguments(&self, resources: &ResourcePool) -> Result<Vec<Value>, Status> {
        let mut resolved = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            match arg {
                TaskArg::Literal(value) => resolved.push(value.clone()),
                TaskArg::OutputFrom(producer) => match resources.get(producer.hash()) {
                    Some(output) => resolved.push(output.clone()),
                    None => {
                        return Err(Status::cancel(format!(
                            "cancelled execution of task \"{}\" because required inputs were unavailable in the resource pool for task \"{}\"",
                            self.identifier, producer
                        )));
                    }
                },
            }
        }
        Ok(resolved)
    }
}

impl TaskNode for Task {
    fn identity(&self) -> &TaskIdentifier {
        &self.identifier
    }

    fn dependencies(&self) -> impl Iterator<Item = &TaskIdentifier> {
        self.dependencies.iter()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("identifier", &self.identifier)
            .field("args", &self.args)
            .field("dependencies", &self.dependencies)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "opaque panic payload".to_string())
}

/// A named, ordered collection of tasks.
///
/// Convenience for assembling related work before handing it to
/// [`TaskExecutor::from_tasks`].
#[derive(Debug, Clone, Default)]
pub struct TaskGroup {
    name: String,
    tasks: Vec<Task>,
}

impl TaskGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// The group's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a task.
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Number of tasks in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the group holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate the tasks in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    /// Unwrap into the task list.
    #[must_use]
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }
}

impl IntoIterator for TaskGroup {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.into_iter()
    }
}
