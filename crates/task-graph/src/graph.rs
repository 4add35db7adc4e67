//! Layered task graph construction.
//!
//! This module builds a layered directed acyclic graph from a flat list of
//! task nodes. Tasks without dependencies seed layer 0 in input order;
//! every other task is placed one layer below its deepest producer once all
//! of its producers have been placed. The result is that each layer only
//! depends on layers above it, so layers can execute as parallel waves.

use crate::error::{Error, Result};
use crate::traversal::{Layers, TasksAt};
use crate::{TaskHash, TaskNode};
use std::fmt;
use tracing::{debug, trace};

/// One depth level of the graph: an ordered list of tasks.
#[derive(Debug, Clone)]
pub struct Layer<T> {
    depth: usize,
    tasks: Vec<T>,
}

impl<T> Layer<T> {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            tasks: Vec::new(),
        }
    }

    /// Depth of this layer; the root layer is depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The tasks at this depth, in placement order.
    #[must_use]
    pub fn tasks(&self) -> &[T] {
        &self.tasks
    }

    /// Number of tasks at this depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether this layer holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate the tasks at this depth.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.tasks.iter()
    }
}

impl<'a, T> IntoIterator for &'a Layer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// A dependency graph organized as a flat sequence of layers.
///
/// Invariants upheld by [`TaskGraph::from_tasks`]:
///
/// - every dependency of a task at depth `d` resolves to a task at some
///   depth `< d`;
/// - depth 0 contains exactly the tasks with no dependencies, in their
///   input order;
/// - within a layer, tasks keep the order in which they were placed.
#[derive(Debug, Clone)]
pub struct TaskGraph<T> {
    layers: Vec<Layer<T>>,
}

impl<T: TaskNode> TaskGraph<T> {
    /// Create an empty graph. Layers are allocated on demand by
    /// [`insert_at`](Self::insert_at).
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Build a layered graph from a flat task list.
    ///
    /// Tasks without dependencies seed layer 0 in their input order. The
    /// remainder is placed by fixpoint iteration: a task whose producers
    /// are all placed goes one layer below the deepest of them. Two
    /// consecutive passes without progress terminate the build.
    ///
    /// # Errors
    ///
    /// - [`Error::NoRootNodes`] when no task is free of dependencies.
    /// - [`Error::ExcessDependencies`] when more placed producers match a
    ///   task's dependency set than it declared, which indicates duplicate
    ///   identifiers in the input.
    /// - [`Error::CircularOrMissingDependency`] when unplaced tasks remain
    ///   after the build converges.
    pub fn from_tasks(mut tasks: Vec<T>) -> Result<Self> {
        let mut graph = Self {
            layers: vec![Layer::new(0)],
        };

        let mut index = 0;
        while index < tasks.len() {
            if tasks[index].is_root() {
                let task = tasks.remove(index);
                trace!(task = %task.identity(), "seeding root layer");
                graph.layers[0].tasks.push(task);
            } else {
                index += 1;
            }
        }
        if graph.layers[0].is_empty() {
            return Err(Error::NoRootNodes);
        }

        let mut stalled_passes = 0;
        while !tasks.is_empty() && stalled_passes < 2 {
            let mut progressed = false;
            let mut index = 0;
            while index < tasks.len() {
                let wanted = tasks[index].dependencies().count();
                let (found, deepest) = graph.count_placed_dependencies(&tasks[index]);
                if found == wanted {
                    let task = tasks.remove(index);
                    debug!(task = %task.identity(), depth = deepest + 1, "placing task");
                    graph.insert_at(task, deepest + 1);
                    progressed = true;
                } else if found > wanted {
                    return Err(Error::ExcessDependencies {
                        task: tasks[index].identity().to_string(),
                    });
                } else {
                    index += 1;
                }
            }
            stalled_passes = if progressed { 0 } else { stalled_passes + 1 };
        }

        if !tasks.is_empty() {
            return Err(Error::CircularOrMissingDependency {
                unplaced: tasks.iter().map(|t| t.identity().to_string()).collect(),
            });
        }

        debug!(
            layers = graph.layers.len(),
            tasks = graph.task_count(),
            "built task graph"
        );
        Ok(graph)
    }

    /// Append a task to the layer at `depth`, allocating intermediate
    /// layers on demand.
    pub fn insert_at(&mut self, task: T, depth: usize) {
        while self.layers.len() <= depth {
            let next = self.layers.len();
            self.layers.push(Layer::new(next));
        }
        self.layers[depth].tasks.push(task);
    }

    /// Iterate `(depth, task)` pairs for the layer at `depth`. Yields
    /// nothing for unallocated depths.
    #[must_use]
    pub fn tasks_at(&self, depth: usize) -> TasksAt<'_, T> {
        let tasks = self
            .layers
            .get(depth)
            .map_or(&[] as &[T], |layer| layer.tasks());
        TasksAt::new(depth, tasks)
    }

    /// Depth of the deepest allocated layer.
    #[must_use]
    pub fn total_depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// Iterate layers in depth order, from 0 upward.
    #[must_use]
    pub fn layers(&self) -> Layers<'_, T> {
        Layers::new(&self.layers)
    }

    /// Total number of tasks across all layers.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    /// Whether the graph holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Layer::is_empty)
    }

    /// Find the first placed task whose identity digests to `hash`.
    #[must_use]
    pub fn find_task(&self, hash: TaskHash) -> Option<&T> {
        self.layers
            .iter()
            .flat_map(Layer::tasks)
            .find(|task| task.identity().hash() == hash)
    }

    /// Mutable access to the first placed task digesting to `hash`.
    pub fn find_task_mut(&mut self, hash: TaskHash) -> Option<&mut T> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.tasks.iter_mut())
            .find(|task| task.identity().hash() == hash)
    }

    /// Depth of the first placed task digesting to `hash`.
    #[must_use]
    pub fn depth_of(&self, hash: TaskHash) -> Option<usize> {
        self.layers.iter().find_map(|layer| {
            layer
                .tasks()
                .iter()
                .any(|task| task.identity().hash() == hash)
                .then_some(layer.depth())
        })
    }

    /// Count how many placed tasks match `task`'s dependency set, and the
    /// deepest layer a match was found at. Duplicated identifiers make the
    /// count exceed the size of the dependency set.
    fn count_placed_dependencies(&self, task: &T) -> (usize, usize) {
        let mut found = 0;
        let mut deepest = 0;
        for dependency in task.dependencies() {
            let hash = dependency.hash();
            for layer in &self.layers {
                for placed in layer.tasks() {
                    if placed.identity().hash() == hash {
                        found += 1;
                        deepest = deepest.max(layer.depth());
                    }
                }
            }
        }
        (found, deepest)
    }
}

impl<T: TaskNode> Default for TaskGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a TaskGraph<T> {
    type Item = &'a Layer<T>;
    type IntoIter = Layers<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Layers::new(&self.layers)
    }
}

impl<T: TaskNode> fmt::Display for TaskGraph<T> {
    /// Depth-indented rendering, one task per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for layer in &self.layers {
            for task in layer.tasks() {
                writeln!(
                    f,
                    "{:indent$}{} {}",
                    "",
                    layer.depth(),
                    task.identity(),
                    indent = layer.depth() * 4
                )?;
            }
        }
        Ok(())
    }
}
