//! The per-execution resource pool.

use serde_json::Value;
use std::collections::HashMap;
use strata_task_graph::TaskHash;

/// Mapping from task hash to the output that task committed.
///
/// The pool lives for the duration of one executor run. Only the
/// supervisor writes to it, and only between layers, after a task reported
/// success; workers read from an owned snapshot taken at spawn time. That
/// discipline is what makes output forwarding deterministic.
#[derive(Debug, Clone, Default)]
pub struct ResourcePool {
    outputs: HashMap<TaskHash, Value>,
}

impl ResourcePool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a task's output. Supervisor-only.
    pub fn insert(&mut self, task: TaskHash, output: Value) {
        self.outputs.insert(task, output);
    }

    /// Look up the output committed for `task`.
    #[must_use]
    pub fn get(&self, task: TaskHash) -> Option<&Value> {
        self.outputs.get(&task)
    }

    /// Whether `task` has a committed output.
    #[must_use]
    pub fn contains(&self, task: TaskHash) -> bool {
        self.outputs.contains_key(&task)
    }

    /// Number of committed outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether the pool holds no outputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Iterate committed `(task, output)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&TaskHash, &Value)> {
        self.outputs.iter()
    }
}
