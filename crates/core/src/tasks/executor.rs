//! The layered task executor.
//!
//! Layers run strictly in depth order. Within a layer the executor
//! partitions tasks round-robin across at most `max_workers` groups and
//! spawns one isolated worker per task. Workers communicate with the
//! supervisor only through their join result and the progress queue; the
//! resource pool is written exclusively by the supervisor, between layers.

use crate::errors::{Error, Result};
use crate::partition::partition;
use crate::resources::ResourcePool;
use crate::status::{Status, StatusKind};
use crate::tasks::{Messenger, Task};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use strata_events::{
    emit_layer_started, emit_task_cancelled, emit_task_completed, emit_task_started,
    progress_channel,
};
use strata_task_graph::{TaskGraph, TaskHash, TaskIdentifier};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// What one worker hands back: partition index, position within the
/// partition, the task it owned, and the final status.
type WorkerEntry = (usize, usize, Task, Status);

/// Recorded outcome of one executed task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Identity of the executed task.
    pub identifier: TaskIdentifier,
    /// Layer the task ran in.
    pub depth: usize,
    /// Index of the partition the task was assigned to.
    pub partition: usize,
    /// Position of the task within its partition.
    pub position: usize,
    /// Final status the worker reported.
    pub status: Status,
}

/// Summary of one executor run.
///
/// Informational final statuses (INFO, WARN, PENDING) are recorded in the
/// outcome list but counted in none of the buckets here.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Tasks that finished successfully.
    pub completed: Vec<TaskIdentifier>,
    /// Tasks that failed or errored.
    pub failed: Vec<TaskIdentifier>,
    /// Tasks cancelled because a required input never reached the pool.
    pub cancelled: Vec<TaskIdentifier>,
}

impl ExecutionReport {
    /// Whether every executed task completed successfully.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }
}

/// Executes a layered task graph across isolated workers.
///
/// The executor owns the graph plus the per-run progress map and outcome
/// log. The resource pool and the progress queue are created per
/// [`execute`](Self::execute) call and released when it returns.
pub struct TaskExecutor {
    graph: TaskGraph<Task>,
    progress: HashMap<TaskHash, f64>,
    outcomes: Vec<TaskOutcome>,
}

impl TaskExecutor {
    /// Build the dependency graph from a flat task list and wrap it in an
    /// executor.
    ///
    /// # Errors
    ///
    /// Graph construction failures are fatal and surface as a FAIL
    /// [`Status`]; no execution begins.
    pub fn from_tasks(tasks: Vec<Task>) -> std::result::Result<Self, Status> {
        match TaskGraph::from_tasks(tasks) {
            Ok(graph) => Ok(Self::from_graph(graph)),
            Err(error) => Err(Status::fail(error.to_string())),
        }
    }

    /// Wrap an already-built graph.
    #[must_use]
    pub fn from_graph(graph: TaskGraph<Task>) -> Self {
        Self {
            graph,
            progress: HashMap::new(),
            outcomes: Vec::new(),
        }
    }

    /// The layered graph this executor runs.
    #[must_use]
    pub fn graph(&self) -> &TaskGraph<Task> {
        &self.graph
    }

    /// Read-only view of the last observed progress fraction per task.
    #[must_use]
    pub fn tasks_progress(&self) -> &HashMap<TaskHash, f64> {
        &self.progress
    }

    /// Outcomes recorded by the most recent run, in layer order.
    #[must_use]
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// The committed output of `identifier`'s task, if it succeeded with
    /// one.
    #[must_use]
    pub fn output_of(&self, identifier: &TaskIdentifier) -> Option<&Value> {
        self.graph
            .find_task(identifier.hash())
            .and_then(Task::outputs)
    }

    /// Run every layer of the graph, spawning at most `max_workers`
    /// partitions of workers per layer.
    ///
    /// Per-task failures never abort the layer or the run; they are
    /// recorded for inspection via [`outcomes`](Self::outcomes) and the
    /// returned [`ExecutionReport`]. Dependents of a failed task cancel on
    /// their own when argument resolution finds their inputs missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `max_workers` is zero.
    pub async fn execute(&mut self, max_workers: usize) -> Result<ExecutionReport> {
        if max_workers == 0 {
            return Err(Error::invalid_argument(
                "max_workers must be at least 1",
            ));
        }

        self.progress.clear();
        self.outcomes.clear();

        let mut pool = ResourcePool::new();
        let (sender, mut receiver) = progress_channel();
        // Tasks in a terminal state; progress messages arriving for them
        // are dropped.
        let mut settled: HashSet<TaskHash> = HashSet::new();

        for depth in 0..=self.graph.total_depth() {
            let layer_tasks: Vec<Task> = self
                .graph
                .tasks_at(depth)
                .map(|(_, task)| task.clone())
                .collect();
            if layer_tasks.is_empty() {
                continue;
            }

            let partitions = partition(layer_tasks, max_workers)?;
            let task_count: usize = partitions.iter().map(Vec::len).sum();
            emit_layer_started!(depth, task_count);
            info!(depth, tasks = task_count, "executing layer");

            // Workers read from a snapshot taken now; the pool itself is
            // only written again after this layer fully joins.
            let snapshot = Arc::new(pool.clone());
            let mut join_set: JoinSet<WorkerEntry> = JoinSet::new();
            let mut in_flight: HashMap<tokio::task::Id, (usize, usize, TaskIdentifier)> =
                HashMap::new();

            for (partition_index, group) in partitions.into_iter().enumerate() {
                for (position_index, mut task) in group.into_iter().enumerate() {
                    emit_task_started!(task.identifier(), depth, partition_index);
                    let identifier = task.identifier().clone();
                    let messenger = Messenger::new(task.hash(), sender.clone());
                    let snapshot = Arc::clone(&snapshot);
                    let handle = join_set.spawn_blocking(move || {
                        let status = task.execute(&messenger, &snapshot);
                        (partition_index, position_index, task, status)
                    });
                    in_flight.insert(handle.id(), (partition_index, position_index, identifier));
                }
            }

            let mut finished: Vec<WorkerEntry> = Vec::new();
            let mut crashed: Vec<(usize, usize, TaskIdentifier, Status)> = Vec::new();

            // Drain progress continuously until every worker of this layer
            // has exited.
            while !join_set.is_empty() {
                tokio::select! {
                    joined = join_set.join_next_with_id() => match joined {
                        Some(Ok((worker_id, entry))) => {
                            in_flight.remove(&worker_id);
                            finished.push(entry);
                        }
                        Some(Err(join_error)) => {
                            if let Some((partition_index, position_index, identifier)) =
                                in_flight.remove(&join_error.id())
                            {
                                warn!(task = %identifier, "worker crashed: {join_error}");
                                let status = Status::fail(format!(
                                    "worker for task \"{identifier}\" crashed: {join_error}"
                                ));
                                crashed.push((partition_index, position_index, identifier, status));
                            }
                        }
                        None => break,
                    },
                    event = receiver.recv() => {
                        if let Some(event) = event
                            && !settled.contains(&event.task)
                        {
                            self.progress.insert(event.task, event.fraction);
                        }
                    }
                }
            }
            while let Some(event) = receiver.try_recv() {
                if !settled.contains(&event.task) {
                    self.progress.insert(event.task, event.fraction);
                }
            }

            // All workers joined: commit outputs, then record outcomes.
            finished.sort_by_key(|(partition_index, position_index, _, _)| {
                (*partition_index, *position_index)
            });
            for (partition_index, position_index, task, status) in finished {
                let hash = task.hash();
                settled.insert(hash);

                match status.kind {
                    StatusKind::Success => {
                        if let Some(output) = task.outputs() {
                            pool.insert(hash, output.clone());
                            if let Some(placed) = self.graph.find_task_mut(hash) {
                                placed.record_output(output.clone());
                            }
                        }
                        emit_task_completed!(task.identifier(), true);
                        debug!(task = %task.identifier(), "task completed");
                    }
                    StatusKind::Cancel => {
                        emit_task_cancelled!(task.identifier(), status.message);
                        warn!(task = %task.identifier(), "{}", status.message);
                    }
                    _ => {
                        emit_task_completed!(task.identifier(), false, status.message);
                        warn!(task = %task.identifier(), kind = %status.kind, "{}", status.message);
                    }
                }

                self.outcomes.push(TaskOutcome {
                    identifier: task.identifier().clone(),
                    depth,
                    partition: partition_index,
                    position: position_index,
                    status,
                });
            }
            for (partition_index, position_index, identifier, status) in crashed {
                settled.insert(identifier.hash());
                emit_task_completed!(identifier, false, status.message);
                self.outcomes.push(TaskOutcome {
                    identifier,
                    depth,
                    partition: partition_index,
                    position: position_index,
                    status,
                });
            }
        }

        Ok(self.report())
    }

    fn report(&self) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        for outcome in &self.outcomes {
            match outcome.status.kind {
                StatusKind::Success => report.completed.push(outcome.identifier.clone()),
                StatusKind::Cancel => report.cancelled.push(outcome.identifier.clone()),
                StatusKind::Fail | StatusKind::Error => {
                    report.failed.push(outcome.identifier.clone());
                }
                StatusKind::Info | StatusKind::Warn | StatusKind::Pending => {}
            }
        }
        report
    }
}

impl std::fmt::Debug for TaskExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskExecutor")
            .field("tasks", &self.graph.task_count())
            .field("layers", &(self.graph.total_depth() + 1))
            .field("outcomes", &self.outcomes.len())
            .finish()
    }
}
