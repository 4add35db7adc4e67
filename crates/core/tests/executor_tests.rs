//! End-to-end executor tests: graph layering, output forwarding, failure
//! isolation, cancellation, and progress reporting.

use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strata_core::{
    Status, StatusKind, Task, TaskArg, TaskExecutor, TaskGroup, TaskIdentifier,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("strata=trace")
        .try_init();
}

fn constant(identifier: &TaskIdentifier, value: i64) -> Task {
    Task::new(identifier.clone(), vec![], move |_messenger, _args| {
        (Some(json!(value)), Status::success())
    })
}

#[tokio::test]
async fn linear_chain_forwards_outputs_through_every_layer() {
    init_tracing();
    let a = TaskIdentifier::new(1, "a");
    let b = TaskIdentifier::new(2, "b");
    let c = TaskIdentifier::new(3, "c");

    let tasks = vec![
        constant(&a, 10),
        Task::new(
            b.clone(),
            vec![TaskArg::output_from(a.clone())],
            |_messenger, args| {
                let x = args[0].as_i64().unwrap();
                (Some(json!(x + 1)), Status::success())
            },
        ),
        Task::new(
            c.clone(),
            vec![TaskArg::output_from(b.clone())],
            |_messenger, args| {
                let x = args[0].as_i64().unwrap();
                (Some(json!(x * 2)), Status::success())
            },
        ),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    assert_eq!(executor.graph().depth_of(a.hash()), Some(0));
    assert_eq!(executor.graph().depth_of(b.hash()), Some(1));
    assert_eq!(executor.graph().depth_of(c.hash()), Some(2));

    let report = executor.execute(2).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.completed.len(), 3);
    assert_eq!(executor.output_of(&c), Some(&json!(22)));
}

#[tokio::test]
async fn diamond_joins_both_branches() {
    let root = TaskIdentifier::new(1, "root");
    let left = TaskIdentifier::new(2, "left");
    let right = TaskIdentifier::new(3, "right");
    let join = TaskIdentifier::new(4, "join");

    let tasks = vec![
        constant(&root, 1),
        Task::new(
            left.clone(),
            vec![TaskArg::output_from(root.clone())],
            |_messenger, args| (Some(json!(args[0].as_i64().unwrap() + 1)), Status::success()),
        ),
        Task::new(
            right.clone(),
            vec![TaskArg::output_from(root.clone())],
            |_messenger, args| (Some(json!(args[0].as_i64().unwrap() + 2)), Status::success()),
        ),
        Task::new(
            join.clone(),
            vec![
                TaskArg::output_from(left.clone()),
                TaskArg::output_from(right.clone()),
            ],
            |_messenger, args| {
                let sum = args[0].as_i64().unwrap() + args[1].as_i64().unwrap();
                (Some(json!(sum)), Status::success())
            },
        ),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    assert_eq!(executor.graph().depth_of(root.hash()), Some(0));
    assert_eq!(executor.graph().depth_of(left.hash()), Some(1));
    assert_eq!(executor.graph().depth_of(right.hash()), Some(1));
    assert_eq!(executor.graph().depth_of(join.hash()), Some(2));

    let report = executor.execute(4).await.unwrap();
    assert!(report.is_success());
    assert_eq!(executor.output_of(&join), Some(&json!(5)));
}

#[tokio::test]
async fn cycles_are_fatal_at_construction() {
    let a = TaskIdentifier::new(1, "a");
    let b = TaskIdentifier::new(2, "b");

    let tasks = vec![
        constant(&TaskIdentifier::new(0, "root"), 0),
        Task::new(a.clone(), vec![TaskArg::output_from(b.clone())], |_m, _a| {
            (None, Status::success())
        }),
        Task::new(b.clone(), vec![TaskArg::output_from(a.clone())], |_m, _a| {
            (None, Status::success())
        }),
    ];

    let status = TaskExecutor::from_tasks(tasks).unwrap_err();
    assert_eq!(status.kind, StatusKind::Fail);
    assert!(status.message.contains("circular or missing dependency"));
}

#[tokio::test]
async fn fully_dependent_input_is_fatal_at_construction() {
    let a = TaskIdentifier::new(1, "a");
    let b = TaskIdentifier::new(2, "b");

    let tasks = vec![
        Task::new(a.clone(), vec![TaskArg::output_from(b.clone())], |_m, _a| {
            (None, Status::success())
        }),
        Task::new(b.clone(), vec![TaskArg::output_from(a.clone())], |_m, _a| {
            (None, Status::success())
        }),
    ];

    let status = TaskExecutor::from_tasks(tasks).unwrap_err();
    assert_eq!(status.kind, StatusKind::Fail);
    assert!(status.message.contains("no root nodes"));
}

#[tokio::test]
async fn sibling_failure_does_not_abort_the_layer() {
    init_tracing();
    let bad = TaskIdentifier::new(1, "bad");
    let good = TaskIdentifier::new(2, "good");

    let tasks = vec![
        Task::new(bad.clone(), vec![], |_messenger, _args| {
            panic!("deliberate failure")
        }),
        constant(&good, 7),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let report = executor.execute(2).await.unwrap();

    assert_eq!(report.completed, vec![good.clone()]);
    assert_eq!(report.failed, vec![bad.clone()]);
    assert!(report.cancelled.is_empty());
    assert_eq!(executor.output_of(&good), Some(&json!(7)));

    let bad_outcome = executor
        .outcomes()
        .iter()
        .find(|o| o.identifier == bad)
        .unwrap();
    assert_eq!(bad_outcome.status.kind, StatusKind::Fail);
    assert!(bad_outcome.status.message.contains("deliberate failure"));
}

#[tokio::test]
async fn dependents_of_a_failed_task_cancel_without_running() {
    let flaky = TaskIdentifier::new(1, "flaky");
    let downstream = TaskIdentifier::new(2, "downstream");
    let invoked = Arc::new(AtomicBool::new(false));
    let invoked_probe = Arc::clone(&invoked);

    let tasks = vec![
        Task::new(flaky.clone(), vec![], |_messenger, _args| {
            (None, Status::fail("flaky by design"))
        }),
        Task::new(
            downstream.clone(),
            vec![TaskArg::output_from(flaky.clone())],
            move |_messenger, _args| {
                invoked_probe.store(true, Ordering::SeqCst);
                (Some(json!("never")), Status::success())
            },
        ),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let report = executor.execute(2).await.unwrap();

    assert_eq!(report.failed, vec![flaky]);
    assert_eq!(report.cancelled, vec![downstream.clone()]);
    assert!(!invoked.load(Ordering::SeqCst), "action ran with missing input");

    let outcome = executor
        .outcomes()
        .iter()
        .find(|o| o.identifier == downstream)
        .unwrap();
    assert_eq!(outcome.status.kind, StatusKind::Cancel);
    assert!(outcome.status.message.contains("1: flaky"));
}

#[tokio::test]
async fn forwarded_values_arrive_at_the_declared_positions() {
    let producer = TaskIdentifier::new(1, "producer");
    let consumer = TaskIdentifier::new(2, "consumer");

    let tasks = vec![
        constant(&producer, 99),
        Task::new(
            consumer.clone(),
            vec![
                TaskArg::literal("label"),
                TaskArg::output_from(producer.clone()),
                TaskArg::literal(3),
            ],
            |_messenger, args| {
                assert_eq!(args[0], json!("label"));
                assert_eq!(args[1], json!(99));
                assert_eq!(args[2], json!(3));
                (Some(json!([args[0], args[1], args[2]])), Status::success())
            },
        ),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let report = executor.execute(1).await.unwrap();
    assert!(report.is_success());
    assert_eq!(
        executor.output_of(&consumer),
        Some(&json!(["label", 99, 3]))
    );
}

#[tokio::test]
async fn sibling_mutations_stay_isolated() {
    // Both consumers receive the producer's value and "modify" it; the
    // committed output of the producer stays untouched.
    let producer = TaskIdentifier::new(1, "producer");
    let mutator_a = TaskIdentifier::new(2, "mutator_a");
    let mutator_b = TaskIdentifier::new(3, "mutator_b");

    let mutate = |delta: i64| {
        move |_messenger: &strata_core::Messenger, args: &[serde_json::Value]| {
            let mut list = args[0].as_array().unwrap().clone();
            list.push(json!(delta));
            (Some(json!(list)), Status::success())
        }
    };

    let tasks = vec![
        Task::new(producer.clone(), vec![], |_messenger, _args| {
            (Some(json!([0])), Status::success())
        }),
        Task::new(
            mutator_a.clone(),
            vec![TaskArg::output_from(producer.clone())],
            mutate(1),
        ),
        Task::new(
            mutator_b.clone(),
            vec![TaskArg::output_from(producer.clone())],
            mutate(2),
        ),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let report = executor.execute(2).await.unwrap();
    assert!(report.is_success());
    assert_eq!(executor.output_of(&producer), Some(&json!([0])));
    assert_eq!(executor.output_of(&mutator_a), Some(&json!([0, 1])));
    assert_eq!(executor.output_of(&mutator_b), Some(&json!([0, 2])));
}

#[tokio::test]
async fn progress_reports_reach_the_supervisor() {
    let steady = TaskIdentifier::new(1, "steady");
    let tasks = vec![Task::new(steady.clone(), vec![], |messenger, _args| {
        messenger.send_progress(0.25);
        messenger.send_progress(0.75);
        messenger.send_progress(1.0);
        (Some(json!("done")), Status::success())
    })];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let report = executor.execute(1).await.unwrap();
    assert!(report.is_success());

    let fraction = executor.tasks_progress().get(&steady.hash()).copied();
    assert_eq!(fraction, Some(1.0));
}

#[tokio::test]
async fn outcome_log_records_layer_and_partition_coordinates() {
    let a = TaskIdentifier::new(1, "a");
    let b = TaskIdentifier::new(2, "b");

    let tasks = vec![
        constant(&a, 1),
        Task::new(
            b.clone(),
            vec![TaskArg::output_from(a.clone())],
            |_messenger, args| (Some(args[0].clone()), Status::success()),
        ),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    executor.execute(3).await.unwrap();

    let depths: Vec<usize> = executor.outcomes().iter().map(|o| o.depth).collect();
    assert_eq!(depths, vec![0, 1]);
    assert!(executor.outcomes().iter().all(|o| o.partition == 0));
    assert!(executor.outcomes().iter().all(|o| o.position == 0));
}

#[tokio::test]
async fn zero_workers_is_an_invalid_argument() {
    let tasks = vec![constant(&TaskIdentifier::new(1, "only"), 1)];
    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let err = executor.execute(0).await.unwrap_err();
    assert!(err.to_string().contains("invalid argument"));
}

#[tokio::test]
async fn wide_layer_runs_under_a_small_worker_budget() {
    // Seven roots squeezed through three partitions; everything completes.
    let identifiers: Vec<TaskIdentifier> = (1..=7)
        .map(|i| TaskIdentifier::new(i, format!("w{i}")))
        .collect();
    let tasks: Vec<Task> = identifiers
        .iter()
        .map(|id| constant(id, i64::try_from(id.id()).unwrap()))
        .collect();

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let report = executor.execute(3).await.unwrap();
    assert_eq!(report.completed.len(), 7);
    for identifier in &identifiers {
        assert!(executor.output_of(identifier).is_some());
    }
    // Partition indices stay below the worker budget.
    assert!(executor.outcomes().iter().all(|o| o.partition < 3));
}

#[tokio::test]
async fn groups_feed_the_executor() {
    let first = TaskIdentifier::new(1, "first");
    let second = TaskIdentifier::new(2, "second");

    let mut group = TaskGroup::new("pipeline");
    group.push(constant(&first, 5));
    group.push(Task::new(
        second.clone(),
        vec![TaskArg::output_from(first.clone())],
        |_messenger, args| (Some(json!(args[0].as_i64().unwrap() * 10)), Status::success()),
    ));

    let mut executor = TaskExecutor::from_tasks(group.into_tasks()).unwrap();
    let report = executor.execute(2).await.unwrap();
    assert!(report.is_success());
    assert_eq!(executor.output_of(&second), Some(&json!(50)));
}

#[tokio::test]
async fn independent_work_proceeds_past_an_unrelated_failure() {
    // A failing root only poisons its own dependents; the unrelated chain
    // still completes.
    let doomed = TaskIdentifier::new(1, "doomed");
    let victim = TaskIdentifier::new(2, "victim");
    let healthy = TaskIdentifier::new(3, "healthy");
    let survivor = TaskIdentifier::new(4, "survivor");

    let tasks = vec![
        Task::new(doomed.clone(), vec![], |_m, _a| {
            (None, Status::fail("root failure"))
        }),
        Task::new(
            victim.clone(),
            vec![TaskArg::output_from(doomed.clone())],
            |_m, _a| (None, Status::success()),
        ),
        constant(&healthy, 3),
        Task::new(
            survivor.clone(),
            vec![TaskArg::output_from(healthy.clone())],
            |_m, args| (Some(json!(args[0].as_i64().unwrap() + 1)), Status::success()),
        ),
    ];

    let mut executor = TaskExecutor::from_tasks(tasks).unwrap();
    let report = executor.execute(4).await.unwrap();

    assert_eq!(report.failed, vec![doomed]);
    assert_eq!(report.cancelled, vec![victim]);
    assert_eq!(executor.output_of(&survivor), Some(&json!(4)));
}
