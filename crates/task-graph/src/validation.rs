//! Pre-flight validation of task lists.
//!
//! [`TaskGraph::from_tasks`](crate::TaskGraph::from_tasks) conflates cycles
//! and missing producers into a single failure, because layering cannot
//! tell them apart. The checks here run against the flat input list before
//! construction and produce finer-grained diagnostics: duplicate
//! identifiers, unknown producers, and self-dependencies.

use crate::error::Error;
use crate::{TaskHash, TaskNode};
use std::collections::HashSet;

/// Outcome of validating a task list.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether no issues were found.
    pub is_valid: bool,
    /// The issues found, in input order.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// A result with no issues.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// A result carrying issues.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Check a flat task list for structural problems the layering pass would
/// either mask or conflate.
#[must_use]
pub fn validate_tasks<T: TaskNode>(tasks: &[T]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut seen: HashSet<TaskHash> = HashSet::new();
    for task in tasks {
        if !seen.insert(task.identity().hash()) {
            errors.push(Error::DuplicateIdentifier {
                identifier: task.identity().to_string(),
            });
        }
    }

    let known: HashSet<TaskHash> = tasks.iter().map(|t| t.identity().hash()).collect();
    for task in tasks {
        for dependency in task.dependencies() {
            if dependency.hash() == task.identity().hash() {
                errors.push(Error::SelfDependency {
                    task: task.identity().to_string(),
                });
            } else if !known.contains(&dependency.hash()) {
                errors.push(Error::UnknownDependency {
                    task: task.identity().to_string(),
                    dependency: dependency.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskIdentifier;

    #[derive(Clone, Debug)]
    struct TestTask {
        identity: TaskIdentifier,
        deps: Vec<TaskIdentifier>,
    }

    impl TaskNode for TestTask {
        fn identity(&self) -> &TaskIdentifier {
            &self.identity
        }

        fn dependencies(&self) -> impl Iterator<Item = &TaskIdentifier> {
            self.deps.iter()
        }
    }

    fn task(id: u64, context: &str, deps: &[TaskIdentifier]) -> TestTask {
        TestTask {
            identity: TaskIdentifier::new(id, context),
            deps: deps.to_vec(),
        }
    }

    #[test]
    fn clean_list_validates() {
        let a = TaskIdentifier::new(1, "a");
        let tasks = vec![task(1, "a", &[]), task(2, "b", &[a])];
        let result = validate_tasks(&tasks);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn duplicate_identifier_is_reported() {
        let tasks = vec![task(1, "same", &[]), task(1, "same", &[])];
        let result = validate_tasks(&tasks);
        assert!(!result.is_valid);
        assert!(matches!(
            result.errors[0],
            Error::DuplicateIdentifier { .. }
        ));
    }

    #[test]
    fn unknown_producer_is_reported() {
        let ghost = TaskIdentifier::new(9, "ghost");
        let tasks = vec![task(1, "a", &[]), task(2, "b", &[ghost])];
        let result = validate_tasks(&tasks);
        assert_eq!(result.errors.len(), 1);
        match &result.errors[0] {
            Error::UnknownDependency { task, dependency } => {
                assert_eq!(task, "2: b");
                assert_eq!(dependency, "9: ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_dependency_is_reported() {
        let me = TaskIdentifier::new(1, "me");
        let tasks = vec![task(1, "me", &[me])];
        let result = validate_tasks(&tasks);
        assert!(matches!(result.errors[0], Error::SelfDependency { .. }));
    }
}
