//! Round-robin partitioning of work items.

use crate::errors::{Error, Result};

/// Split `items` into at most `max_partitions` non-empty groups.
///
/// Distribution is round-robin by input index: item `i` lands in group
/// `i % g` where `g = min(max_partitions, items.len())`, so order within a
/// group preserves input order and the concatenation of all groups is a
/// permutation of the input. An empty input yields an empty group list.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] when `max_partitions` is zero.
pub fn partition<T>(items: Vec<T>, max_partitions: usize) -> Result<Vec<Vec<T>>> {
    if max_partitions < 1 {
        return Err(Error::invalid_argument(format!(
            "cannot split items into {max_partitions} partitions, partition count must be greater than 0"
        )));
    }
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let groups = max_partitions.min(items.len());
    let mut partitions: Vec<Vec<T>> = (0..groups).map(|_| Vec::new()).collect();
    for (index, item) in items.into_iter().enumerate() {
        partitions[index % groups].push(item);
    }
    Ok(partitions)
}
