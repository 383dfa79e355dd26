//! Task ordering for greedy consumption.
//!
//! Tasks are sorted by priority weight (highest first), then by deadline
//! (earliest first, no deadline last). The sort is stable: tasks that tie on
//! both keys keep their input order.

use std::cmp::Ordering;

use super::scoring::PriorityWeights;
use crate::task::Task;

/// Compare two tasks by `(-priority_weight, deadline_or_infinity)`.
pub fn compare_tasks(a: &Task, b: &Task, weights: &PriorityWeights) -> Ordering {
    let weight_a = weights.weight(a.priority);
    let weight_b = weights.weight(b.priority);

    weight_b
        .total_cmp(&weight_a)
        .then_with(|| match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Return the tasks in scheduling order.
pub fn prioritize(tasks: &[Task], weights: &PriorityWeights) -> Vec<Task> {
    let mut ordered = tasks.to_vec();
    ordered.sort_by(|a, b| compare_tasks(a, b, weights));
    ordered
}

/// [`prioritize`] with the default weights.
pub fn prioritize_tasks(tasks: &[Task]) -> Vec<Task> {
    prioritize(tasks, &PriorityWeights::default())
}
