//! Bounded worker pool draining a shared index cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Resolve the worker count: the operator's request, else available
/// parallelism, clamped to the task count so idle threads are never spawned.
pub(crate) fn worker_count(requested: Option<usize>, task_count: usize) -> usize {
    let available = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    requested
        .unwrap_or(available)
        .clamp(1, task_count.max(1))
}

/// Run `op` over every item using `workers` threads pulling from a shared
/// atomic cursor.
///
/// `fetch_add` hands each index to exactly one worker, so items are neither
/// double-processed nor skipped. Completion order across items is
/// nondeterministic; `op` must do its own synchronisation for any shared
/// output.
pub(crate) fn for_each_parallel<T, F>(items: &[T], workers: usize, op: F)
where
    T: Sync,
    F: Fn(&T) + Sync,
{
    if items.is_empty() {
        return;
    }
    let cursor = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..workers.clamp(1, items.len()) {
            scope.spawn(|| {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(item) = items.get(index) else {
                        break;
                    };
                    op(item);
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn every_item_is_processed_exactly_once() {
        let items: Vec<usize> = (0..100).collect();
        let seen = Mutex::new(Vec::new());
        for_each_parallel(&items, 4, |item| {
            if let Ok(mut guard) = seen.lock() {
                guard.push(*item);
            }
        });
        let mut collected = seen.into_inner().unwrap();
        collected.sort_unstable();
        assert_eq!(collected, items);
    }

    #[test]
    fn worker_count_clamps_to_tasks_and_floor_of_one() {
        assert_eq!(worker_count(Some(8), 3), 3);
        assert_eq!(worker_count(Some(0), 3), 1);
        assert_eq!(worker_count(Some(2), 0), 1);
        assert!(worker_count(None, 64) >= 1);
    }
}
