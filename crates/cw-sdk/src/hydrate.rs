//! Bounded concurrent hydration.
//!
//! A fixed pool of scoped worker threads drains a bounded channel of items.
//! Each worker populates one item at a time and appends the result to a
//! shared collection. A failing or panicking item is logged and dropped; it
//! never stops its worker or affects other items. The call returns once the
//! channel is drained and every worker has finished. Output order is
//! completion order.
//!
//! Dropped items are silent in the output, so callers compare the output
//! length against the input count with [`ensure_complete`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex};
use std::thread;

use tracing::{debug, error};

use crate::error::{SdkError, SdkResult};

/// Populate every item on `workers` threads (at least one).
pub fn hydrate<I, T, F>(items: Vec<I>, workers: usize, populate: F) -> Vec<T>
where
    I: Send + fmt::Debug,
    T: Send,
    F: Fn(&I) -> SdkResult<T> + Sync,
{
    let workers = workers.max(1);
    let total = items.len();
    let (tx, rx) = mpsc::sync_channel::<I>(workers * 2);
    let rx = Mutex::new(rx);
    let out = Mutex::new(Vec::with_capacity(total));

    thread::scope(|s| {
        for worker in 0..workers {
            let (rx, out, populate) = (&rx, &out, &populate);
            s.spawn(move || loop {
                let next = rx.lock().expect("lock poisoned").recv();
                let Ok(item) = next else {
                    break;
                };
                match panic::catch_unwind(AssertUnwindSafe(|| populate(&item))) {
                    Ok(Ok(entity)) => out.lock().expect("lock poisoned").push(entity),
                    Ok(Err(e)) => error!(worker, ?item, error = %e, "hydration failed, item dropped"),
                    Err(_) => error!(worker, ?item, "hydration panicked, item dropped"),
                }
            });
        }
        for item in items {
            if tx.send(item).is_err() {
                break;
            }
        }
        drop(tx);
    });

    let out = out.into_inner().expect("lock poisoned");
    debug!(total, hydrated = out.len(), workers, "hydration finished");
    out
}

/// Fail when hydration produced fewer entities than requested.
pub fn ensure_complete(expected: usize, actual: usize) -> SdkResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(SdkError::Consistency { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_items_hydrated() {
        let out = hydrate((0..100).collect(), 4, |n: &u32| Ok(n * 2));
        assert_eq!(out.len(), 100);
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(sorted[99], 198);
        assert!(ensure_complete(100, out.len()).is_ok());
    }

    #[test]
    fn failing_item_is_dropped_and_detected() {
        let out = hydrate((0..10).collect(), 3, |n: &u32| {
            if *n == 7 {
                Err(SdkError::Integrity("engineered failure".into()))
            } else {
                Ok(*n)
            }
        });
        assert_eq!(out.len(), 9);
        assert!(!out.contains(&7));
        assert!(matches!(
            ensure_complete(10, out.len()),
            Err(SdkError::Consistency {
                expected: 10,
                actual: 9
            })
        ));
    }

    #[test]
    fn panicking_item_does_not_stop_workers() {
        let out = hydrate((0..20).collect(), 2, |n: &u32| {
            if *n % 5 == 0 {
                panic!("boom on {n}");
            }
            Ok(*n)
        });
        assert_eq!(out.len(), 16);
    }

    #[test]
    fn zero_workers_still_drains() {
        let out = hydrate(vec!["a", "b"], 0, |s: &&str| Ok(s.len()));
        assert_eq!(out, vec![1, 1]);
    }

    #[test]
    fn empty_input() {
        let out: Vec<u8> = hydrate(Vec::<u8>::new(), 4, |n| Ok(*n));
        assert!(out.is_empty());
    }
}
