//! The get-or-create protocol for content-addressed entities.
//!
//! 1. Look the content up. Exactly one match: return it.
//! 2. No match: insert under the candidate URI, then look up again.
//! 3. Any other cardinality is a data-integrity error.
//!
//! The protocol is not atomic. Two callers interning identical content may
//! both see no match and both insert; this is harmless because both compute
//! the same candidate URI and restate the same triples. A store without
//! read-after-write consistency can transiently report zero or duplicate
//! rows after the insert, so the second lookup is retried a bounded number
//! of times, and a row set whose members are all identical is collapsed to
//! one.

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Retry budget for the post-insert lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InternPolicy {
    pub retries: u32,
    pub interval: Duration,
}

impl Default for InternPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            interval: Duration::from_millis(50),
        }
    }
}

/// Run the get-or-create protocol over a lookup and an insert.
pub fn get_or_create<T, L, I>(policy: &InternPolicy, mut lookup: L, insert: I) -> StoreResult<T>
where
    T: PartialEq + fmt::Debug,
    L: FnMut() -> StoreResult<Vec<T>>,
    I: FnOnce() -> StoreResult<()>,
{
    match collapse(lookup()?) {
        Ok(Some(found)) => {
            debug!(?found, "get-or-create: existing entity");
            return Ok(found);
        }
        Ok(None) => {}
        Err(count) => {
            return Err(StoreError::Integrity(format!(
                "lookup matched {count} distinct entities before insert"
            )))
        }
    }

    insert()?;

    let mut attempt = 0;
    loop {
        let rows = lookup()?;
        let count = rows.len();
        match collapse(rows) {
            Ok(Some(created)) => {
                debug!(?created, "get-or-create: inserted entity");
                return Ok(created);
            }
            _ if attempt < policy.retries => {
                attempt += 1;
                warn!(attempt, count, "get-or-create: lookup after insert did not match once, retrying");
                thread::sleep(policy.interval);
            }
            _ => {
                return Err(StoreError::Integrity(format!(
                    "lookup matched {count} entities after insert"
                )))
            }
        }
    }
}

/// Reduce a lookup result to at most one row.
///
/// More than one distinct row is a data-integrity error.
pub fn retrieve_one<T: PartialEq>(rows: Vec<T>) -> StoreResult<Option<T>> {
    collapse(rows).map_err(|count| {
        StoreError::Integrity(format!("expected at most one match, found {count}"))
    })
}

fn collapse<T: PartialEq>(mut rows: Vec<T>) -> Result<Option<T>, usize> {
    if rows.windows(2).all(|pair| pair[0] == pair[1]) {
        Ok(rows.pop())
    } else {
        Err(rows.len())
    }
}
