//! Line-level diffs between graph snapshot files.
//!
//! A merge is allowed only when the new snapshot is a pure addition to the
//! committed one: every changed line is an insertion.

pub mod snapshot_diff;

pub use snapshot_diff::{diff_snapshots, DiffHunk, DiffLine, SnapshotDiff};
