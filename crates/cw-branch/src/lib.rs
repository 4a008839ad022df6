//! Branch graphs for Crosswalk.
//!
//! Main is one permanent pair of named graphs (mappings and concepts). A
//! branch is an ephemeral pair holding only statements added since it was
//! created, owned by the user who created it. Branch operations:
//!
//! - **rebase**: strip from the branch everything main already holds
//! - **save**: render main plus the branch as line-stable snapshot text
//! - **merge**: under an advisory file lock, rebase, diff the snapshots
//!   against the last git commit, and fold into main only when every change
//!   is an added line
//!
//! Ordinary queries are never blocked by a merge and may observe main
//! mid-fold.

pub mod error;
pub mod lock;
pub mod manager;
pub mod names;
pub mod snapshot;
pub mod types;
pub mod vcs;

pub use error::{BranchError, BranchResult};
pub use lock::MergeLock;
pub use manager::BranchManager;
pub use names::validate_branch_id;
pub use types::{snapshot_file, Branch, SavedGraph};
pub use vcs::SnapshotRepo;
