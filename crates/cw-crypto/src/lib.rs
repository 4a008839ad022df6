//! Content addressing for Crosswalk.
//!
//! Entities are identified by the SHA-1 digest of their canonical
//! [`Projection`](cw_types::Projection). Identical content always yields the
//! same identifier, which is what makes get-or-create idempotent.
//!
//! All crypto operations wrap established libraries — no custom cryptography.

pub mod hasher;

pub use hasher::{digest, ContentHasher, ContentId};
