//! Foundation types for Crosswalk.
//!
//! This crate provides the atomic graph values and the canonical content
//! representation used throughout the Crosswalk knowledge base. Every other
//! Crosswalk crate depends on `cw-types`.
//!
//! # Key Types
//!
//! - [`Item`] — A URI reference or literal, optionally paired with a short notation
//! - [`Projection`] — Canonical predicate → objects map of an entity
//! - [`namespace`] — The closed prefix table used to expand short-form predicates

pub mod error;
pub mod item;
pub mod namespace;
pub mod projection;

pub use error::TypeError;
pub use item::Item;
pub use namespace::{canonical_predicate, compact, expand, expand_term, sparql_header, PREFIXES};
pub use projection::Projection;
