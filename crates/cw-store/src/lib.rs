//! Graph store access for Crosswalk.
//!
//! Entities live as triples in named graphs of an external SPARQL store.
//! This crate owns everything between an entity's canonical
//! [`Projection`](cw_types::Projection) and the wire:
//!
//! - [`StoreGateway`] -- store process lifecycle and query/update transport
//! - [`sparql`] -- statement builders for lookups, inserts and graph operations
//! - [`results`] -- decoding of SPARQL JSON result sets into rendered terms
//! - [`intern`] -- the get-or-create protocol for content-addressed entities
//!
//! # Storage Backends
//!
//! All backends implement the [`GraphStore`] trait:
//!
//! - [`SparqlStore`] -- the remote store reached through a [`StoreGateway`]
//! - [`InMemoryGraphStore`] -- quad set for tests and embedding
//!
//! # Design Rules
//!
//! 1. Entities are never updated in place; identical content maps to one URI.
//! 2. Get-or-create is idempotent but not atomic (see [`intern`]).
//! 3. Decoding of query results exactly inverts insert encoding, so content
//!    read back hashes to the identifier it was stored under.
//! 4. All transport errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod gateway;
pub mod graph;
pub mod intern;
pub mod memory;
pub mod remote;
pub mod results;
pub mod sparql;
#[cfg(test)]
mod testing;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{Config, LaunchConfig};
pub use error::{StoreError, StoreResult};
pub use gateway::StoreGateway;
pub use graph::{GraphKind, GraphPair, GraphScope, MappingRef, Triple, REGISTRY_GRAPH};
pub use intern::{get_or_create, retrieve_one, InternPolicy};
pub use memory::InMemoryGraphStore;
pub use remote::SparqlStore;
pub use results::{decode_value, Binding, ResultSet, Row};
pub use traits::GraphStore;

/// Bookkeeping predicate marking entities written by [`GraphStore::intern`].
pub const SAVE_CACHE: &str = "cw:saveCache";
