//! The Crosswalk entity model.
//!
//! - [`Property`] -- a scalar fact ([`StatementProperty`]) or a nested
//!   component ([`ComponentProperty`])
//! - [`Component`] -- a typed bag of properties
//! - [`Mapping`] -- a directed relation between two components with
//!   provenance metadata
//!
//! Every entity exposes a canonical [`Projection`](cw_types::Projection),
//! which is the sole input to content hashing and store lookups. Entities
//! are persisted with `create` (assigning their URI) and rebuilt from the
//! store with `populate`. There is no update in place: a revised mapping is
//! a new mapping whose `replaces` links the prior one.

pub mod component;
pub mod dot;
pub mod error;
pub mod mapping;
mod persist;
mod populate;
pub mod property;

pub use component::Component;
pub use dot::DotWriter;
pub use error::{ModelError, ModelResult};
pub use mapping::Mapping;
pub use property::{ComponentProperty, Property, StatementProperty};
