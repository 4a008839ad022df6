use cw_crypto::ContentHasher;
use cw_types::{Projection, TypeError};
use tracing::debug;

use crate::error::StoreResult;
use crate::graph::{MappingRef, Triple};
use crate::intern::{get_or_create, InternPolicy};
use crate::SAVE_CACHE;

/// Graph store holding Crosswalk entities as triples in named graphs.
///
/// Graph names and terms are passed in rendered form (`<uri>`, `"literal"`).
/// Predicates in a [`Projection`] are short-form keys; stores expand them.
/// Predicates returned by [`describe`](Self::describe) and
/// [`triples`](Self::triples) are full angle-bracketed URIs.
///
/// All implementations must satisfy these invariants:
/// - `read` graph lists are merged with set semantics: a statement present
///   in several graphs counts once.
/// - Operations never partially apply on the in-memory side; remote stores
///   offer no rollback of partially applied network operations.
pub trait GraphStore: Send + Sync {
    /// Subjects whose statements in `read` are exactly the projection's
    /// statements, either with the bookkeeping marker (and one extra
    /// statement) or without any marker.
    fn lookup(&self, read: &[String], projection: &Projection) -> StoreResult<Vec<String>>;

    /// Insert every statement of `projection` about `subject` into `graph`.
    fn insert(&self, graph: &str, subject: &str, projection: &Projection) -> StoreResult<()>;

    /// `(predicate, object)` pairs about `subject` in `read`, sorted.
    fn describe(&self, read: &[String], subject: &str) -> StoreResult<Vec<(String, String)>>;

    /// The `skos:notation` of a term, searched across every graph.
    fn notation(&self, subject: &str) -> StoreResult<Option<String>>;

    /// Union of `graphs`, sorted by (subject, predicate, object).
    fn triples(&self, graphs: &[String]) -> StoreResult<Vec<Triple>>;

    /// Delete from `branch` every statement also present in `main`.
    fn remove_common(&self, branch: &str, main: &str) -> StoreResult<()>;

    /// Copy every statement of `from` into `into`.
    fn add_graph(&self, from: &str, into: &str) -> StoreResult<()>;

    /// Remove a graph and everything in it. Missing graphs are not an error.
    fn drop_graph(&self, graph: &str) -> StoreResult<()>;

    /// Remove every statement about `subject` from `graph`.
    fn remove_subject(&self, graph: &str, subject: &str) -> StoreResult<()>;

    /// Current mappings (no other mapping replaces them) whose source and
    /// target components have the given types.
    fn current_mappings(
        &self,
        read: &[String],
        source_type: &str,
        target_type: &str,
    ) -> StoreResult<Vec<MappingRef>>;

    /// Retry budget used by [`intern`](Self::intern).
    fn intern_policy(&self) -> InternPolicy {
        InternPolicy::default()
    }

    /// Get-or-create the entity described by `projection`.
    ///
    /// The lookup consults `read`; a missing entity is inserted into `graph`
    /// under its content-addressed URI together with the bookkeeping marker.
    /// Returns the entity URI.
    fn intern(
        &self,
        graph: &str,
        read: &[String],
        projection: &Projection,
        hasher: &ContentHasher,
    ) -> StoreResult<String> {
        if projection.get("rdf:type").is_none() {
            return Err(TypeError::mismatch("projection", "an rdf:type statement", "none").into());
        }
        let candidate = hasher.entity_uri(projection)?;
        let marked = projection.clone().with(SAVE_CACHE, "\"True\"")?;
        get_or_create(
            &self.intern_policy(),
            || self.lookup(read, projection),
            || {
                debug!(%candidate, graph, "inserting entity");
                self.insert(graph, &candidate, &marked)
            },
        )
    }
}
