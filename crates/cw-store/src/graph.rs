//! Named graphs and the shapes that travel between the store and callers.

use serde::{Deserialize, Serialize};

const GRAPH_NS: &str = "http://crosswalk.dev/graph/";

/// The bookkeeping graph recording branch owners. Never snapshotted.
pub const REGISTRY_GRAPH: &str = "<http://crosswalk.dev/graph/branches>";

/// The two logical graphs every branch (and main) is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraphKind {
    Mappings,
    Concepts,
}

impl GraphKind {
    pub const ALL: [GraphKind; 2] = [GraphKind::Mappings, GraphKind::Concepts];

    /// Name of the logical graph, also the snapshot file stem.
    pub fn name(&self) -> &'static str {
        match self {
            GraphKind::Mappings => "mappings",
            GraphKind::Concepts => "concepts",
        }
    }
}

/// A mappings graph and a concepts graph addressed together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPair {
    pub mappings: String,
    pub concepts: String,
}

impl GraphPair {
    /// The permanent graphs.
    pub fn main() -> Self {
        Self {
            mappings: format!("<{GRAPH_NS}mappings>"),
            concepts: format!("<{GRAPH_NS}concepts>"),
        }
    }

    /// The delta graphs of a branch.
    pub fn branch(id: &str) -> Self {
        Self {
            mappings: format!("<{GRAPH_NS}{id}/mappings>"),
            concepts: format!("<{GRAPH_NS}{id}/concepts>"),
        }
    }

    /// The graph of the given kind.
    pub fn get(&self, kind: GraphKind) -> &str {
        match kind {
            GraphKind::Mappings => &self.mappings,
            GraphKind::Concepts => &self.concepts,
        }
    }

    /// Both graph names, mappings first.
    pub fn to_vec(&self) -> Vec<String> {
        vec![self.mappings.clone(), self.concepts.clone()]
    }
}

/// Where writes land and which graphs reads consult.
///
/// Reads on a branch see main plus the branch delta; writes go to the
/// branch only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphScope {
    /// Target of inserts and deletes.
    pub write: GraphPair,
    /// Graphs consulted by queries, in order.
    pub read: Vec<String>,
}

impl GraphScope {
    /// Read and write main.
    pub fn main() -> Self {
        let write = GraphPair::main();
        let read = write.to_vec();
        Self { write, read }
    }

    /// Write to the branch delta, read main plus the delta.
    pub fn branch(id: &str) -> Self {
        let write = GraphPair::branch(id);
        let mut read = GraphPair::main().to_vec();
        read.extend(write.to_vec());
        Self { write, read }
    }
}

/// One statement, every position in rendered form. Orders by (s, p, o).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// A current mapping found by [`GraphStore::current_mappings`](crate::GraphStore::current_mappings).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingRef {
    pub uri: String,
    pub invertible: bool,
}
