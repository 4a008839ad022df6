use chrono::{DateTime, SecondsFormat, Utc};
use cw_store::{GraphKind, GraphPair, GraphScope};
use serde::{Deserialize, Serialize};

const GRAPH_NS: &str = "http://crosswalk.dev/graph/";

/// An ephemeral branch: a pair of delta graphs owned by one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub owner: String,
    pub created: DateTime<Utc>,
}

impl Branch {
    /// Subject of this branch's registry entry.
    pub fn uri(&self) -> String {
        registry_uri(&self.id)
    }

    pub fn graphs(&self) -> GraphPair {
        GraphPair::branch(&self.id)
    }

    /// Writes go to the branch; reads see main plus the branch.
    pub fn scope(&self) -> GraphScope {
        GraphScope::branch(&self.id)
    }
}

pub(crate) fn registry_uri(id: &str) -> String {
    format!("<{GRAPH_NS}{id}>")
}

/// The branch id a registry subject names, if it is one.
pub(crate) fn id_from_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix('<')?
        .strip_suffix('>')?
        .strip_prefix(GRAPH_NS)
}

/// Timestamp form stored in the registry and hashed into the branch id.
pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// One logical graph rendered by [`BranchManager::save`](crate::BranchManager::save).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedGraph {
    pub kind: GraphKind,
    /// Snapshot of main plus the branch.
    pub content: String,
    /// The branch holds at least one statement of its own.
    pub contributed: bool,
}

impl SavedGraph {
    /// Snapshot file name, relative to the working tree.
    pub fn file_name(&self) -> String {
        snapshot_file(self.kind)
    }
}

pub fn snapshot_file(kind: GraphKind) -> String {
    format!("{}.ttl", kind.name())
}
