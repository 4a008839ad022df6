use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use cw_crypto::digest;
use cw_diff::diff_snapshots;
use cw_store::{Config, GraphKind, GraphPair, GraphStore, REGISTRY_GRAPH};
use cw_types::{expand, Item, Projection};
use tracing::{debug, info, warn};

use crate::error::{BranchError, BranchResult};
use crate::lock::MergeLock;
use crate::names::validate_branch_id;
use crate::snapshot::render;
use crate::types::{id_from_uri, registry_uri, timestamp, Branch, SavedGraph};
use crate::vcs::SnapshotRepo;

/// Creates, rebases, snapshots and merges branch graphs.
///
/// Main is the permanent pair of graphs. A branch holds only the statements
/// added since it was created; [`rebase`](Self::rebase) strips anything main
/// already has. [`merge`](Self::merge) folds a branch into main, gated on the
/// snapshot diff against the last commit being a pure addition.
pub struct BranchManager<S: GraphStore> {
    store: Arc<S>,
    config: Config,
}

impl<S: GraphStore> BranchManager<S> {
    pub fn new(store: Arc<S>, config: &Config) -> BranchResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config: config.clone(),
        })
    }

    // --- lifecycle ---------------------------------------------------------

    /// Register a new branch owned by `owner`.
    pub fn create(&self, owner: &str) -> BranchResult<Branch> {
        let created = Utc::now().trunc_subsecs(6);
        let stamp = timestamp(&created);
        let owner_term = Item::literal(owner).data().to_string();
        let stamp_term = Item::literal(&stamp).data().to_string();

        let identity = Projection::new()
            .with("dc:creator", owner_term)?
            .with("dc:created", stamp_term)?;
        let id = digest(&identity, &[])?.to_hex();
        let entry = identity.with("rdf:type", expand("cw:Branch")?)?;
        self.store.insert(REGISTRY_GRAPH, &registry_uri(&id), &entry)?;

        info!(branch = %id, owner, "branch created");
        Ok(Branch {
            id,
            owner: owner.to_string(),
            created,
        })
    }

    /// Look a branch up in the registry.
    pub fn get(&self, id: &str) -> BranchResult<Branch> {
        validate_branch_id(id)?;
        let statements = self
            .store
            .describe(&[REGISTRY_GRAPH.to_string()], &registry_uri(id))?;
        let values = |short: &str| -> BranchResult<Vec<String>> {
            let full = expand(short)?;
            Ok(statements
                .iter()
                .filter(|(p, _)| *p == full)
                .filter_map(|(_, o)| Item::new(o).literal_value())
                .collect())
        };
        let owners = values("dc:creator")?;
        let owner = match owners.as_slice() {
            [] => {
                return Err(BranchError::NotFound {
                    branch: id.to_string(),
                })
            }
            [owner] => owner.clone(),
            _ => {
                return Err(BranchError::DuplicateOwner {
                    branch: id.to_string(),
                    count: owners.len(),
                })
            }
        };
        let created = values("dc:created")?
            .first()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_default();
        Ok(Branch {
            id: id.to_string(),
            owner,
            created,
        })
    }

    /// Every registered branch, ordered by id.
    pub fn list(&self) -> BranchResult<Vec<Branch>> {
        let triples = self.store.triples(&[REGISTRY_GRAPH.to_string()])?;
        let ids: BTreeSet<&str> = triples
            .iter()
            .filter_map(|t| id_from_uri(&t.subject))
            .collect();
        ids.into_iter().map(|id| self.get(id)).collect()
    }

    pub fn owner(&self, id: &str) -> BranchResult<String> {
        Ok(self.get(id)?.owner)
    }

    /// Drop a branch's graphs and registry entry. Only the owner may delete.
    pub fn delete(&self, id: &str, caller: &str) -> BranchResult<()> {
        let branch = self.get(id)?;
        if branch.owner != caller {
            warn!(branch = %id, owner = %branch.owner, caller, "branch delete refused");
            return Err(BranchError::NotOwner {
                branch: id.to_string(),
                owner: branch.owner,
                caller: caller.to_string(),
            });
        }
        for graph in branch.graphs().to_vec() {
            self.store.drop_graph(&graph)?;
        }
        self.store.remove_subject(REGISTRY_GRAPH, &branch.uri())?;
        info!(branch = %id, "branch deleted");
        Ok(())
    }

    // --- rebase / save / merge ---------------------------------------------

    /// Remove from the branch every statement main already holds.
    pub fn rebase(&self, id: &str) -> BranchResult<()> {
        let branch = self.get(id)?;
        self.rebase_graphs(&branch.graphs())
    }

    fn rebase_graphs(&self, graphs: &GraphPair) -> BranchResult<()> {
        let main = GraphPair::main();
        for kind in GraphKind::ALL {
            self.store.remove_common(graphs.get(kind), main.get(kind))?;
        }
        debug!(?graphs, "rebased");
        Ok(())
    }

    /// Render main plus the branch for each logical graph.
    pub fn save(&self, id: &str) -> BranchResult<Vec<SavedGraph>> {
        let branch = self.get(id)?;
        self.save_graphs(&branch.graphs())
    }

    fn save_graphs(&self, graphs: &GraphPair) -> BranchResult<Vec<SavedGraph>> {
        let main = GraphPair::main();
        GraphKind::ALL
            .iter()
            .map(|&kind| -> BranchResult<SavedGraph> {
                let own = graphs.get(kind).to_string();
                let union = self
                    .store
                    .triples(&[main.get(kind).to_string(), own.clone()])?;
                let contributed = !self.store.triples(&[own])?.is_empty();
                Ok(SavedGraph {
                    kind,
                    content: render(&union, &self.config.license),
                    contributed,
                })
            })
            .collect()
    }

    /// Fold a branch into main.
    ///
    /// Returns `Ok(false)` without touching files, commits or graphs when the
    /// branch contributes nothing or its snapshot would remove a committed
    /// line.
    pub fn merge(&self, id: &str, ticket: &str) -> BranchResult<bool> {
        let branch = self.get(id)?;
        let mut lock = MergeLock::open(
            &self.config.db_dir,
            self.config.lock_retries,
            self.config.lock_interval(),
        )?;
        lock.run(|| self.merge_locked(&branch, ticket))
    }

    fn merge_locked(&self, branch: &Branch, ticket: &str) -> BranchResult<bool> {
        let graphs = branch.graphs();
        self.rebase_graphs(&graphs)?;
        let touched: Vec<SavedGraph> = self
            .save_graphs(&graphs)?
            .into_iter()
            .filter(|saved| saved.contributed)
            .collect();
        if touched.is_empty() {
            info!(branch = %branch.id, "nothing to merge");
            return Ok(false);
        }

        let repo = SnapshotRepo::open_or_init(
            &self.config.static_dir,
            &self.config.bot_name,
            &self.config.bot_email,
        )?;
        for saved in &touched {
            let diff = diff_snapshots(&repo.committed(&saved.file_name())?, &saved.content);
            if !diff.is_pure_addition() {
                warn!(
                    branch = %branch.id,
                    file = %saved.file_name(),
                    deletions = diff.deletions(),
                    "merge refused: snapshot would remove committed lines"
                );
                return Ok(false);
            }
        }

        let mut files = Vec::with_capacity(touched.len());
        for saved in &touched {
            fs::write(self.config.static_dir.join(saved.file_name()), &saved.content)?;
            files.push(saved.file_name());
        }
        repo.commit(&files, ticket)?;

        let main = GraphPair::main();
        for saved in &touched {
            self.store
                .add_graph(graphs.get(saved.kind), main.get(saved.kind))?;
        }
        self.rebase_graphs(&graphs)?;
        info!(branch = %branch.id, ticket, files = ?files, "branch merged");
        Ok(true)
    }
}
