//! The knowledge-base facade.

use std::sync::Arc;

use cw_branch::{Branch, BranchManager};
use cw_model::{Component, Mapping};
use cw_store::{Config, GraphScope, GraphStore, MappingRef, SparqlStore, StoreGateway};
use cw_types::Item;
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};
use crate::hydrate::{ensure_complete, hydrate};
use crate::validation::{Findings, Validator};

fn scope(branch: Option<&Branch>) -> GraphScope {
    branch.map_or_else(GraphScope::main, Branch::scope)
}

/// Entry point for reading and writing entities.
///
/// Writes go to the branch graphs when a branch is given, otherwise to the
/// main graphs. Reads see the branch together with main.
pub struct KnowledgeBase<S: GraphStore> {
    store: Arc<S>,
    branches: BranchManager<S>,
    validator: Validator,
    workers: usize,
}

impl KnowledgeBase<SparqlStore> {
    /// Connect to the remote store described by `config`.
    pub fn connect(config: &Config) -> SdkResult<Self> {
        let gateway = Arc::new(StoreGateway::new(config)?);
        Self::new(Arc::new(SparqlStore::new(gateway)), config)
    }
}

impl<S: GraphStore> KnowledgeBase<S> {
    pub fn new(store: Arc<S>, config: &Config) -> SdkResult<Self> {
        let branches = BranchManager::new(Arc::clone(&store), config)?;
        Ok(Self {
            store,
            branches,
            validator: Validator::new(),
            workers: config.workers,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn branches(&self) -> &BranchManager<S> {
        &self.branches
    }

    /// The rule battery run by [`validate`](Self::validate); register extra
    /// rules here.
    pub fn validator_mut(&mut self) -> &mut Validator {
        &mut self.validator
    }

    pub fn create_component(
        &self,
        component: &mut Component,
        branch: Option<&Branch>,
    ) -> SdkResult<Item> {
        Ok(component.create(self.store.as_ref(), &scope(branch))?)
    }

    pub fn create_mapping(&self, mapping: &mut Mapping, branch: Option<&Branch>) -> SdkResult<Item> {
        Ok(mapping.create(self.store.as_ref(), &scope(branch))?)
    }

    /// Persist `revised` as the successor of `prior`.
    ///
    /// Only a current mapping can be replaced; replacing a mapping that
    /// already has a successor is an integrity error.
    pub fn revise(
        &self,
        prior: &Mapping,
        mut revised: Mapping,
        branch: Option<&Branch>,
    ) -> SdkResult<Mapping> {
        let prior_uri = prior
            .uri()
            .ok_or_else(|| SdkError::Integrity("cannot replace an unsaved mapping".into()))?;
        let current = self.current_refs(prior.source(), prior.target(), branch)?;
        if !current.iter().any(|m| m.uri == prior_uri.data()) {
            return Err(SdkError::Integrity(format!(
                "{prior_uri} is not a current mapping and cannot be replaced"
            )));
        }
        revised.set_replaces(prior_uri.clone())?;
        let uri = self.create_mapping(&mut revised, branch)?;
        info!(prior = %prior_uri, %uri, "mapping revised");
        Ok(revised)
    }

    fn current_refs(
        &self,
        source: &Component,
        target: &Component,
        branch: Option<&Branch>,
    ) -> SdkResult<Vec<MappingRef>> {
        Ok(self.store.current_mappings(
            &scope(branch).read,
            source.com_type().data(),
            target.com_type().data(),
        )?)
    }

    /// Every current mapping from `source_type` components to `target_type`
    /// components, hydrated concurrently.
    ///
    /// Fails with [`SdkError::Consistency`] when any mapping could not be
    /// hydrated.
    pub fn retrieve_mappings(
        &self,
        source_type: &str,
        target_type: &str,
        branch: Option<&Branch>,
    ) -> SdkResult<Vec<Mapping>> {
        let read = scope(branch).read;
        let refs = self.store.current_mappings(&read, source_type, target_type)?;
        self.hydrate_refs(refs, &read)
    }

    fn hydrate_refs(&self, refs: Vec<MappingRef>, read: &[String]) -> SdkResult<Vec<Mapping>> {
        let expected = refs.len();
        let store: &dyn GraphStore = self.store.as_ref();
        let mappings = hydrate(refs, self.workers, |m: &MappingRef| {
            Ok(Mapping::populate(store, read, &m.uri)?)
        });
        ensure_complete(expected, mappings.len())?;
        debug!(count = expected, "mappings retrieved");
        Ok(mappings)
    }

    /// The current mapping from `source` to `target`, if any.
    ///
    /// Components are matched by content, so nested components must already
    /// carry their URIs.
    pub fn current_mapping(
        &self,
        source: &Component,
        target: &Component,
        branch: Option<&Branch>,
    ) -> SdkResult<Option<Mapping>> {
        let read = scope(branch).read;
        let refs = self.current_refs(source, target, branch)?;
        let want = (source.projection()?, target.projection()?);
        let mut found = Vec::new();
        for mapping in self.hydrate_refs(refs, &read)? {
            if (mapping.source().projection()?, mapping.target().projection()?) == want {
                found.push(mapping);
            }
        }
        if found.len() > 1 {
            let uris: Vec<String> = found
                .iter()
                .filter_map(|m| m.uri().map(|u| u.data().to_string()))
                .collect();
            return Err(SdkError::Integrity(format!(
                "{} current mappings share one source and target: {}",
                found.len(),
                uris.join(", ")
            )));
        }
        Ok(found.pop())
    }

    pub fn component(&self, uri: &str, branch: Option<&Branch>) -> SdkResult<Component> {
        Ok(Component::populate(self.store.as_ref(), &scope(branch).read, uri)?)
    }

    pub fn mapping(&self, uri: &str, branch: Option<&Branch>) -> SdkResult<Mapping> {
        Ok(Mapping::populate(self.store.as_ref(), &scope(branch).read, uri)?)
    }

    /// Run the validation battery against the branch (or main).
    pub fn validate(&self, branch: Option<&Branch>) -> SdkResult<Findings> {
        self.validator.run(self.store.as_ref(), branch)
    }

    /// Merge a branch into main under a change ticket. `Ok(false)` means the
    /// merge was refused or there was nothing to merge.
    pub fn merge(&self, branch_id: &str, ticket: &str) -> SdkResult<bool> {
        Ok(self.branches.merge(branch_id, ticket)?)
    }
}

impl<S: GraphStore> std::fmt::Debug for KnowledgeBase<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("validator", &self.validator)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}
