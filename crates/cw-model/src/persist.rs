//! Persisting entities through the get-or-create protocol.
//!
//! Components go to the concepts graph and mappings to the mappings graph of
//! the write scope. Nested components are persisted first so their URIs can
//! appear in the parent's projection.

use cw_crypto::ContentHasher;
use cw_store::{GraphScope, GraphStore};
use cw_types::Item;
use tracing::debug;

use crate::component::Component;
use crate::error::ModelResult;
use crate::mapping::Mapping;
use crate::property::Property;

impl Component {
    /// Persist this component and every nested component, assigning URIs.
    ///
    /// A component that already has a URI is returned as is.
    pub fn create(&mut self, store: &dyn GraphStore, scope: &GraphScope) -> ModelResult<Item> {
        if let Some(uri) = self.uri() {
            return Ok(uri.clone());
        }
        for property in self.properties_mut() {
            if let Property::Component(nested) = property {
                nested.component_mut().create(store, scope)?;
            }
        }
        let uri = store.intern(
            &scope.write.concepts,
            &scope.read,
            &self.projection()?,
            &ContentHasher::COMPONENT,
        )?;
        debug!(%uri, com_type = %self.com_type(), "component persisted");
        let uri = Item::uri(uri);
        self.set_uri(uri.clone());
        Ok(uri)
    }
}

impl Mapping {
    /// Persist source, target and the mapping itself, assigning URIs.
    pub fn create(&mut self, store: &dyn GraphStore, scope: &GraphScope) -> ModelResult<Item> {
        if let Some(uri) = self.uri() {
            return Ok(uri.clone());
        }
        self.source_mut().create(store, scope)?;
        self.target_mut().create(store, scope)?;
        let uri = store.intern(
            &scope.write.mappings,
            &scope.read,
            &self.projection()?,
            &ContentHasher::MAPPING,
        )?;
        debug!(%uri, "mapping persisted");
        let uri = Item::uri(uri);
        self.set_uri(uri.clone());
        Ok(uri)
    }
}
