//! Rebuilding entities from store contents.
//!
//! Hydration reads every statement about an entity, recursing into nested
//! components, and attaches notations to URI terms. A hydrated entity has
//! its URI set and reprojects to the content it was stored under.

use cw_store::{GraphStore, SAVE_CACHE};
use cw_types::{compact, expand, Item};
use tracing::debug;

use crate::component::Component;
use crate::error::{ModelError, ModelResult};
use crate::mapping::{parse_flag, Mapping};
use crate::property::Property;

const COMPONENT_NS: &str = "<http://crosswalk.dev/component/";

/// A URI item carrying the notation the store holds for it, if any.
fn notated(store: &dyn GraphStore, term: &str) -> ModelResult<Item> {
    let item = Item::new(term);
    if !item.is_uri() {
        return Ok(item);
    }
    Ok(match store.notation(term)? {
        Some(notation) => {
            let label = Item::new(&notation).literal_value().unwrap_or(notation);
            item.notated(label)
        }
        None => item,
    })
}

impl Component {
    /// Hydrate the component stored as `uri`, visible in `read`.
    pub fn populate(store: &dyn GraphStore, read: &[String], uri: &str) -> ModelResult<Self> {
        let statements = store.describe(read, uri)?;
        let rdf_type = expand("rdf:type")?;
        let marker = expand(SAVE_CACHE)?;

        let com_type = statements
            .iter()
            .find(|(p, _)| *p == rdf_type)
            .map(|(_, o)| o.as_str())
            .ok_or_else(|| ModelError::Missing {
                entity: "component",
                uri: uri.to_string(),
                field: "rdf:type",
            })?;
        let mut component = Component::new(notated(store, com_type)?)?;

        for (predicate, object) in &statements {
            if *predicate == rdf_type || *predicate == marker {
                continue;
            }
            let predicate = notated(store, predicate)?;
            let property = if object.starts_with(COMPONENT_NS) {
                Property::component(predicate, Component::populate(store, read, object)?)?
            } else {
                Property::statement(predicate, notated(store, object)?)?
            };
            component.add(property)?;
        }
        component.set_uri(Item::uri(uri));
        debug!(uri, properties = component.properties().len(), "component hydrated");
        Ok(component)
    }
}

impl Mapping {
    /// Hydrate the mapping stored as `uri`, visible in `read`.
    pub fn populate(store: &dyn GraphStore, read: &[String], uri: &str) -> ModelResult<Self> {
        let statements = store.describe(read, uri)?;
        let first = |field: &'static str| -> ModelResult<String> {
            let full = expand(field)?;
            statements
                .iter()
                .find(|(p, _)| *p == full)
                .map(|(_, o)| o.clone())
                .ok_or_else(|| ModelError::Missing {
                    entity: "mapping",
                    uri: uri.to_string(),
                    field,
                })
        };
        let source = Component::populate(store, read, &first("cw:source")?)?;
        let target = Component::populate(store, read, &first("cw:target")?)?;
        let mut mapping = Mapping::new(source, target);

        for (predicate, object) in &statements {
            let Some(short) = compact(predicate) else {
                continue;
            };
            let item = Item::new(object);
            match short.as_str() {
                "cw:invertible" => mapping.set_invertible(parse_flag(object))?,
                "cw:inverted" => mapping.set_inverted(parse_flag(object))?,
                "dc:creator" => mapping.set_creator(item)?,
                "skos:note" => mapping.set_note(item)?,
                "dc:replaces" => mapping.set_replaces(item)?,
                "cw:hasValueMap" => mapping.add_valuemap(item)?,
                "dc:rights" => mapping.set_rights(item)?,
                "dc:rightsHolder" => mapping.add_rights_holder(item)?,
                "dc:contributor" => mapping.add_contributor(item)?,
                "dc:dateAccepted" => mapping.set_date_accepted(item)?,
                _ => {}
            }
        }
        mapping.set_uri(Item::uri(uri));
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_crypto::ContentHasher;
    use cw_store::{GraphScope, InMemoryGraphStore};

    fn term(local: &str) -> Item {
        Item::uri(format!("http://crosswalk.dev/vocab#{local}"))
    }

    fn field(name: &str) -> Component {
        let unit = Component::new(term("Unit"))
            .unwrap()
            .with(Property::statement(term("symbol"), Item::literal("K")).unwrap())
            .unwrap()
            .with(Property::statement(term("scale"), Item::new("273.15")).unwrap())
            .unwrap();
        Component::new(term("Field"))
            .unwrap()
            .with(Property::statement(term("name"), Item::literal(name)).unwrap())
            .unwrap()
            .with(Property::component(term("unit"), unit).unwrap())
            .unwrap()
    }

    #[test]
    fn component_round_trips_through_store() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let mut original = field("tas");
        let uri = original.create(&store, &scope).unwrap();

        let hydrated = Component::populate(&store, &scope.read, uri.data()).unwrap();
        assert_eq!(hydrated, original);
        assert!(hydrated.is_compound());
        assert_eq!(hydrated.uri(), Some(&uri));
        let rehashed = ContentHasher::COMPONENT
            .entity_uri(&hydrated.projection().unwrap())
            .unwrap();
        assert_eq!(rehashed, uri.data());
    }

    #[test]
    fn notations_are_attached() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        store
            .add(&scope.write.concepts, term("name").data(), "skos:notation", "\"Name\"")
            .unwrap();
        let uri = field("tas").create(&store, &scope).unwrap();
        let hydrated = Component::populate(&store, &scope.read, uri.data()).unwrap();
        let name = hydrated.get("name").unwrap();
        assert_eq!(name.predicate().notation(), Some("Name"));
    }

    #[test]
    fn mapping_round_trips_through_store() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let mut m = Mapping::new(field("tas"), field("2t"));
        m.set_invertible(true).unwrap();
        m.set_creator(Item::uri("http://people/alice")).unwrap();
        m.set_note(Item::literal("checked \"by hand\"")).unwrap();
        m.set_date_accepted(Item::literal("2024-05-01")).unwrap();
        let uri = m.create(&store, &scope).unwrap();

        let hydrated = Mapping::populate(&store, &scope.read, uri.data()).unwrap();
        assert_eq!(hydrated, m);
        assert!(hydrated.invertible());
        assert_eq!(hydrated.note(), m.note());
        assert_eq!(hydrated.projection().unwrap(), m.projection().unwrap());
    }

    #[test]
    fn numeric_text_literals_keep_their_kind() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let mut m = Mapping::new(field("tas"), field("2t"));
        m.set_note(Item::literal("42")).unwrap();
        m.set_date_accepted(Item::literal("2024")).unwrap();
        let uri = m.create(&store, &scope).unwrap();

        let hydrated = Mapping::populate(&store, &scope.read, uri.data()).unwrap();
        assert_eq!(hydrated.note(), Some(&Item::literal("42")));
        assert_eq!(hydrated.date_accepted(), Some(&Item::literal("2024")));
        assert_eq!(hydrated, m);
    }

    #[test]
    fn unknown_subject_is_missing() {
        let store = InMemoryGraphStore::new();
        let err = Mapping::populate(&store, &GraphScope::main().read, "<http://x/none>").unwrap_err();
        assert!(matches!(err, ModelError::Missing { .. }));
    }
}
