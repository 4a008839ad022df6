use std::collections::BTreeMap;

use cw_types::{Item, Projection, TypeError};

use crate::error::{ModelError, ModelResult};
use crate::property::Property;

/// A typed bag of properties describing one metadata concept instance.
///
/// A component without nested components is *simple*; otherwise it is
/// *compound*. Once a URI has been assigned (by persisting or hydrating)
/// the component cannot be changed.
///
/// Equality compares the type and the properties as a multiset; the URI and
/// property order do not take part.
#[derive(Clone, Debug)]
pub struct Component {
    uri: Option<Item>,
    com_type: Item,
    properties: Vec<Property>,
    index: BTreeMap<String, usize>,
}

impl Component {
    /// Create an empty component. The type must be a URI.
    pub fn new(com_type: Item) -> Result<Self, TypeError> {
        if !com_type.is_uri() {
            return Err(TypeError::mismatch("com_type", "a URI", com_type.data()));
        }
        Ok(Self {
            uri: None,
            com_type,
            properties: Vec::new(),
            index: BTreeMap::new(),
        })
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, property: Property) -> ModelResult<Self> {
        self.add(property)?;
        Ok(self)
    }

    /// Append a property.
    pub fn add(&mut self, property: Property) -> ModelResult<()> {
        if let Some(uri) = &self.uri {
            return Err(ModelError::Immutable {
                entity: "component",
                uri: uri.data().to_string(),
            });
        }
        self.index
            .entry(property.name())
            .or_insert(self.properties.len());
        self.properties.push(property);
        Ok(())
    }

    /// The first property whose predicate notation (case-insensitive) or
    /// canonical predicate is `name`.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.index
            .get(&name.to_lowercase())
            .or_else(|| self.index.get(name))
            .map(|&i| &self.properties[i])
    }

    pub fn uri(&self) -> Option<&Item> {
        self.uri.as_ref()
    }

    pub fn com_type(&self) -> &Item {
        &self.com_type
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn is_simple(&self) -> bool {
        !self.properties.iter().any(Property::is_nested)
    }

    pub fn is_compound(&self) -> bool {
        !self.is_simple()
    }

    /// Canonical projection: `rdf:type` plus one statement per property.
    pub fn projection(&self) -> ModelResult<Projection> {
        let mut projection = Projection::new();
        projection.push_item("rdf:type", &self.com_type)?;
        for property in &self.properties {
            let (predicate, object) = property.contribution()?;
            projection.push(&predicate, object)?;
        }
        Ok(projection)
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [Property] {
        &mut self.properties
    }

    pub(crate) fn set_uri(&mut self, uri: Item) {
        self.uri = Some(uri);
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        if self.com_type != other.com_type || self.properties.len() != other.properties.len() {
            return false;
        }
        let mut used = vec![false; other.properties.len()];
        self.properties.iter().all(|p| {
            match other
                .properties
                .iter()
                .enumerate()
                .position(|(i, q)| !used[i] && q == p)
            {
                Some(i) => {
                    used[i] = true;
                    true
                }
                None => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cw_crypto::ContentHasher;
    use proptest::prelude::*;

    fn term(local: &str) -> Item {
        Item::uri(format!("http://crosswalk.dev/vocab#{local}"))
    }

    fn quantity() -> Component {
        Component::new(term("Quantity"))
            .unwrap()
            .with(Property::statement(term("name").notated("Name"), Item::literal("air_temperature")).unwrap())
            .unwrap()
            .with(Property::statement(term("units"), Item::literal("K")).unwrap())
            .unwrap()
    }

    #[test]
    fn type_must_be_uri() {
        assert!(Component::new(Item::literal("Quantity")).is_err());
    }

    #[test]
    fn accessor_by_notation_and_predicate() {
        let c = quantity();
        assert!(c.get("name").is_some());
        assert!(c.get("NAME").is_some());
        assert!(c.get("cw:units").is_some());
        assert!(c.get("missing").is_none());
    }

    #[test]
    fn simple_and_compound() {
        let simple = quantity();
        assert!(simple.is_simple());
        let compound = Component::new(term("Field"))
            .unwrap()
            .with(Property::component(term("quantity"), quantity()).unwrap())
            .unwrap();
        assert!(compound.is_compound());
    }

    #[test]
    fn equality_ignores_property_order_and_uri() {
        let a = quantity();
        let mut b = Component::new(term("Quantity"))
            .unwrap()
            .with(Property::statement(term("units"), Item::literal("K")).unwrap())
            .unwrap()
            .with(Property::statement(term("name").notated("Name"), Item::literal("air_temperature")).unwrap())
            .unwrap();
        b.set_uri(Item::uri("http://crosswalk.dev/component/abc"));
        assert_eq!(a, b);
    }

    #[test]
    fn persisted_component_is_immutable() {
        let mut c = quantity();
        c.set_uri(Item::uri("http://crosswalk.dev/component/abc"));
        let err = c
            .add(Property::statement(term("units"), Item::literal("degC")).unwrap())
            .unwrap_err();
        assert!(matches!(err, ModelError::Immutable { .. }));
    }

    #[test]
    fn projection_includes_type() {
        let p = quantity().projection().unwrap();
        assert_eq!(p.get("rdf:type").unwrap(), &["<http://crosswalk.dev/vocab#Quantity>".to_string()]);
        assert_eq!(p.len(), 3);
    }

    proptest! {
        #[test]
        fn hash_independent_of_property_order(values in proptest::collection::vec("[a-z]{1,8}", 1..6)) {
            let build = |vals: &[String]| {
                let mut c = Component::new(term("Bag")).unwrap();
                for v in vals {
                    c.add(Property::statement(term("member"), Item::literal(v)).unwrap()).unwrap();
                }
                ContentHasher::COMPONENT.hash(&c.projection().unwrap()).unwrap()
            };
            let mut reversed = values.clone();
            reversed.reverse();
            prop_assert_eq!(build(&values), build(&reversed));
        }
    }
}
