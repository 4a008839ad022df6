use cw_types::{canonical_predicate, Item, TypeError};

use crate::component::Component;
use crate::error::{ModelError, ModelResult};

/// A scalar fact: predicate and object item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatementProperty {
    predicate: Item,
    object: Item,
}

impl StatementProperty {
    /// The predicate must be a URI.
    pub fn new(predicate: Item, object: Item) -> Result<Self, TypeError> {
        require_uri_predicate(&predicate)?;
        Ok(Self { predicate, object })
    }

    /// Predicate URI.
    pub fn predicate(&self) -> &Item {
        &self.predicate
    }

    /// Object term, a URI, literal or number.
    pub fn object(&self) -> &Item {
        &self.object
    }
}

/// A structural fact: predicate and nested component.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentProperty {
    predicate: Item,
    component: Component,
}

impl ComponentProperty {
    /// The predicate must be a URI.
    pub fn new(predicate: Item, component: Component) -> Result<Self, TypeError> {
        require_uri_predicate(&predicate)?;
        Ok(Self {
            predicate,
            component,
        })
    }

    /// Predicate URI.
    pub fn predicate(&self) -> &Item {
        &self.predicate
    }

    /// The nested component.
    pub fn component(&self) -> &Component {
        &self.component
    }

    pub(crate) fn component_mut(&mut self) -> &mut Component {
        &mut self.component
    }
}

fn require_uri_predicate(predicate: &Item) -> Result<(), TypeError> {
    if predicate.is_uri() {
        Ok(())
    } else {
        Err(TypeError::mismatch("predicate", "a URI", predicate.data()))
    }
}

/// One property of a [`Component`].
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
    Statement(StatementProperty),
    Component(ComponentProperty),
}

impl Property {
    /// Shorthand for a statement property.
    pub fn statement(predicate: Item, object: Item) -> Result<Self, TypeError> {
        StatementProperty::new(predicate, object).map(Property::Statement)
    }

    /// Shorthand for a component property.
    pub fn component(predicate: Item, component: Component) -> Result<Self, TypeError> {
        ComponentProperty::new(predicate, component).map(Property::Component)
    }

    /// Predicate of either variant.
    pub fn predicate(&self) -> &Item {
        match self {
            Property::Statement(p) => p.predicate(),
            Property::Component(p) => p.predicate(),
        }
    }

    /// Name the property is addressed by: the lowercased predicate notation,
    /// or the canonical predicate when it has none.
    pub fn name(&self) -> String {
        match self.predicate().notation() {
            Some(notation) => notation.to_lowercase(),
            None => canonical_predicate(self.predicate().data())
                .unwrap_or_else(|_| self.predicate().data().to_string()),
        }
    }

    /// True for component properties.
    pub fn is_nested(&self) -> bool {
        matches!(self, Property::Component(_))
    }

    /// The `(predicate, object)` statement this property contributes to its
    /// component's projection.
    ///
    /// A nested component contributes its URI, so it must be persisted.
    pub fn contribution(&self) -> ModelResult<(String, String)> {
        let predicate = canonical_predicate(self.predicate().data())?;
        let object = match self {
            Property::Statement(p) => p.object().data().to_string(),
            Property::Component(p) => match p.component().uri() {
                Some(uri) => uri.data().to_string(),
                None => {
                    return Err(ModelError::Unpersisted(format!(
                        "component of type {}",
                        p.component().com_type().label()
                    )))
                }
            },
        };
        Ok((predicate, object))
    }
}
