use cw_types::{expand, Item, Projection, TypeError};

use crate::component::Component;
use crate::error::{ModelError, ModelResult};

/// A directed relation between a source and a target component.
///
/// Identity for comparison is the (source, target) pair only; provenance
/// metadata does not take part. The content hash, by contrast, covers every
/// field except the acceptance date.
#[derive(Clone, Debug)]
pub struct Mapping {
    uri: Option<Item>,
    source: Component,
    target: Component,
    invertible: bool,
    inverted: bool,
    creator: Option<Item>,
    note: Option<Item>,
    replaces: Option<Item>,
    valuemaps: Vec<Item>,
    rights: Option<Item>,
    rights_holders: Vec<Item>,
    contributors: Vec<Item>,
    date_accepted: Option<Item>,
}

fn require_uri(field: &str, item: &Item) -> Result<(), TypeError> {
    if item.is_uri() {
        Ok(())
    } else {
        Err(TypeError::mismatch(field, "a URI", item.data()))
    }
}

fn require_literal(field: &str, item: &Item) -> Result<(), TypeError> {
    if item.is_literal() {
        Ok(())
    } else {
        Err(TypeError::mismatch(field, "a literal", item.data()))
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "\"True\""
    } else {
        "\"False\""
    }
}

impl Mapping {
    pub fn new(source: Component, target: Component) -> Self {
        Self {
            uri: None,
            source,
            target,
            invertible: false,
            inverted: false,
            creator: None,
            note: None,
            replaces: None,
            valuemaps: Vec::new(),
            rights: None,
            rights_holders: Vec::new(),
            contributors: Vec::new(),
            date_accepted: None,
        }
    }

    fn mutable(&self) -> ModelResult<()> {
        match &self.uri {
            Some(uri) => Err(ModelError::Immutable {
                entity: "mapping",
                uri: uri.data().to_string(),
            }),
            None => Ok(()),
        }
    }

    // --- setters -----------------------------------------------------------

    /// Mark the mapping as usable in both directions.
    pub fn set_invertible(&mut self, invertible: bool) -> ModelResult<()> {
        self.mutable()?;
        self.invertible = invertible;
        Ok(())
    }

    /// Set the stored `cw:inverted` flag.
    pub fn set_inverted(&mut self, inverted: bool) -> ModelResult<()> {
        self.mutable()?;
        self.inverted = inverted;
        Ok(())
    }

    /// Set the author. Must be a URI.
    pub fn set_creator(&mut self, creator: Item) -> ModelResult<()> {
        self.mutable()?;
        require_uri("creator", &creator)?;
        self.creator = Some(creator);
        Ok(())
    }

    /// Attach a free-text note. Must be a literal.
    pub fn set_note(&mut self, note: Item) -> ModelResult<()> {
        self.mutable()?;
        require_literal("note", &note)?;
        self.note = Some(note);
        Ok(())
    }

    /// Link the mapping this one supersedes.
    pub fn set_replaces(&mut self, prior: Item) -> ModelResult<()> {
        self.mutable()?;
        require_uri("replaces", &prior)?;
        self.replaces = Some(prior);
        Ok(())
    }

    /// Reference a value map (a URI) used by the mapping.
    pub fn add_valuemap(&mut self, valuemap: Item) -> ModelResult<()> {
        self.mutable()?;
        require_uri("valuemaps", &valuemap)?;
        self.valuemaps.push(valuemap);
        Ok(())
    }

    /// Set the rights statement. Any term kind is accepted.
    pub fn set_rights(&mut self, rights: Item) -> ModelResult<()> {
        self.mutable()?;
        self.rights = Some(rights);
        Ok(())
    }

    /// Add a rights holder URI.
    pub fn add_rights_holder(&mut self, holder: Item) -> ModelResult<()> {
        self.mutable()?;
        require_uri("rightsHolders", &holder)?;
        self.rights_holders.push(holder);
        Ok(())
    }

    /// Add a contributor URI.
    pub fn add_contributor(&mut self, contributor: Item) -> ModelResult<()> {
        self.mutable()?;
        require_uri("contributors", &contributor)?;
        self.contributors.push(contributor);
        Ok(())
    }

    /// Record when the mapping was accepted. Must be a literal.
    pub fn set_date_accepted(&mut self, date: Item) -> ModelResult<()> {
        self.mutable()?;
        require_literal("dateAccepted", &date)?;
        self.date_accepted = Some(date);
        Ok(())
    }

    // --- accessors ---------------------------------------------------------

    /// Content-addressed URI, set once the mapping is stored or populated.
    pub fn uri(&self) -> Option<&Item> {
        self.uri.as_ref()
    }

    /// Component mapped from.
    pub fn source(&self) -> &Component {
        &self.source
    }

    /// Component mapped to.
    pub fn target(&self) -> &Component {
        &self.target
    }

    /// Whether the mapping also applies from target to source.
    pub fn invertible(&self) -> bool {
        self.invertible
    }

    /// The stored `cw:inverted` flag.
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Author URI.
    pub fn creator(&self) -> Option<&Item> {
        self.creator.as_ref()
    }

    /// Note literal.
    pub fn note(&self) -> Option<&Item> {
        self.note.as_ref()
    }

    /// The mapping this one supersedes.
    pub fn replaces(&self) -> Option<&Item> {
        self.replaces.as_ref()
    }

    /// Value map URIs, in insertion order.
    pub fn valuemaps(&self) -> &[Item] {
        &self.valuemaps
    }

    /// Rights statement.
    pub fn rights(&self) -> Option<&Item> {
        self.rights.as_ref()
    }

    /// Rights holder URIs.
    pub fn rights_holders(&self) -> &[Item] {
        &self.rights_holders
    }

    /// Contributor URIs.
    pub fn contributors(&self) -> &[Item] {
        &self.contributors
    }

    /// Acceptance date literal.
    pub fn date_accepted(&self) -> Option<&Item> {
        self.date_accepted.as_ref()
    }

    pub(crate) fn source_mut(&mut self) -> &mut Component {
        &mut self.source
    }

    pub(crate) fn target_mut(&mut self) -> &mut Component {
        &mut self.target
    }

    pub(crate) fn set_uri(&mut self, uri: Item) {
        self.uri = Some(uri);
    }

    /// Canonical projection. Source and target must be persisted.
    pub fn projection(&self) -> ModelResult<Projection> {
        let endpoint = |c: &Component, which: &str| -> ModelResult<String> {
            c.uri()
                .map(|u| u.data().to_string())
                .ok_or_else(|| ModelError::Unpersisted(format!("mapping {which}")))
        };
        let mut p = Projection::new();
        p.push("rdf:type", expand("cw:Mapping")?)?;
        p.push("cw:source", endpoint(&self.source, "source")?)?;
        p.push("cw:target", endpoint(&self.target, "target")?)?;
        p.push("cw:invertible", flag(self.invertible))?;
        p.push("cw:inverted", flag(self.inverted))?;
        let optional = [
            ("dc:creator", &self.creator),
            ("skos:note", &self.note),
            ("dc:replaces", &self.replaces),
            ("dc:rights", &self.rights),
            ("dc:dateAccepted", &self.date_accepted),
        ];
        for (predicate, item) in optional {
            if let Some(item) = item {
                p.push_item(predicate, item)?;
            }
        }
        let lists = [
            ("cw:hasValueMap", &self.valuemaps),
            ("dc:rightsHolder", &self.rights_holders),
            ("dc:contributor", &self.contributors),
        ];
        for (predicate, items) in lists {
            for item in items {
                p.push_item(predicate, item)?;
            }
        }
        Ok(p)
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.target == other.target
    }
}

/// Parse a stored `"True"`/`"False"` flag.
pub(crate) fn parse_flag(term: &str) -> bool {
    term == "\"True\""
}
