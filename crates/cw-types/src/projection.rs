use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::item::Item;
use crate::namespace;

/// Canonical predicate → objects view of an entity.
///
/// A projection is the sole input to content hashing and to lookup/insert
/// statement construction. Predicates are short-form (`prefix:local`) keys,
/// or full `<...>` URIs outside the prefix table, held in sorted order; each
/// predicate maps to one or more rendered object terms. Object lists are
/// kept sorted and free of duplicates, matching the set semantics of triples
/// in the store, so the projection does not depend on the order in which
/// fields were assigned.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    entries: BTreeMap<String, Vec<String>>,
}

impl Projection {
    /// Create an empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one statement.
    ///
    /// The predicate must be in `prefix:local` form or an angle-bracketed
    /// URI; full URIs covered by the prefix table are stored in short form.
    pub fn push(&mut self, predicate: &str, object: impl Into<String>) -> Result<(), TypeError> {
        let predicate = namespace::canonical_predicate(predicate)?;
        let object = object.into();
        if object.is_empty() {
            return Err(TypeError::EmptyTerm);
        }
        let objects = self.entries.entry(predicate).or_default();
        if let Err(pos) = objects.binary_search(&object) {
            objects.insert(pos, object);
        }
        Ok(())
    }

    /// Add one statement whose object is an [`Item`].
    pub fn push_item(&mut self, predicate: &str, item: &Item) -> Result<(), TypeError> {
        self.push(predicate, item.data())
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, predicate: &str, object: impl Into<String>) -> Result<Self, TypeError> {
        self.push(predicate, object)?;
        Ok(self)
    }

    /// Objects bound to a predicate.
    pub fn get(&self, predicate: &str) -> Option<&[String]> {
        self.entries.get(predicate).map(Vec::as_slice)
    }

    /// Remove a predicate and return its objects.
    pub fn remove(&mut self, predicate: &str) -> Option<Vec<String>> {
        self.entries.remove(predicate)
    }

    /// Predicates in sorted order.
    pub fn predicates(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate `(predicate, objects)` in sorted predicate order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(p, o)| (p.as_str(), o.as_slice()))
    }

    /// Iterate every `(predicate, object)` statement.
    pub fn statements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(p, objs)| objs.iter().map(move |o| (p.as_str(), o.as_str())))
    }

    /// Number of statements (the cardinality used by store lookups).
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns `true` if the projection holds no statements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn insertion_order_does_not_matter() {
        let mut a = Projection::new();
        a.push("dc:creator", "<http://x/alice>").unwrap();
        a.push("skos:note", "\"n\"").unwrap();
        let mut b = Projection::new();
        b.push("skos:note", "\"n\"").unwrap();
        b.push("dc:creator", "<http://x/alice>").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn objects_are_sorted_and_deduplicated() {
        let mut p = Projection::new();
        p.push("dc:contributor", "<http://x/b>").unwrap();
        p.push("dc:contributor", "<http://x/a>").unwrap();
        p.push("dc:contributor", "<http://x/b>").unwrap();
        assert_eq!(
            p.get("dc:contributor").unwrap(),
            &["<http://x/a>".to_string(), "<http://x/b>".to_string()]
        );
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn rejects_malformed_predicate() {
        let mut p = Projection::new();
        assert!(p.push("creator", "\"x\"").is_err());
        assert!(p.push("dc:creator", "").is_err());
        assert!(p.is_empty());
    }

    #[test]
    fn full_predicates_are_canonicalised() {
        let mut p = Projection::new();
        p.push("<http://purl.org/dc/terms/creator>", "<http://x/a>").unwrap();
        p.push("<http://example.org/units>", "\"K\"").unwrap();
        assert!(p.get("dc:creator").is_some());
        assert!(p.get("<http://example.org/units>").is_some());
    }

    #[test]
    fn statements_flatten_lists() {
        let p = Projection::new()
            .with("rdf:type", "<http://x/T>")
            .unwrap()
            .with("dc:contributor", "<http://x/a>")
            .unwrap()
            .with("dc:contributor", "<http://x/b>")
            .unwrap();
        let stmts: Vec<_> = p.statements().collect();
        assert_eq!(stmts.len(), 3);
        assert_eq!(stmts[0].0, "dc:contributor");
        assert_eq!(stmts[2], ("rdf:type", "<http://x/T>"));
    }

    fn statement() -> impl Strategy<Value = (&'static str, String)> {
        (
            prop::sample::select(vec!["skos:notation", "cw:name", "dc:creator", "rdf:type"]),
            "\"[a-z]{1,6}\"",
        )
    }

    proptest! {
        #[test]
        fn order_and_repeats_do_not_change_projection(
            pairs in prop::collection::vec(statement(), 1..12)
        ) {
            let mut forward = Projection::new();
            for (predicate, object) in &pairs {
                forward.push(predicate, object.clone()).unwrap();
            }
            let mut backward = Projection::new();
            for (predicate, object) in pairs.iter().rev().chain(pairs.iter()) {
                backward.push(predicate, object.clone()).unwrap();
            }
            prop_assert_eq!(&forward, &backward);
            prop_assert!(forward.statements().count() <= pairs.len());
        }
    }
}
