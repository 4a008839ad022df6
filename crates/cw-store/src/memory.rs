use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use cw_types::{expand, expand_term, Projection};

use crate::error::StoreResult;
use crate::graph::{MappingRef, Triple};
use crate::intern::InternPolicy;
use crate::traits::GraphStore;
use crate::SAVE_CACHE;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Quad {
    graph: String,
    subject: String,
    predicate: String,
    object: String,
}

/// In-memory quad store.
///
/// Intended for tests and embedding. Predicates are held expanded so the
/// store answers the same way the remote store does for the same statements.
pub struct InMemoryGraphStore {
    quads: RwLock<BTreeSet<Quad>>,
    policy: InternPolicy,
}

impl InMemoryGraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            quads: RwLock::new(BTreeSet::new()),
            policy: InternPolicy::default(),
        }
    }

    /// Number of quads across all graphs.
    pub fn len(&self) -> usize {
        self.quads.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no graph holds any statement.
    pub fn is_empty(&self) -> bool {
        self.quads.read().expect("lock poisoned").is_empty()
    }

    /// Number of statements in one graph.
    pub fn graph_len(&self, graph: &str) -> usize {
        self.quads
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|q| q.graph == graph)
            .count()
    }

    /// Names of non-empty graphs, sorted.
    pub fn graphs(&self) -> Vec<String> {
        let quads = self.quads.read().expect("lock poisoned");
        let names: BTreeSet<&String> = quads.iter().map(|q| &q.graph).collect();
        names.into_iter().cloned().collect()
    }

    /// Insert one raw statement. Predicates and objects may be prefixed.
    pub fn add(&self, graph: &str, subject: &str, predicate: &str, object: &str) -> StoreResult<()> {
        let quad = Quad {
            graph: graph.to_string(),
            subject: subject.to_string(),
            predicate: expand(predicate)?,
            object: expand_term(object)?,
        };
        self.quads.write().expect("lock poisoned").insert(quad);
        Ok(())
    }

    /// Merged default graph over `read`: subject -> set of (p, o).
    fn merged(&self, read: &[String]) -> BTreeMap<String, BTreeSet<(String, String)>> {
        let quads = self.quads.read().expect("lock poisoned");
        let mut merged: BTreeMap<String, BTreeSet<(String, String)>> = BTreeMap::new();
        for q in quads.iter().filter(|q| read.contains(&q.graph)) {
            merged
                .entry(q.subject.clone())
                .or_default()
                .insert((q.predicate.clone(), q.object.clone()));
        }
        merged
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

fn expanded(projection: &Projection) -> StoreResult<BTreeSet<(String, String)>> {
    projection
        .statements()
        .map(|(p, o)| Ok((expand(p)?, expand_term(o)?)))
        .collect()
}

impl GraphStore for InMemoryGraphStore {
    fn lookup(&self, read: &[String], projection: &Projection) -> StoreResult<Vec<String>> {
        let wanted = expanded(projection)?;
        let marker_p = expand(SAVE_CACHE)?;
        let marker = (marker_p.clone(), "\"True\"".to_string());
        let merged = self.merged(read);
        let found = merged
            .into_iter()
            .filter(|(_, statements)| {
                if !wanted.is_subset(statements) {
                    return false;
                }
                if statements.contains(&marker) {
                    statements.len() == wanted.len() + 1
                } else {
                    !statements.iter().any(|(p, _)| *p == marker_p)
                        && statements.len() == wanted.len()
                }
            })
            .map(|(subject, _)| subject)
            .collect();
        Ok(found)
    }

    fn insert(&self, graph: &str, subject: &str, projection: &Projection) -> StoreResult<()> {
        let statements = expanded(projection)?;
        let mut quads = self.quads.write().expect("lock poisoned");
        for (predicate, object) in statements {
            quads.insert(Quad {
                graph: graph.to_string(),
                subject: subject.to_string(),
                predicate,
                object,
            });
        }
        Ok(())
    }

    fn describe(&self, read: &[String], subject: &str) -> StoreResult<Vec<(String, String)>> {
        Ok(self
            .merged(read)
            .remove(subject)
            .map(|s| s.into_iter().collect())
            .unwrap_or_default())
    }

    fn notation(&self, subject: &str) -> StoreResult<Option<String>> {
        let notation = expand("skos:notation")?;
        let quads = self.quads.read().expect("lock poisoned");
        Ok(quads
            .iter()
            .filter(|q| q.subject == subject && q.predicate == notation)
            .map(|q| q.object.clone())
            .min())
    }

    fn triples(&self, graphs: &[String]) -> StoreResult<Vec<Triple>> {
        let quads = self.quads.read().expect("lock poisoned");
        let set: BTreeSet<Triple> = quads
            .iter()
            .filter(|q| graphs.contains(&q.graph))
            .map(|q| Triple::new(&q.subject, &q.predicate, &q.object))
            .collect();
        Ok(set.into_iter().collect())
    }

    fn remove_common(&self, branch: &str, main: &str) -> StoreResult<()> {
        let mut quads = self.quads.write().expect("lock poisoned");
        let in_main: BTreeSet<(String, String, String)> = quads
            .iter()
            .filter(|q| q.graph == main)
            .map(|q| (q.subject.clone(), q.predicate.clone(), q.object.clone()))
            .collect();
        quads.retain(|q| {
            q.graph != branch
                || !in_main.contains(&(q.subject.clone(), q.predicate.clone(), q.object.clone()))
        });
        Ok(())
    }

    fn add_graph(&self, from: &str, into: &str) -> StoreResult<()> {
        let mut quads = self.quads.write().expect("lock poisoned");
        let copied: Vec<Quad> = quads
            .iter()
            .filter(|q| q.graph == from)
            .map(|q| Quad {
                graph: into.to_string(),
                ..q.clone()
            })
            .collect();
        quads.extend(copied);
        Ok(())
    }

    fn drop_graph(&self, graph: &str) -> StoreResult<()> {
        self.quads
            .write()
            .expect("lock poisoned")
            .retain(|q| q.graph != graph);
        Ok(())
    }

    fn remove_subject(&self, graph: &str, subject: &str) -> StoreResult<()> {
        self.quads
            .write()
            .expect("lock poisoned")
            .retain(|q| q.graph != graph || q.subject != subject);
        Ok(())
    }

    fn current_mappings(
        &self,
        read: &[String],
        source_type: &str,
        target_type: &str,
    ) -> StoreResult<Vec<MappingRef>> {
        let rdf_type = expand("rdf:type")?;
        let mapping_type = expand("cw:Mapping")?;
        let source = expand("cw:source")?;
        let target = expand("cw:target")?;
        let invertible = expand("cw:invertible")?;
        let replaces = expand("dc:replaces")?;
        let source_type = expand_term(source_type)?;
        let target_type = expand_term(target_type)?;

        let merged = self.merged(read);
        let has = |s: &str, p: &str, o: &str| {
            merged
                .get(s)
                .is_some_and(|st| st.contains(&(p.to_string(), o.to_string())))
        };
        let objects = |s: &str, p: &str| -> Vec<String> {
            merged
                .get(s)
                .map(|st| {
                    st.iter()
                        .filter(|(sp, _)| sp == p)
                        .map(|(_, o)| o.clone())
                        .collect()
                })
                .unwrap_or_default()
        };
        let replaced: BTreeSet<String> = merged
            .values()
            .flat_map(|st| st.iter().filter(|(p, _)| *p == replaces).map(|(_, o)| o.clone()))
            .collect();

        let mut found = Vec::new();
        for mapping in merged.keys() {
            if !has(mapping, &rdf_type, &mapping_type) || replaced.contains(mapping) {
                continue;
            }
            let source_ok = objects(mapping, &source)
                .iter()
                .any(|s| has(s, &rdf_type, &source_type));
            let target_ok = objects(mapping, &target)
                .iter()
                .any(|t| has(t, &rdf_type, &target_type));
            if source_ok && target_ok {
                found.push(MappingRef {
                    uri: mapping.clone(),
                    invertible: has(mapping, &invertible, "\"True\""),
                });
            }
        }
        Ok(found)
    }

    fn intern_policy(&self) -> InternPolicy {
        self.policy
    }
}

impl std::fmt::Debug for InMemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGraphStore")
            .field("quad_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphPair, GraphScope};
    use cw_crypto::ContentHasher;

    const UNIT: &str = "<http://crosswalk.dev/vocab#Unit>";

    fn unit(name: &str) -> Projection {
        Projection::new()
            .with("rdf:type", UNIT)
            .unwrap()
            .with("skos:notation", format!("\"{name}\""))
            .unwrap()
    }

    #[test]
    fn intern_is_idempotent() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let a = store
            .intern(&scope.write.concepts, &scope.read, &unit("K"), &ContentHasher::COMPONENT)
            .unwrap();
        let b = store
            .intern(&scope.write.concepts, &scope.read, &unit("K"), &ContentHasher::COMPONENT)
            .unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("<http://crosswalk.dev/component/"));
        // two statements plus the marker
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn concurrent_identical_interns_yield_one_entity() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let ids: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        store
                            .intern(
                                &scope.write.concepts,
                                &scope.read,
                                &unit("m"),
                                &ContentHasher::COMPONENT,
                            )
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn intern_requires_type() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let p = Projection::new().with("skos:notation", "\"K\"").unwrap();
        assert!(store
            .intern(&scope.write.concepts, &scope.read, &p, &ContentHasher::COMPONENT)
            .is_err());
    }

    #[test]
    fn lookup_matches_exact_content_only() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let g = &scope.write.concepts;
        store.insert(g, "<http://x/plain>", &unit("K")).unwrap();
        let bigger = unit("m").with("skos:note", "\"extra\"").unwrap();
        store.insert(g, "<http://x/bigger>", &bigger).unwrap();

        assert_eq!(store.lookup(&scope.read, &unit("K")).unwrap(), vec!["<http://x/plain>"]);
        // a subset of a larger entity does not match
        assert!(store.lookup(&scope.read, &unit("m")).unwrap().is_empty());
    }

    #[test]
    fn branch_writes_are_invisible_on_main() {
        let store = InMemoryGraphStore::new();
        let branch = GraphScope::branch("b1");
        let id = store
            .intern(&branch.write.concepts, &branch.read, &unit("K"), &ContentHasher::COMPONENT)
            .unwrap();
        assert_eq!(store.lookup(&branch.read, &unit("K")).unwrap(), vec![id]);
        assert!(store.lookup(&GraphScope::main().read, &unit("K")).unwrap().is_empty());
    }

    #[test]
    fn remove_common_and_add_graph() {
        let store = InMemoryGraphStore::new();
        let main = GraphPair::main();
        let branch = GraphPair::branch("b1");
        store.insert(&main.concepts, "<http://x/a>", &unit("a")).unwrap();
        store.insert(&branch.concepts, "<http://x/a>", &unit("a")).unwrap();
        store.insert(&branch.concepts, "<http://x/b>", &unit("b")).unwrap();

        store.remove_common(&branch.concepts, &main.concepts).unwrap();
        assert_eq!(store.graph_len(&branch.concepts), 2);

        store.add_graph(&branch.concepts, &main.concepts).unwrap();
        assert_eq!(store.graph_len(&main.concepts), 4);

        store.remove_common(&branch.concepts, &main.concepts).unwrap();
        assert_eq!(store.graph_len(&branch.concepts), 0);
    }

    #[test]
    fn describe_and_notation() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        store.insert(&scope.write.concepts, "<http://x/a>", &unit("K")).unwrap();
        let described = store.describe(&scope.read, "<http://x/a>").unwrap();
        assert_eq!(described.len(), 2);
        assert!(described
            .iter()
            .any(|(p, o)| p == "<http://www.w3.org/2004/02/skos/core#notation>" && o == "\"K\""));
        assert_eq!(store.notation("<http://x/a>").unwrap().as_deref(), Some("\"K\""));
        assert_eq!(store.notation("<http://x/none>").unwrap(), None);
    }

    #[test]
    fn current_mappings_skip_replaced() {
        let store = InMemoryGraphStore::new();
        let scope = GraphScope::main();
        let g = &scope.write.mappings;
        store.add(g, "<http://x/s>", "rdf:type", "<http://x/Src>").unwrap();
        store.add(g, "<http://x/t>", "rdf:type", "<http://x/Tgt>").unwrap();
        for m in ["<http://x/m1>", "<http://x/m2>"] {
            store.add(g, m, "rdf:type", "cw:Mapping").unwrap();
            store.add(g, m, "cw:source", "<http://x/s>").unwrap();
            store.add(g, m, "cw:target", "<http://x/t>").unwrap();
        }
        store.add(g, "<http://x/m2>", "cw:invertible", "\"True\"").unwrap();
        store.add(g, "<http://x/m2>", "dc:replaces", "<http://x/m1>").unwrap();

        let found = store
            .current_mappings(&scope.read, "<http://x/Src>", "<http://x/Tgt>")
            .unwrap();
        assert_eq!(
            found,
            vec![MappingRef {
                uri: "<http://x/m2>".into(),
                invertible: true
            }]
        );
    }

    #[test]
    fn drop_graph_and_remove_subject() {
        let store = InMemoryGraphStore::new();
        let main = GraphPair::main();
        store.insert(&main.concepts, "<http://x/a>", &unit("a")).unwrap();
        store.insert(&main.mappings, "<http://x/b>", &unit("b")).unwrap();
        store.remove_subject(&main.concepts, "<http://x/a>").unwrap();
        assert_eq!(store.graph_len(&main.concepts), 0);
        store.drop_graph(&main.mappings).unwrap();
        store.drop_graph("<http://x/never>").unwrap();
        assert!(store.is_empty());
    }
}
