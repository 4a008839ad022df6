//! Integrity rules over a graph snapshot.
//!
//! A [`Validator`] runs a battery of rules and merges their findings, a map
//! from rule label to violating rows. Two built-in rules check current
//! mappings:
//!
//! - **Duplicate mappings**: two distinct current mappings with identical
//!   source and identical target.
//! - **Ambiguous mappings**: two distinct current mappings whose sources are
//!   the same apart from sub-format discriminators, whose targets differ but
//!   share a target class. When both sources declare discriminators and the
//!   values differ, the ambiguity is resolved and not reported.
//!
//! Rules are registered, not discovered at run time. [`Validator::new`]
//! registers the built-ins; any crate holding a validator (for example
//! through [`KnowledgeBase::validator_mut`](crate::KnowledgeBase::validator_mut))
//! adds its own with [`Validator::register`], and every registered rule runs
//! on each [`Validator::run`]. Findings are merged with [`merge_disjoint`],
//! which refuses to let one rule overwrite another's label.

use std::collections::{BTreeMap, BTreeSet};

use cw_branch::Branch;
use cw_store::{GraphScope, GraphStore, SAVE_CACHE};
use cw_types::expand;
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};

/// One violating row: column name -> rendered term.
pub type FindingRow = BTreeMap<String, String>;

/// Rule label -> violating rows.
pub type Findings = BTreeMap<String, Vec<FindingRow>>;

/// A validation rule over the store, optionally restricted to a branch.
pub type Rule = Box<dyn Fn(&dyn GraphStore, Option<&Branch>) -> SdkResult<Findings> + Send + Sync>;

pub const DUPLICATE_MAPPINGS: &str = "Duplicate mappings";
pub const AMBIGUOUS_MAPPINGS: &str = "Ambiguous mappings";

/// Default sub-format discriminator predicates.
pub const DISCRIMINATORS: &[&str] = &["cw:subFormat"];

/// Subject -> predicate -> objects, predicates expanded.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    subjects: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl Snapshot {
    /// Read every statement visible from the branch (or main).
    pub fn load(store: &dyn GraphStore, branch: Option<&Branch>) -> SdkResult<Self> {
        let scope = branch.map_or_else(GraphScope::main, Branch::scope);
        let mut snapshot = Self::default();
        for t in store.triples(&scope.read)? {
            snapshot
                .subjects
                .entry(t.subject)
                .or_default()
                .entry(t.predicate)
                .or_default()
                .insert(t.object);
        }
        Ok(snapshot)
    }

    pub fn objects(&self, subject: &str, predicate: &str) -> Option<&BTreeSet<String>> {
        self.subjects.get(subject)?.get(predicate)
    }

    fn single(&self, subject: &str, predicate: &str) -> Option<&str> {
        self.objects(subject, predicate)?
            .iter()
            .next()
            .map(String::as_str)
    }

    /// Mappings no other mapping replaces, with their source and target.
    pub fn current_mappings(&self) -> SdkResult<Vec<(String, String, String)>> {
        let rdf_type = expand("rdf:type")?;
        let mapping = expand("cw:Mapping")?;
        let replaces = expand("dc:replaces")?;
        let source = expand("cw:source")?;
        let target = expand("cw:target")?;

        let replaced: BTreeSet<&String> = self
            .subjects
            .values()
            .filter_map(|p| p.get(&replaces))
            .flatten()
            .collect();
        Ok(self
            .subjects
            .iter()
            .filter(|(s, p)| {
                p.get(&rdf_type).is_some_and(|t| t.contains(&mapping)) && !replaced.contains(s)
            })
            .filter_map(|(s, _)| {
                Some((
                    s.clone(),
                    self.single(s, &source)?.to_string(),
                    self.single(s, &target)?.to_string(),
                ))
            })
            .collect())
    }
}

fn row(pairs: &[(&str, &str)]) -> FindingRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Pairs of distinct current mappings with identical source and target.
pub fn duplicate_mappings(snapshot: &Snapshot) -> SdkResult<Vec<FindingRow>> {
    let mut groups: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for (mapping, source, target) in snapshot.current_mappings()? {
        groups.entry((source, target)).or_default().push(mapping);
    }
    let mut rows = Vec::new();
    for ((source, target), mappings) in &groups {
        for (i, a) in mappings.iter().enumerate() {
            for b in &mappings[i + 1..] {
                rows.push(row(&[
                    ("mapping1", a),
                    ("mapping2", b),
                    ("source", source),
                    ("target", target),
                ]));
            }
        }
    }
    Ok(rows)
}

/// Pairs of current mappings that map one source to two targets of the
/// same class.
pub fn ambiguous_mappings(
    snapshot: &Snapshot,
    discriminators: &[&str],
) -> SdkResult<Vec<FindingRow>> {
    let rdf_type = expand("rdf:type")?;
    let marker = expand(SAVE_CACHE)?;
    let discriminators = discriminators
        .iter()
        .map(|d| expand(d))
        .collect::<Result<BTreeSet<_>, _>>()?;

    // source identity without discriminators, and the discriminator values
    let split = |source: &str| {
        let mut key = BTreeMap::new();
        let mut declared = BTreeMap::new();
        if let Some(preds) = snapshot.subjects.get(source) {
            for (p, objs) in preds {
                if *p == marker {
                    continue;
                }
                if discriminators.contains(p) {
                    declared.insert(p.clone(), objs.clone());
                } else {
                    key.insert(p.clone(), objs.clone());
                }
            }
        }
        (key, declared)
    };

    let current = snapshot.current_mappings()?;
    let mut rows = Vec::new();
    for (i, (m1, s1, t1)) in current.iter().enumerate() {
        for (m2, s2, t2) in &current[i + 1..] {
            if t1 == t2 {
                continue;
            }
            let (key1, declared1) = split(s1);
            let (key2, declared2) = split(s2);
            if s1 != s2 && key1 != key2 {
                continue;
            }
            if !declared1.is_empty() && !declared2.is_empty() && declared1 != declared2 {
                continue;
            }
            let empty = BTreeSet::new();
            let classes1 = snapshot.objects(t1, &rdf_type).unwrap_or(&empty);
            let classes2 = snapshot.objects(t2, &rdf_type).unwrap_or(&empty);
            if let Some(class) = classes1.intersection(classes2).next() {
                rows.push(row(&[
                    ("mapping1", m1),
                    ("mapping2", m2),
                    ("source", s1),
                    ("target1", t1),
                    ("target2", t2),
                    ("class", class),
                ]));
            }
        }
    }
    Ok(rows)
}

/// Merge `from` into `into`; a label present in both is an error.
pub fn merge_disjoint(into: &mut Findings, from: Findings) -> SdkResult<()> {
    if let Some(label) = from.keys().find(|label| into.contains_key(*label)) {
        return Err(SdkError::DuplicateRule {
            label: label.clone(),
        });
    }
    into.extend(from);
    Ok(())
}

/// The rule battery.
pub struct Validator {
    rules: Vec<(String, Rule)>,
}

impl Validator {
    /// A validator with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// A validator with the built-in duplicate and ambiguity rules.
    pub fn new() -> Self {
        let mut v = Self::empty();
        v.register(
            "duplicates",
            |store, branch| {
                let snapshot = Snapshot::load(store, branch)?;
                Ok(Findings::from([(
                    DUPLICATE_MAPPINGS.to_string(),
                    duplicate_mappings(&snapshot)?,
                )]))
            },
        );
        v.register(
            "ambiguities",
            |store, branch| {
                let snapshot = Snapshot::load(store, branch)?;
                Ok(Findings::from([(
                    AMBIGUOUS_MAPPINGS.to_string(),
                    ambiguous_mappings(&snapshot, DISCRIMINATORS)?,
                )]))
            },
        );
        v
    }

    /// Add a rule. `name` identifies the rule in logs; its findings carry
    /// their own labels.
    pub fn register<F>(&mut self, name: &str, rule: F)
    where
        F: Fn(&dyn GraphStore, Option<&Branch>) -> SdkResult<Findings> + Send + Sync + 'static,
    {
        self.rules.push((name.to_string(), Box::new(rule)));
    }

    /// Names of the registered rules, in run order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    /// Run every rule and merge the findings.
    pub fn run(&self, store: &dyn GraphStore, branch: Option<&Branch>) -> SdkResult<Findings> {
        let mut findings = Findings::new();
        for (name, rule) in &self.rules {
            let found = rule(store, branch)?;
            debug!(rule = %name, labels = found.len(), "validation rule finished");
            merge_disjoint(&mut findings, found)?;
        }
        let violations: usize = findings.values().map(Vec::len).sum();
        info!(
            branch = branch.map(|b| b.id.as_str()).unwrap_or("main"),
            violations,
            "validation finished"
        );
        Ok(findings)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rule_names().collect::<Vec<_>>())
            .finish()
    }
}
