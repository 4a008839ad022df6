//! Statement builders for the SPARQL store.
//!
//! Every builder returns the statement body only; the gateway prepends the
//! `PREFIX` header before sending. Predicates are always written expanded.

use std::fmt::Write;

use cw_types::{expand, expand_term, Projection};

use crate::error::StoreResult;
use crate::SAVE_CACHE;

fn from_clauses(read: &[String]) -> String {
    read.iter().map(|g| format!("FROM {g}\n")).collect()
}

fn patterns(projection: &Projection) -> StoreResult<String> {
    let mut out = String::new();
    for (predicate, object) in projection.statements() {
        let _ = writeln!(out, "      ?s {} {} .", expand(predicate)?, object);
    }
    Ok(out)
}

/// Subjects in `read` whose statements are exactly `projection`, with the
/// bookkeeping marker or with no marker at all.
pub fn lookup_query(read: &[String], projection: &Projection) -> StoreResult<String> {
    let n = projection.len();
    let body = patterns(projection)?;
    let marker = expand(SAVE_CACHE)?;
    Ok(format!(
        "SELECT DISTINCT ?s\n{from}WHERE {{\n  {{\n    SELECT ?s WHERE {{\n{body}      ?s {marker} \"True\" .\n      ?s ?p ?o .\n    }}\n    GROUP BY ?s\n    HAVING (COUNT(?o) = {with_marker})\n  }}\n  UNION\n  {{\n    SELECT ?s WHERE {{\n{body}      ?s ?p ?o .\n      FILTER NOT EXISTS {{ ?s {marker} ?cache }}\n    }}\n    GROUP BY ?s\n    HAVING (COUNT(?o) = {n})\n  }}\n}}\n",
        from = from_clauses(read),
        with_marker = n + 1,
    ))
}

/// Insert every statement of `projection` about `subject` into `graph`.
pub fn insert_data(graph: &str, subject: &str, projection: &Projection) -> StoreResult<String> {
    let mut out = format!("INSERT DATA {{\n  GRAPH {graph} {{\n");
    for (predicate, object) in projection.statements() {
        let _ = writeln!(out, "    {subject} {} {object} .", expand(predicate)?);
    }
    out.push_str("  }\n}\n");
    Ok(out)
}

/// Every `(?p, ?o)` about `subject` in `read`.
pub fn describe_query(read: &[String], subject: &str) -> String {
    format!(
        "SELECT DISTINCT ?p ?o\n{}WHERE {{\n  {subject} ?p ?o .\n}}\nORDER BY ?p ?o\n",
        from_clauses(read)
    )
}

/// The notation of a term in the default graph or any named graph.
pub fn notation_query(subject: &str) -> String {
    format!(
        "SELECT ?notation WHERE {{\n  {{ {subject} skos:notation ?notation }}\n  UNION\n  {{ GRAPH ?g {{ {subject} skos:notation ?notation }} }}\n}}\nORDER BY ?notation\nLIMIT 1\n"
    )
}

/// Every statement in `graphs`.
pub fn triples_query(graphs: &[String]) -> String {
    format!(
        "SELECT DISTINCT ?s ?p ?o\n{}WHERE {{\n  ?s ?p ?o .\n}}\nORDER BY ?s ?p ?o\n",
        from_clauses(graphs)
    )
}

/// Delete from `branch` every statement also in `main`.
pub fn rebase_update(branch: &str, main: &str) -> String {
    format!(
        "DELETE {{\n  GRAPH {branch} {{ ?s ?p ?o }}\n}}\nWHERE {{\n  GRAPH {branch} {{ ?s ?p ?o }}\n  GRAPH {main} {{ ?s ?p ?o }}\n}}\n"
    )
}

/// Copy `from` into `into`.
pub fn add_update(from: &str, into: &str) -> String {
    format!("ADD SILENT {from} TO {into}\n")
}

pub fn drop_update(graph: &str) -> String {
    format!("DROP SILENT GRAPH {graph}\n")
}

pub fn remove_subject_update(graph: &str, subject: &str) -> String {
    format!("DELETE WHERE {{\n  GRAPH {graph} {{ {subject} ?p ?o }}\n}}\n")
}

/// Current mappings between components of two types.
pub fn current_mappings_query(
    read: &[String],
    source_type: &str,
    target_type: &str,
) -> StoreResult<String> {
    let source_type = expand_term(source_type)?;
    let target_type = expand_term(target_type)?;
    Ok(format!(
        "SELECT DISTINCT ?mapping ?invertible\n{}WHERE {{\n  ?mapping rdf:type cw:Mapping ;\n           cw:source ?source ;\n           cw:target ?target .\n  ?source rdf:type {source_type} .\n  ?target rdf:type {target_type} .\n  OPTIONAL {{ ?mapping cw:invertible ?invertible }}\n  FILTER NOT EXISTS {{ ?successor dc:replaces ?mapping }}\n}}\nORDER BY ?mapping\n",
        from_clauses(read)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphScope;

    fn unit() -> Projection {
        Projection::new()
            .with("rdf:type", "<http://crosswalk.dev/vocab#Unit>")
            .unwrap()
            .with("skos:notation", "\"K\"")
            .unwrap()
    }

    #[test]
    fn lookup_counts_with_and_without_marker() {
        let q = lookup_query(&GraphScope::branch("b1").read, &unit()).unwrap();
        assert_eq!(q.matches("FROM <").count(), 4);
        assert!(q.contains("HAVING (COUNT(?o) = 3)"));
        assert!(q.contains("HAVING (COUNT(?o) = 2)"));
        assert!(q.contains("?s <http://crosswalk.dev/vocab#saveCache> \"True\" ."));
        assert!(q.contains("FILTER NOT EXISTS { ?s <http://crosswalk.dev/vocab#saveCache> ?cache }"));
        assert!(q.contains(
            "?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://crosswalk.dev/vocab#Unit> ."
        ));
    }

    #[test]
    fn insert_targets_one_graph() {
        let q = insert_data("<http://g>", "<http://s>", &unit()).unwrap();
        assert!(q.starts_with("INSERT DATA {\n  GRAPH <http://g> {"));
        assert!(q.contains("<http://s> <http://www.w3.org/2004/02/skos/core#notation> \"K\" ."));
        assert_eq!(q.matches(" .\n").count(), 2);
    }

    #[test]
    fn graph_updates() {
        assert_eq!(add_update("<a>", "<b>"), "ADD SILENT <a> TO <b>\n");
        assert_eq!(drop_update("<a>"), "DROP SILENT GRAPH <a>\n");
        let rebase = rebase_update("<b>", "<m>");
        assert!(rebase.contains("GRAPH <b> { ?s ?p ?o }\n  GRAPH <m> { ?s ?p ?o }"));
    }

    #[test]
    fn current_mappings_excludes_replaced() {
        let q = current_mappings_query(&GraphScope::main().read, "<http://x/S>", "cw:Unit").unwrap();
        assert!(q.contains("FILTER NOT EXISTS { ?successor dc:replaces ?mapping }"));
        assert!(q.contains("?target rdf:type <http://crosswalk.dev/vocab#Unit> ."));
    }

    #[test]
    fn insert_escapes_control_characters_in_literals() {
        let projection = Projection::new()
            .with("rdf:type", "cw:Note")
            .unwrap()
            .with("skos:note", cw_types::Item::literal("a\rb\tc").data())
            .unwrap();
        let update = insert_data("<http://x/g>", "<http://x/n>", &projection).unwrap();
        assert!(update.contains("\"a\\rb\\tc\""));
        assert!(!update.contains('\r'));
        assert!(!update.contains('\t'));
    }
}
