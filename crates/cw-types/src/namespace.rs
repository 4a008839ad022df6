//! The closed namespace prefix table.
//!
//! Predicates are written in short `prefix:local` form throughout Crosswalk
//! and expanded against this table for hashing and for the store. The table
//! is fixed: a prefix that is not listed here cannot be expanded. Predicates
//! from vocabularies outside the table are carried as full `<...>` URIs.

use crate::error::TypeError;

/// Known prefixes and their namespace URIs.
pub const PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("dc", "http://purl.org/dc/terms/"),
    ("cw", "http://crosswalk.dev/vocab#"),
    ("cwcomp", "http://crosswalk.dev/component/"),
    ("cwmap", "http://crosswalk.dev/mapping/"),
    ("cwgraph", "http://crosswalk.dev/graph/"),
];

/// Look up the namespace URI for a prefix.
pub fn namespace(prefix: &str) -> Option<&'static str> {
    PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| *ns)
}

/// Split a short-form name into `(prefix, local)`.
pub fn split(short: &str) -> Result<(&str, &str), TypeError> {
    match short.split_once(':') {
        Some((prefix, local))
            if !prefix.is_empty()
                && !local.starts_with("//")
                && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            Ok((prefix, local))
        }
        _ => Err(TypeError::InvalidPredicate(short.to_string())),
    }
}

/// Expand a short-form name to an angle-bracketed full URI.
///
/// An already angle-bracketed URI is returned unchanged.
///
/// ```
/// use cw_types::expand;
///
/// assert_eq!(expand("dc:creator").unwrap(), "<http://purl.org/dc/terms/creator>");
/// assert!(expand("nope:thing").is_err());
/// ```
pub fn expand(short: &str) -> Result<String, TypeError> {
    if is_full(short) {
        return Ok(short.to_string());
    }
    let (prefix, local) = split(short)?;
    let ns = namespace(prefix).ok_or_else(|| TypeError::UnknownPrefix(short.to_string()))?;
    Ok(format!("<{ns}{local}>"))
}

/// Compact an angle-bracketed (or bare) full URI into short form.
///
/// Returns `None` when no prefix in the table matches. The longest matching
/// namespace wins.
pub fn compact(full: &str) -> Option<String> {
    let bare = full
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(full);
    PREFIXES
        .iter()
        .filter(|(_, ns)| bare.starts_with(ns) && bare.len() > ns.len())
        .max_by_key(|(_, ns)| ns.len())
        .map(|(prefix, ns)| format!("{prefix}:{}", &bare[ns.len()..]))
}

/// Canonical key for a predicate: short form when the table covers it,
/// otherwise the angle-bracketed full URI.
pub fn canonical_predicate(predicate: &str) -> Result<String, TypeError> {
    if is_full(predicate) {
        return Ok(compact(predicate).unwrap_or_else(|| predicate.to_string()));
    }
    split(predicate)?;
    Ok(predicate.to_string())
}

/// Expand a term in object position.
///
/// Literals and bare numbers pass through; prefixed names are expanded.
pub fn expand_term(term: &str) -> Result<String, TypeError> {
    if term.starts_with('"') || term.parse::<f64>().is_ok() {
        return Ok(term.to_string());
    }
    expand(term)
}

fn is_full(term: &str) -> bool {
    term.len() > 2 && term.starts_with('<') && term.ends_with('>')
}

/// The `PREFIX` header prepended to every query sent to the store.
pub fn sparql_header() -> String {
    PREFIXES
        .iter()
        .map(|(prefix, ns)| format!("PREFIX {prefix}: <{ns}>\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_known_prefix() {
        assert_eq!(
            expand("skos:notation").unwrap(),
            "<http://www.w3.org/2004/02/skos/core#notation>"
        );
    }

    #[test]
    fn expand_unknown_prefix_fails() {
        assert!(matches!(
            expand("foo:bar"),
            Err(TypeError::UnknownPrefix(_))
        ));
    }

    #[test]
    fn expand_rejects_full_uris() {
        assert!(matches!(
            expand("http://x/y"),
            Err(TypeError::InvalidPredicate(_))
        ));
        assert!(expand("noprefix").is_err());
    }

    #[test]
    fn compact_roundtrip() {
        let full = expand("cw:source").unwrap();
        assert_eq!(compact(&full).as_deref(), Some("cw:source"));
    }

    #[test]
    fn expand_passes_full_uri_through() {
        assert_eq!(expand("<http://example.org/p>").unwrap(), "<http://example.org/p>");
    }

    #[test]
    fn canonical_predicate_prefers_short_form() {
        assert_eq!(
            canonical_predicate("<http://purl.org/dc/terms/creator>").unwrap(),
            "dc:creator"
        );
        assert_eq!(
            canonical_predicate("<http://example.org/p>").unwrap(),
            "<http://example.org/p>"
        );
        assert_eq!(canonical_predicate("skos:note").unwrap(), "skos:note");
        assert!(canonical_predicate("note").is_err());
    }

    #[test]
    fn expand_term_leaves_literals_alone() {
        assert_eq!(expand_term("\"x\"").unwrap(), "\"x\"");
        assert_eq!(expand_term("42").unwrap(), "42");
        assert_eq!(expand_term("cw:Mapping").unwrap(), "<http://crosswalk.dev/vocab#Mapping>");
    }

    #[test]
    fn compact_unknown_namespace() {
        assert_eq!(compact("<http://example.org/x>"), None);
    }

    #[test]
    fn header_declares_every_prefix() {
        let header = sparql_header();
        for (prefix, _) in PREFIXES {
            assert!(header.contains(&format!("PREFIX {prefix}:")));
        }
    }
}
