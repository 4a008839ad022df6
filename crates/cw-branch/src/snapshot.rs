//! Line-stable text serialisation of a graph.
//!
//! ```text
//! # <license line>
//!
//! <subject>
//!     <predicate> <object> ;
//! .
//! ```
//!
//! Statements are grouped by subject in (subject, predicate, object) order,
//! so adding statements only ever adds lines.

use std::fmt::Write;

use cw_store::Triple;

/// Render sorted triples under a license header.
pub fn render(triples: &[Triple], license: &str) -> String {
    let mut out = String::new();
    for line in license.lines() {
        let _ = writeln!(out, "# {line}");
    }
    out.push('\n');

    let mut current: Option<&str> = None;
    for triple in triples {
        if current != Some(triple.subject.as_str()) {
            if current.is_some() {
                out.push_str(".\n");
            }
            let _ = writeln!(out, "{}", triple.subject);
            current = Some(&triple.subject);
        }
        let _ = writeln!(out, "    {} {} ;", triple.predicate, triple.object);
    }
    if current.is_some() {
        out.push_str(".\n");
    }
    out
}
