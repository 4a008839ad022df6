//! Decoding of SPARQL JSON result sets into rendered terms.
//!
//! Decoding inverts insert encoding: a value read back renders exactly as
//! it was written, so content retrieved from the store hashes to the URI it
//! was stored under.

use std::collections::BTreeMap;

use cw_types::Item;
use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// One decoded result row: variable name -> binding.
pub type Row = BTreeMap<String, Binding>;

/// A decoded binding value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// A single rendered term.
    Term(String),
    /// A URI carrying `&`-separated parts, split into one URI per part.
    List(Vec<String>),
}

impl Binding {
    /// The single term, or a decode error for a list.
    pub fn term(&self) -> StoreResult<&str> {
        match self {
            Binding::Term(t) => Ok(t),
            Binding::List(parts) => Err(StoreError::Decode(format!(
                "expected a single term, found a list of {}",
                parts.len()
            ))),
        }
    }

    /// Every term in the binding.
    pub fn terms(&self) -> Vec<String> {
        match self {
            Binding::Term(t) => vec![t.clone()],
            Binding::List(parts) => parts.clone(),
        }
    }
}

/// The `application/sparql-results+json` document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: Bindings,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Bindings {
    #[serde(default)]
    pub bindings: Vec<BTreeMap<String, RawValue>>,
}

/// A binding exactly as the store sends it.
#[derive(Clone, Debug, Deserialize)]
pub struct RawValue {
    pub value: String,
    /// `uri`, `literal`, `typed-literal` or `bnode`; empty when absent.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Datatype URI of a typed literal.
    #[serde(default)]
    pub datatype: Option<String>,
}

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
const NUMERIC: &[&str] = &["integer", "decimal", "double", "float", "long", "int"];

impl RawValue {
    /// Decode using the term kind the store reports.
    ///
    /// A plain literal always comes back quoted, even when its text looks
    /// like a number; only numeric typed literals render bare. Values
    /// without a kind fall back to [`decode_value`].
    pub fn decode(&self) -> Binding {
        match self.kind.as_str() {
            "uri" => decode_uri(&self.value),
            "literal" | "typed-literal" => {
                let numeric = self
                    .datatype
                    .as_deref()
                    .and_then(|dt| dt.strip_prefix(XSD))
                    .is_some_and(|local| NUMERIC.contains(&local));
                if numeric {
                    Binding::Term(self.value.clone())
                } else {
                    Binding::Term(Item::literal(&self.value).data().to_string())
                }
            }
            _ => decode_value(&self.value),
        }
    }
}

fn decode_uri(value: &str) -> Binding {
    if value.contains('&') {
        return Binding::List(value.split('&').map(|part| format!("<{part}>")).collect());
    }
    Binding::Term(format!("<{value}>"))
}

impl ResultSet {
    /// Parse a JSON response body.
    pub fn parse(body: &str) -> StoreResult<Self> {
        serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Decoded rows. Unbound variables are absent from their row.
    pub fn rows(&self) -> Vec<Row> {
        self.results
            .bindings
            .iter()
            .map(|raw| {
                raw.iter()
                    .map(|(var, v)| (var.clone(), v.decode()))
                    .collect()
            })
            .collect()
    }

    /// Single-term values of one variable across all rows.
    pub fn column(&self, var: &str) -> StoreResult<Vec<String>> {
        self.rows()
            .iter()
            .filter_map(|row| row.get(var))
            .map(|b| b.term().map(str::to_string))
            .collect()
    }
}

/// Decode one raw value into its rendered form, guessing its kind from the
/// text alone.
///
/// - `http(s)://` values become `<uri>`; values carrying `&` become a list of
///   URIs, one per part
/// - values already angle-bracketed pass through
/// - integers and floats stay bare
/// - everything else becomes a quoted literal
pub fn decode_value(value: &str) -> Binding {
    if value.starts_with("http://") || value.starts_with("https://") {
        return decode_uri(value);
    }
    if value.len() >= 2 && value.starts_with('<') && value.ends_with('>') {
        return Binding::Term(value.to_string());
    }
    if value.parse::<i64>().is_ok() || value.parse::<f64>().is_ok() {
        return Binding::Term(value.to_string());
    }
    Binding::Term(Item::literal(value).data().to_string())
}
