use std::fmt;

use serde::{Deserialize, Serialize};

/// An atomic graph value: a URI reference or a literal.
///
/// The term is held in its rendered form, which is also the form written to
/// and decoded from the store:
///
/// - URIs are angle-bracketed: `<http://x/y>`
/// - numbers are bare: `42`, `2.5`
/// - everything else is a quoted literal: `"air_temperature"`
///
/// A URI may carry a short human-readable `notation` (for example the short
/// name of a controlled-vocabulary term). Items are immutable.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    data: String,
    notation: Option<String>,
}

impl Item {
    /// Create an item, normalizing the raw value into its rendered form.
    ///
    /// Already-wrapped values (`<...>` or `"..."`) pass through unchanged.
    pub fn new(value: impl AsRef<str>) -> Self {
        Self {
            data: normalize(value.as_ref()),
            notation: None,
        }
    }

    /// Create an item with a display notation.
    pub fn with_notation(value: impl AsRef<str>, notation: impl Into<String>) -> Self {
        Self {
            data: normalize(value.as_ref()),
            notation: Some(notation.into()),
        }
    }

    /// Create a URI item from an unwrapped URI string.
    pub fn uri(uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref();
        let data = if is_wrapped_uri(uri) {
            uri.to_string()
        } else {
            format!("<{uri}>")
        };
        Self {
            data,
            notation: None,
        }
    }

    /// Create a quoted literal regardless of what the value looks like.
    pub fn literal(value: impl AsRef<str>) -> Self {
        Self {
            data: quote(value.as_ref()),
            notation: None,
        }
    }

    /// Replace the notation, returning a new item.
    pub fn notated(self, notation: impl Into<String>) -> Self {
        Self {
            notation: Some(notation.into()),
            ..self
        }
    }

    /// The rendered term.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// The short display notation, if any.
    pub fn notation(&self) -> Option<&str> {
        self.notation.as_deref()
    }

    /// Returns `true` if this item is a URI reference.
    pub fn is_uri(&self) -> bool {
        is_wrapped_uri(&self.data)
    }

    /// Returns `true` if this item is a quoted literal.
    pub fn is_literal(&self) -> bool {
        self.data.len() >= 2 && self.data.starts_with('"') && self.data.ends_with('"')
    }

    /// The URI without its angle brackets, if this item is a URI.
    pub fn uri_str(&self) -> Option<&str> {
        if self.is_uri() {
            Some(&self.data[1..self.data.len() - 1])
        } else {
            None
        }
    }

    /// The unquoted, unescaped literal value, if this item is a literal.
    pub fn literal_value(&self) -> Option<String> {
        if self.is_literal() {
            Some(unquote(&self.data[1..self.data.len() - 1]))
        } else {
            None
        }
    }

    /// A label for display: the notation if present, else the rendered term.
    pub fn label(&self) -> &str {
        self.notation.as_deref().unwrap_or(&self.data)
    }
}

fn is_wrapped_uri(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('<') && value.ends_with('>')
}

/// Integer, decimal or double in SPARQL's numeric literal syntax.
fn is_number(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && value.parse::<f64>().is_ok()
}

fn normalize(raw: &str) -> String {
    let value = raw.trim();
    if is_wrapped_uri(value) {
        value.to_string()
    } else if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value.to_string()
    } else if value.starts_with("http") {
        format!("<{value}>")
    } else if is_number(value) {
        value.to_string()
    } else {
        quote(value)
    }
}

/// Quote with SPARQL string escapes (`ECHAR`), so no raw line break, tab
/// or quote ever reaches a statement.
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn unquote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

impl PartialEq<str> for Item {
    /// An item equals a bare string matching its data, or (case-insensitively)
    /// its notation.
    fn eq(&self, other: &str) -> bool {
        self.data == other
            || self
                .notation
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(other))
    }
}

impl PartialEq<&str> for Item {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.notation {
            Some(n) => write!(f, "Item({} [{n}])", self.data),
            None => write!(f, "Item({})", self.data),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_value_becomes_uri() {
        let item = Item::new("http://x/y");
        assert!(item.is_uri());
        assert_eq!(item.data(), "<http://x/y>");
        assert_eq!(item.uri_str(), Some("http://x/y"));
    }

    #[test]
    fn bare_token_becomes_literal() {
        let item = Item::new("air_temperature");
        assert_eq!(item.data(), "\"air_temperature\"");
        assert!(item.is_literal());
        assert!(!item.is_uri());
    }

    #[test]
    fn wrapped_values_pass_through() {
        assert_eq!(Item::new("<urn:a>").data(), "<urn:a>");
        assert_eq!(Item::new("\"K\"").data(), "\"K\"");
    }

    #[test]
    fn numbers_stay_bare() {
        assert_eq!(Item::new("42").data(), "42");
        assert_eq!(Item::new("2.5").data(), "2.5");
        assert!(!Item::new("42").is_literal());
        assert_eq!(Item::new("-1.5e3").data(), "-1.5e3");
        assert_eq!(Item::new("NaN").data(), "\"NaN\"");
        assert_eq!(Item::new("inf").data(), "\"inf\"");
    }

    #[test]
    fn literal_escapes_quotes() {
        let item = Item::literal("say \"hi\"");
        assert_eq!(item.data(), "\"say \\\"hi\\\"\"");
        assert_eq!(item.literal_value().as_deref(), Some("say \"hi\""));
    }

    #[test]
    fn literal_escapes_newlines_and_backslashes() {
        let item = Item::literal("a\\nb\nc");
        assert!(!item.data().contains('\n'));
        assert_eq!(item.literal_value().as_deref(), Some("a\\nb\nc"));
    }

    #[test]
    fn literal_escapes_every_control_echar() {
        let raw = "a\rb\tc\u{8}d\u{c}e";
        let item = Item::literal(raw);
        assert_eq!(item.data(), "\"a\\rb\\tc\\bd\\fe\"");
        assert!(!item.data().chars().any(char::is_control));
        assert_eq!(item.literal_value().as_deref(), Some(raw));
    }

    #[test]
    fn numeric_looking_literal_stays_quoted() {
        let item = Item::literal("42");
        assert_eq!(item.data(), "\"42\"");
        assert!(item.is_literal());
        assert_eq!(Item::new(item.data()), item);
    }

    #[test]
    fn equality_requires_data_and_notation() {
        let a = Item::with_notation("http://x/t", "t");
        let b = Item::with_notation("http://x/t", "t");
        let c = Item::new("http://x/t");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn equals_bare_string_by_data_or_notation() {
        let item = Item::with_notation("http://x/temp", "Temp");
        assert!(item == "<http://x/temp>");
        assert!(item == "temp");
        assert!(item == "TEMP");
        assert!(item != "pressure");
    }

    #[test]
    fn label_prefers_notation() {
        assert_eq!(Item::with_notation("http://x/k", "K").label(), "K");
        assert_eq!(Item::new("http://x/k").label(), "<http://x/k>");
    }

    #[test]
    fn serde_roundtrip() {
        let item = Item::with_notation("http://x/y", "y");
        let json = serde_json::to_string(&item).unwrap();
        let parsed: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, parsed);
    }
}
