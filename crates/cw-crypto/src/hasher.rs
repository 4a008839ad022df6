use std::fmt;

use cw_types::{expand, Projection, TypeError};
use sha1::{Digest, Sha1};

/// SHA-1 digest of an entity's canonical content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId([u8; 20]);

impl ContentId {
    /// Create a `ContentId` from a pre-computed digest.
    pub fn from_digest(digest: [u8; 20]) -> Self {
        Self(digest)
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 20] = bytes.try_into().ok()?;
        Some(Self(arr))
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short_hex())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Content hasher for one entity kind.
///
/// Each hasher carries the URI prefix its entities are minted under and the
/// predicates left out of the digest (volatile fields such as acceptance
/// dates), so two entities differing only in those fields share an identity.
pub struct ContentHasher {
    uri_prefix: &'static str,
    omitted: &'static [&'static str],
}

impl ContentHasher {
    /// Hasher for components.
    pub const COMPONENT: Self = Self {
        uri_prefix: "http://crosswalk.dev/component/",
        omitted: &[],
    };
    /// Hasher for mappings. The acceptance date does not take part in identity.
    pub const MAPPING: Self = Self {
        uri_prefix: "http://crosswalk.dev/mapping/",
        omitted: &["dc:dateAccepted"],
    };

    /// Create a hasher with a custom prefix and omitted predicates.
    pub const fn new(uri_prefix: &'static str, omitted: &'static [&'static str]) -> Self {
        Self {
            uri_prefix,
            omitted,
        }
    }

    /// Digest a projection.
    ///
    /// Predicates are visited in sorted order and expanded to full URIs; for
    /// every object of every predicate the digest is fed the predicate and
    /// then the object. Expansion of an unknown prefix is an error.
    pub fn hash(&self, projection: &Projection) -> Result<ContentId, TypeError> {
        digest(projection, self.omitted)
    }

    /// The candidate entity URI (angle-bracketed) for a projection.
    pub fn entity_uri(&self, projection: &Projection) -> Result<String, TypeError> {
        let id = self.hash(projection)?;
        Ok(format!("<{}{}>", self.uri_prefix, id.to_hex()))
    }

    /// The URI prefix entities of this kind are minted under.
    pub fn uri_prefix(&self) -> &str {
        self.uri_prefix
    }

    /// Predicates excluded from the digest.
    pub fn omitted(&self) -> &[&'static str] {
        self.omitted
    }
}

/// Digest a projection, skipping the `omitted` predicates.
pub fn digest(projection: &Projection, omitted: &[&str]) -> Result<ContentId, TypeError> {
    let mut hasher = Sha1::new();
    for (predicate, objects) in projection.iter() {
        if omitted.contains(&predicate) {
            continue;
        }
        let expanded = expand(predicate)?;
        for object in objects {
            hasher.update(expanded.as_bytes());
            hasher.update(object.as_bytes());
        }
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&hasher.finalize());
    Ok(ContentId::from_digest(out))
}
