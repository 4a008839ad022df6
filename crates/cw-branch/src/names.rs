//! Branch id validation.
//!
//! A branch id is the 40-character lowercase hex SHA-1 of its owner and
//! creation timestamp. Ids are interpolated into graph names, so anything
//! else is rejected before it reaches the store.

use crate::error::{BranchError, BranchResult};

/// Validate a branch id, returning `Ok(())` if valid.
///
/// ```
/// use cw_branch::names::validate_branch_id;
///
/// assert!(validate_branch_id(&"ab".repeat(20)).is_ok());
/// assert!(validate_branch_id("main").is_err());
/// ```
pub fn validate_branch_id(id: &str) -> BranchResult<()> {
    if id.len() != 40 {
        return Err(BranchError::InvalidBranchId {
            id: id.to_string(),
            reason: format!("expected 40 characters, found {}", id.len()),
        });
    }
    if let Some(ch) = id
        .chars()
        .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
    {
        return Err(BranchError::InvalidBranchId {
            id: id.to_string(),
            reason: format!("contains non-hex character: {ch:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_sha1() {
        assert!(validate_branch_id("0123456789abcdef0123456789abcdef01234567").is_ok());
    }

    #[test]
    fn rejects_uppercase_and_short() {
        assert!(validate_branch_id("0123456789ABCDEF0123456789ABCDEF01234567").is_err());
        assert!(validate_branch_id("abc").is_err());
        assert!(validate_branch_id("").is_err());
    }

    #[test]
    fn rejects_graph_injection() {
        let id = format!("{}>", "a".repeat(39));
        assert!(matches!(
            validate_branch_id(&id),
            Err(BranchError::InvalidBranchId { .. })
        ));
    }
}
