//! Rename directives for variable keys.
//!
//! A directive is either a bare `key` (taken as-is) or `old:new`.

use tfdump_common::error::{Result, TfdumpError};

const SEPARATOR: char = ':';

/// A source key and the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    /// Key looked up in the resolved data.
    pub old_key: String,
    /// Variable name written to the output.
    pub new_key: String,
}

/// Parses a rename directive.
///
/// # Errors
///
/// Returns `TfdumpError::InvalidPattern` if the pattern is empty, contains
/// more than one `:`, or either side of the `:` is empty.
pub fn parse_rename_pattern(pattern: &str) -> Result<RenamePair> {
    let invalid = |reason| TfdumpError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };

    if pattern.is_empty() {
        return Err(invalid("empty pattern"));
    }

    let Some((old_key, new_key)) = pattern.split_once(SEPARATOR) else {
        return Ok(RenamePair {
            old_key: pattern.to_string(),
            new_key: pattern.to_string(),
        });
    };

    if new_key.contains(SEPARATOR) {
        return Err(invalid("expected at most one ':'"));
    }
    if old_key.is_empty() {
        return Err(invalid("empty old name"));
    }
    if new_key.is_empty() {
        return Err(invalid("empty new name"));
    }

    Ok(RenamePair {
        old_key: old_key.to_string(),
        new_key: new_key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(pattern: &str) -> &'static str {
        match parse_rename_pattern(pattern) {
            Err(TfdumpError::InvalidPattern { reason, .. }) => reason,
            other => panic!("expected InvalidPattern for {pattern:?}, got {other:?}"),
        }
    }

    #[test]
    fn bare_key_is_identity() {
        let pair = parse_rename_pattern("db_user").expect("parse");
        assert_eq!(pair.old_key, "db_user");
        assert_eq!(pair.new_key, "db_user");
    }

    #[test]
    fn single_separator_splits() {
        let pair = parse_rename_pattern("db_user:username").expect("parse");
        assert_eq!(
            pair,
            RenamePair {
                old_key: "db_user".into(),
                new_key: "username".into(),
            }
        );
    }

    #[test]
    fn two_separators_are_rejected() {
        assert_eq!(reason("a:b:c"), "expected at most one ':'");
        assert_eq!(reason("::"), "expected at most one ':'");
    }

    #[test]
    fn empty_sides_are_rejected() {
        assert_eq!(reason(":new"), "empty old name");
        assert_eq!(reason("old:"), "empty new name");
        assert_eq!(reason(":"), "empty old name");
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert_eq!(reason(""), "empty pattern");
    }

    #[test]
    fn error_names_the_pattern() {
        let err = parse_rename_pattern("a:b:c").expect_err("invalid");
        assert!(err.to_string().contains("\"a:b:c\""));
    }
}
