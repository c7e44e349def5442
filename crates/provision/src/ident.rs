//! Quoting for identifiers and literals in assembled DDL.
//!
//! Every name passing through here already matched the facility's
//! naming rules at submission, so the character check is a second gate,
//! not the primary validation.

use crate::error::ProvisionError;

/// Characters we allow in account and database names. Slash separates a
/// database suffix from its owner.
pub fn check(name: &str) -> Result<&str, ProvisionError> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/'));
    if ok {
        Ok(name)
    } else {
        Err(ProvisionError::InvalidIdentifier(name.to_string()))
    }
}

/// Backtick-quote a MySQL identifier.
pub fn mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Double-quote a PostgreSQL identifier.
pub fn pg(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote a string literal for inline use in DDL.
pub fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// LIKE pattern matching an account's suffixed databases (`name/...`),
/// with the account's own characters escaped so `_` matches literally.
pub fn like_suffixes(name: &str) -> String {
    let escaped = name
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{escaped}/%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_owner_and_suffixed_names() {
        assert!(check("ab123").is_ok());
        assert!(check("ab123/blog").is_ok());
        assert!(check("chess_club").is_ok());
    }

    #[test]
    fn rejects_quoting_characters() {
        assert!(check("ab`123").is_err());
        assert!(check("a b").is_err());
        assert!(check("").is_err());
    }

    #[test]
    fn like_patterns_escape_underscores() {
        assert_eq!(like_suffixes("chess_club"), "chess\\_club/%");
        assert_eq!(like_suffixes("ab123"), "ab123/%");
    }

    #[test]
    fn quotes_embedded_delimiters() {
        assert_eq!(mysql("a`b"), "`a``b`");
        assert_eq!(pg("a\"b"), "\"a\"\"b\"");
        assert_eq!(literal("o'brien"), "'o''brien'");
        assert_eq!(literal("back\\slash"), "'back\\\\slash'");
    }
}
