//! Identifier validation and quoting for dynamically built SQL.
//!
//! Table and column names cannot be bound as statement parameters, so any
//! identifier that ends up inside SQL text goes through [`quote_mysql`].

use crate::error::{EvolutionError, Result};

/// Maximum identifier length accepted by MySQL.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Validate an identifier for security issues.
///
/// Rejects empty identifiers, identifiers containing null bytes and
/// identifiers longer than MySQL allows.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(EvolutionError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(EvolutionError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(EvolutionError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks.
///
/// ```ignore
/// assert_eq!(quote_mysql("user")?, "`user`");
/// assert_eq!(quote_mysql("table`name")?, "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Quote a `table.column` pair.
pub fn qualify_mysql(table: &str, column: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_mysql(table)?, quote_mysql(column)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_rejects_empty() {
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let err = validate_identifier("user\0; DROP TABLE user").unwrap_err();
        assert!(err.to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_length_limit() {
        assert!(validate_identifier(&"a".repeat(64)).is_ok());
        assert!(validate_identifier(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_quote_mysql_escapes_backtick() {
        assert_eq!(quote_mysql("user").unwrap(), "`user`");
        assert_eq!(quote_mysql("a`b").unwrap(), "`a``b`");
    }

    #[test]
    fn test_quote_mysql_sql_injection_safely_quoted() {
        let quoted = quote_mysql("x`; DROP TABLE user; --").unwrap();
        assert_eq!(quoted, "`x``; DROP TABLE user; --`");
    }

    #[test]
    fn test_qualify_mysql() {
        assert_eq!(
            qualify_mysql("quest_target", "quest_id").unwrap(),
            "`quest_target`.`quest_id`"
        );
        assert!(qualify_mysql("", "id").is_err());
    }
}
