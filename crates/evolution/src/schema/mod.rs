//! Schema sync for tables this application owns.
//!
//! `sync_tables` creates missing tables and, when the configuration asks for
//! a reset, drops them first. It never alters existing columns.

use sqlx::mysql::MySqlPool;
use tracing::{info, warn};

use crate::db::identifier::quote_mysql;
use crate::error::{EvolutionError, Result};
use crate::models::system::User;
use crate::models::Model;

/// A table whose DDL is owned by this application.
pub trait ManagedTable: Send + Sync {
    /// Table name.
    fn name(&self) -> &'static str;

    /// Column and key definitions, without the surrounding `CREATE TABLE`.
    fn definition(&self) -> &'static str;
}

/// The system `user` table.
pub struct UserTable;

impl ManagedTable for UserTable {
    fn name(&self) -> &'static str {
        User::TABLE
    }

    fn definition(&self) -> &'static str {
        "`id` INT(11) NOT NULL AUTO_INCREMENT,
         `name` VARCHAR(255) NOT NULL DEFAULT '' COMMENT 'display name',
         `email` VARCHAR(255) NOT NULL DEFAULT '' COMMENT 'login email',
         `password` VARCHAR(255) NOT NULL DEFAULT '' COMMENT 'password hash',
         `status` INT(11) NOT NULL DEFAULT 1 COMMENT '1 active, 2 disabled',
         `created_at` TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
         `updated_at` TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
         PRIMARY KEY (`id`),
         UNIQUE KEY `uk_user_email` (`email`)"
    }
}

/// Tables synced by the `init` entry point.
pub fn system_tables() -> Vec<Box<dyn ManagedTable>> {
    vec![Box::new(UserTable)]
}

/// `DROP TABLE IF EXISTS` statement for a table.
pub fn drop_table_sql(table: &dyn ManagedTable) -> Result<String> {
    Ok(format!("DROP TABLE IF EXISTS {}", quote_mysql(table.name())?))
}

/// `CREATE TABLE IF NOT EXISTS` statement for a table.
pub fn create_table_sql(table: &dyn ManagedTable, charset: &str) -> Result<String> {
    if !charset.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(EvolutionError::Config(format!(
            "invalid charset: {:?}",
            charset
        )));
    }
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n) ENGINE=InnoDB DEFAULT CHARSET={}",
        quote_mysql(table.name())?,
        table.definition(),
        charset
    ))
}

/// Create managed tables, dropping them first when `reset` is set.
pub async fn sync_tables(
    pool: &MySqlPool,
    tables: &[Box<dyn ManagedTable>],
    charset: &str,
    reset: bool,
) -> Result<()> {
    for table in tables {
        if reset {
            warn!("Resetting table {}", table.name());
            sqlx::query(&drop_table_sql(table.as_ref())?)
                .execute(pool)
                .await
                .map_err(|e| EvolutionError::pool(e, format!("dropping {}", table.name())))?;
        }

        sqlx::query(&create_table_sql(table.as_ref(), charset)?)
            .execute(pool)
            .await
            .map_err(|e| EvolutionError::pool(e, format!("creating {}", table.name())))?;
        info!("Table {} is in sync", table.name());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_sql() {
        let sql = create_table_sql(&UserTable, "utf8mb4").unwrap();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `user` ("));
        assert!(sql.ends_with("ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"));
        assert!(sql.contains("PRIMARY KEY (`id`)"));
    }

    #[test]
    fn test_create_table_rejects_bad_charset() {
        assert!(create_table_sql(&UserTable, "utf8; DROP TABLE user").is_err());
    }

    #[test]
    fn test_drop_table_sql() {
        assert_eq!(
            drop_table_sql(&UserTable).unwrap(),
            "DROP TABLE IF EXISTS `user`"
        );
    }

    #[test]
    fn test_system_tables_contains_user() {
        let names: Vec<_> = system_tables().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["user"]);
    }
}
