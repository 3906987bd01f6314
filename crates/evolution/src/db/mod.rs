//! MySQL connection pools and model-driven queries.

pub mod identifier;

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{FromRow, MySql, QueryBuilder, Row};
use tracing::{debug, info};

use crate::config::DbConfig;
use crate::error::{EvolutionError, Result};
use crate::models::time::{Area, QuestTarget, QuestTargetJoin, Resource};
use crate::models::Model;
use identifier::quote_mysql;

/// Connect options for a configured database.
pub fn connect_options(config: &DbConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.target)
        .username(&config.user)
        .password(&config.password)
        .charset(&config.charset)
        .timezone(Some(config.timezone.clone()))
        .ssl_mode(MySqlSslMode::Preferred)
}

fn pool_options(config: &DbConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
}

/// Create a pool and verify the database answers.
pub async fn connect(config: &DbConfig) -> Result<MySqlPool> {
    let context = format!("connecting to {}", config.display_name());
    let pool = pool_options(config)
        .connect_with(connect_options(config))
        .await
        .map_err(|e| EvolutionError::pool(e, context.as_str()))?;

    ping(&pool)
        .await
        .map_err(|e| EvolutionError::pool(e, context.as_str()))?;

    info!("Connected to MySQL: {}", config.display_name());
    Ok(pool)
}

/// Create a pool that connects on first use.
pub fn connect_lazy(config: &DbConfig) -> MySqlPool {
    pool_options(config).connect_lazy_with(connect_options(config))
}

/// Round-trip a trivial query.
pub async fn ping(pool: &MySqlPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// `SELECT table.* FROM table WHERE <probe's equality filter>`.
pub async fn find_by<M>(pool: &MySqlPool, probe: &M) -> Result<Vec<M>>
where
    M: Model + for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    let table = quote_mysql(M::TABLE)?;
    let mut qb = QueryBuilder::new(format!("SELECT {}.* FROM {}", table, table));
    probe.build_condition().push_where(&mut qb)?;
    qb.push(" ORDER BY ").push(&table).push(".`id`");
    debug!(sql = qb.sql(), "find_by");

    let rows = qb.build_query_as::<M>().fetch_all(pool).await?;
    Ok(rows)
}

/// Fetch one record by primary key.
pub async fn get_by_id<M>(pool: &MySqlPool, id: i64) -> Result<Option<M>>
where
    M: Model + for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    let table = quote_mysql(M::TABLE)?;
    let sql = format!("SELECT {}.* FROM {} WHERE {}.`id` = ?", table, table, table);
    let row = sqlx::query_as::<_, M>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

fn quest_targets_query(probe: &QuestTarget) -> Result<QueryBuilder<'static, MySql>> {
    let mut qb = QueryBuilder::new(
        "SELECT `quest_target`.`id` AS qt_id, `quest_target`.`quest_id` AS qt_quest_id,
                `quest_target`.`resource_id` AS qt_resource_id, `quest_target`.`desc` AS qt_desc,
                `quest_target`.`status` AS qt_status,
                `resource`.`id` AS resource_id, `resource`.`name` AS resource_name,
                `resource`.`area_id` AS resource_area_id, `resource`.`desc` AS resource_desc,
                `area`.`id` AS area_id, `area`.`name` AS area_name, `area`.`field_id` AS area_field_id
         FROM `quest_target`
         INNER JOIN `resource` ON `resource`.`id` = `quest_target`.`resource_id`
         INNER JOIN `area` ON `area`.`id` = `resource`.`area_id`",
    );
    probe.build_condition().push_where(&mut qb)?;
    qb.push(" ORDER BY `quest_target`.`id`");
    Ok(qb)
}

/// Quest targets matching `probe`, each with its resource and area.
pub async fn find_quest_targets(pool: &MySqlPool, probe: &QuestTarget) -> Result<Vec<QuestTargetJoin>> {
    let mut qb = quest_targets_query(probe)?;
    let rows = qb.build().fetch_all(pool).await?;
    rows.iter()
        .map(|row| -> Result<QuestTargetJoin> {
            Ok(QuestTargetJoin {
                quest_target: QuestTarget {
                    id: row.try_get("qt_id")?,
                    quest_id: row.try_get("qt_quest_id")?,
                    resource_id: row.try_get("qt_resource_id")?,
                    desc: row.try_get("qt_desc")?,
                    status: row.try_get("qt_status")?,
                },
                resource: Resource {
                    id: row.try_get("resource_id")?,
                    name: row.try_get("resource_name")?,
                    area_id: row.try_get("resource_area_id")?,
                    desc: row.try_get("resource_desc")?,
                },
                area: Area {
                    id: row.try_get("area_id")?,
                    name: row.try_get("area_name")?,
                    field_id: row.try_get("area_field_id")?,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_quest_targets_query_filters_on_quest_target_columns() {
        let probe = QuestTarget {
            quest_id: 7,
            status: QuestTarget::STATUS_WAIT,
            ..Default::default()
        };
        let qb = quest_targets_query(&probe).unwrap();
        let sql = qb.sql();
        assert!(sql.contains("INNER JOIN `area` ON `area`.`id` = `resource`.`area_id`"));
        assert!(sql.contains(
            "WHERE `quest_target`.`quest_id` = ? AND `quest_target`.`status` = ?"
        ));
        assert!(sql.ends_with("ORDER BY `quest_target`.`id`"));
    }

    #[test]
    fn test_quest_targets_query_without_filter() {
        let qb = quest_targets_query(&QuestTarget::default()).unwrap();
        assert!(!qb.sql().contains("WHERE"));
    }

    #[tokio::test]
    async fn test_connect_lazy_does_not_touch_the_network() {
        let config = Config::from_yaml(
            r#"
system:
  database:
    host: db.invalid
    user: root
    target: evolution
"#,
        )
        .unwrap();
        let pool = connect_lazy(config.require_system().unwrap());
        assert_eq!(pool.size(), 0);
    }
}
