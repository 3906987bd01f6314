//! Source and destination stores used by the entity-link transfer.
//!
//! The transfer only sees these two traits; [`MysqlLinkSource`] and
//! [`MysqlResourceSink`] are the production implementations.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::Row;

use crate::db::identifier::{qualify_mysql, quote_mysql};
use crate::error::Result;
use crate::models::legacy::{Entity, Target, TargetEntityLink, TargetEntityLinkJoin};
use crate::models::time::{Area, Phase, Resource, ResourceJoin, UserResource};
use crate::models::Model;

/// Read side of the transfer: the legacy schema.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// All link rows left-joined with their target, in link id order.
    async fn load_links(&self) -> Result<Vec<TargetEntityLinkJoin>>;

    /// Display name of an entity stored in `table`, if the row exists.
    async fn entity_name(&self, table: &str, entity_id: i64) -> Result<Option<String>>;
}

/// Write side of the transfer: the time schema.
#[async_trait]
pub trait ResourceSink: Send + Sync {
    /// Lowest-level phase of a field.
    async fn first_phase(&self, field_id: i64) -> Result<Option<Phase>>;

    /// Resource named exactly `name` in an area of `field_id`.
    async fn find_resource(&self, field_id: i64, name: &str) -> Result<Option<ResourceJoin>>;

    /// Whether `user_id` already holds `resource_id`.
    async fn user_resource_exists(&self, user_id: i64, resource_id: i64) -> Result<bool>;

    /// Insert an association.
    async fn insert_user_resource(&self, record: &UserResource) -> Result<()>;
}

/// Legacy schema over a MySQL pool.
pub struct MysqlLinkSource {
    pool: MySqlPool,
}

impl MysqlLinkSource {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn links_query() -> Result<String> {
        let link = TargetEntityLink::TABLE;
        let target = Target::TABLE;
        Ok(format!(
            "SELECT {} AS link_id, {} AS link_target_id, {} AS link_entity_id,
                    {} AS link_ctime, {} AS link_utime,
                    {} AS target_id, {} AS target_name, {} AS target_field_id
             FROM {} LEFT JOIN {} ON {} = {}
             ORDER BY {}",
            qualify_mysql(link, "id")?,
            qualify_mysql(link, "target_id")?,
            qualify_mysql(link, "entity_id")?,
            qualify_mysql(link, "ctime")?,
            qualify_mysql(link, "utime")?,
            qualify_mysql(target, "id")?,
            qualify_mysql(target, "name")?,
            qualify_mysql(target, "field_id")?,
            quote_mysql(link)?,
            quote_mysql(target)?,
            qualify_mysql(target, "id")?,
            qualify_mysql(link, "target_id")?,
            qualify_mysql(link, "id")?,
        ))
    }

    fn row_to_join(row: &MySqlRow) -> Result<TargetEntityLinkJoin> {
        let link = TargetEntityLink {
            id: row.try_get("link_id")?,
            target_id: row.try_get("link_target_id")?,
            entity_id: row.try_get("link_entity_id")?,
            ctime: row.try_get("link_ctime")?,
            utime: row.try_get("link_utime")?,
        };
        let target = match row.try_get::<Option<i64>, _>("target_id")? {
            Some(id) => Some(Target {
                id,
                name: row
                    .try_get::<Option<String>, _>("target_name")?
                    .unwrap_or_default(),
                field_id: row
                    .try_get::<Option<i64>, _>("target_field_id")?
                    .unwrap_or_default(),
            }),
            None => None,
        };
        Ok(TargetEntityLinkJoin { link, target })
    }
}

#[async_trait]
impl LinkSource for MysqlLinkSource {
    async fn load_links(&self) -> Result<Vec<TargetEntityLinkJoin>> {
        let sql = Self::links_query()?;
        let rows: Vec<MySqlRow> = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_join).collect()
    }

    async fn entity_name(&self, table: &str, entity_id: i64) -> Result<Option<String>> {
        let table = quote_mysql(table)?;
        let sql = format!("SELECT `id`, `name` FROM {} WHERE `id` = ?", table);
        let entity = sqlx::query_as::<_, Entity>(&sql)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entity.map(|e| e.name))
    }
}

/// Time schema over a MySQL pool.
pub struct MysqlResourceSink {
    pool: MySqlPool,
}

impl MysqlResourceSink {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceSink for MysqlResourceSink {
    async fn first_phase(&self, field_id: i64) -> Result<Option<Phase>> {
        let phase = sqlx::query_as::<_, Phase>(
            "SELECT `id`, `name`, `desc`, `level`, `threshold`, `field_id`
             FROM `phase` WHERE `field_id` = ? ORDER BY `level` ASC LIMIT 1",
        )
        .bind(field_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(phase)
    }

    async fn find_resource(&self, field_id: i64, name: &str) -> Result<Option<ResourceJoin>> {
        // CAST AS BINARY keeps the name match case-sensitive under *_ci collations
        let row: Option<MySqlRow> = sqlx::query(
            "SELECT `resource`.`id` AS resource_id, `resource`.`name` AS resource_name,
                    `resource`.`area_id` AS resource_area_id, `resource`.`desc` AS resource_desc,
                    `area`.`id` AS area_id, `area`.`name` AS area_name,
                    `area`.`field_id` AS area_field_id
             FROM `resource` INNER JOIN `area` ON `area`.`id` = `resource`.`area_id`
             WHERE `area`.`field_id` = ?
               AND CAST(`resource`.`name` AS BINARY) = CAST(? AS BINARY)
             ORDER BY `resource`.`id`
             LIMIT 1",
        )
        .bind(field_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(ResourceJoin {
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
        }))
    }

    async fn user_resource_exists(&self, user_id: i64, resource_id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM `user_resource` WHERE `user_id` = ? AND `resource_id` = ?",
        )
        .bind(user_id)
        .bind(resource_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn insert_user_resource(&self, record: &UserResource) -> Result<()> {
        sqlx::query(
            "INSERT INTO `user_resource` (`user_id`, `resource_id`, `created_at`, `updated_at`)
             VALUES (?, ?, ?, ?)",
        )
        .bind(record.user_id)
        .bind(record.resource_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
