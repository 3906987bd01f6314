//! Legacy schema records read by the entity-link transfer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ColumnValue, Model};

/// Domain object that link rows attach to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Target {
    pub id: i64,
    pub name: String,
    /// Field-type code selecting the entity table of linked entities.
    pub field_id: i64,
}

impl Model for Target {
    const TABLE: &'static str = "target";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("name", &self.name),
            ColumnValue::omit_empty("field_id", self.field_id),
        ]
    }
}

/// Relation between a target and an entity of the target's field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TargetEntityLink {
    pub id: i64,
    pub target_id: i64,
    pub entity_id: i64,
    pub ctime: Option<NaiveDateTime>,
    pub utime: Option<NaiveDateTime>,
}

impl Model for TargetEntityLink {
    const TABLE: &'static str = "target_entity_link";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("target_id", self.target_id),
            ColumnValue::omit_empty("entity_id", self.entity_id),
            ColumnValue::skip("ctime", self.ctime),
            ColumnValue::skip("utime", self.utime),
        ]
    }
}

/// A link row left-joined with its target; `target` is `None` when the
/// link points at a target that no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetEntityLinkJoin {
    pub link: TargetEntityLink,
    pub target: Option<Target>,
}

impl TargetEntityLinkJoin {
    /// Field-type code of the joined target.
    pub fn field_id(&self) -> Option<i64> {
        self.target.as_ref().map(|t| t.field_id)
    }

    pub fn entity_id(&self) -> i64 {
        self.link.entity_id
    }
}

/// Row shape shared by the six entity tables: only the display name matters
/// to the transfer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Entity {
    pub id: i64,
    pub name: String,
}
