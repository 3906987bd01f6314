//! Time schema records: fields, areas, resources, phases, quests and the
//! per-user resource associations.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ColumnValue, Model};

/// Top-level grouping (skill, asset, work, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Field {
    pub id: i64,
    pub name: String,
}

impl Model for Field {
    const TABLE: &'static str = "field";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("name", &self.name),
        ]
    }
}

/// Area inside a field; resources are named within an area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Area {
    pub id: i64,
    pub name: String,
    pub field_id: i64,
}

impl Model for Area {
    const TABLE: &'static str = "area";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("name", &self.name),
            ColumnValue::omit_empty("field_id", self.field_id),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub area_id: i64,
    pub desc: String,
}

impl Model for Resource {
    const TABLE: &'static str = "resource";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("name", &self.name),
            ColumnValue::omit_empty("area_id", self.area_id),
            ColumnValue::omit_empty("desc", &self.desc),
        ]
    }
}

/// A resource together with the area that owns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceJoin {
    pub resource: Resource,
    pub area: Area,
}

impl ResourceJoin {
    /// Field the resource belongs to, through its area.
    pub fn field_id(&self) -> i64 {
        self.area.field_id
    }
}

/// Ordered stage within a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Phase {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub level: i32,
    pub threshold: i32,
    pub field_id: i64,
}

impl Model for Phase {
    const TABLE: &'static str = "phase";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("name", &self.name),
            ColumnValue::omit_empty("desc", &self.desc),
            ColumnValue::omit_empty("level", self.level),
            ColumnValue::omit_empty("threshold", self.threshold),
            ColumnValue::omit_empty("field_id", self.field_id),
        ]
    }
}

/// Association between a user and a resource they hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserResource {
    pub id: i64,
    pub user_id: i64,
    pub resource_id: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Model for UserResource {
    const TABLE: &'static str = "user_resource";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("user_id", self.user_id),
            ColumnValue::omit_empty("resource_id", self.resource_id),
            ColumnValue::skip("created_at", self.created_at),
            ColumnValue::skip("updated_at", self.updated_at),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Quest {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub user_id: i64,
    pub status: i32,
}

impl Model for Quest {
    const TABLE: &'static str = "quest";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("name", &self.name),
            ColumnValue::omit_empty("desc", &self.desc),
            ColumnValue::omit_empty("user_id", self.user_id),
            ColumnValue::omit_empty("status", self.status),
        ]
    }
}

/// Resource a quest aims at; unique per (quest, resource).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuestTarget {
    pub id: i64,
    pub quest_id: i64,
    pub resource_id: i64,
    pub desc: String,
    pub status: i32,
}

impl QuestTarget {
    pub const STATUS_WAIT: i32 = 1;
    pub const STATUS_FINISH: i32 = 2;
}

impl Model for QuestTarget {
    const TABLE: &'static str = "quest_target";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("quest_id", self.quest_id),
            ColumnValue::omit_empty("resource_id", self.resource_id),
            ColumnValue::omit_empty("desc", &self.desc),
            ColumnValue::omit_empty("status", self.status),
        ]
    }
}

/// Quest target with its resource and the resource's area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestTargetJoin {
    pub quest_target: QuestTarget,
    pub resource: Resource,
    pub area: Area,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_join_field_comes_from_area() {
        let join = ResourceJoin {
            resource: Resource {
                id: 10,
                name: "Rust".to_string(),
                area_id: 4,
                ..Default::default()
            },
            area: Area {
                id: 4,
                name: "Languages".to_string(),
                field_id: 1,
            },
        };
        assert_eq!(join.field_id(), 1);
    }

    #[test]
    fn test_user_resource_filters_on_ids_only() {
        let probe = UserResource {
            user_id: 1,
            resource_id: 10,
            created_at: NaiveDateTime::parse_from_str("2018-01-02 03:04:05", "%Y-%m-%d %H:%M:%S")
                .ok(),
            ..Default::default()
        };
        assert_eq!(
            probe.build_condition().keys(),
            vec!["user_resource.user_id", "user_resource.resource_id"]
        );
    }
}
