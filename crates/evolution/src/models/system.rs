//! System schema records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ColumnValue, Model};

/// Back-office user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub status: i32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl User {
    pub const STATUS_ACTIVE: i32 = 1;
    pub const STATUS_DISABLED: i32 = 2;
}

impl Model for User {
    const TABLE: &'static str = "user";

    fn columns(&self) -> Vec<ColumnValue> {
        vec![
            ColumnValue::omit_empty("id", self.id),
            ColumnValue::omit_empty("name", &self.name),
            ColumnValue::omit_empty("email", &self.email),
            ColumnValue::skip("password", &self.password),
            ColumnValue::omit_empty("status", self.status),
            ColumnValue::skip("created_at", self.created_at),
            ColumnValue::skip("updated_at", self.updated_at),
        ]
    }
}
