//! Typed records for the system, time and legacy schemas.
//!
//! Every record implements [`Model`]: it knows its table name and lists its
//! columns with their current values. [`Model::build_condition`] turns a
//! partially filled record into an equality filter, which is how list
//! endpoints express "find rows like this one".

pub mod legacy;
pub mod system;
pub mod time;

use chrono::NaiveDateTime;
use sqlx::mysql::MySql;
use sqlx::QueryBuilder;

use crate::db::identifier::qualify_mysql;
use crate::error::Result;

/// A column value as seen by the filter builder.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Text(String),
    Bool(bool),
    Timestamp(Option<NaiveDateTime>),
}

impl FieldValue {
    /// Whether the value is the zero value of its type.
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Int(v) => *v == 0,
            FieldValue::Text(v) => v.is_empty(),
            FieldValue::Bool(v) => !*v,
            FieldValue::Timestamp(v) => v.is_none(),
        }
    }
}

/// One column of a record, with its "omit if empty" flag.
#[derive(Debug, Clone)]
pub struct ColumnValue {
    pub column: &'static str,
    pub value: FieldValue,
    pub omit_empty: bool,
}

impl ColumnValue {
    /// A column left out of filters when it holds a zero value.
    pub fn omit_empty(column: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            column,
            value: value.into(),
            omit_empty: true,
        }
    }

    /// A column that never takes part in filters.
    pub fn skip(column: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            column,
            value: value.into(),
            omit_empty: false,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Option<NaiveDateTime>> for FieldValue {
    fn from(v: Option<NaiveDateTime>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::Timestamp(Some(v))
    }
}

/// A record mapped to a relational table.
pub trait Model {
    /// Table the record lives in.
    const TABLE: &'static str;

    /// Columns with their current values.
    fn columns(&self) -> Vec<ColumnValue>;

    /// Equality filter over every non-zero column marked `omit_empty`,
    /// qualified with the table name.
    fn build_condition(&self) -> Condition {
        Condition::from_columns(Self::TABLE, self.columns())
    }
}

/// Conjunction of `table.column = value` terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    terms: Vec<(String, String, FieldValue)>,
}

impl Condition {
    /// Build a condition from a record's columns.
    pub fn from_columns(table: &str, columns: Vec<ColumnValue>) -> Self {
        let terms = columns
            .into_iter()
            .filter(|c| c.omit_empty && !c.value.is_zero())
            .map(|c| (table.to_string(), c.column.to_string(), c.value))
            .collect();
        Self { terms }
    }

    /// Whether the condition matches every row.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Keys in `table.column` form, in column order.
    pub fn keys(&self) -> Vec<String> {
        self.terms
            .iter()
            .map(|(table, column, _)| format!("{}.{}", table, column))
            .collect()
    }

    /// Value bound for a `table.column` key.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.terms
            .iter()
            .find(|(table, column, _)| {
                key.strip_prefix(table.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
                    == Some(column.as_str())
            })
            .map(|(_, _, value)| value)
    }

    /// Append ` WHERE ...` with bound values to a query; no-op when empty.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, MySql>) -> Result<()> {
        for (i, (table, column, value)) in self.terms.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            qb.push(qualify_mysql(table, column)?);
            qb.push(" = ");
            match value {
                FieldValue::Int(v) => qb.push_bind(*v),
                FieldValue::Text(v) => qb.push_bind(v.clone()),
                FieldValue::Bool(v) => qb.push_bind(*v),
                FieldValue::Timestamp(v) => qb.push_bind(*v),
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::QuestTarget;

    #[test]
    fn test_zero_values() {
        assert!(FieldValue::Int(0).is_zero());
        assert!(FieldValue::Text(String::new()).is_zero());
        assert!(FieldValue::Bool(false).is_zero());
        assert!(FieldValue::Timestamp(None).is_zero());
        assert!(!FieldValue::Int(-1).is_zero());
    }

    #[test]
    fn test_condition_omits_zero_fields_and_prefixes_table() {
        let probe = QuestTarget {
            quest_id: 3,
            status: QuestTarget::STATUS_FINISH,
            ..Default::default()
        };
        let condition = probe.build_condition();
        assert_eq!(
            condition.keys(),
            vec!["quest_target.quest_id", "quest_target.status"]
        );
        assert_eq!(condition.get("quest_target.quest_id"), Some(&FieldValue::Int(3)));
        assert_eq!(condition.get("quest_target.resource_id"), None);
    }

    #[test]
    fn test_default_record_matches_everything() {
        assert!(QuestTarget::default().build_condition().is_empty());
    }

    #[test]
    fn test_columns_without_omit_empty_never_filter() {
        let columns = vec![
            ColumnValue::omit_empty("name", "skill"),
            ColumnValue::skip("password", "hunter2"),
        ];
        let condition = Condition::from_columns("user", columns);
        assert_eq!(condition.keys(), vec!["user.name"]);
    }

    #[test]
    fn test_push_where_renders_placeholders() {
        let probe = QuestTarget {
            quest_id: 3,
            desc: "read".to_string(),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<MySql>::new("SELECT `quest_target`.* FROM `quest_target`");
        probe.build_condition().push_where(&mut qb).unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT `quest_target`.* FROM `quest_target` WHERE `quest_target`.`quest_id` = ? AND `quest_target`.`desc` = ?"
        );
    }

    #[test]
    fn test_calls_share_no_state() {
        let a = QuestTarget {
            quest_id: 1,
            ..Default::default()
        };
        let b = QuestTarget {
            resource_id: 2,
            ..Default::default()
        };
        let first = a.build_condition();
        let _ = b.build_condition();
        assert_eq!(first, a.build_condition());
        assert_eq!(first.len(), 1);
    }
}
