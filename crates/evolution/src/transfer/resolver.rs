//! Field-type code → entity display name.
//!
//! Each legacy field type keeps its entities in a table of its own. A
//! [`NameResolvers`] registry maps the code to the strategy that looks the
//! name up; a new entity type is one `register` call.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::store::LinkSource;
use crate::error::Result;

/// Looks up the display name of one entity.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// `Ok(None)` when the entity row does not exist.
    async fn resolve(&self, source: &dyn LinkSource, entity_id: i64) -> Result<Option<String>>;

    /// Short label for logs.
    fn label(&self) -> &str;
}

/// Resolver backed by a single entity table.
#[derive(Debug, Clone)]
pub struct EntityTableResolver {
    table: &'static str,
}

impl EntityTableResolver {
    pub fn new(table: &'static str) -> Self {
        Self { table }
    }
}

#[async_trait]
impl NameResolver for EntityTableResolver {
    async fn resolve(&self, source: &dyn LinkSource, entity_id: i64) -> Result<Option<String>> {
        source.entity_name(self.table, entity_id).await
    }

    fn label(&self) -> &str {
        self.table
    }
}

/// Legacy field-type codes and their entity tables.
pub const ENTITY_TABLES: [(i64, &str); 6] = [
    (1, "entity_skill"),
    (2, "entity_asset"),
    (3, "entity_work"),
    (4, "entity_circle"),
    (5, "entity_quest"),
    (6, "entity_life"),
];

/// Registry of name resolvers keyed by field-type code.
pub struct NameResolvers {
    by_code: BTreeMap<i64, Box<dyn NameResolver>>,
}

impl NameResolvers {
    /// Empty registry.
    pub fn empty() -> Self {
        Self {
            by_code: BTreeMap::new(),
        }
    }

    /// Registry with the six legacy entity tables.
    pub fn builtin() -> Self {
        ENTITY_TABLES
            .iter()
            .fold(Self::empty(), |registry, &(code, table)| {
                registry.register(code, EntityTableResolver::new(table))
            })
    }

    /// Register (or replace) the resolver for a code.
    pub fn register(mut self, code: i64, resolver: impl NameResolver + 'static) -> Self {
        self.by_code.insert(code, Box::new(resolver));
        self
    }

    /// Resolver for a code; `None` for unregistered codes.
    pub fn get(&self, code: i64) -> Option<&dyn NameResolver> {
        self.by_code.get(&code).map(|r| r.as_ref())
    }

    /// Registered codes in ascending order.
    pub fn codes(&self) -> Vec<i64> {
        self.by_code.keys().copied().collect()
    }
}

impl Default for NameResolvers {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_codes_one_to_six() {
        let registry = NameResolvers::builtin();
        assert_eq!(registry.codes(), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(registry.get(1).map(|r| r.label()), Some("entity_skill"));
        assert_eq!(registry.get(6).map(|r| r.label()), Some("entity_life"));
        assert!(registry.get(0).is_none());
        assert!(registry.get(7).is_none());
    }

    #[test]
    fn test_register_adds_seventh_type() {
        let registry = NameResolvers::builtin().register(7, EntityTableResolver::new("entity_travel"));
        assert_eq!(registry.get(7).map(|r| r.label()), Some("entity_travel"));
    }
}
