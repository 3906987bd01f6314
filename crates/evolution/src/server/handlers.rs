//! HTTP request handlers. Filters come from optional query parameters;
//! absent or zero values match everything.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlPool;
use tracing::{debug, warn};

use super::response::{ok, ApiError, ApiResult};
use super::state::AppState;
use crate::db;
use crate::error::EvolutionError;
use crate::models::system::User;
use crate::models::time::{Field, Quest, QuestTarget, QuestTargetJoin};
use crate::rpc::QuantTypes;

#[derive(Debug, Serialize)]
pub struct Health {
    pub database: bool,
}

/// Liveness plus a system database ping.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Health> {
    let database = match db::ping(&state.system).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check ping failed: {}", e);
            false
        }
    };
    Ok(ok(Health { database }))
}

/// Optional user filter; absent or zero values match everything.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<i32>,
}

impl From<UserQuery> for User {
    fn from(q: UserQuery) -> Self {
        User {
            name: q.name.unwrap_or_default(),
            email: q.email.unwrap_or_default(),
            status: q.status.unwrap_or_default(),
            ..Default::default()
        }
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Vec<User>> {
    let probe = User::from(query);
    debug!(?probe, "Listing users");
    Ok(ok(db::find_by(&state.system, &probe).await?))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    let user = db::get_by_id::<User>(&state.system, id)
        .await?
        .ok_or(EvolutionError::NotFound { entity: "user", id })?;
    Ok(ok(user))
}

/// Stock type classification from the quant engine.
pub async fn quant_types(State(state): State<AppState>) -> ApiResult<QuantTypes> {
    let client = state
        .quant
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("quant engine is not configured"))?;
    Ok(ok(client.get_type().await?))
}

fn time_pool(state: &AppState) -> Result<&MySqlPool, ApiError> {
    state
        .time
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("time database is not configured"))
}

pub async fn list_fields(State(state): State<AppState>) -> ApiResult<Vec<Field>> {
    let pool = time_pool(&state)?;
    Ok(ok(db::find_by(pool, &Field::default()).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestQuery {
    pub user_id: Option<i64>,
    pub status: Option<i32>,
}

pub async fn list_quests(
    State(state): State<AppState>,
    Query(query): Query<QuestQuery>,
) -> ApiResult<Vec<Quest>> {
    let pool = time_pool(&state)?;
    let probe = Quest {
        user_id: query.user_id.unwrap_or_default(),
        status: query.status.unwrap_or_default(),
        ..Default::default()
    };
    Ok(ok(db::find_by(pool, &probe).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestTargetQuery {
    pub quest_id: Option<i64>,
    pub resource_id: Option<i64>,
    pub status: Option<i32>,
}

/// Targets of quests with their resource and area.
pub async fn list_quest_targets(
    State(state): State<AppState>,
    Query(query): Query<QuestTargetQuery>,
) -> ApiResult<Vec<QuestTargetJoin>> {
    let pool = time_pool(&state)?;
    let probe = QuestTarget {
        quest_id: query.quest_id.unwrap_or_default(),
        resource_id: query.resource_id.unwrap_or_default(),
        status: query.status.unwrap_or_default(),
        ..Default::default()
    };
    Ok(ok(db::find_quest_targets(pool, &probe).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Model;

    #[test]
    fn test_user_query_becomes_probe() {
        let probe = User::from(UserQuery {
            email: Some("a@b.c".to_string()),
            status: Some(User::STATUS_ACTIVE),
            ..Default::default()
        });
        assert_eq!(probe.build_condition().keys(), vec!["user.email", "user.status"]);
    }

    #[test]
    fn test_empty_user_query_matches_all() {
        assert!(User::from(UserQuery::default()).build_condition().is_empty());
    }
}
