//! State shared by every request handler.

use sqlx::mysql::MySqlPool;

use crate::rpc::QuantClient;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// System database (users).
    pub system: MySqlPool,
    /// Time database, when configured.
    pub time: Option<MySqlPool>,
    /// Quant engine, when configured.
    pub quant: Option<QuantClient>,
}
