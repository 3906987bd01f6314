//! Entry-point workflows: connect what a command needs, run it, report.

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlPool;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{Config, DbConfig};
use crate::db;
use crate::error::Result;
use crate::rpc::{QuantClient, QuantTypes};
use crate::schema;
use crate::server::{self, AppState};
use crate::transfer::{EntityLinkTransfer, MysqlLinkSource, MysqlResourceSink, TransferReport};

/// Connectivity of each configured database; `None` when not configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub system: Option<bool>,
    pub time: Option<bool>,
    pub legacy: Option<bool>,
}

impl HealthReport {
    /// Whether every configured database answered.
    pub fn healthy(&self) -> bool {
        [self.system, self.time, self.legacy]
            .iter()
            .all(|state| state.unwrap_or(true))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the back-office commands against one configuration.
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create the system tables, dropping them first when `reset` is set.
    pub async fn init(&self) -> Result<()> {
        let db = self.config.require_system()?;
        let pool = db::connect(db).await?;
        schema::sync_tables(&pool, &schema::system_tables(), &db.charset, db.reset).await?;
        pool.close().await;
        info!("System schema ready on {}", db.display_name());
        Ok(())
    }

    /// Copy legacy target/entity links into time user resources.
    pub async fn transfer(&self) -> Result<TransferReport> {
        let legacy = db::connect(self.config.require_legacy()?).await?;
        let time = db::connect(self.config.require_time()?).await?;

        let source = MysqlLinkSource::new(legacy.clone());
        let sink = MysqlResourceSink::new(time.clone());
        let result = EntityLinkTransfer::new(&source, &sink)
            .with_user_id(self.config.transfer.user_id)
            .run()
            .await;

        legacy.close().await;
        time.close().await;
        result
    }

    /// Stock type classification from the quant engine.
    pub async fn quant_types(&self) -> Result<QuantTypes> {
        let client = QuantClient::from_config(self.config.require_quant()?);
        Ok(client.get_type().await?)
    }

    /// Ping every configured database.
    pub async fn health_check(&self) -> HealthReport {
        HealthReport {
            system: ping_section(self.config.system.as_ref().map(|s| &s.database)).await,
            time: ping_section(self.config.time.as_ref().map(|s| &s.database)).await,
            legacy: ping_section(self.config.legacy.as_ref().map(|s| &s.database)).await,
        }
    }

    /// Serve the HTTP application until `shutdown` is cancelled.
    pub async fn serve(&self, shutdown: CancellationToken) -> Result<()> {
        let system = db::connect(self.config.require_system()?).await?;
        let time = match &self.config.time {
            Some(section) => Some(db::connect(&section.database).await?),
            None => None,
        };
        self.serve_with_pools(system, time, shutdown).await
    }

    /// Serve on already created pools; both pools are closed when the server
    /// stops, whether it stopped cleanly or not.
    async fn serve_with_pools(
        &self,
        system: MySqlPool,
        time: Option<MySqlPool>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let quant = self.config.quant.as_ref().map(QuantClient::from_config);

        let app = server::create_app(AppState {
            system: system.clone(),
            time: time.clone(),
            quant,
        });
        let result = server::run_server(app, &self.config.server.addr, shutdown).await;

        system.close().await;
        if let Some(time) = time {
            time.close().await;
        }
        result
    }
}

async fn ping_section(db: Option<&DbConfig>) -> Option<bool> {
    let db = db?;
    match db::connect(db).await {
        Ok(pool) => {
            pool.close().await;
            Some(true)
        }
        Err(e) => {
            warn!("{} is unreachable: {}", db.display_name(), e);
            Some(false)
        }
    }
}
