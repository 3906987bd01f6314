//! # evolution
//!
//! Back-office library for the evolution applications.
//!
//! - **Entity-link transfer** from the legacy target/entity schema into the
//!   time schema's per-user resource associations
//! - **Quant engine client** over Thrift
//! - **Model-driven filters** for equality queries
//! - **Schema init** and the **HTTP application**
//!
//! ## Example
//!
//! ```rust,no_run
//! use evolution::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> evolution::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let report = Orchestrator::new(config).transfer().await?;
//!     println!("Inserted {} associations", report.inserted());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod rpc;
pub mod schema;
pub mod server;
pub mod transfer;

// Re-exports for convenient access
pub use config::{Config, DbConfig, QuantConfig};
pub use error::{EvolutionError, Result};
pub use models::{Condition, Model};
pub use orchestrator::{HealthReport, Orchestrator};
pub use rpc::{QuantClient, QuantTypes, RpcError};
pub use transfer::{EntityLinkTransfer, NameResolvers, TransferReport, TransferStats};
