//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration structure.
///
/// Every section is optional at load time; commands ask for the sections
/// they need through the `require_*` accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// System application (users, HTTP app, schema init).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<AppConfig>,

    /// Time application schema, the destination of the entity-link transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<AppConfig>,

    /// Legacy schema, the source of the entity-link transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<AppConfig>,

    /// Quant engine RPC endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quant: Option<QuantConfig>,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Transfer behavior.
    #[serde(default)]
    pub transfer: TransferConfig,
}

/// Per-application section holding its database connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DbConfig,
}

/// Database connection parameters.
#[derive(Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Driver type (only "mysql" is supported).
    #[serde(default = "default_mysql")]
    pub r#type: String,

    /// Database host.
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Schema (database) name.
    pub target: String,

    /// Drop and recreate managed tables on init (default: false).
    #[serde(default)]
    pub reset: bool,

    /// Connection charset (default: "utf8mb4").
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Session time zone (default: "+08:00").
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Maximum pool connections (default: 5).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection (default: 30).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("type", &self.r#type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("target", &self.target)
            .field("reset", &self.reset)
            .field("charset", &self.charset)
            .field("timezone", &self.timezone)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DbConfig {
    /// `host:port/target`, used in log lines.
    pub fn display_name(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.target)
    }
}

/// Quant engine RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantConfig {
    /// Engine host. The engine listens on IPv4 loopback in most setups.
    #[serde(default = "default_quant_host")]
    pub host: String,

    /// Engine port.
    pub port: u16,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (default: "0.0.0.0:8080").
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

/// Entity-link transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// User that receives the migrated resources (default: 1).
    #[serde(default = "default_user_id")]
    pub user_id: i64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
        }
    }
}

fn default_mysql() -> String {
    "mysql".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8mb4".to_string()
}

fn default_timezone() -> String {
    "+08:00".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_quant_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_user_id() -> i64 {
    1
}
