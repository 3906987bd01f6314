//! Configuration validation.

use super::{Config, DbConfig};
use crate::error::{EvolutionError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    for (name, app) in [
        ("system", &config.system),
        ("time", &config.time),
        ("legacy", &config.legacy),
    ] {
        if let Some(app) = app {
            validate_db(name, &app.database)?;
        }
    }

    // Transfer source and destination cannot be the same schema
    if let (Some(legacy), Some(time)) = (&config.legacy, &config.time) {
        let (src, dst) = (&legacy.database, &time.database);
        if src.host == dst.host && src.port == dst.port && src.target == dst.target {
            return Err(EvolutionError::Config(
                "legacy and time cannot be the same database".into(),
            ));
        }
    }

    if let Some(quant) = &config.quant {
        if quant.host.is_empty() {
            return Err(EvolutionError::Config("quant.host is required".into()));
        }
        if quant.port == 0 {
            return Err(EvolutionError::Config("quant.port is required".into()));
        }
    }

    validate_listen_addr(&config.server.addr)?;

    if config.transfer.user_id <= 0 {
        return Err(EvolutionError::Config(
            "transfer.user_id must be positive".into(),
        ));
    }

    Ok(())
}

/// Check that `addr` has the `host:port` shape. Host names are resolved
/// only when the server binds.
pub fn validate_listen_addr(addr: &str) -> Result<()> {
    let valid = match addr.rsplit_once(':') {
        Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(EvolutionError::Config(format!(
            "server.addr must be host:port, got '{}'",
            addr
        )))
    }
}

fn validate_db(section: &str, db: &DbConfig) -> Result<()> {
    if db.host.is_empty() {
        return Err(EvolutionError::Config(format!(
            "{}.database.host is required",
            section
        )));
    }
    if db.user.is_empty() {
        return Err(EvolutionError::Config(format!(
            "{}.database.user is required",
            section
        )));
    }
    if db.target.is_empty() {
        return Err(EvolutionError::Config(format!(
            "{}.database.target is required",
            section
        )));
    }
    if db.r#type != "mysql" {
        return Err(EvolutionError::Config(format!(
            "{}.database.type must be 'mysql', got '{}'",
            section, db.r#type
        )));
    }
    if db.max_connections == 0 {
        return Err(EvolutionError::Config(format!(
            "{}.database.max_connections must be at least 1",
            section
        )));
    }
    Ok(())
}
