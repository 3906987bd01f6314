//! Configuration loading and validation.

mod types;
mod validation;

pub(crate) use validation::validate_listen_addr;

pub use types::*;

use crate::error::{EvolutionError, Result};
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Database of the system application.
    pub fn require_system(&self) -> Result<&DbConfig> {
        section(&self.system, "system")
    }

    /// Database of the time application (transfer destination).
    pub fn require_time(&self) -> Result<&DbConfig> {
        section(&self.time, "time")
    }

    /// Legacy database (transfer source).
    pub fn require_legacy(&self) -> Result<&DbConfig> {
        section(&self.legacy, "legacy")
    }

    /// Quant engine endpoint.
    pub fn require_quant(&self) -> Result<&QuantConfig> {
        self.quant
            .as_ref()
            .ok_or_else(|| EvolutionError::Config("quant section is required".into()))
    }
}

fn section<'a>(app: &'a Option<AppConfig>, name: &str) -> Result<&'a DbConfig> {
    app.as_ref()
        .map(|a| &a.database)
        .ok_or_else(|| EvolutionError::Config(format!("{}.database section is required", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
system:
  database:
    host: db.local
    user: root
    password: secret
    target: evolution_system
    reset: true
time:
  database:
    host: db.local
    user: root
    target: evolution_time
legacy:
  database:
    host: legacy.local
    port: 3307
    user: php
    target: life
quant:
  port: 9090
transfer:
  user_id: 7
"#;

    #[test]
    fn test_from_yaml_applies_defaults() {
        let config = Config::from_yaml(FULL).unwrap();
        let system = config.require_system().unwrap();
        assert_eq!(system.r#type, "mysql");
        assert_eq!(system.port, 3306);
        assert_eq!(system.charset, "utf8mb4");
        assert_eq!(system.timezone, "+08:00");
        assert!(system.reset);

        let legacy = config.require_legacy().unwrap();
        assert_eq!(legacy.port, 3307);
        assert!(!legacy.reset);

        let quant = config.require_quant().unwrap();
        assert_eq!(quant.host, "127.0.0.1");
        assert_eq!(quant.port, 9090);

        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.transfer.user_id, 7);
    }

    #[test]
    fn test_missing_section_is_config_error() {
        let config = Config::from_yaml("server:\n  addr: 127.0.0.1:9000\n").unwrap();
        let err = config.require_time().unwrap_err();
        assert!(err.to_string().contains("time.database"));
        assert!(config.require_quant().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FULL).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.require_time().unwrap().target, "evolution_time");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, EvolutionError::Io(_)));
    }
}
