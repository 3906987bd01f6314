//! Error types for the back-office library.

use thiserror::Error;

use crate::rpc::RpcError;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for database connection or query errors.
pub const EXIT_DATABASE_ERROR: u8 = 2;
/// Exit code for a transfer run that aborted.
pub const EXIT_TRANSFER_ERROR: u8 = 3;
/// Exit code for quant engine RPC failures.
pub const EXIT_RPC_ERROR: u8 = 4;
/// Exit code for IO errors (missing config file, etc.)
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for back-office operations.
#[derive(Error, Debug)]
pub enum EvolutionError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Transfer run aborted
    #[error("Transfer failed at {stage}: {message}")]
    Transfer { stage: String, message: String },

    /// A field has no phase rows in the destination schema
    #[error("No phase exists for field {0} - add at least one phase before transferring")]
    PhaseMissing(i64),

    /// Quant engine RPC failure
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Requested record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EvolutionError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        EvolutionError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Transfer error
    pub fn transfer(stage: impl Into<String>, message: impl ToString) -> Self {
        EvolutionError::Transfer {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error category.
    pub fn exit_code(&self) -> u8 {
        match self {
            EvolutionError::Config(_) | EvolutionError::Yaml(_) => EXIT_CONFIG_ERROR,
            EvolutionError::Database(_)
            | EvolutionError::Pool { .. }
            | EvolutionError::NotFound { .. } => EXIT_DATABASE_ERROR,
            EvolutionError::Transfer { .. } | EvolutionError::PhaseMissing(_) => {
                EXIT_TRANSFER_ERROR
            }
            EvolutionError::Rpc(_) => EXIT_RPC_ERROR,
            EvolutionError::Io(_) | EvolutionError::Json(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for back-office operations.
pub type Result<T> = std::result::Result<T, EvolutionError>;
