//! Error types for stepchain.
//!
//! Layered taxonomy: each subsystem gets its own enum, and the top-level
//! [`StepchainError`] wraps them with `#[from]` conversions so `?` flows
//! naturally across module boundaries. `anyhow::Error` is accepted
//! transparently for one-off contexts that do not deserve a variant.

use thiserror::Error;

// ─────────────────────────── Top-level error ───────────────────────────

#[derive(Debug, Error)]
pub enum StepchainError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("tool: {0}")]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─────────────────────────── Subsystem errors ───────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set; export it or add api_key to {config_path}")]
    MissingApiKey { config_path: String },

    #[error("failed to load config: {0}")]
    Load(String),

    #[error("invalid config: {0}")]
    Validation(String),

    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed step response: {0}")]
    Malformed(String),

    #[error("{step} step missing required field '{field}'")]
    MissingField { step: String, field: String },
}

#[derive(Debug, Error)]
pub enum ToolError {
    /// The registry has no tool under the requested name. The display text
    /// is fed back to the model verbatim as an observation.
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("tool '{name}' failed: {message}")]
    Execution { name: String, message: String },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StepchainError>;

// ─────────────────────────────── Tests ───────────────────────────────
