use thiserror::Error;

/// Unified error type for Keel.
#[derive(Error, Debug)]
pub enum KeelError {
    // ── Profile errors ─────────────────────────────────────────
    #[error("unknown network profile '{name}' (known profiles: {known})")]
    UnknownProfile { name: String, known: String },

    #[error("network profile '{profile}' is missing a credential: environment variable {env} is not set")]
    MissingCredential { profile: String, env: String },

    #[error("network profile '{profile}' has a malformed endpoint '{url}': {reason}")]
    MalformedEndpoint {
        profile: String,
        url: String,
        reason: String,
    },

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    /// Environment access failed (e.g. the working directory is gone).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KeelError>;
