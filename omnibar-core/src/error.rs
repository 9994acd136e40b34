//! Error types for the Omnibar core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering plugin handlers, pipeline construction, storage, and
//! configuration domains.

/// Top-level error type for the Omnibar core library.
#[derive(Debug, thiserror::Error)]
pub enum OmnibarError {
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by plugin handler invocations.
///
/// A handler failure never aborts the whole pipeline: the engine isolates
/// each invocation and degrades it to an empty contribution (stage 2) or an
/// empty resolution (stages 1, 3, 4).
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin not found: {name}")]
    NotFound { name: String },

    #[error("Plugin '{name}' input handler failed: {message}")]
    InputFailed { name: String, message: String },

    #[error("Plugin '{name}' enter handler failed: {message}")]
    EnterFailed { name: String, message: String },

    #[error("Plugin '{name}' rejected the query: {reason}")]
    Rejected { name: String, reason: String },
}

impl PluginError {
    /// Wrap an arbitrary failure from a plugin's input handler.
    pub fn input(name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::InputFailed {
            name: name.into(),
            message: err.to_string(),
        }
    }

    /// Wrap an arbitrary failure from a plugin's enter handler.
    pub fn enter(name: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::EnterFailed {
            name: name.into(),
            message: err.to_string(),
        }
    }
}

/// Errors from classifier and matcher construction.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid pattern for regexp command '{key}': {source}")]
    InvalidRegex {
        key: String,
        #[source]
        source: regex::Error,
    },

    #[error("Composite matcher construction failed: {source}")]
    MatcherBuild {
        #[source]
        source: regex::Error,
    },
}

/// Errors from the key-value record store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error for record '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt record '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, OmnibarError>;
