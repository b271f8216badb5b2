//! Error types for placelens

/// Result type alias using placelens' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for placelens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors (bad gazetteer, pattern that fails to compile)
    #[error("configuration error: {0}")]
    Config(String),

    /// A classification rule could not evaluate a phrase
    #[error("pattern evaluation error in rule '{rule}': {reason}")]
    PatternEvaluation { rule: String, reason: String },

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parse errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new pattern evaluation error
    pub fn pattern(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PatternEvaluation {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}
