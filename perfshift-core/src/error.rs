use thiserror::Error;

/// Errors raised while searching a series for change points
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChangePointError {
    /// Too few samples, or nothing significant, to place a split.
    ///
    /// This is an expected outcome and is absorbed by `find_change_points`.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A NaN or infinite measurement was found in the analyzed window
    #[error("non-finite sample at window index {index}")]
    NonFiniteSample { index: usize },
}

impl ChangePointError {
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }
}

/// Errors raised while loading, saving or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
