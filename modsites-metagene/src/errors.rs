use modsites_core::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModSitesError {
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A statistical test's precondition does not hold for the data given.
    #[error("Insufficient data for {test}: {reason}")]
    InsufficientData { test: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Numerical error: {0}")]
    Numeric(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Error parsing configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ModSitesError {
    pub(crate) fn insufficient(test: &str, reason: impl Into<String>) -> Self {
        ModSitesError::InsufficientData {
            test: test.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ModSitesError::Model(ModelError::MalformedInput(reason.into()))
    }
}
