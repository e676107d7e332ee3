use thiserror::Error;

pub type HzResult<T> = Result<T, HzError>;

/// Fatal errors. Any of these aborts the current window build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HzError {
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    #[error("Data integrity error: {what}")]
    DataIntegrity { what: String },

    #[error("Schema error: {what}")]
    Schema { what: String },

    #[error("Store error: {what}")]
    Store { what: String },
}

impl HzError {
    pub fn configuration(what: impl Into<String>) -> Self {
        HzError::Configuration { what: what.into() }
    }

    pub fn data_integrity(what: impl Into<String>) -> Self {
        HzError::DataIntegrity { what: what.into() }
    }

    pub fn schema(what: impl Into<String>) -> Self {
        HzError::Schema { what: what.into() }
    }
}
