use crate::schema::Provider;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("No usable statement records returned by provider {provider}")]
    NoData { provider: Provider },

    #[error("Insufficient free cash flow data for valuation over a {horizon}-year horizon")]
    InsufficientValuationData { horizon: usize },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatementError>;
