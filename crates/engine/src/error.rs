use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] configuration::error::ConfigError),

    /// Only the raw-transaction fetch reaches the caller; the first two tiers
    /// are fallen through instead.
    #[error("API client error: {0}")]
    ApiClient(#[from] api_client::error::ApiError),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] core_types::CoreError),
}
